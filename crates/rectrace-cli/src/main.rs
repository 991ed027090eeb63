//! `rectrace-cli` – process entry point for the rectangle tracer.
//!
//! 1. Initialises structured logging (and the optional OTLP exporter).
//! 2. Loads `~/.rectrace/config.toml`, writing the defaults on first run.
//! 3. Installs a Ctrl-C handler that publishes a stop command plus a
//!    `SystemAlerts` fault before shutting the loops down.
//! 4. Wires the simulator feed (when enabled) and the control loop onto a
//!    shared event bus and runs them to completion.

mod config;

use std::time::Duration;

use colored::Colorize;
use tokio::sync::watch;
use tracing::{info, warn};

use rectrace_middleware::bus::{EventBus, Topic};
use rectrace_middleware::sim::{SimFeed, TurtleSim};
use rectrace_runtime::control_loop::{ControlLoop, ControlLoopConfig};
use rectrace_runtime::telemetry;
use rectrace_types::{Event, EventPayload, VelocityCommand};

fn main() {
    // Hold the guard for the whole process so pending spans are flushed.
    let _guard = telemetry::init_tracing("rectrace");

    print_banner();

    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  No config found – defaults written to {}",
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => warn!(error = %e, "could not persist default config"),
            }
            // Overrides apply to this run but are not persisted.
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {e}", "Config error".red());
            println!("  Using default configuration.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };

    let bus = EventBus::new(cfg.bus_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Ctrl-C: command a full stop, alert any listeners, then wind down.
    let bus_for_ctrlc = bus.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping the tracer …".yellow().bold());

        let _ = bus_for_ctrlc.publish_to(
            Topic::DriveCommands,
            Event::new("rectrace-cli", EventPayload::Drive(VelocityCommand::STOP)),
        );
        let _ = bus_for_ctrlc.publish_to(
            Topic::SystemAlerts,
            Event::new(
                "rectrace-cli",
                EventPayload::Fault {
                    component: "cli".to_string(),
                    code: 130,
                    message: "operator Ctrl-C".to_string(),
                },
            ),
        );
        let _ = shutdown_tx.send(true);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler; graceful shutdown unavailable");
    }

    // The Tokio runtime is created only after `init_tracing` (the simple
    // span exporter must not depend on a live runtime at init time).
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}: {e}", "Failed to start async runtime".red());
            std::process::exit(1);
        }
    };
    runtime.block_on(run(cfg, bus, shutdown_rx));
}

async fn run(cfg: config::Config, bus: EventBus, shutdown_rx: watch::Receiver<bool>) {
    if cfg.sim_enabled {
        let spawn = cfg.params.spawn_pose();
        let feed = SimFeed::new(TurtleSim::new(spawn), bus.clone(), cfg.sim_rate_hz);
        tokio::spawn(feed.run(shutdown_rx.clone()));
        info!(rate_hz = cfg.sim_rate_hz, "simulator feed enabled");
    } else {
        info!("simulator disabled; expecting an external pose feed on the bus");
    }

    let control = ControlLoop::new(
        cfg.params,
        bus,
        ControlLoopConfig {
            tick_rate_hz: cfg.tick_rate_hz,
            pose_deadline: Duration::from_millis(cfg.pose_deadline_ms),
        },
    );
    control.run(shutdown_rx).await;

    println!("{}", "  ✓ Tracer stopped.".green());
}

fn print_banner() {
    println!();
    println!("  {} {}",
        "rectrace".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Closed-loop rectangle tracer for differential-drive agents");
    println!();
}
