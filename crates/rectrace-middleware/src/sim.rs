//! Headless kinematic turtle simulator.
//!
//! [`TurtleSim`] integrates unicycle kinematics so the full rectrace stack can
//! run in CI pipelines and demos without a live agent transport.  [`SimFeed`]
//! runs it against the [`EventBus`]: drive commands in, pose samples out.
//!
//! # Example
//!
//! ```rust
//! use rectrace_middleware::sim::TurtleSim;
//! use rectrace_types::{Pose, VelocityCommand};
//!
//! let mut sim = TurtleSim::new(Pose::new(5.5, 5.5, 0.0));
//! sim.apply(VelocityCommand::new(1.0, 0.0));
//! let pose = sim.step(0.5);
//! assert!((pose.x - 6.0).abs() < 1e-5);
//! ```

use std::f32::consts::PI;
use std::time::Duration;

use rectrace_types::{Event, EventPayload, Pose, VelocityCommand};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::bus::{EventBus, Topic};

/// Wrap an angle into `(-π, π]`.
fn wrap_angle(theta: f32) -> f32 {
    let mut t = theta;
    while t > PI {
        t -= 2.0 * PI;
    }
    while t <= -PI {
        t += 2.0 * PI;
    }
    t
}

/// Unicycle-model integrator with the same conventions as the turtlesim
/// arena: position in arena units, heading CCW from +X in `(-π, π]`.
#[derive(Debug, Clone)]
pub struct TurtleSim {
    pose: Pose,
    command: VelocityCommand,
}

impl TurtleSim {
    /// Create a simulator resting at `spawn` with zero velocity.
    pub fn new(spawn: Pose) -> Self {
        Self {
            pose: spawn,
            command: VelocityCommand::STOP,
        }
    }

    /// Latch a velocity setpoint.  It stays in effect until replaced.
    pub fn apply(&mut self, command: VelocityCommand) {
        self.command = command;
    }

    /// Advance the simulation by `dt` seconds and return the new pose.
    pub fn step(&mut self, dt: f32) -> Pose {
        let dt = dt.max(0.0);
        let heading = self.pose.heading_rad;
        self.pose.x += self.command.linear * heading.cos() * dt;
        self.pose.y += self.command.linear * heading.sin() * dt;
        self.pose.heading_rad = wrap_angle(heading + self.command.angular * dt);
        self.pose
    }

    /// The current pose without advancing time.
    pub fn pose(&self) -> Pose {
        self.pose
    }
}

/// Drives a [`TurtleSim`] on the event bus at a fixed rate.
///
/// Each period the feed drains any queued [`EventPayload::Drive`] commands
/// (latching the newest), integrates one step, and publishes the resulting
/// pose on [`Topic::PoseFeedback`].
pub struct SimFeed {
    sim: TurtleSim,
    bus: EventBus,
    period: Duration,
}

impl SimFeed {
    /// Create a feed stepping `sim` every `1 / rate_hz` seconds.
    pub fn new(sim: TurtleSim, bus: EventBus, rate_hz: u32) -> Self {
        let rate_hz = rate_hz.max(1);
        Self {
            sim,
            bus,
            period: Duration::from_secs_f64(1.0 / f64::from(rate_hz)),
        }
    }

    /// Run until `shutdown` flips to `true`.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut commands_rx = self.bus.subscribe_to(Topic::DriveCommands);
        let mut ticker = tokio::time::interval(self.period);
        let dt = self.period.as_secs_f32();
        info!(period_s = dt, "simulator feed started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Latch the newest queued command, if any.
                    loop {
                        match commands_rx.try_recv() {
                            Ok(event) => {
                                if let EventPayload::Drive(cmd) = event.payload {
                                    self.sim.apply(cmd);
                                }
                            }
                            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                                debug!(dropped = n, "simulator lagged on drive commands");
                                continue;
                            }
                            Err(_) => break,
                        }
                    }
                    let pose = self.sim.step(dt);
                    let event = Event::new(
                        "rectrace-middleware::sim_feed",
                        EventPayload::Pose(pose),
                    );
                    // No pose subscriber yet is a normal startup condition.
                    let _ = self.bus.publish_to(Topic::PoseFeedback, event);
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("simulator feed stopping");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_integration() {
        let mut sim = TurtleSim::new(Pose::new(0.0, 0.0, 0.0));
        sim.apply(VelocityCommand::new(2.0, 0.0));
        let pose = sim.step(1.0);
        assert!((pose.x - 2.0).abs() < 1e-5);
        assert!(pose.y.abs() < 1e-5);
        assert!(pose.heading_rad.abs() < 1e-5);
    }

    #[test]
    fn pure_rotation_leaves_position_unchanged() {
        let mut sim = TurtleSim::new(Pose::new(3.0, 4.0, 0.0));
        sim.apply(VelocityCommand::new(0.0, 0.5));
        let pose = sim.step(2.0);
        assert!((pose.x - 3.0).abs() < 1e-5);
        assert!((pose.y - 4.0).abs() < 1e-5);
        assert!((pose.heading_rad - 1.0).abs() < 1e-5);
    }

    #[test]
    fn heading_wraps_past_pi() {
        let mut sim = TurtleSim::new(Pose::new(0.0, 0.0, 3.0));
        sim.apply(VelocityCommand::new(0.0, 1.0));
        // 3.0 + 0.5 = 3.5 rad, which wraps to 3.5 - 2π ≈ -2.7832.
        let pose = sim.step(0.5);
        assert!((pose.heading_rad - (3.5 - 2.0 * PI)).abs() < 1e-5);
    }

    #[test]
    fn heading_wraps_below_minus_pi() {
        let mut sim = TurtleSim::new(Pose::new(0.0, 0.0, -3.0));
        sim.apply(VelocityCommand::new(0.0, -1.0));
        let pose = sim.step(0.5);
        assert!((pose.heading_rad - (-3.5 + 2.0 * PI)).abs() < 1e-5);
    }

    #[test]
    fn negative_dt_treated_as_zero() {
        let mut sim = TurtleSim::new(Pose::new(1.0, 1.0, 0.0));
        sim.apply(VelocityCommand::new(1.0, 1.0));
        let pose = sim.step(-0.5);
        assert_eq!(pose, Pose::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn command_is_latched_until_replaced() {
        let mut sim = TurtleSim::new(Pose::new(0.0, 0.0, 0.0));
        sim.apply(VelocityCommand::new(1.0, 0.0));
        sim.step(1.0);
        sim.step(1.0);
        assert!((sim.pose().x - 2.0).abs() < 1e-5);

        sim.apply(VelocityCommand::STOP);
        sim.step(1.0);
        assert!((sim.pose().x - 2.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn sim_feed_publishes_poses_and_honors_commands() {
        let bus = EventBus::default();
        let mut pose_rx = bus.subscribe_to(Topic::PoseFeedback);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let feed = SimFeed::new(TurtleSim::new(Pose::new(5.5, 5.5, 0.0)), bus.clone(), 200);
        let handle = tokio::spawn(feed.run(shutdown_rx));

        // The first pose event proves the feed is up (and therefore already
        // subscribed to drive commands); only then is a command observable.
        pose_rx.recv().await.expect("first pose event");
        bus.publish_to(
            Topic::DriveCommands,
            Event::new(
                "test::driver",
                EventPayload::Drive(VelocityCommand::new(1.0, 0.0)),
            ),
        )
        .expect("command publish");

        let mut last_x = 5.5_f32;
        for _ in 0..20 {
            let event = pose_rx.recv().await.expect("pose event");
            if let EventPayload::Pose(pose) = event.payload {
                assert!(pose.x >= last_x - 1e-6, "x must be non-decreasing");
                last_x = pose.x;
            } else {
                panic!("expected a pose payload");
            }
        }
        assert!(last_x > 5.5, "the turtle should have moved forward");

        shutdown_tx.send(true).expect("shutdown signal");
        handle.await.expect("feed task");
    }
}
