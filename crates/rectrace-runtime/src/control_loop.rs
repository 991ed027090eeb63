//! [`ControlLoop`] – the fixed-rate scheduler around the controller.
//!
//! Each period the loop:
//!
//! 1. drains every queued pose event from [`Topic::PoseFeedback`] without
//!    blocking, feeding each into the controller (the last one wins);
//! 2. advances the controller by one tick;
//! 3. publishes the emitted [`VelocityCommand`] on [`Topic::DriveCommands`].
//!
//! Command emission is fire-and-forget: a topic with no subscribers is a
//! normal startup condition, not an error.  The loop has no blocking work of
//! its own – one tick is pure arithmetic plus channel operations.

use std::time::Duration;

use rectrace_controller::{TraceController, TraceParams};
use rectrace_middleware::bus::{EventBus, Topic, TopicReceiver};
use rectrace_types::{Event, EventPayload, VelocityCommand};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::feed_monitor::FeedMonitor;

/// Source tag stamped on every command event the loop publishes.
const SOURCE: &str = "rectrace-runtime::control_loop";

/// Timing knobs for [`ControlLoop`].
#[derive(Debug, Clone)]
pub struct ControlLoopConfig {
    /// Tick frequency.  The controller tolerates any rate fast enough that
    /// the agent cannot overshoot a tolerance band between ticks.
    pub tick_rate_hz: u32,
    /// Silence on the pose feed longer than this raises a warning.
    pub pose_deadline: Duration,
}

impl Default for ControlLoopConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 1_000,
            pose_deadline: Duration::from_millis(500),
        }
    }
}

/// Owns a [`TraceController`] and drives it against the event bus.
pub struct ControlLoop {
    controller: TraceController,
    bus: EventBus,
    pose_rx: TopicReceiver,
    monitor: FeedMonitor,
    period: Duration,
}

impl ControlLoop {
    /// Wire a new controller to `bus`.  Subscribes to the pose topic
    /// immediately so no sample published after this call is lost.
    pub fn new(params: TraceParams, bus: EventBus, config: ControlLoopConfig) -> Self {
        let pose_rx = bus.subscribe_to(Topic::PoseFeedback);
        let rate = config.tick_rate_hz.max(1);
        Self {
            controller: TraceController::new(params),
            bus,
            pose_rx,
            monitor: FeedMonitor::new(config.pose_deadline),
            period: Duration::from_secs_f64(1.0 / f64::from(rate)),
        }
    }

    /// Ingest pending pose samples, advance one tick, publish the command.
    ///
    /// Exposed separately from [`run`][Self::run] so tests can single-step
    /// the loop deterministically.
    pub fn tick(&mut self) -> VelocityCommand {
        self.drain_pose_feed();
        if self.monitor.should_warn() {
            warn!("pose feed silent past deadline; controller is running on a stale pose");
        }
        let command = self.controller.tick();
        let event = Event::new(SOURCE, EventPayload::Drive(command));
        if let Err(e) = self.bus.publish_to(Topic::DriveCommands, event) {
            // Nobody listening yet – keep ticking, the sim or transport
            // subscribes in its own time.
            debug!(error = %e, "command published to empty topic");
        }
        command
    }

    /// Run the loop at the configured rate until `shutdown` flips to `true`.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.period);
        // A missed deadline should not cause a burst of catch-up ticks.
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!(period_s = self.period.as_secs_f32(), "control loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("control loop stopping");
                        break;
                    }
                }
            }
        }
    }

    /// Read access to the controller, for tests and status reporting.
    pub fn controller(&self) -> &TraceController {
        &self.controller
    }

    /// Whether the pose feed has gone past its deadline without an accepted
    /// sample.  Rejected samples do not count.
    pub fn pose_feed_stale(&self) -> bool {
        self.monitor.stale()
    }

    /// Non-blocking drain of the pose topic.  Every queued sample is offered
    /// to the controller; since `observe` is last-write-wins only the newest
    /// valid one matters.
    ///
    /// Only accepted samples count as a heartbeat: a feed streaming rejected
    /// (non-finite) poses leaves the controller just as blind as a silent
    /// one, so it must trip the staleness deadline the same way.
    fn drain_pose_feed(&mut self) {
        loop {
            match self.pose_rx.try_recv() {
                Ok(event) => {
                    if let EventPayload::Pose(pose) = event.payload
                        && self.controller.observe(pose)
                    {
                        self.monitor.heartbeat();
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    // Fell behind a fast feed; skip ahead and keep draining.
                    debug!(dropped = n, "pose feed lagged");
                    continue;
                }
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rectrace_controller::Phase;
    use rectrace_types::Pose;

    fn pose_event(x: f32, y: f32, heading: f32) -> Event {
        Event::new("test::feed", EventPayload::Pose(Pose::new(x, y, heading)))
    }

    fn make_loop(bus: &EventBus) -> ControlLoop {
        ControlLoop::new(
            TraceParams::default(),
            bus.clone(),
            ControlLoopConfig::default(),
        )
    }

    #[tokio::test]
    async fn tick_publishes_the_emitted_command() {
        let bus = EventBus::default();
        let mut cl = make_loop(&bus);
        let mut commands_rx = bus.subscribe_to(Topic::DriveCommands);

        let cmd = cl.tick();
        let event = commands_rx.try_recv().expect("command event");
        match event.payload {
            EventPayload::Drive(published) => assert_eq!(published, cmd),
            other => panic!("expected a drive payload, got {other:?}"),
        }
        assert_eq!(event.source, SOURCE);
    }

    #[tokio::test]
    async fn newest_queued_pose_wins() {
        let bus = EventBus::default();
        let mut cl = make_loop(&bus);

        bus.publish_to(Topic::PoseFeedback, pose_event(3.0, 3.0, 0.0))
            .unwrap();
        bus.publish_to(Topic::PoseFeedback, pose_event(7.0, 7.0, 0.5))
            .unwrap();
        cl.tick();

        assert_eq!(cl.controller().pose(), Pose::new(7.0, 7.0, 0.5));
    }

    #[tokio::test]
    async fn tick_without_feedback_uses_spawn_pose() {
        let bus = EventBus::default();
        let mut cl = make_loop(&bus);
        let cmd = cl.tick();
        // Spawn pose is mid-arena: cruise forward, no transition.
        assert!((cmd.linear - 1.0).abs() < 1e-6);
        assert_eq!(cmd.angular, 0.0);
        assert_eq!(cl.controller().phase(), Phase::Forward);
    }

    #[tokio::test]
    async fn boundary_pose_transitions_within_one_tick() {
        let bus = EventBus::default();
        let mut cl = make_loop(&bus);

        bus.publish_to(Topic::PoseFeedback, pose_event(9.6, 5.0, 0.0))
            .unwrap();
        cl.tick();
        assert_eq!(cl.controller().phase(), Phase::TurnNeg);
    }

    #[tokio::test]
    async fn rejected_poses_do_not_reset_the_feed_deadline() {
        let bus = EventBus::default();
        let mut cl = ControlLoop::new(
            TraceParams::default(),
            bus.clone(),
            ControlLoopConfig {
                tick_rate_hz: 1_000,
                pose_deadline: Duration::from_millis(30),
            },
        );

        // A feed that only produces garbage leaves the controller blind;
        // the deadline must trip exactly as if the feed were silent.
        tokio::time::sleep(Duration::from_millis(20)).await;
        bus.publish_to(Topic::PoseFeedback, pose_event(f32::NAN, 5.0, 0.0))
            .unwrap();
        cl.tick();
        tokio::time::sleep(Duration::from_millis(20)).await;
        cl.tick();
        assert!(cl.pose_feed_stale());
    }

    #[tokio::test]
    async fn accepted_poses_reset_the_feed_deadline() {
        let bus = EventBus::default();
        let mut cl = ControlLoop::new(
            TraceParams::default(),
            bus.clone(),
            ControlLoopConfig {
                tick_rate_hz: 1_000,
                pose_deadline: Duration::from_millis(30),
            },
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        bus.publish_to(Topic::PoseFeedback, pose_event(5.0, 5.0, 0.0))
            .unwrap();
        cl.tick();
        tokio::time::sleep(Duration::from_millis(20)).await;
        cl.tick();
        assert!(!cl.pose_feed_stale());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let bus = EventBus::default();
        let cl = make_loop(&bus);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(cl.run(shutdown_rx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown_tx.send(true).expect("shutdown signal");
        handle.await.expect("loop task");
    }
}
