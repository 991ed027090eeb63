//! Headless, typed, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others.
//!
//! # Topics
//!
//! Traffic is partitioned into three [`Topic`] lanes so components only
//! receive the messages they care about:
//!
//! | Topic | Typical traffic |
//! |---|---|
//! | [`Topic::PoseFeedback`] | High-frequency pose samples from the agent |
//! | [`Topic::DriveCommands`] | Velocity setpoints emitted by the controller |
//! | [`Topic::SystemAlerts`] | Faults and operator-initiated stops |

use rectrace_types::{Event, TraceError};
use tokio::sync::broadcast;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Enumeration of all routing topics on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Pose samples pushed by the agent (or its simulator).
    PoseFeedback,
    /// Velocity setpoints published by the control loop.
    DriveCommands,
    /// Faults and emergency-stop notifications.
    SystemAlerts,
}

/// Shared event bus.  Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    pose_feedback: broadcast::Sender<Event>,
    drive_commands: broadcast::Sender<Event>,
    system_alerts: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// The `capacity` is applied to every topic channel independently.
    pub fn new(capacity: usize) -> Self {
        let (pose_feedback, _) = broadcast::channel(capacity);
        let (drive_commands, _) = broadcast::channel(capacity);
        let (system_alerts, _) = broadcast::channel(capacity);
        Self {
            pose_feedback,
            drive_commands,
            system_alerts,
        }
    }

    /// Publish `event` to the given [`Topic`] channel.
    ///
    /// Returns the number of active receivers that were handed the event, or
    /// [`TraceError::Channel`] when no subscriber is currently listening.
    /// Callers for whom an empty topic is a normal condition (fire-and-forget
    /// command emission) simply discard the error.
    pub fn publish_to(&self, topic: Topic, event: Event) -> Result<usize, TraceError> {
        self.topic_sender(topic)
            .send(event)
            .map_err(|_| TraceError::Channel(format!("no subscribers for topic {topic:?}")))
    }

    /// Subscribe to a specific [`Topic`] channel.
    ///
    /// The returned [`TopicReceiver`] yields only events published to that
    /// topic, in publish order.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::PoseFeedback => &self.pose_feedback,
            Topic::DriveCommands => &self.drive_commands,
            Topic::SystemAlerts => &self.system_alerts,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// Returns:
    /// * `Ok(event)` – a successfully received event.
    /// * `Err(broadcast::error::RecvError::Lagged(n))` – the subscriber fell
    ///   behind and `n` messages were dropped.  The caller decides whether to
    ///   continue or abort.
    /// * `Err(broadcast::error::RecvError::Closed)` – the bus has shut down.
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    /// Non-blocking variant of [`recv`][Self::recv].
    ///
    /// The control loop drains its pose topic with this before every tick so
    /// that only the most recent sample survives (last-write-wins).
    pub fn try_recv(&mut self) -> Result<Event, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rectrace_types::{EventPayload, Pose, VelocityCommand};

    fn pose_event(x: f32, y: f32) -> Event {
        Event::new(
            "test::pose_source",
            EventPayload::Pose(Pose::new(x, y, 0.0)),
        )
    }

    #[tokio::test]
    async fn publish_and_receive_on_topic() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut rx = bus.subscribe_to(Topic::PoseFeedback);

        let event = pose_event(1.0, 2.0);
        bus.publish_to(Topic::PoseFeedback, event.clone())?;

        let received = rx.recv().await?;
        assert_eq!(received.id, event.id);
        assert_eq!(rx.topic(), Topic::PoseFeedback);
        Ok(())
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe_to(Topic::DriveCommands);
        let mut rx2 = bus.subscribe_to(Topic::DriveCommands);

        let event = Event::new(
            "test::controller",
            EventPayload::Drive(VelocityCommand::new(1.0, 0.0)),
        );
        bus.publish_to(Topic::DriveCommands, event.clone())?;

        assert_eq!(rx1.recv().await?.id, event.id);
        assert_eq!(rx2.recv().await?.id, event.id);
        Ok(())
    }

    #[tokio::test]
    async fn topics_are_isolated() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut commands_rx = bus.subscribe_to(Topic::DriveCommands);
        // A pose subscriber must exist so the publish does not error.
        let _pose_rx = bus.subscribe_to(Topic::PoseFeedback);

        bus.publish_to(Topic::PoseFeedback, pose_event(0.0, 0.0))?;

        // The DriveCommands subscriber must see nothing.
        assert!(matches!(
            commands_rx.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
        Ok(())
    }

    #[test]
    fn publish_without_subscribers_returns_error() {
        let bus = EventBus::default();
        let result = bus.publish_to(Topic::SystemAlerts, pose_event(0.0, 0.0));
        assert!(matches!(result, Err(TraceError::Channel(_))));
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        const CAPACITY: usize = 8;
        let bus = EventBus::new(CAPACITY);
        let mut slow_rx = bus.subscribe_to(Topic::PoseFeedback);

        // Flood far beyond the buffer while the subscriber sleeps.
        for i in 0..1_000 {
            let _ = bus.publish_to(Topic::PoseFeedback, pose_event(i as f32, 0.0));
        }

        let result = slow_rx.recv().await;
        assert!(
            matches!(result, Err(broadcast::error::RecvError::Lagged(_))),
            "expected Lagged error, got: {result:?}"
        );
    }

    #[test]
    fn try_recv_drains_in_publish_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe_to(Topic::PoseFeedback);

        let first = pose_event(1.0, 0.0);
        let second = pose_event(2.0, 0.0);
        bus.publish_to(Topic::PoseFeedback, first.clone()).unwrap();
        bus.publish_to(Topic::PoseFeedback, second.clone()).unwrap();

        assert_eq!(rx.try_recv().unwrap().id, first.id);
        assert_eq!(rx.try_recv().unwrap().id, second.id);
        assert!(rx.try_recv().is_err());
    }
}
