//! [`FeedMonitor`] – pose-feed staleness detector.
//!
//! The control loop keeps ticking on a stale pose by design (repeated ticks
//! are idempotent), but a transport that has gone silent is worth surfacing.
//! The monitor records the instant of each accepted sample and reports a
//! lapse once per silent period, so a dead feed produces one warning rather
//! than one per tick.

use std::time::{Duration, Instant};

/// Tracks the arrival time of pose samples against a deadline.
#[derive(Debug)]
pub struct FeedMonitor {
    deadline: Duration,
    last_seen: Instant,
    warned: bool,
}

impl FeedMonitor {
    /// Create a monitor that considers the feed stale after `deadline` of
    /// silence.  The clock starts now, so a feed that never produces a
    /// sample still trips the deadline.
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            last_seen: Instant::now(),
            warned: false,
        }
    }

    /// Record an accepted pose sample, resetting the deadline.
    pub fn heartbeat(&mut self) {
        self.last_seen = Instant::now();
        self.warned = false;
    }

    /// True when the feed has been silent past the deadline.
    pub fn stale(&self) -> bool {
        self.last_seen.elapsed() > self.deadline
    }

    /// True exactly once per lapse: the first call that observes a stale
    /// feed returns `true`, subsequent calls return `false` until a
    /// heartbeat arrives.
    pub fn should_warn(&mut self) -> bool {
        if self.stale() && !self.warned {
            self.warned = true;
            true
        } else {
            false
        }
    }
}
