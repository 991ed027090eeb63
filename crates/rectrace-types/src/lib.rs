//! `rectrace-types` – shared data model for the rectangle-tracing stack.
//!
//! Everything that crosses a crate boundary lives here: the agent [`Pose`],
//! the [`VelocityCommand`] pushed to the drive base, the bus [`Event`]
//! envelope, and the workspace error type [`TraceError`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Position and heading of the controlled agent in the arena frame.
///
/// `heading_rad` is the signed angle of the agent's forward direction,
/// measured counter-clockwise from +X, nominally in `(-π, π]`.  Values
/// outside that range are tolerated by the controller, which only ever
/// compares `heading_rad.abs()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// X position (arena length units).
    pub x: f32,
    /// Y position (arena length units).
    pub y: f32,
    /// Signed heading angle (radians).
    pub heading_rad: f32,
}

impl Pose {
    /// Create a pose from its three components.
    pub fn new(x: f32, y: f32, heading_rad: f32) -> Self {
        Self { x, y, heading_rad }
    }

    /// Reject samples that would poison guard comparisons.
    ///
    /// A NaN or infinite component never satisfies any threshold guard, so a
    /// controller that stored one could stall in its current phase forever.
    /// Callers drop the sample and keep the last valid pose instead.
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.x.is_finite() && self.y.is_finite() && self.heading_rad.is_finite() {
            Ok(())
        } else {
            Err(TraceError::ImplausiblePose(format!(
                "non-finite pose sample ({}, {}, {})",
                self.x, self.y, self.heading_rad
            )))
        }
    }
}

/// Differential-drive velocity setpoint.
///
/// A value type: the controller constructs a fresh command every tick and
/// publishes it to the [`Event`] bus; nothing holds a mutable reference to a
/// previously emitted command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityCommand {
    /// Linear velocity along the agent's forward axis.
    pub linear: f32,
    /// Angular velocity around the vertical axis (positive = CCW).
    pub angular: f32,
}

impl VelocityCommand {
    /// Full stop.  Published on emergency shutdown.
    pub const STOP: VelocityCommand = VelocityCommand {
        linear: 0.0,
        angular: 0.0,
    };

    /// Create a command from its two components.
    pub fn new(linear: f32, angular: f32) -> Self {
        Self { linear, angular }
    }
}

/// Unified envelope for everything routed over the internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"rectrace-runtime::control_loop"`
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Build a freshly stamped event.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that can be routed over the internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    /// A pose feedback sample from the agent (or its simulator).
    Pose(Pose),
    /// A velocity setpoint for the drive base.
    Drive(VelocityCommand),
    /// An abnormal condition worth surfacing to operators.
    Fault {
        component: String,
        code: u32,
        message: String,
    },
}

/// Workspace-wide error type.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum TraceError {
    #[error("channel error: {0}")]
    Channel(String),

    #[error("implausible pose: {0}")]
    ImplausiblePose(String),

    #[error("config error: {0}")]
    Config(String),
}
