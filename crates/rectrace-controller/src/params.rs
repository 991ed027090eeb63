//! Tunable controller parameters.
//!
//! Defaults reproduce the reference turtlesim arena: an 11×11 field with
//! threshold lines at 1.5 and 9.5 units.

use rectrace_types::Pose;
use serde::{Deserialize, Serialize};

/// Velocities, boundary thresholds, and angular tolerance bands for the
/// rectangle tracer.  Deserializable from the `[params]` table of the config
/// file; every field falls back to its reference default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceParams {
    /// Linear velocity on straight legs.
    #[serde(default = "default_v_forward")]
    pub v_forward: f32,

    /// Linear velocity held during arced corner turns.
    #[serde(default = "default_v_turning_x")]
    pub v_turning_x: f32,

    /// Angular velocity magnitude during any turn.
    #[serde(default = "default_v_turning_t")]
    pub v_turning_t: f32,

    /// X above this value counts as the right boundary.
    #[serde(default = "default_threshold_high")]
    pub threshold_r: f32,

    /// X below this value counts as the left boundary.
    #[serde(default = "default_threshold_low")]
    pub threshold_l: f32,

    /// Y above this value counts as the top boundary.
    #[serde(default = "default_threshold_high")]
    pub threshold_t: f32,

    /// Y below this value counts as the bottom boundary.
    #[serde(default = "default_threshold_low")]
    pub threshold_b: f32,

    /// Coarse band for classifying which target heading a turn is seeking.
    #[serde(default = "default_threshold_direction")]
    pub threshold_direction: f32,

    /// Fine band for deciding that a rotation is complete.  Must be tighter
    /// than `threshold_direction` or the heading phases oscillate.
    #[serde(default = "default_threshold_theta")]
    pub threshold_theta: f32,

    /// X coordinate the controller assumes before the first feedback sample.
    #[serde(default = "default_spawn_x")]
    pub spawn_x: f32,

    /// Y coordinate the controller assumes before the first feedback sample.
    #[serde(default = "default_spawn_y")]
    pub spawn_y: f32,
}

impl TraceParams {
    /// The pose assumed at construction, before any feedback arrives.
    ///
    /// The reference node seeds this manually in case the first sample is
    /// missed; heading starts at 0.
    pub fn spawn_pose(&self) -> Pose {
        Pose::new(self.spawn_x, self.spawn_y, 0.0)
    }
}

fn default_v_forward() -> f32 {
    1.0
}
fn default_v_turning_x() -> f32 {
    0.2
}
fn default_v_turning_t() -> f32 {
    0.16
}
fn default_threshold_high() -> f32 {
    9.5
}
fn default_threshold_low() -> f32 {
    1.5
}
fn default_threshold_direction() -> f32 {
    0.15
}
fn default_threshold_theta() -> f32 {
    0.002
}
fn default_spawn_x() -> f32 {
    5.5
}
fn default_spawn_y() -> f32 {
    5.5
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            v_forward: default_v_forward(),
            v_turning_x: default_v_turning_x(),
            v_turning_t: default_v_turning_t(),
            threshold_r: default_threshold_high(),
            threshold_l: default_threshold_low(),
            threshold_t: default_threshold_high(),
            threshold_b: default_threshold_low(),
            threshold_direction: default_threshold_direction(),
            threshold_theta: default_threshold_theta(),
            spawn_x: default_spawn_x(),
            spawn_y: default_spawn_y(),
        }
    }
}
