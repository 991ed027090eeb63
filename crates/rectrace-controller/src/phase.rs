//! Motion-phase and traversal-direction enumerations.

use serde::{Deserialize, Serialize};

/// The controller's motion phase.  Exactly one is active at a time; the
/// controller starts in [`Phase::Forward`] and performs at most one
/// transition per tick.
///
/// The three `Turn*` phases are one-shot: they set the turn velocity once and
/// hand off to [`Phase::HeadingCheck`] on the very next guard evaluation.
/// The two `Align*` phases then hold that command across many ticks while the
/// agent physically rotates into the target tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Straight-line motion along the current leg.
    Forward,
    /// Arm an in-place 180° reversal (taken at two diagonal corners).
    TurnAbout,
    /// Arm an arced turn with negative angular velocity.
    TurnNeg,
    /// Arm an arced turn with positive angular velocity.
    TurnPos,
    /// Classify which target heading (0 or π) the active turn is seeking.
    HeadingCheck,
    /// Hold the turn command until `|heading|` reaches the band around π.
    AlignToPi,
    /// Hold the turn command until `|heading|` reaches the band around 0.
    AlignToZero,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Forward
    }
}

/// Which of the two traversal directions around the rectangle is active.
///
/// Flips only on a [`Phase::TurnAbout`] (the 180° stationary reversal); the
/// arc turns preserve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// The direction active at spawn.
    Outbound,
    /// The direction after an odd number of reversals.
    Inbound,
}

impl Direction {
    /// The opposite traversal direction.
    pub fn flipped(self) -> Self {
        match self {
            Self::Outbound => Self::Inbound,
            Self::Inbound => Self::Outbound,
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::Outbound
    }
}
