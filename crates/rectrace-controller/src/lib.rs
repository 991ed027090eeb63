//! `rectrace-controller` – the finite-state feedback controller.
//!
//! Maps a continuously updated pose estimate into discrete motion commands
//! that trace a rectangular path: straight legs, arced 90°-class corner
//! turns, and in-place 180° reversals at two diagonally opposite corners.
//!
//! # Modules
//!
//! - [`controller`] – [`TraceController`][controller::TraceController]: the
//!   state register, turn-permission flags, and the per-tick decision logic.
//! - [`phase`] – [`Phase`][phase::Phase] and [`Direction`][phase::Direction]:
//!   the motion-phase enumeration and the traversal direction flag.
//! - [`geometry`] – threshold guard predicates over the four arena boundary
//!   lines.
//! - [`params`] – [`TraceParams`][params::TraceParams]: tunable velocities,
//!   thresholds, and tolerance bands.

pub mod controller;
pub mod geometry;
pub mod params;
pub mod phase;

pub use controller::TraceController;
pub use params::TraceParams;
pub use phase::{Direction, Phase};
