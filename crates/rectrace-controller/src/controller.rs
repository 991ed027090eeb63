//! [`TraceController`] – the per-tick decision logic.
//!
//! An external scheduler drives [`TraceController::tick`] at a fixed rate;
//! pose samples arrive independently via [`TraceController::observe`].  Each
//! tick reads the cached pose, evaluates the active phase's guards in
//! priority order (first match wins), performs at most one phase transition,
//! and returns the command to publish.
//!
//! Turn phases are one-shot: they latch the turn velocity and hand off to
//! the heading phases, which re-emit that same command unchanged (see
//! [`hold_last_command`][TraceController::hold_last_command]) until the agent
//! has physically rotated into the target tolerance band.  Altering the
//! command mid-rotation would corrupt the arc, so the hold is explicit.

use std::f32::consts::PI;

use rectrace_types::{Pose, VelocityCommand};
use tracing::{info, warn};

use crate::geometry;
use crate::params::TraceParams;
use crate::phase::{Direction, Phase};

/// Finite-state feedback controller tracing a rectangular path.
///
/// All state is instance-owned: the pose cache, the last-issued command, the
/// phase register, and the turn-permission flags.  Multiple controllers can
/// run independently, and unit tests drive one without any live transport.
#[derive(Debug, Clone)]
pub struct TraceController {
    params: TraceParams,
    phase: Phase,
    direction: Direction,
    /// Re-entry guards: after a turn completes the agent is still near the
    /// same x coordinate that triggered it, so the spatial guard would fire
    /// again immediately.  The flag for the turn just taken stays down until
    /// a different turn re-arms it.
    can_turn_about: bool,
    can_turn_neg: bool,
    can_turn_pos: bool,
    pose: Pose,
    last_command: VelocityCommand,
}

impl TraceController {
    /// Build a controller in [`Phase::Forward`] with all turns armed, the
    /// pose seeded to the spawn point, and a stop as the last command.
    pub fn new(params: TraceParams) -> Self {
        let pose = params.spawn_pose();
        Self {
            params,
            phase: Phase::default(),
            direction: Direction::default(),
            can_turn_about: true,
            can_turn_neg: true,
            can_turn_pos: true,
            pose,
            last_command: VelocityCommand::STOP,
        }
    }

    /// Store the latest pose sample (last-write-wins, no queuing).
    ///
    /// Returns `true` when the sample was accepted.  Non-finite samples are
    /// dropped and the last valid pose retained; the reference behavior would
    /// let them poison the guards and stall the controller, which is a silent
    /// failure we deliberately do not copy.  Callers tracking feed health
    /// must count only accepted samples.
    pub fn observe(&mut self, pose: Pose) -> bool {
        match pose.validate() {
            Ok(()) => {
                self.pose = pose;
                true
            }
            Err(e) => {
                warn!(error = %e, "dropping pose sample");
                false
            }
        }
    }

    /// Advance the controller by one tick and return the command to publish.
    ///
    /// Safe to call faster than pose updates arrive: repeated ticks on a
    /// stale pose re-evaluate the same guards and re-emit the same command.
    pub fn tick(&mut self) -> VelocityCommand {
        let command = match self.phase {
            Phase::Forward => self.forward(),
            Phase::TurnAbout => self.arm_turn_about(),
            Phase::TurnNeg => self.arm_turn_neg(),
            Phase::TurnPos => self.arm_turn_pos(),
            Phase::HeadingCheck => self.heading_check(),
            Phase::AlignToPi => self.align_to_pi(),
            Phase::AlignToZero => self.align_to_zero(),
        };
        self.last_command = command;
        command
    }

    /// Re-emit the last issued command without recomputing it.
    ///
    /// The heading phases must hold the turn command constant across many
    /// ticks while the agent rotates; this is that hold, by name.
    fn hold_last_command(&self) -> VelocityCommand {
        self.last_command
    }

    fn forward(&mut self) -> VelocityCommand {
        let command = VelocityCommand::new(self.params.v_forward, 0.0);
        if geometry::near_reversal_corner(&self.pose, &self.params) && self.can_turn_about {
            self.phase = Phase::TurnAbout;
            info!(x = self.pose.x, y = self.pose.y, "reversal corner reached, turning about");
        } else if geometry::at_neg_turn_boundary(&self.pose, self.direction, &self.params)
            && self.can_turn_neg
        {
            self.phase = Phase::TurnNeg;
            info!(x = self.pose.x, "boundary reached, arcing negative");
        } else if geometry::at_pos_turn_boundary(&self.pose, self.direction, &self.params)
            && self.can_turn_pos
        {
            self.phase = Phase::TurnPos;
            info!(x = self.pose.x, "boundary reached, arcing positive");
        }
        command
    }

    fn arm_turn_about(&mut self) -> VelocityCommand {
        self.can_turn_about = false;
        self.direction = self.direction.flipped();
        self.phase = Phase::HeadingCheck;
        info!(direction = ?self.direction, "stationary 180° reversal armed");
        VelocityCommand::new(0.0, self.params.v_turning_t)
    }

    fn arm_turn_neg(&mut self) -> VelocityCommand {
        self.can_turn_about = true;
        self.can_turn_neg = false;
        self.can_turn_pos = true;
        self.phase = Phase::HeadingCheck;
        info!("negative arc turn armed");
        VelocityCommand::new(self.params.v_turning_x, -self.params.v_turning_t)
    }

    fn arm_turn_pos(&mut self) -> VelocityCommand {
        self.can_turn_about = true;
        self.can_turn_neg = true;
        self.can_turn_pos = false;
        self.phase = Phase::HeadingCheck;
        info!("positive arc turn armed");
        VelocityCommand::new(self.params.v_turning_x, self.params.v_turning_t)
    }

    fn heading_check(&mut self) -> VelocityCommand {
        let abs_heading = self.pose.heading_rad.abs();
        if abs_heading < self.params.threshold_direction {
            self.phase = Phase::AlignToPi;
            info!(heading = self.pose.heading_rad, "heading near 0, rotating to π");
        } else if abs_heading > PI - self.params.threshold_direction {
            self.phase = Phase::AlignToZero;
            info!(heading = self.pose.heading_rad, "heading near π, rotating to 0");
        }
        self.hold_last_command()
    }

    fn align_to_pi(&mut self) -> VelocityCommand {
        if self.pose.heading_rad.abs() > PI - self.params.threshold_theta {
            self.phase = Phase::Forward;
            info!("aligned to π, resuming forward motion");
        }
        self.hold_last_command()
    }

    fn align_to_zero(&mut self) -> VelocityCommand {
        if self.pose.heading_rad.abs() < self.params.threshold_theta {
            self.phase = Phase::Forward;
            info!("aligned to 0, resuming forward motion");
        }
        self.hold_last_command()
    }

    /// The active motion phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The active traversal direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The most recently accepted pose sample.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The command emitted by the most recent tick.
    pub fn last_command(&self) -> VelocityCommand {
        self.last_command
    }

    /// Whether the in-place reversal is currently armed.
    pub fn can_turn_about(&self) -> bool {
        self.can_turn_about
    }

    /// Whether the negative arc turn is currently armed.
    pub fn can_turn_neg(&self) -> bool {
        self.can_turn_neg
    }

    /// Whether the positive arc turn is currently armed.
    pub fn can_turn_pos(&self) -> bool {
        self.can_turn_pos
    }
}
