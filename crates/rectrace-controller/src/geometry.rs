//! Threshold guard predicates.
//!
//! The arena is bounded by four threshold lines: right/top at the high
//! values, left/bottom at the low values.  All comparisons are strict – a
//! pose sitting exactly on a threshold line does not trigger a guard, which
//! matches the reference behavior.

use rectrace_types::Pose;

use crate::params::TraceParams;
use crate::phase::Direction;

/// True near either of the two diagonal corners where the traversal reverses:
/// low-x AND high-y, or high-x AND low-y.
///
/// The asymmetry is deliberate – given the rectangle's fixed orientation the
/// traversal only ever passes near these two of the four corners.
pub fn near_reversal_corner(pose: &Pose, p: &TraceParams) -> bool {
    (pose.x < p.threshold_b && pose.y > p.threshold_r)
        || (pose.x > p.threshold_t && pose.y < p.threshold_l)
}

/// True at the boundary where a negative-angle arc turn is due: the right
/// line while outbound, the left line while inbound.
pub fn at_neg_turn_boundary(pose: &Pose, direction: Direction, p: &TraceParams) -> bool {
    match direction {
        Direction::Outbound => pose.x > p.threshold_r,
        Direction::Inbound => pose.x < p.threshold_l,
    }
}

/// True at the boundary where a positive-angle arc turn is due: the left
/// line while outbound, the right line while inbound.
pub fn at_pos_turn_boundary(pose: &Pose, direction: Direction, p: &TraceParams) -> bool {
    match direction {
        Direction::Outbound => pose.x < p.threshold_l,
        Direction::Inbound => pose.x > p.threshold_r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TraceParams {
        TraceParams::default()
    }

    #[test]
    fn centre_of_arena_triggers_nothing() {
        let pose = Pose::new(5.5, 5.5, 0.0);
        assert!(!near_reversal_corner(&pose, &params()));
        assert!(!at_neg_turn_boundary(&pose, Direction::Outbound, &params()));
        assert!(!at_pos_turn_boundary(&pose, Direction::Outbound, &params()));
    }

    #[test]
    fn top_left_corner_is_a_reversal_corner() {
        // x below the low line AND y above the high line.
        assert!(near_reversal_corner(&Pose::new(1.0, 10.0, 0.0), &params()));
    }

    #[test]
    fn bottom_right_corner_is_a_reversal_corner() {
        assert!(near_reversal_corner(&Pose::new(10.0, 1.0, 0.0), &params()));
    }

    #[test]
    fn other_diagonal_corners_are_not_reversal_corners() {
        assert!(!near_reversal_corner(&Pose::new(1.0, 1.0, 0.0), &params()));
        assert!(!near_reversal_corner(&Pose::new(10.0, 10.0, 0.0), &params()));
    }

    #[test]
    fn exact_threshold_values_do_not_trigger() {
        // Strict inequalities: sitting on the line is not "past" it.
        let on_right = Pose::new(9.5, 5.0, 0.0);
        assert!(!at_neg_turn_boundary(&on_right, Direction::Outbound, &params()));
        let on_corner = Pose::new(1.5, 9.5, 0.0);
        assert!(!near_reversal_corner(&on_corner, &params()));
    }

    #[test]
    fn neg_turn_boundary_depends_on_direction() {
        let right = Pose::new(9.6, 5.0, 0.0);
        let left = Pose::new(1.4, 5.0, 0.0);
        assert!(at_neg_turn_boundary(&right, Direction::Outbound, &params()));
        assert!(!at_neg_turn_boundary(&right, Direction::Inbound, &params()));
        assert!(at_neg_turn_boundary(&left, Direction::Inbound, &params()));
        assert!(!at_neg_turn_boundary(&left, Direction::Outbound, &params()));
    }

    #[test]
    fn pos_turn_boundary_mirrors_neg_turn_boundary() {
        let right = Pose::new(9.6, 5.0, 0.0);
        let left = Pose::new(1.4, 5.0, 0.0);
        assert!(at_pos_turn_boundary(&left, Direction::Outbound, &params()));
        assert!(!at_pos_turn_boundary(&left, Direction::Inbound, &params()));
        assert!(at_pos_turn_boundary(&right, Direction::Inbound, &params()));
        assert!(!at_pos_turn_boundary(&right, Direction::Outbound, &params()));
    }
}
