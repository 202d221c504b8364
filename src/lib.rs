//! Raceway Reward - per-step reward function for a vehicle lapping a closed track
//!
//! Core modules:
//! - `context`: The step context handed over by the simulator each tick
//! - `track`: Cyclic waypoint geometry
//! - `reward`: Curvature estimation and the reward blending pipeline
//! - `tuning`: Data-driven thresholds and factors
//! - `sample`: Seeded step-context generation for sweeps and tests

pub mod context;
pub mod error;
pub mod reward;
pub mod sample;
pub mod track;
pub mod tuning;

pub use context::StepContext;
pub use error::RewardError;
pub use reward::{
    Curvature, CurvatureEstimate, RewardBreakdown, Stage, Term, estimate_curvature, evaluate,
    score, score_with,
};
pub use sample::ContextSampler;
pub use track::Track;
pub use tuning::RewardTuning;

use glam::DVec2;

/// Reward constants
pub mod consts {
    /// Returned as-is whenever the vehicle leaves the track
    pub const OFF_TRACK_REWARD: f64 = 1e-3;
    /// Starting value of the accumulator before any stage runs
    pub const BASE_REWARD: f64 = 1.0;

    /// Direction change (degrees) at which a segment stops being straight
    pub const MILD_TURN_DEG: f64 = 5.0;
    /// Direction change (degrees) at which a turn becomes sharp
    pub const SHARP_TURN_DEG: f64 = 15.0;

    /// Steering magnitude (degrees) above which a sharp turn floors the steering term
    pub const SHARP_TURN_STEERING_DEG: f64 = 15.0;
    pub const SHARP_TURN_STEERING_FLOOR: f64 = 0.7;

    /// Multiplier applied to progress-per-step
    pub const PROGRESS_SCALE: f64 = 5.0;
    /// Progress value (percent) that counts as a completed lap
    pub const LAP_COMPLETE_PROGRESS: f64 = 100.0;
    pub const LAP_BONUS: f64 = 100.0;
}

/// Shortest angular distance between two angles in radians, in [0, π]
#[inline]
pub fn angle_between(a: f64, b: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let diff = (a - b).abs().rem_euclid(TAU);
    if diff > PI { TAU - diff } else { diff }
}

/// Shortest angular distance between two angles in degrees, in [0, 180]
#[inline]
pub fn angle_between_deg(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs().rem_euclid(360.0);
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Direction of travel from one point to the next (radians, atan2 convention)
#[inline]
pub fn segment_heading(from: DVec2, to: DVec2) -> f64 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_angle_between_wraparound() {
        // 170° and -170° are 20° apart, not 340°
        let a = 170.0_f64.to_radians();
        let b = -170.0_f64.to_radians();
        assert!((angle_between(a, b) - 20.0_f64.to_radians()).abs() < 1e-9);
        assert!((angle_between_deg(170.0, -170.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_between_opposite() {
        assert!((angle_between(0.0, PI) - PI).abs() < 1e-12);
        assert_eq!(angle_between_deg(90.0, -90.0), 180.0);
        assert_eq!(angle_between_deg(45.0, 45.0), 0.0);
    }

    #[test]
    fn test_segment_heading() {
        let h = segment_heading(DVec2::new(1.0, 1.0), DVec2::new(1.0, 3.0));
        assert!((h - PI / 2.0).abs() < 1e-12);
        // Duplicate points give a zero heading rather than NaN
        assert_eq!(segment_heading(DVec2::ONE, DVec2::ONE), 0.0);
    }

    proptest! {
        #[test]
        fn prop_angle_between_bounded(a in -10.0f64..10.0, b in -10.0f64..10.0) {
            let d = angle_between(a, b);
            prop_assert!((0.0..=PI).contains(&d));
        }

        #[test]
        fn prop_angle_between_deg_bounded(a in -720.0f64..720.0, b in -720.0f64..720.0) {
            let d = angle_between_deg(a, b);
            prop_assert!((0.0..=180.0).contains(&d));
            prop_assert!((d - angle_between_deg(b, a)).abs() < 1e-9);
        }
    }
}
