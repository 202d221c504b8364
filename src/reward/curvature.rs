//! Local track curvature from three consecutive waypoints
//!
//! The direction change between the segment entering the vehicle's current
//! waypoint and the segment leaving it classifies the track as straight, a
//! mild turn, or a sharp turn.

use serde::{Deserialize, Serialize};

use crate::context::StepContext;
use crate::tuning::CurvatureThresholds;
use crate::{angle_between, segment_heading};

/// Curvature class of the segment under the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Curvature {
    Straight,
    MildTurn,
    SharpTurn,
}

impl Curvature {
    pub const ALL: [Curvature; 3] = [
        Curvature::Straight,
        Curvature::MildTurn,
        Curvature::SharpTurn,
    ];

    /// Classify a direction change in degrees. Each threshold belongs to the
    /// class above it.
    pub fn classify(direction_diff_deg: f64, thresholds: &CurvatureThresholds) -> Self {
        if direction_diff_deg < thresholds.mild_turn_deg {
            Curvature::Straight
        } else if direction_diff_deg < thresholds.sharp_turn_deg {
            Curvature::MildTurn
        } else {
            Curvature::SharpTurn
        }
    }

    pub fn is_turn(&self) -> bool {
        !matches!(self, Curvature::Straight)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Curvature::Straight => "straight",
            Curvature::MildTurn => "mild turn",
            Curvature::SharpTurn => "sharp turn",
        }
    }
}

/// Geometry derived from the waypoints around the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvatureEstimate {
    pub class: Curvature,
    /// Direction change across the current waypoint, in [0, 180]
    pub direction_diff_deg: f64,
    /// Direction of the segment ahead of the vehicle (degrees, atan2 convention)
    pub track_direction_deg: f64,
}

/// Estimate curvature at the vehicle's closest segment.
///
/// Uses the waypoint before `closest_waypoints[0]`, `closest_waypoints[0]`
/// itself, and `closest_waypoints[1]`. A repeated waypoint yields a zero-length
/// segment whose direction reads as 0; that is a property of the input data
/// and is only logged.
pub fn estimate_curvature(
    ctx: &StepContext,
    thresholds: &CurvatureThresholds,
) -> CurvatureEstimate {
    let track = &ctx.waypoints;
    let current_index = ctx.current_index();
    let next_index = ctx.next_index();
    let prev_index = track.previous_index(current_index);

    let prev = track.point(prev_index);
    let curr = track.point(current_index);
    let next = track.point(next_index);

    if track.is_degenerate(prev_index, current_index)
        || track.is_degenerate(current_index, next_index)
    {
        log::warn!(
            "Zero-length track segment around waypoint {} (prev {}, next {})",
            current_index,
            prev_index,
            next_index
        );
    }

    let heading_in = segment_heading(prev, curr);
    let heading_out = segment_heading(curr, next);
    let direction_diff_deg = angle_between(heading_out, heading_in).to_degrees();
    let class = Curvature::classify(direction_diff_deg, thresholds);

    log::debug!(
        "Curvature at waypoint {}: {:.2}° ({})",
        current_index,
        direction_diff_deg,
        class.as_str()
    );

    CurvatureEstimate {
        class,
        direction_diff_deg,
        track_direction_deg: heading_out.to_degrees(),
    }
}
