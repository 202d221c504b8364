//! Step context: the immutable snapshot the simulator passes in each tick
//!
//! Field names match the simulator's params keys, so a params mapping
//! serialized as JSON decodes directly. Keys this crate does not use are
//! ignored.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::RewardError;
use crate::track::Track;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepContext {
    /// Track width at the current position (meters)
    pub track_width: f64,
    /// Lateral offset from the centerline (meters, >= 0)
    pub distance_from_center: f64,
    /// Vehicle speed (m/s)
    pub speed: f64,
    /// Signed steering angle (degrees)
    pub steering_angle: f64,
    pub all_wheels_on_track: bool,
    pub is_offtrack: bool,
    /// Percent of the lap completed this episode, 0-100
    pub progress: f64,
    /// Simulation steps elapsed this episode
    pub steps: u64,
    /// Track centerline
    pub waypoints: Track,
    /// Indices of the waypoints behind and ahead of the vehicle.
    /// Decoded indices are already wrapped onto the loop.
    pub closest_waypoints: [usize; 2],
    /// Vehicle heading in the world frame (degrees)
    pub heading: f64,
}

impl StepContext {
    /// A stationary, centered, on-track vehicle at the given segment.
    /// Meant as a base for struct-update construction.
    pub fn new(waypoints: Track, closest_waypoints: [usize; 2]) -> Self {
        Self {
            track_width: 1.0,
            distance_from_center: 0.0,
            speed: 0.0,
            steering_angle: 0.0,
            all_wheels_on_track: true,
            is_offtrack: false,
            progress: 0.0,
            steps: 0,
            waypoints,
            closest_waypoints,
            heading: 0.0,
        }
    }

    /// Decode a simulator params object
    pub fn from_json(json: &str) -> Result<Self, RewardError> {
        let raw: RawStepContext = serde_json::from_str(json)?;
        raw.try_into()
    }

    /// Decode a simulator params object that is already parsed
    pub fn from_value(value: serde_json::Value) -> Result<Self, RewardError> {
        let raw: RawStepContext = serde_json::from_value(value)?;
        raw.try_into()
    }

    /// Either flag marks the vehicle as off the track
    pub fn is_off_track(&self) -> bool {
        !self.all_wheels_on_track || self.is_offtrack
    }

    #[inline]
    pub fn steering_abs(&self) -> f64 {
        self.steering_angle.abs()
    }

    /// Waypoint index behind the vehicle (wrapped onto the loop)
    pub fn current_index(&self) -> usize {
        self.closest_waypoints[0] % self.waypoints.waypoint_count()
    }

    /// Waypoint index ahead of the vehicle (wrapped onto the loop)
    pub fn next_index(&self) -> usize {
        self.closest_waypoints[1] % self.waypoints.waypoint_count()
    }
}

/// Params exactly as the simulator sends them, before validation
#[derive(Deserialize)]
struct RawStepContext {
    track_width: f64,
    distance_from_center: f64,
    speed: f64,
    steering_angle: f64,
    all_wheels_on_track: bool,
    is_offtrack: bool,
    progress: f64,
    /// Integer or integral float, depending on the simulator
    steps: serde_json::Number,
    waypoints: Vec<DVec2>,
    /// May be negative; counts back from the end of the loop
    closest_waypoints: [i64; 2],
    heading: f64,
}

impl TryFrom<RawStepContext> for StepContext {
    type Error = RewardError;

    fn try_from(raw: RawStepContext) -> Result<Self, Self::Error> {
        let waypoints = Track::new(raw.waypoints)?;
        let steps = step_count(&raw.steps)?;
        let closest_waypoints = [
            waypoints.wrap(raw.closest_waypoints[0]),
            waypoints.wrap(raw.closest_waypoints[1]),
        ];

        Ok(Self {
            track_width: raw.track_width,
            distance_from_center: raw.distance_from_center,
            speed: raw.speed,
            steering_angle: raw.steering_angle,
            all_wheels_on_track: raw.all_wheels_on_track,
            is_offtrack: raw.is_offtrack,
            progress: raw.progress,
            steps,
            waypoints,
            closest_waypoints,
            heading: raw.heading,
        })
    }
}

fn step_count(steps: &serde_json::Number) -> Result<u64, RewardError> {
    if let Some(n) = steps.as_u64() {
        return Ok(n);
    }
    match steps.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        Some(f) => Err(RewardError::InvalidStepCount(f)),
        None => Err(RewardError::InvalidStepCount(f64::NAN)),
    }
}
