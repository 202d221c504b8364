//! Seeded step-context generation
//!
//! Produces plausible simulator snapshots on a fixed track for reward sweeps.
//! The same seed always yields the same sequence of contexts.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::context::StepContext;
use crate::segment_heading;
use crate::track::Track;

/// Default track width used for sampled contexts (meters)
pub const SAMPLE_TRACK_WIDTH: f64 = 0.76;
/// Episode length after which sampled progress reaches 100%
pub const SAMPLE_LAP_STEPS: u64 = 2000;

pub struct ContextSampler {
    track: Track,
    rng: Pcg32,
    off_track_chance: f64,
}

impl ContextSampler {
    pub fn new(track: Track, seed: u64) -> Self {
        Self {
            track,
            rng: Pcg32::seed_from_u64(seed),
            off_track_chance: 0.05,
        }
    }

    /// Probability (clamped to 0-1) that a sample is off the track
    pub fn with_off_track_chance(mut self, chance: f64) -> Self {
        self.off_track_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Draw the next context
    pub fn sample(&mut self) -> StepContext {
        let current = self.rng.random_range(0..self.track.waypoint_count());
        let next = self.track.wrap(current as i64 + 1);

        let track_direction =
            segment_heading(self.track.point(current), self.track.point(next)).to_degrees();
        let mut heading = track_direction + self.rng.random_range(-40.0..40.0);
        if heading > 180.0 {
            heading -= 360.0;
        } else if heading <= -180.0 {
            heading += 360.0;
        }

        let steps = self.rng.random_range(1..=SAMPLE_LAP_STEPS);
        let progress = (steps as f64 * 100.0 / SAMPLE_LAP_STEPS as f64).min(100.0);

        let off_track = self.rng.random_bool(self.off_track_chance);
        let is_offtrack = off_track && self.rng.random_bool(0.5);

        StepContext {
            track_width: SAMPLE_TRACK_WIDTH,
            distance_from_center: self.rng.random_range(0.0..0.6) * SAMPLE_TRACK_WIDTH,
            speed: self.rng.random_range(0.5..4.0),
            steering_angle: self.rng.random_range(-30.0..=30.0),
            all_wheels_on_track: !off_track,
            is_offtrack,
            progress,
            steps,
            waypoints: self.track.clone(),
            closest_waypoints: [current, next],
            heading,
        }
    }
}

impl Iterator for ContextSampler {
    type Item = StepContext;

    fn next(&mut self) -> Option<StepContext> {
        Some(self.sample())
    }
}
