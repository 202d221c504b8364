//! Cyclic waypoint geometry
//!
//! The track centerline is a closed loop of waypoints. Every lookup wraps
//! modulo the waypoint count, so index `N` is waypoint `0` again and index
//! `-1` is the last waypoint.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::RewardError;

/// A closed track centerline (never empty)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DVec2>", into = "Vec<DVec2>")]
pub struct Track {
    waypoints: Vec<DVec2>,
}

impl Track {
    pub fn new(waypoints: Vec<DVec2>) -> Result<Self, RewardError> {
        if waypoints.is_empty() {
            return Err(RewardError::EmptyTrack);
        }
        Ok(Self { waypoints })
    }

    /// Regular polygon approximating a circle, counter-clockwise from +x.
    /// At least three waypoints are generated.
    pub fn circle(center: DVec2, radius: f64, count: usize) -> Self {
        use std::f64::consts::TAU;
        let count = count.max(3);
        let waypoints = (0..count)
            .map(|i| {
                let theta = TAU * i as f64 / count as f64;
                center + radius * DVec2::new(theta.cos(), theta.sin())
            })
            .collect();
        Self { waypoints }
    }

    /// Axis-aligned rectangle centered on the origin, counter-clockwise from the
    /// bottom-left corner. Straights are sampled every `spacing` meters and meet
    /// at 90° corners.
    pub fn rectangle(width: f64, height: f64, spacing: f64) -> Self {
        let half = DVec2::new(width / 2.0, height / 2.0);
        let corners = [
            DVec2::new(-half.x, -half.y),
            DVec2::new(half.x, -half.y),
            DVec2::new(half.x, half.y),
            DVec2::new(-half.x, half.y),
        ];

        let mut waypoints = Vec::new();
        for (i, &start) in corners.iter().enumerate() {
            let end = corners[(i + 1) % corners.len()];
            let edge = end - start;
            let steps = if spacing > 0.0 {
                ((edge.length() / spacing).round() as usize).max(1)
            } else {
                1
            };
            for k in 0..steps {
                waypoints.push(start + edge * (k as f64 / steps as f64));
            }
        }
        Self { waypoints }
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    /// Wrap a signed index onto the loop
    #[inline]
    pub fn wrap(&self, index: i64) -> usize {
        index.rem_euclid(self.waypoints.len() as i64) as usize
    }

    /// Waypoint at `index`, wrapping past either end
    #[inline]
    pub fn point(&self, index: usize) -> DVec2 {
        self.waypoints[index % self.waypoints.len()]
    }

    /// Index of the waypoint before `index` on the loop
    #[inline]
    pub fn previous_index(&self, index: usize) -> usize {
        self.wrap(index as i64 - 1)
    }

    /// Whether the segment between two waypoints has zero length
    pub fn is_degenerate(&self, from: usize, to: usize) -> bool {
        self.point(from) == self.point(to)
    }
}

impl TryFrom<Vec<DVec2>> for Track {
    type Error = RewardError;

    fn try_from(waypoints: Vec<DVec2>) -> Result<Self, Self::Error> {
        Self::new(waypoints)
    }
}

impl From<Track> for Vec<DVec2> {
    fn from(track: Track) -> Self {
        track.waypoints
    }
}
