//! Error types for decoding step contexts and tuning files
//!
//! Scoring itself never fails; only the edges that parse external data do.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewardError {
    #[error("failed to decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("track has no waypoints")]
    EmptyTrack,

    #[error("invalid step count: {0} (expected a non-negative integer)")]
    InvalidStepCount(f64),
}
