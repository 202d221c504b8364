//! Reward pipeline
//!
//! Pure and stateless: the same step context always produces the same score.
//! - Curvature estimation from the waypoints around the vehicle
//! - Independent reward stages (multipliers and bonuses)
//! - A single fold that blends the stages into one score

pub mod blend;
pub mod curvature;
pub mod stages;

pub use blend::{RewardBreakdown, evaluate, score, score_with};
pub use curvature::{Curvature, CurvatureEstimate, estimate_curvature};
pub use stages::{Stage, StageInput, Term};
