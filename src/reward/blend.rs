//! Reward blending
//!
//! geometry -> curvature class -> stage terms -> blended score

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::curvature::{CurvatureEstimate, estimate_curvature};
use super::stages::{Stage, StageInput, Term};
use crate::context::StepContext;
use crate::tuning::RewardTuning;

static DEFAULT_TUNING: LazyLock<RewardTuning> = LazyLock::new(RewardTuning::default);

/// How a score was put together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    /// Off-track short-circuit; no stages ran
    pub off_track: bool,
    pub curvature: Option<CurvatureEstimate>,
    /// Terms in the order they were applied
    pub terms: Vec<(Stage, Term)>,
    pub total: f64,
}

impl RewardBreakdown {
    /// Term a stage contributed, if the pipeline ran
    pub fn term(&self, stage: Stage) -> Option<Term> {
        self.terms
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|&(_, term)| term)
    }
}

/// Score one step with the stock tuning
pub fn score(ctx: &StepContext) -> f64 {
    score_with(ctx, &DEFAULT_TUNING)
}

/// Score one step
pub fn score_with(ctx: &StepContext, tuning: &RewardTuning) -> f64 {
    evaluate(ctx, tuning).total
}

/// Score one step and keep every intermediate term
pub fn evaluate(ctx: &StepContext, tuning: &RewardTuning) -> RewardBreakdown {
    if ctx.is_off_track() {
        log::debug!("Off track at step {}: reward {}", ctx.steps, tuning.off_track_reward);
        return RewardBreakdown {
            off_track: true,
            curvature: None,
            terms: Vec::new(),
            total: tuning.off_track_reward,
        };
    }

    let curvature = estimate_curvature(ctx, &tuning.curvature);
    let input = StageInput {
        ctx,
        tuning,
        curvature: &curvature,
    };

    let terms: Vec<(Stage, Term)> = Stage::PIPELINE
        .iter()
        .map(|&stage| (stage, stage.term(&input)))
        .collect();

    let total = terms.iter().fold(tuning.base_reward, |reward, &(stage, term)| {
        let next = term.apply(reward);
        log::trace!("{:>12}: {:?} ({:.4} -> {:.4})", stage.as_str(), term, reward, next);
        next
    });

    log::debug!(
        "Step {}: {} segment, reward {:.4}",
        ctx.steps,
        curvature.class.as_str(),
        total
    );

    RewardBreakdown {
        off_track: false,
        curvature: Some(curvature),
        terms,
        total,
    }
}
