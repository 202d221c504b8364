//! Reward stages
//!
//! Each stage is a pure function of the step context, the tuning and the
//! curvature estimate. It yields a `Term`: a multiplier, an additive bonus,
//! or nothing. The blender folds the terms in `Stage::PIPELINE` order over
//! the base reward.

use serde::{Deserialize, Serialize};

use super::curvature::{Curvature, CurvatureEstimate};
use crate::angle_between_deg;
use crate::context::StepContext;
use crate::tuning::RewardTuning;

/// Contribution of one stage to the accumulated reward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Term {
    /// Multiply the reward so far
    Scale(f64),
    /// Add to the reward so far
    Bonus(f64),
    /// Stage did not apply
    Skip,
}

impl Term {
    #[inline]
    pub fn apply(self, reward: f64) -> f64 {
        match self {
            Term::Scale(factor) => reward * factor,
            Term::Bonus(bonus) => reward + bonus,
            Term::Skip => reward,
        }
    }
}

/// Reward stages, in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Speed,
    Lane,
    Steering,
    Coordination,
    Progress,
    LapBonus,
    Heading,
}

impl Stage {
    /// Heading comes last so misalignment also discounts both bonuses
    pub const PIPELINE: [Stage; 7] = [
        Stage::Speed,
        Stage::Lane,
        Stage::Steering,
        Stage::Coordination,
        Stage::Progress,
        Stage::LapBonus,
        Stage::Heading,
    ];

    pub fn term(self, input: &StageInput<'_>) -> Term {
        match self {
            Stage::Speed => speed_term(input),
            Stage::Lane => lane_term(input),
            Stage::Steering => steering_term(input),
            Stage::Coordination => coordination_term(input),
            Stage::Progress => progress_term(input),
            Stage::LapBonus => lap_bonus_term(input),
            Stage::Heading => heading_term(input),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Speed => "speed",
            Stage::Lane => "lane",
            Stage::Steering => "steering",
            Stage::Coordination => "coordination",
            Stage::Progress => "progress",
            Stage::LapBonus => "lap_bonus",
            Stage::Heading => "heading",
        }
    }
}

/// Everything a stage may read
#[derive(Debug, Clone, Copy)]
pub struct StageInput<'a> {
    pub ctx: &'a StepContext,
    pub tuning: &'a RewardTuning,
    pub curvature: &'a CurvatureEstimate,
}

/// Speed matched to the curvature class
pub fn speed_term(input: &StageInput<'_>) -> Term {
    let table = input.tuning.speed.for_class(input.curvature.class);
    Term::Scale(table.lookup(input.ctx.speed))
}

/// Distance from the centerline, with wider markers in turns
pub fn lane_term(input: &StageInput<'_>) -> Term {
    let table = input.tuning.lane.for_class(input.curvature.class);
    Term::Scale(table.lookup_scaled(input.ctx.distance_from_center, input.ctx.track_width))
}

/// Smooth steering, floored in sharp turns where large input is expected
pub fn steering_term(input: &StageInput<'_>) -> Term {
    let steering_abs = input.ctx.steering_abs();
    let mut factor = input.tuning.steering.lookup(steering_abs);

    let floor = &input.tuning.sharp_turn_steering;
    if input.curvature.class == Curvature::SharpTurn && steering_abs > floor.min_steering_deg {
        factor = factor.max(floor.floor);
    }
    Term::Scale(factor)
}

/// Hard steering at speed; only the first matching penalty applies
pub fn coordination_term(input: &StageInput<'_>) -> Term {
    let speed = input.ctx.speed;
    let steering_abs = input.ctx.steering_abs();
    input
        .tuning
        .coordination
        .iter()
        .find(|penalty| penalty.applies(speed, steering_abs))
        .map_or(Term::Skip, |penalty| Term::Scale(penalty.factor))
}

/// Progress per step, favoring early progress
pub fn progress_term(input: &StageInput<'_>) -> Term {
    let ctx = input.ctx;
    if ctx.steps == 0 {
        return Term::Skip;
    }
    Term::Bonus(ctx.progress / ctx.steps as f64 * input.tuning.progress_scale)
}

/// Lap completion; progress must match exactly
pub fn lap_bonus_term(input: &StageInput<'_>) -> Term {
    if input.ctx.progress == input.tuning.lap_complete_progress {
        Term::Bonus(input.tuning.lap_bonus)
    } else {
        Term::Skip
    }
}

/// Vehicle heading against the direction of the segment ahead
pub fn heading_term(input: &StageInput<'_>) -> Term {
    let error = angle_between_deg(input.curvature.track_direction_deg, input.ctx.heading);
    Term::Scale(input.tuning.heading.lookup(error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Track;

    fn estimate(class: Curvature) -> CurvatureEstimate {
        CurvatureEstimate {
            class,
            direction_diff_deg: 0.0,
            track_direction_deg: 0.0,
        }
    }

    fn ctx() -> StepContext {
        StepContext::new(Track::rectangle(10.0, 6.0, 1.0), [2, 3])
    }

    fn term(stage: Stage, ctx: &StepContext, class: Curvature) -> Term {
        let tuning = RewardTuning::default();
        let curvature = estimate(class);
        stage.term(&StageInput {
            ctx,
            tuning: &tuning,
            curvature: &curvature,
        })
    }

    #[test]
    fn test_term_apply() {
        assert_eq!(Term::Scale(0.5).apply(3.0), 1.5);
        assert_eq!(Term::Bonus(0.5).apply(3.0), 3.5);
        assert_eq!(Term::Skip.apply(3.0), 3.0);
    }

    #[test]
    fn test_speed_term_by_class() {
        let fast = StepContext {
            speed: 2.8,
            ..ctx()
        };
        assert_eq!(term(Stage::Speed, &fast, Curvature::Straight), Term::Scale(1.0));
        assert_eq!(term(Stage::Speed, &fast, Curvature::MildTurn), Term::Scale(0.6));
        assert_eq!(term(Stage::Speed, &fast, Curvature::SharpTurn), Term::Scale(0.4));

        let slow = StepContext {

            speed: 1.2,

            ..ctx()

        };
        assert_eq!(term(Stage::Speed, &slow, Curvature::Straight), Term::Scale(0.5));
        assert_eq!(term(Stage::Speed, &slow, Curvature::MildTurn), Term::Scale(0.7));
        assert_eq!(term(Stage::Speed, &slow, Curvature::SharpTurn), Term::Scale(1.0));
    }

    #[test]
    fn test_lane_term_wider_in_turns() {
        let offset = StepContext {
            track_width: 1.0,
            distance_from_center: 0.12,
            ..ctx()
        };
        assert_eq!(term(Stage::Lane, &offset, Curvature::Straight), Term::Scale(0.7));
        assert_eq!(term(Stage::Lane, &offset, Curvature::MildTurn), Term::Scale(1.0));

        let edge = StepContext {
            track_width: 1.0,
            distance_from_center: 0.45,
            ..ctx()
        };
        assert_eq!(term(Stage::Lane, &edge, Curvature::Straight), Term::Scale(0.1));
        assert_eq!(term(Stage::Lane, &edge, Curvature::SharpTurn), Term::Scale(0.3));
    }

    #[test]
    fn test_steering_floor_only_in_sharp_turns() {
        let hard = StepContext {
            steering_angle: -28.0,
            ..ctx()
        };
        assert_eq!(term(Stage::Steering, &hard, Curvature::MildTurn), Term::Scale(0.4));
        assert_eq!(term(Stage::Steering, &hard, Curvature::SharpTurn), Term::Scale(0.7));

        // Floor never lowers the term
        let moderate = StepContext {
            steering_angle: 18.0,
            ..ctx()
        };
        assert_eq!(term(Stage::Steering, &moderate, Curvature::SharpTurn), Term::Scale(0.8));

        // Exactly 15° does not trigger the floor
        let at_limit = StepContext {
            steering_angle: 15.0,
            ..ctx()
        };
        assert_eq!(term(Stage::Steering, &at_limit, Curvature::SharpTurn), Term::Scale(0.8));
    }

    #[test]
    fn test_coordination_first_match_only() {
        let both = StepContext {
            speed: 2.8,
            steering_angle: 27.0,
            ..ctx()
        };
        assert_eq!(term(Stage::Coordination, &both, Curvature::Straight), Term::Scale(0.5));

        let second = StepContext {
            speed: 2.2,
            steering_angle: -26.0,
            ..ctx()
        };
        assert_eq!(term(Stage::Coordination, &second, Curvature::Straight), Term::Scale(0.6));

        let calm = StepContext {
            speed: 2.8,
            steering_angle: 20.0,
            ..ctx()
        };
        assert_eq!(term(Stage::Coordination, &calm, Curvature::Straight), Term::Skip);
    }

    #[test]
    fn test_progress_term_guards_zero_steps() {
        let start = StepContext {
            progress: 0.0,
            steps: 0,
            ..ctx()
        };
        assert_eq!(term(Stage::Progress, &start, Curvature::Straight), Term::Skip);

        let running = StepContext {
            progress: 50.0,
            steps: 500,
            ..ctx()
        };
        assert_eq!(term(Stage::Progress, &running, Curvature::Straight), Term::Bonus(0.5));
    }

    #[test]
    fn test_lap_bonus_exact_match() {
        let done = StepContext {
            progress: 100.0,
            ..ctx()
        };
        assert_eq!(term(Stage::LapBonus, &done, Curvature::Straight), Term::Bonus(100.0));

        let almost = StepContext {

            progress: 99.999,

            ..ctx()

        };
        assert_eq!(term(Stage::LapBonus, &almost, Curvature::Straight), Term::Skip);
    }

    #[test]
    fn test_heading_term_wraps() {
        let aligned = StepContext {
            heading: 5.0,
            ..ctx()
        };
        assert_eq!(term(Stage::Heading, &aligned, Curvature::Straight), Term::Scale(1.0));

        // 355° is 5° off a 0° track direction
        let wrapped = StepContext {
            heading: 355.0,
            ..ctx()
        };
        assert_eq!(term(Stage::Heading, &wrapped, Curvature::Straight), Term::Scale(1.0));

        let skewed = StepContext {

            heading: -25.0,

            ..ctx()

        };
        assert_eq!(term(Stage::Heading, &skewed, Curvature::Straight), Term::Scale(0.6));

        let backwards = StepContext {

            heading: 180.0,

            ..ctx()

        };
        assert_eq!(term(Stage::Heading, &backwards, Curvature::Straight), Term::Scale(0.4));
    }

    #[test]
    fn test_pipeline_order() {
        assert_eq!(Stage::PIPELINE.first(), Some(&Stage::Speed));
        assert_eq!(Stage::PIPELINE.last(), Some(&Stage::Heading));
    }
}
