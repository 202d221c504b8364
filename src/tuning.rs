//! Data-driven reward tuning
//!
//! Every threshold and factor the reward pipeline uses lives here. The
//! defaults reproduce the stock reward exactly; a JSON file may override any
//! subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::RewardError;
use crate::reward::Curvature;

/// One end of a speed interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    Unbounded,
    Inclusive(f64),
    Exclusive(f64),
}

/// Speed interval with explicit open/closed ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: Bound,
    pub max: Bound,
}

impl SpeedRange {
    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Bound::Inclusive(min),
            max: Bound::Unbounded,
        }
    }

    pub const fn above(min: f64) -> Self {
        Self {
            min: Bound::Exclusive(min),
            max: Bound::Unbounded,
        }
    }

    pub const fn closed(min: f64, max: f64) -> Self {
        Self {
            min: Bound::Inclusive(min),
            max: Bound::Inclusive(max),
        }
    }

    pub fn contains(&self, speed: f64) -> bool {
        let above_min = match self.min {
            Bound::Unbounded => true,
            Bound::Inclusive(min) => speed >= min,
            Bound::Exclusive(min) => speed > min,
        };
        let below_max = match self.max {
            Bound::Unbounded => true,
            Bound::Inclusive(max) => speed <= max,
            Bound::Exclusive(max) => speed < max,
        };
        above_min && below_max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRule {
    pub range: SpeedRange,
    pub factor: f64,
}

/// Speed factors for one curvature class; first matching rule wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTable {
    pub rules: Vec<SpeedRule>,
    pub otherwise: f64,
}

impl SpeedTable {
    pub fn lookup(&self, speed: f64) -> f64 {
        self.rules
            .iter()
            .find(|rule| rule.range.contains(speed))
            .map_or(self.otherwise, |rule| rule.factor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedTables {
    pub straight: SpeedTable,
    pub mild_turn: SpeedTable,
    pub sharp_turn: SpeedTable,
}

impl SpeedTables {
    pub fn for_class(&self, class: Curvature) -> &SpeedTable {
        match class {
            Curvature::Straight => &self.straight,
            Curvature::MildTurn => &self.mild_turn,
            Curvature::SharpTurn => &self.sharp_turn,
        }
    }
}

impl Default for SpeedTables {
    fn default() -> Self {
        Self {
            // Reward flat-out driving on straights
            straight: SpeedTable {
                rules: vec![
                    SpeedRule {
                        range: SpeedRange::at_least(2.5),
                        factor: 1.0,
                    },
                    SpeedRule {
                        range: SpeedRange::at_least(2.0),
                        factor: 0.8,
                    },
                ],
                otherwise: 0.5,
            },
            mild_turn: SpeedTable {
                rules: vec![
                    SpeedRule {
                        range: SpeedRange::closed(1.5, 2.5),
                        factor: 1.0,
                    },
                    SpeedRule {
                        range: SpeedRange::above(2.5),
                        factor: 0.6,
                    },
                ],
                otherwise: 0.7,
            },
            // Too fast into a sharp corner is punished hardest
            sharp_turn: SpeedTable {
                rules: vec![
                    SpeedRule {
                        range: SpeedRange::closed(1.0, 2.0),
                        factor: 1.0,
                    },
                    SpeedRule {
                        range: SpeedRange::above(2.5),
                        factor: 0.4,
                    },
                ],
                otherwise: 0.7,
            },
        }
    }
}

/// Upper limit of a band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    /// value < limit
    Below(f64),
    /// value <= limit
    AtMost(f64),
}

impl Limit {
    #[inline]
    pub fn admits(&self, value: f64, scale: f64) -> bool {
        match *self {
            Limit::Below(limit) => value < limit * scale,
            Limit::AtMost(limit) => value <= limit * scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub limit: Limit,
    pub factor: f64,
}

/// Ascending bands; the first band whose limit admits the value wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub bands: Vec<Band>,
    pub otherwise: f64,
}

impl BandTable {
    fn below(limits_and_factors: &[(f64, f64)], otherwise: f64) -> Self {
        Self {
            bands: limits_and_factors
                .iter()
                .map(|&(limit, factor)| Band {
                    limit: Limit::Below(limit),
                    factor,
                })
                .collect(),
            otherwise,
        }
    }

    fn at_most(limits_and_factors: &[(f64, f64)], otherwise: f64) -> Self {
        Self {
            bands: limits_and_factors
                .iter()
                .map(|&(limit, factor)| Band {
                    limit: Limit::AtMost(limit),
                    factor,
                })
                .collect(),
            otherwise,
        }
    }

    pub fn lookup(&self, value: f64) -> f64 {
        self.lookup_scaled(value, 1.0)
    }

    /// Lookup with every limit multiplied by `scale` (e.g. track width)
    pub fn lookup_scaled(&self, value: f64, scale: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| band.limit.admits(value, scale))
            .map_or(self.otherwise, |band| band.factor)
    }
}

/// Lane markers as fractions of track width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneTables {
    pub straight: BandTable,
    /// Turns allow a wider racing line
    pub turn: BandTable,
}

impl LaneTables {
    pub fn for_class(&self, class: Curvature) -> &BandTable {
        if class.is_turn() {
            &self.turn
        } else {
            &self.straight
        }
    }
}

impl Default for LaneTables {
    fn default() -> Self {
        Self {
            straight: BandTable::at_most(&[(0.1, 1.0), (0.2, 0.7), (0.4, 0.3)], 0.1),
            turn: BandTable::at_most(&[(0.15, 1.0), (0.3, 0.7), (0.5, 0.3)], 0.1),
        }
    }
}

/// Floor applied to the steering term when a sharp turn needs real input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringFloor {
    /// Applies when |steering| is strictly above this (degrees)
    pub min_steering_deg: f64,
    pub floor: f64,
}

impl Default for SteeringFloor {
    fn default() -> Self {
        Self {
            min_steering_deg: SHARP_TURN_STEERING_DEG,
            floor: SHARP_TURN_STEERING_FLOOR,
        }
    }
}

/// Penalty for steering hard at speed; both limits are strict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinationPenalty {
    pub min_speed: f64,
    pub min_steering_deg: f64,
    pub factor: f64,
}

impl CoordinationPenalty {
    pub fn applies(&self, speed: f64, steering_abs: f64) -> bool {
        speed > self.min_speed && steering_abs > self.min_steering_deg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvatureThresholds {
    /// Direction change (degrees) from which a segment is a mild turn
    pub mild_turn_deg: f64,
    /// Direction change (degrees) from which a segment is a sharp turn
    pub sharp_turn_deg: f64,
}

impl Default for CurvatureThresholds {
    fn default() -> Self {
        Self {
            mild_turn_deg: MILD_TURN_DEG,
            sharp_turn_deg: SHARP_TURN_DEG,
        }
    }
}

/// Complete reward tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTuning {
    pub base_reward: f64,
    pub off_track_reward: f64,

    pub curvature: CurvatureThresholds,
    pub speed: SpeedTables,
    pub lane: LaneTables,

    /// Steering magnitude bands (degrees)
    pub steering: BandTable,
    pub sharp_turn_steering: SteeringFloor,
    /// Checked in order; only the first matching penalty applies
    pub coordination: Vec<CoordinationPenalty>,

    pub progress_scale: f64,
    pub lap_complete_progress: f64,
    pub lap_bonus: f64,

    /// Heading error bands (degrees)
    pub heading: BandTable,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            base_reward: BASE_REWARD,
            off_track_reward: OFF_TRACK_REWARD,

            curvature: CurvatureThresholds::default(),
            speed: SpeedTables::default(),
            lane: LaneTables::default(),

            steering: BandTable::below(&[(10.0, 1.0), (20.0, 0.8), (25.0, 0.6)], 0.4),
            sharp_turn_steering: SteeringFloor::default(),
            coordination: vec![
                CoordinationPenalty {
                    min_speed: 2.5,
                    min_steering_deg: 20.0,
                    factor: 0.5,
                },
                CoordinationPenalty {
                    min_speed: 2.0,
                    min_steering_deg: 25.0,
                    factor: 0.6,
                },
            ],

            progress_scale: PROGRESS_SCALE,
            lap_complete_progress: LAP_COMPLETE_PROGRESS,
            lap_bonus: LAP_BONUS,

            heading: BandTable::below(&[(10.0, 1.0), (20.0, 0.8), (30.0, 0.6)], 0.4),
        }
    }
}

impl RewardTuning {
    /// Parse tuning overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, RewardError> {
        let tuning: Self = serde_json::from_str(json)?;
        log::debug!("Loaded reward tuning: {:?}", tuning);
        Ok(tuning)
    }

    /// Load tuning overrides from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RewardError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Reward tuning loaded from {}", path.display());
        Ok(tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_range_bounds() {
        let range = SpeedRange::closed(1.5, 2.5);
        assert!(range.contains(1.5));
        assert!(range.contains(2.5));
        assert!(!range.contains(2.5001));
        assert!(!SpeedRange::above(2.5).contains(2.5));
        assert!(SpeedRange::at_least(2.5).contains(2.5));
    }

    #[test]
    fn test_default_speed_tables() {
        let speed = SpeedTables::default();
        assert_eq!(speed.straight.lookup(2.5), 1.0);
        assert_eq!(speed.straight.lookup(2.0), 0.8);
        assert_eq!(speed.straight.lookup(1.99), 0.5);

        assert_eq!(speed.mild_turn.lookup(2.5), 1.0);
        assert_eq!(speed.mild_turn.lookup(2.6), 0.6);
        assert_eq!(speed.mild_turn.lookup(1.0), 0.7);

        assert_eq!(speed.sharp_turn.lookup(2.0), 1.0);
        // Between the good band and the penalty band
        assert_eq!(speed.sharp_turn.lookup(2.3), 0.7);
        assert_eq!(speed.sharp_turn.lookup(2.5), 0.7);
        assert_eq!(speed.sharp_turn.lookup(2.51), 0.4);
        assert_eq!(speed.sharp_turn.lookup(0.5), 0.7);
    }

    #[test]
    fn test_band_limits_inclusive_vs_strict() {
        let tuning = RewardTuning::default();
        // Steering bands are strict
        assert_eq!(tuning.steering.lookup(9.99), 1.0);
        assert_eq!(tuning.steering.lookup(10.0), 0.8);
        assert_eq!(tuning.steering.lookup(25.0), 0.4);
        // Lane markers are inclusive and scale with width
        let lane = &tuning.lane.straight;
        assert_eq!(lane.lookup_scaled(0.1, 1.0), 1.0);
        assert_eq!(lane.lookup_scaled(0.2, 2.0), 1.0);
        assert_eq!(lane.lookup_scaled(0.81, 2.0), 0.1);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = RewardTuning::from_json(r#"{ "lap_bonus": 50.0 }"#).unwrap();
        assert_eq!(tuning.lap_bonus, 50.0);
        assert_eq!(tuning.progress_scale, PROGRESS_SCALE);
        assert_eq!(tuning.speed, SpeedTables::default());

        let nested =
            RewardTuning::from_json(r#"{ "curvature": { "sharp_turn_deg": 30.0 } }"#).unwrap();
        assert_eq!(nested.curvature.sharp_turn_deg, 30.0);
        assert_eq!(nested.curvature.mild_turn_deg, MILD_TURN_DEG);
    }

    #[test]
    fn test_tuning_json_roundtrip_shape() {
        let json = serde_json::to_string(&RewardTuning::default()).unwrap();
        assert!(json.contains(r#""at_most":0.1"#));
        assert!(json.contains(r#""inclusive":2.5"#));
        assert_eq!(RewardTuning::from_json(&json).unwrap(), RewardTuning::default());
    }

    #[test]
    fn test_bad_tuning_is_an_error() {
        assert!(matches!(
            RewardTuning::from_json(r#"{ "lap_bonus": "lots" }"#),
            Err(RewardError::Json(_))
        ));
        assert!(matches!(
            RewardTuning::load("/nonexistent/tuning.json"),
            Err(RewardError::Io(_))
        ));
    }
}
