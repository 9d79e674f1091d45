use std::fmt;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::config::InvestigationConfig;
use crate::systems::validation::{ArrestTier, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrestResult {
    Success,
    Partial,
    Failed,
}

impl ArrestResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrestResult::Success => "success",
            ArrestResult::Partial => "partial",
            ArrestResult::Failed => "failed",
        }
    }
}

impl fmt::Display for ArrestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse cross-case consequence of an arrest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub arrest_result: ArrestResult,
    pub trust_delta: i32,
    pub pressure_delta: i32,
    pub notes: Vec<String>,
}

pub fn resolve_case_outcome(validation: &ValidationResult) -> CaseOutcome {
    match (validation.is_correct_suspect, validation.tier) {
        (true, ArrestTier::Clean) => CaseOutcome {
            arrest_result: ArrestResult::Success,
            trust_delta: 1,
            pressure_delta: -1,
            notes: vec!["Command is satisfied with the charge.".to_string()],
        },
        (true, ArrestTier::Shaky) => CaseOutcome {
            arrest_result: ArrestResult::Partial,
            trust_delta: 0,
            pressure_delta: 1,
            notes: vec!["The case is right, but the support is thin.".to_string()],
        },
        _ => CaseOutcome {
            arrest_result: ArrestResult::Failed,
            trust_delta: -1,
            pressure_delta: 2,
            notes: vec!["Command sees this as a weak or misdirected arrest.".to_string()],
        },
    }
}

/// Trust and pressure carried from one case to the next.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldStanding {
    pub trust: u32,
    pub pressure: u32,
}

impl Default for WorldStanding {
    fn default() -> Self {
        Self {
            trust: 3,
            pressure: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseStartModifiers {
    pub cooperation: f64,
    pub lead_deadline_delta: u32,
}

impl WorldStanding {
    /// Applies an outcome, clamping both counters to `[0, limit]`.
    pub fn apply(&mut self, outcome: &CaseOutcome, config: &InvestigationConfig) {
        self.trust = shift(self.trust, outcome.trust_delta, config.trust_limit);
        self.pressure = shift(self.pressure, outcome.pressure_delta, config.pressure_limit);
    }

    /// Trusted detectives get more cooperation; institutional friction
    /// slows paperwork and pushes lead deadlines out.
    pub fn case_start_modifiers(&self, config: &InvestigationConfig) -> CaseStartModifiers {
        let trust_share = if config.trust_limit == 0 {
            0.0
        } else {
            self.trust as f64 / config.trust_limit as f64
        };
        let cooperation = (0.4 + trust_share * 0.6).clamp(0.2, 1.0);
        let lead_deadline_delta = match self.pressure {
            p if p >= 5 => 2,
            p if p >= 3 => 1,
            _ => 0,
        };
        CaseStartModifiers {
            cooperation,
            lead_deadline_delta,
        }
    }
}

fn shift(value: u32, delta: i32, limit: u32) -> u32 {
    (value as i64 + delta as i64).clamp(0, limit as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::validation::TemporalStatus;
    use std::collections::BTreeMap;

    fn verdict(is_correct_suspect: bool, tier: ArrestTier) -> ValidationResult {
        ValidationResult {
            is_correct_suspect,
            probable_cause: true,
            tier,
            summary: String::new(),
            supports: Vec::new(),
            missing: Vec::new(),
            notes: Vec::new(),
            temporal: TemporalStatus::None,
            classes: BTreeMap::new(),
        }
    }

    #[test]
    fn tiers_map_to_outcomes() {
        let clean = resolve_case_outcome(&verdict(true, ArrestTier::Clean));
        assert_eq!(clean.arrest_result, ArrestResult::Success);
        assert_eq!((clean.trust_delta, clean.pressure_delta), (1, -1));

        let shaky = resolve_case_outcome(&verdict(true, ArrestTier::Shaky));
        assert_eq!(shaky.arrest_result, ArrestResult::Partial);
        assert_eq!((shaky.trust_delta, shaky.pressure_delta), (0, 1));

        let wrong = resolve_case_outcome(&verdict(false, ArrestTier::Clean));
        assert_eq!(wrong.arrest_result, ArrestResult::Failed);
        assert_eq!((wrong.trust_delta, wrong.pressure_delta), (-1, 2));
    }

    #[test]
    fn standing_clamps_to_limits() {
        let config = InvestigationConfig::default();
        let mut standing = WorldStanding {
            trust: 0,
            pressure: 5,
        };
        standing.apply(&resolve_case_outcome(&verdict(false, ArrestTier::Failed)), &config);
        assert_eq!(standing, WorldStanding { trust: 0, pressure: 6 });
    }

    #[test]
    fn start_modifiers_follow_standing() {
        let config = InvestigationConfig::default();
        let calm = WorldStanding::default().case_start_modifiers(&config);
        assert!((calm.cooperation - 0.7).abs() < 1e-9);
        assert_eq!(calm.lead_deadline_delta, 0);

        let strained = WorldStanding {
            trust: 0,
            pressure: 5,
        }
        .case_start_modifiers(&config);
        assert!((strained.cooperation - 0.4).abs() < 1e-9);
        assert_eq!(strained.lead_deadline_delta, 2);
    }
}
