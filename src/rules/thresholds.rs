use serde::{Deserialize, Serialize};

use crate::data::config::InvestigationConfig;
use crate::simulation::investigation::InvestigationState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrestAssessment {
    pub is_probable: bool,
    pub explanation: Vec<String>,
}

/// Probable-cause gate: enough collected evidence and pressure within the
/// ceiling. Independent of whether the right person is being arrested.
pub fn evaluate_arrest(state: &InvestigationState, config: &InvestigationConfig) -> ArrestAssessment {
    let count = state.known_evidence.len();
    let mut explanation = Vec::new();
    if count < config.min_evidence {
        explanation.push("Not enough evidence for probable cause.".to_string());
    }
    if state.pressure > config.pressure_limit {
        explanation.push("Institutional pressure is too high to justify an arrest.".to_string());
    }
    let is_probable = count >= config.min_evidence && state.pressure <= config.pressure_limit;
    if is_probable {
        explanation.push("Probable cause established.".to_string());
    }
    ArrestAssessment {
        is_probable,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::identity::EntityId;

    #[test]
    fn single_item_is_not_probable() {
        let mut state = InvestigationState::default();
        state.learn(EntityId(1));
        let assessment = evaluate_arrest(&state, &InvestigationConfig::default());
        assert!(!assessment.is_probable);
        assert_eq!(assessment.explanation, vec!["Not enough evidence for probable cause."]);
    }

    #[test]
    fn pressure_over_limit_blocks_arrest() {
        let mut state = InvestigationState::default();
        state.learn(EntityId(1));
        state.learn(EntityId(2));
        let config = InvestigationConfig::default();
        assert!(evaluate_arrest(&state, &config).is_probable);
        state.pressure = config.pressure_limit + 1;
        let assessment = evaluate_arrest(&state, &config);
        assert!(!assessment.is_probable);
        assert_eq!(assessment.explanation.len(), 1);
    }
}
