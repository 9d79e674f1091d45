use std::fmt;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::identity::EntityId;
use crate::rules::cost::ActionCost;
use crate::simulation::leads::LeadBoard;
use crate::simulation::time::Tick;

pub const MAX_CLAIMS: usize = 3;
pub const MAX_HYPOTHESIS_EVIDENCE: usize = 3;

/// Per-session counters. Reset at case start, owned by the session.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationState {
    pub time: Tick,
    pub pressure: u32,
    pub trust: u32,
    pub cooperation: f64,
    pub known_evidence: Vec<EntityId>,
    pub leads: LeadBoard,
}

impl Default for InvestigationState {
    fn default() -> Self {
        Self {
            time: 0,
            pressure: 0,
            trust: 3,
            cooperation: 1.0,
            known_evidence: Vec::new(),
            leads: LeadBoard::default(),
        }
    }
}

impl InvestigationState {
    pub fn new(trust: u32, cooperation: f64, leads: LeadBoard) -> Self {
        Self {
            trust,
            cooperation: cooperation.clamp(0.0, 1.0),
            leads,
            ..Self::default()
        }
    }

    pub fn knows(&self, evidence_id: EntityId) -> bool {
        self.known_evidence.contains(&evidence_id)
    }

    /// Returns `false` if the item was already known.
    pub fn learn(&mut self, evidence_id: EntityId) -> bool {
        if self.knows(evidence_id) {
            return false;
        }
        self.known_evidence.push(evidence_id);
        true
    }

    pub fn apply_cost(&mut self, cost: &ActionCost) {
        self.time += cost.time;
        self.pressure += cost.pressure;
        self.cooperation = (self.cooperation + cost.cooperation_delta).clamp(0.0, 1.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimTag {
    Presence,
    Opportunity,
    Motive,
    Behavior,
}

impl ClaimTag {
    pub const ALL: [ClaimTag; 4] = [
        ClaimTag::Presence,
        ClaimTag::Opportunity,
        ClaimTag::Motive,
        ClaimTag::Behavior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimTag::Presence => "presence",
            ClaimTag::Opportunity => "opportunity",
            ClaimTag::Motive => "motive",
            ClaimTag::Behavior => "behavior",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|claim| claim.as_str() == value)
    }
}

impl fmt::Display for ClaimTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Refusal reasons for a submitted hypothesis. Shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HypothesisError {
    NoClaims,
    TooManyClaims(usize),
    NoEvidence,
    TooManyEvidence(usize),
    UncollectedEvidence(EntityId),
}

impl fmt::Display for HypothesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HypothesisError::NoClaims => {
                write!(f, "Hypothesis not set. Pick at least one claim.")
            }
            HypothesisError::TooManyClaims(count) => write!(
                f,
                "Hypothesis not set. {} claims given, at most {} allowed.",
                count, MAX_CLAIMS
            ),
            HypothesisError::NoEvidence => write!(
                f,
                "Hypothesis not set. At least 1 supporting evidence is required."
            ),
            HypothesisError::TooManyEvidence(count) => write!(
                f,
                "Hypothesis not set. {} evidence items given, at most {} allowed.",
                count, MAX_HYPOTHESIS_EVIDENCE
            ),
            HypothesisError::UncollectedEvidence(_) => {
                write!(f, "Hypothesis uses evidence you have not collected.")
            }
        }
    }
}

impl std::error::Error for HypothesisError {}

/// A player's theory of the case. Always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub suspect_id: EntityId,
    pub claims: Vec<ClaimTag>,
    pub evidence_ids: Vec<EntityId>,
}

impl Hypothesis {
    /// Duplicate claims and evidence references collapse before the count
    /// limits are checked.
    pub fn new(
        suspect_id: EntityId,
        claims: &[ClaimTag],
        evidence_ids: &[EntityId],
        known_evidence: &[EntityId],
    ) -> Result<Self, HypothesisError> {
        let claims = dedup(claims);
        let evidence_ids = dedup(evidence_ids);
        if claims.is_empty() {
            return Err(HypothesisError::NoClaims);
        }
        if claims.len() > MAX_CLAIMS {
            return Err(HypothesisError::TooManyClaims(claims.len()));
        }
        if evidence_ids.is_empty() {
            return Err(HypothesisError::NoEvidence);
        }
        if evidence_ids.len() > MAX_HYPOTHESIS_EVIDENCE {
            return Err(HypothesisError::TooManyEvidence(evidence_ids.len()));
        }
        if let Some(missing) = evidence_ids.iter().find(|id| !known_evidence.contains(id)) {
            return Err(HypothesisError::UncollectedEvidence(*missing));
        }
        Ok(Self {
            suspect_id,
            claims,
            evidence_ids,
        })
    }

    pub fn makes_claim(&self, claim: ClaimTag) -> bool {
        self.claims.contains(&claim)
    }
}

fn dedup<T: Copy + PartialEq>(values: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(value) {
            out.push(*value);
        }
    }
    out
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBoard {
    pub hypothesis: Option<Hypothesis>,
}

impl DeductionBoard {
    /// Replaces any earlier hypothesis.
    pub fn submit(&mut self, hypothesis: Hypothesis) -> Option<Hypothesis> {
        self.hypothesis.replace(hypothesis)
    }

    pub fn has_hypothesis(&self) -> bool {
        self.hypothesis.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [EntityId; 4] = [EntityId(1), EntityId(2), EntityId(3), EntityId(4)];

    #[test]
    fn hypothesis_limits_claims_and_evidence() {
        let suspect = EntityId(9);
        assert_eq!(
            Hypothesis::new(suspect, &[], &[EntityId(1)], &KNOWN),
            Err(HypothesisError::NoClaims)
        );
        assert_eq!(
            Hypothesis::new(suspect, &ClaimTag::ALL, &[EntityId(1)], &KNOWN),
            Err(HypothesisError::TooManyClaims(4))
        );
        assert_eq!(
            Hypothesis::new(suspect, &[ClaimTag::Presence], &[], &KNOWN),
            Err(HypothesisError::NoEvidence)
        );
        assert_eq!(
            Hypothesis::new(suspect, &[ClaimTag::Presence], &KNOWN, &KNOWN),
            Err(HypothesisError::TooManyEvidence(4))
        );
    }

    #[test]
    fn hypothesis_rejects_uncollected_evidence() {
        let err = Hypothesis::new(EntityId(9), &[ClaimTag::Motive], &[EntityId(77)], &KNOWN)
            .unwrap_err();
        assert_eq!(err, HypothesisError::UncollectedEvidence(EntityId(77)));
        assert_eq!(err.to_string(), "Hypothesis uses evidence you have not collected.");
    }

    #[test]
    fn duplicate_claims_collapse() {
        let hypothesis = Hypothesis::new(
            EntityId(9),
            &[ClaimTag::Presence, ClaimTag::Presence, ClaimTag::Opportunity, ClaimTag::Presence],
            &[EntityId(1), EntityId(1)],
            &KNOWN,
        )
        .unwrap();
        assert_eq!(hypothesis.claims, vec![ClaimTag::Presence, ClaimTag::Opportunity]);
        assert_eq!(hypothesis.evidence_ids, vec![EntityId(1)]);
    }

    #[test]
    fn board_replaces_wholesale() {
        let mut board = DeductionBoard::default();
        let first = Hypothesis::new(EntityId(9), &[ClaimTag::Presence], &[EntityId(1)], &KNOWN).unwrap();
        let second = Hypothesis::new(EntityId(8), &[ClaimTag::Behavior], &[EntityId(2)], &KNOWN).unwrap();
        assert!(board.submit(first.clone()).is_none());
        assert_eq!(board.submit(second.clone()), Some(first));
        assert_eq!(board.hypothesis, Some(second));
    }

    #[test]
    fn costs_clamp_cooperation() {
        let mut state = InvestigationState::default();
        state.cooperation = 0.02;
        state.apply_cost(&ActionCost::new(1, 2, -0.05));
        assert_eq!(state.time, 1);
        assert_eq!(state.pressure, 2);
        assert_eq!(state.cooperation, 0.0);
        assert!(state.learn(EntityId(4)));
        assert!(!state.learn(EntityId(4)));
    }

    #[test]
    fn claim_tags_parse_loosely() {
        assert_eq!(ClaimTag::parse(" Presence "), Some(ClaimTag::Presence));
        assert_eq!(ClaimTag::parse("alibi"), None);
    }
}
