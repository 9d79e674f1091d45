use std::collections::BTreeMap;

use bevy_utils::tracing::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::components::identity::EntityId;
use crate::data::config::InvestigationConfig;
use crate::rules::cost::{check_budget, ActionCost, ActionType};
use crate::simulation::evidence::{EvidenceClass, EvidenceDetail, EvidenceItem, Presentation};
use crate::simulation::investigation::{ClaimTag, DeductionBoard, Hypothesis, InvestigationState};
use crate::simulation::truth::{EventKind, TruthError, TruthGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Success,
    Failure,
    NoEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action: ActionType,
    pub outcome: ActionOutcome,
    pub summary: String,
    pub time_cost: u32,
    pub pressure_cost: u32,
    pub cooperation_change: f64,
    pub revealed: Vec<EvidenceItem>,
    pub notes: Vec<String>,
}

impl ActionResult {
    pub fn refused(action: ActionType, reason: impl Into<String>) -> Self {
        Self {
            action,
            outcome: ActionOutcome::Failure,
            summary: reason.into(),
            time_cost: 0,
            pressure_cost: 0,
            cooperation_change: 0.0,
            revealed: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn paid(action: ActionType, cost: &ActionCost, summary: impl Into<String>) -> Self {
        Self {
            action,
            outcome: ActionOutcome::Success,
            summary: summary.into(),
            time_cost: cost.time,
            pressure_cost: cost.pressure,
            cooperation_change: cost.cooperation_delta,
            revealed: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Everything a player action may touch.
pub struct ActionContext<'a> {
    pub truth: &'a mut TruthGraph,
    pub presentation: &'a mut Presentation,
    pub state: &'a mut InvestigationState,
    pub config: &'a InvestigationConfig,
}

impl ActionContext<'_> {
    /// Charges `action` against the budget. `Err` carries the refusal.
    fn charge(&mut self, action: ActionType) -> Result<ActionCost, ActionResult> {
        let cost = self.config.costs.cost_for(action);
        if let Err(refusal) = check_budget(
            self.state.time,
            self.state.pressure,
            &cost,
            self.config.time_limit,
            self.config.pressure_limit,
        ) {
            warn!(
                "{} refused at t={} p={}: {}",
                action,
                self.state.time,
                self.state.pressure,
                refusal.reason()
            );
            return Err(ActionResult::refused(action, refusal.reason()));
        }
        self.state.apply_cost(&cost);
        Ok(cost)
    }

    fn record(
        &mut self,
        kind: EventKind,
        location_id: EntityId,
        participants: &[EntityId],
        metadata: BTreeMap<String, String>,
    ) -> Result<EntityId, TruthError> {
        self.truth
            .record_event(kind, self.state.time, location_id, participants, metadata)
    }

    /// Reveals every unknown item of `class` matching `filter`, decaying it
    /// first if the class's lead went cold.
    fn reveal<F>(&mut self, class: EvidenceClass, filter: F, result: &mut ActionResult)
    where
        F: Fn(&EvidenceItem) -> bool,
    {
        let pending: Vec<EntityId> = self
            .presentation
            .of_class(class)
            .filter(|item| !self.state.knows(item.id) && filter(item))
            .map(|item| item.id)
            .collect();
        if pending.is_empty() {
            return;
        }
        let decay = self
            .state
            .leads
            .on_reveal(class, self.state.time, &pending, &mut *self.presentation);
        if !decay.degraded.is_empty() {
            debug!("{} lead decayed {} item(s)", class, decay.degraded.len());
        }
        result.notes.extend(decay.notes);
        for id in pending {
            self.state.learn(id);
            if let Some(item) = self.presentation.get(id) {
                result.revealed.push(item.clone());
            }
        }
    }

    fn expire_leads(&mut self, result: &mut ActionResult) {
        let notes = self.state.leads.update_statuses(self.state.time);
        for note in &notes {
            debug!("{}", note);
        }
        result.notes.extend(notes);
    }
}

fn meta(action: ActionType) -> BTreeMap<String, String> {
    BTreeMap::from([("action".to_string(), action.as_str().to_string())])
}

fn settle(result: &mut ActionResult, found: &str, nothing: &str) {
    if result.revealed.is_empty() {
        result.outcome = ActionOutcome::NoEffect;
        result.summary = nothing.to_string();
    } else {
        result.summary = found.to_string();
    }
}

/// Documents the scene and collects trace evidence.
pub fn visit_scene(
    ctx: &mut ActionContext<'_>,
    location_id: EntityId,
) -> Result<ActionResult, TruthError> {
    let action = ActionType::VisitScene;
    let cost = match ctx.charge(action) {
        Ok(cost) => cost,
        Err(refused) => return Ok(refused),
    };
    ctx.record(EventKind::InvestigateScene, location_id, &[], meta(action))?;
    let mut result = ActionResult::paid(action, &cost, "");
    ctx.expire_leads(&mut result);
    ctx.reveal(EvidenceClass::Forensics, |_| true, &mut result);
    settle(
        &mut result,
        "You document the scene and collect trace evidence.",
        "The scene yields no new trace evidence.",
    );
    Ok(result)
}

/// Takes a statement from `person_id`. Only that person's testimony is
/// revealed.
pub fn interview(
    ctx: &mut ActionContext<'_>,
    person_id: EntityId,
    location_id: EntityId,
) -> Result<ActionResult, TruthError> {
    let action = ActionType::Interview;
    let cost = match ctx.charge(action) {
        Ok(cost) => cost,
        Err(refused) => return Ok(refused),
    };
    ctx.record(EventKind::Interview, location_id, &[person_id], meta(action))?;
    let mut result = ActionResult::paid(action, &cost, "");
    ctx.expire_leads(&mut result);
    ctx.reveal(
        EvidenceClass::Testimonial,
        |item| {
            matches!(&item.detail, EvidenceDetail::Testimonial { witness_id, .. } if *witness_id == person_id)
        },
        &mut result,
    );
    settle(
        &mut result,
        "The interview yields a usable statement.",
        "The interview adds nothing new.",
    );
    Ok(result)
}

pub fn request_cctv(
    ctx: &mut ActionContext<'_>,
    location_id: EntityId,
) -> Result<ActionResult, TruthError> {
    let action = ActionType::RequestCctv;
    let cost = match ctx.charge(action) {
        Ok(cost) => cost,
        Err(refused) => return Ok(refused),
    };
    ctx.record(EventKind::RequestCctv, location_id, &[], meta(action))?;
    let mut result = ActionResult::paid(action, &cost, "");
    ctx.expire_leads(&mut result);
    ctx.reveal(EvidenceClass::Cctv, |_| true, &mut result);
    settle(
        &mut result,
        "CCTV footage arrives.",
        "No usable CCTV footage is available.",
    );
    Ok(result)
}

pub fn submit_forensics(
    ctx: &mut ActionContext<'_>,
    location_id: EntityId,
    item_id: Option<EntityId>,
) -> Result<ActionResult, TruthError> {
    let action = ActionType::SubmitForensics;
    let cost = match ctx.charge(action) {
        Ok(cost) => cost,
        Err(refused) => return Ok(refused),
    };
    let mut metadata = meta(action);
    if let Some(item_id) = item_id {
        metadata.insert("item_id".to_string(), item_id.to_string());
    }
    ctx.record(EventKind::SubmitForensics, location_id, &[], metadata)?;
    let mut result = ActionResult::paid(action, &cost, "");
    ctx.expire_leads(&mut result);
    ctx.reveal(EvidenceClass::Forensics, |_| true, &mut result);
    settle(
        &mut result,
        "Forensics returns a report.",
        "Forensics finds nothing conclusive.",
    );
    Ok(result)
}

/// Pins a hypothesis to the board. Malformed hypotheses are refused before
/// any cost is charged.
pub fn set_hypothesis(
    ctx: &mut ActionContext<'_>,
    board: &mut DeductionBoard,
    suspect_id: EntityId,
    claims: &[ClaimTag],
    evidence_ids: &[EntityId],
) -> ActionResult {
    let action = ActionType::SetHypothesis;
    let known = &ctx.state.known_evidence;
    let hypothesis = match Hypothesis::new(suspect_id, claims, evidence_ids, known) {
        Ok(hypothesis) => hypothesis,
        Err(err) => {
            debug!("hypothesis refused: {}", err);
            return ActionResult::refused(action, err.to_string());
        }
    };
    let cost = match ctx.charge(action) {
        Ok(cost) => cost,
        Err(refused) => return refused,
    };
    board.submit(hypothesis);
    let mut result = ActionResult::paid(action, &cost, "Hypothesis submitted.");
    ctx.expire_leads(&mut result);
    result
}

/// Makes the arrest. Scoring happens separately against the board.
pub fn arrest(
    ctx: &mut ActionContext<'_>,
    board: &DeductionBoard,
    person_id: EntityId,
    location_id: EntityId,
) -> Result<ActionResult, TruthError> {
    let action = ActionType::Arrest;
    if !board.has_hypothesis() {
        return Ok(ActionResult::refused(action, "No hypothesis submitted."));
    }
    let cost = match ctx.charge(action) {
        Ok(cost) => cost,
        Err(refused) => return Ok(refused),
    };
    let mut metadata = meta(action);
    metadata.insert("person_id".to_string(), person_id.to_string());
    ctx.record(EventKind::Arrest, location_id, &[person_id], metadata)?;
    let mut result = ActionResult::paid(action, &cost, "Arrest attempted.");
    ctx.expire_leads(&mut result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::identity::{Person, RoleTag};
    use crate::rules::rng::CaseRng;
    use crate::simulation::case::CaseFacts;
    use crate::simulation::evidence::ConfidenceBand;
    use crate::simulation::leads::{LeadBoard, LeadStatus};
    use crate::systems::generator::{generate_case, StaticNames};
    use crate::systems::projection::project_case;

    struct Fixture {
        truth: TruthGraph,
        presentation: Presentation,
        state: InvestigationState,
        config: InvestigationConfig,
        facts: CaseFacts,
    }

    impl Fixture {
        fn new(seed: u64) -> Self {
            let mut rng = CaseRng::new(seed);
            let case = generate_case(&mut rng, &mut StaticNames, Default::default()).unwrap();
            let presentation = project_case(&case.truth, &mut rng.fork("projection"));
            let config = InvestigationConfig::default();
            let leads = LeadBoard::build(&presentation, 0, &config.lead_deadlines);
            Self {
                truth: case.truth,
                presentation,
                state: InvestigationState::new(3, 1.0, leads),
                config,
                facts: case.facts,
            }
        }

        fn ctx(&mut self) -> ActionContext<'_> {
            ActionContext {
                truth: &mut self.truth,
                presentation: &mut self.presentation,
                state: &mut self.state,
                config: &self.config,
            }
        }
    }

    #[test]
    fn interview_reveals_the_witness_statement_and_logs_an_event() {
        let mut fx = Fixture::new(21);
        let (witness, scene) = (fx.facts.witness_id, fx.facts.crime_scene_id);
        let events_before = fx.truth.events().len();
        let result = interview(&mut fx.ctx(), witness, scene).unwrap();
        assert_eq!(result.outcome, ActionOutcome::Success);
        assert_eq!(result.revealed.len(), 1);
        assert_eq!(result.time_cost, 1);
        assert_eq!(fx.truth.events().len(), events_before + 1);
        assert_eq!(fx.state.time, 1);
        assert!((fx.state.cooperation - 0.95).abs() < 1e-9);
        assert_eq!(
            fx.state.leads.lead(EvidenceClass::Testimonial).unwrap().status,
            LeadStatus::Resolved
        );

        let again = interview(&mut fx.ctx(), witness, scene).unwrap();
        assert_eq!(again.outcome, ActionOutcome::NoEffect);
    }

    #[test]
    fn interviewing_someone_else_reveals_nothing() {
        let mut fx = Fixture::new(21);
        let (victim, scene) = (fx.facts.victim_id, fx.facts.crime_scene_id);
        let result = interview(&mut fx.ctx(), victim, scene).unwrap();
        assert_eq!(result.outcome, ActionOutcome::NoEffect);
        assert_eq!(
            fx.state.leads.lead(EvidenceClass::Testimonial).unwrap().status,
            LeadStatus::Active
        );
    }

    #[test]
    fn unknown_participant_is_a_structural_error() {
        let mut fx = Fixture::new(4);
        let scene = fx.facts.crime_scene_id;
        let err = interview(&mut fx.ctx(), EntityId(1), scene).unwrap_err();
        assert!(matches!(err, TruthError::UnknownEntity { .. }));
    }

    #[test]
    fn late_interview_gets_a_decayed_statement() {
        let mut fx = Fixture::new(8);
        let scene = fx.facts.crime_scene_id;
        let witness = fx.facts.witness_id;
        let weapon = fx.facts.weapon_id;
        visit_scene(&mut fx.ctx(), scene).unwrap();
        let forensics = submit_forensics(&mut fx.ctx(), scene, Some(weapon)).unwrap();
        assert!(forensics.notes.iter().any(|note| note == "Lead went cold: Witness lead."));
        let result = interview(&mut fx.ctx(), witness, scene).unwrap();
        let statement = &result.revealed[0];
        assert_eq!(statement.confidence, ConfidenceBand::Weak);
        assert!(statement.observed_person_ids().is_empty());
        assert!(result
            .notes
            .iter()
            .any(|note| note == "Witness lead expired; the statement is less certain."));
        assert_eq!(fx.presentation.history.len(), 1);
    }

    #[test]
    fn budget_refusal_changes_nothing() {
        let mut fx = Fixture::new(2);
        fx.state.time = 7;
        let scene = fx.facts.crime_scene_id;
        let events_before = fx.truth.events().len();
        let result = submit_forensics(&mut fx.ctx(), scene, None).unwrap();
        assert_eq!(result.outcome, ActionOutcome::Failure);
        assert_eq!(result.summary, "No time left for that action.");
        assert_eq!(fx.state.time, 7);
        assert_eq!(fx.truth.events().len(), events_before);

        fx.state.time = 0;
        fx.state.pressure = 6;
        let result = request_cctv(&mut fx.ctx(), scene).unwrap();
        assert_eq!(result.summary, "Institutional pressure is too high for that action.");
    }

    #[test]
    fn hypothesis_needs_collected_evidence_and_arrest_needs_hypothesis() {
        let mut fx = Fixture::new(3);
        let mut board = DeductionBoard::default();
        let (offender, scene, witness) = (
            fx.facts.offender_id,
            fx.facts.crime_scene_id,
            fx.facts.witness_id,
        );

        let refused = arrest(&mut fx.ctx(), &board, offender, scene).unwrap();
        assert_eq!(refused.summary, "No hypothesis submitted.");

        let unknown = fx.presentation.evidence[0].id;
        let result = set_hypothesis(&mut fx.ctx(), &mut board, offender, &[ClaimTag::Presence], &[unknown]);
        assert_eq!(result.outcome, ActionOutcome::Failure);
        assert_eq!(fx.state.time, 0);

        let statement = interview(&mut fx.ctx(), witness, scene).unwrap().revealed[0].id;
        let result = set_hypothesis(&mut fx.ctx(), &mut board, offender, &[ClaimTag::Presence], &[statement]);
        assert_eq!(result.outcome, ActionOutcome::Success);
        assert!(board.has_hypothesis());

        let made = arrest(&mut fx.ctx(), &board, offender, scene).unwrap();
        assert_eq!(made.outcome, ActionOutcome::Success);
        assert_eq!(fx.state.pressure, 2);
        assert_eq!(fx.truth.events().last().unwrap().kind, EventKind::Arrest);
    }

    #[test]
    fn every_late_witness_gets_a_decayed_statement() {
        let mut fx = Fixture::new(8);
        let (scene, witness, weapon) = (
            fx.facts.crime_scene_id,
            fx.facts.witness_id,
            fx.facts.weapon_id,
        );
        let second = fx.truth.next_id();
        fx.truth
            .add_person(Person::new(second, "Sam Ortiz", &[RoleTag::Witness]))
            .unwrap();
        let mut statement = fx
            .presentation
            .of_class(EvidenceClass::Testimonial)
            .next()
            .unwrap()
            .clone();
        statement.id = fx.truth.next_id();
        statement.confidence = ConfidenceBand::Strong;
        if let EvidenceDetail::Testimonial {
            witness_id,
            observed_person_ids,
            ..
        } = &mut statement.detail
        {
            *witness_id = second;
            *observed_person_ids = vec![fx.facts.offender_id];
        }
        fx.presentation.evidence.push(statement);

        visit_scene(&mut fx.ctx(), scene).unwrap();
        submit_forensics(&mut fx.ctx(), scene, Some(weapon)).unwrap();
        let first = interview(&mut fx.ctx(), witness, scene).unwrap();
        let later = interview(&mut fx.ctx(), second, scene).unwrap();
        for result in [&first, &later] {
            assert_eq!(result.revealed.len(), 1);
            assert_eq!(result.revealed[0].confidence, ConfidenceBand::Weak);
            assert!(result.revealed[0].observed_person_ids().is_empty());
        }
        assert!(later
            .notes
            .iter()
            .any(|note| note == "Witness lead expired; the statement is less certain."));
    }
}
