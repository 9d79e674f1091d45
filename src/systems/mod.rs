pub mod actions;
pub mod generator;
pub mod outcome;
pub mod projection;
pub mod validation;

use bevy_ecs::prelude::*;
use bevy_utils::tracing::{error, info};
use serde::{Deserialize, Serialize};

use crate::core::world::{ActionIntent, ActionQueue};
use crate::data::config::InvestigationConfig;
use crate::rules::cost::ActionType;
use crate::simulation::evidence::Presentation;
use crate::simulation::investigation::{DeductionBoard, InvestigationState};
use crate::simulation::truth::{TruthError, TruthGraph};
use crate::systems::actions::{ActionContext, ActionOutcome, ActionResult};
use crate::systems::outcome::{resolve_case_outcome, CaseOutcome, WorldStanding};
use crate::systems::validation::{validate_hypothesis, ValidationResult};

/// Results of every intent drained this session, in order.
#[derive(Resource, Debug, Default)]
pub struct ActionLog {
    pub results: Vec<ActionResult>,
    pub errors: Vec<TruthError>,
    pub arrest_attempted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub validation: ValidationResult,
    pub outcome: CaseOutcome,
}

/// Set once, by the first successful arrest.
#[derive(Resource, Debug, Default)]
pub struct CaseVerdict(pub Option<Verdict>);

/// System: drains queued intents through the action layer.
pub fn action_intake_system(
    mut queue: ResMut<ActionQueue>,
    mut truth: ResMut<TruthGraph>,
    mut presentation: ResMut<Presentation>,
    mut state: ResMut<InvestigationState>,
    mut board: ResMut<DeductionBoard>,
    config: Res<InvestigationConfig>,
    mut log: ResMut<ActionLog>,
) {
    let intents = std::mem::take(&mut queue.0);
    for intent in intents {
        let action = intent.action();
        if log.arrest_attempted {
            log.results
                .push(ActionResult::refused(action, "The case is closed."));
            continue;
        }
        let mut ctx = ActionContext {
            truth: &mut truth,
            presentation: &mut presentation,
            state: &mut state,
            config: &config,
        };
        let result = match intent {
            ActionIntent::VisitScene { location_id } => actions::visit_scene(&mut ctx, location_id),
            ActionIntent::Interview {
                person_id,
                location_id,
            } => actions::interview(&mut ctx, person_id, location_id),
            ActionIntent::RequestCctv { location_id } => actions::request_cctv(&mut ctx, location_id),
            ActionIntent::SubmitForensics {
                location_id,
                item_id,
            } => actions::submit_forensics(&mut ctx, location_id, item_id),
            ActionIntent::SetHypothesis {
                suspect_id,
                claims,
                evidence_ids,
            } => Ok(actions::set_hypothesis(
                &mut ctx,
                &mut board,
                suspect_id,
                &claims,
                &evidence_ids,
            )),
            ActionIntent::Arrest {
                person_id,
                location_id,
            } => actions::arrest(&mut ctx, &board, person_id, location_id),
        };
        match result {
            Ok(result) => {
                if result.action == ActionType::Arrest
                    && result.outcome == ActionOutcome::Success
                {
                    log.arrest_attempted = true;
                }
                log.results.push(result);
            }
            Err(err) => {
                error!("{} aborted: {}", action, err);
                log.errors.push(err);
            }
        }
    }
}

/// System: scores the case once an arrest has been made and carries the
/// outcome into the standing.
#[allow(clippy::too_many_arguments)]
pub fn verdict_system(
    log: Res<ActionLog>,
    truth: Res<TruthGraph>,
    presentation: Res<Presentation>,
    state: Res<InvestigationState>,
    board: Res<DeductionBoard>,
    config: Res<InvestigationConfig>,
    mut verdict: ResMut<CaseVerdict>,
    mut standing: ResMut<WorldStanding>,
) {
    if !log.arrest_attempted || verdict.0.is_some() {
        return;
    }
    let validation = validate_hypothesis(&truth, &board, &presentation, &state, &config);
    let outcome = resolve_case_outcome(&validation);
    standing.apply(&outcome, &config);
    info!(
        "{}: arrest {} (tier {}), standing trust={} pressure={}",
        truth.case_id, outcome.arrest_result, validation.tier, standing.trust, standing.pressure
    );
    verdict.0 = Some(Verdict {
        validation,
        outcome,
    });
}
