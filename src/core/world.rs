use bevy_ecs::prelude::*;
use bevy_utils::tracing::info;
use serde::{Deserialize, Serialize};

use crate::components::identity::EntityId;
use crate::core::ecs::{create_schedule, create_world};
use crate::core::serialization::CaseExport;
use crate::data::config::InvestigationConfig;
use crate::rules::cost::ActionType;
use crate::rules::rng::CaseRng;
use crate::rules::thresholds::{evaluate_arrest, ArrestAssessment};
use crate::simulation::case::{CaseBlueprint, CaseFacts};
use crate::simulation::evidence::{EvidenceItem, Presentation};
use crate::simulation::investigation::{ClaimTag, DeductionBoard, Hypothesis, InvestigationState};
use crate::simulation::leads::{Lead, LeadBoard};
use crate::simulation::time::Tick;
use crate::simulation::truth::{TruthError, TruthGraph};
use crate::systems::actions::ActionResult;
use crate::systems::generator::{generate_case, NameSource, StaticNames};
use crate::systems::outcome::WorldStanding;
use crate::systems::projection::project_case;
use crate::systems::validation::{validate_hypothesis, ValidationResult};
use crate::systems::{ActionLog, CaseVerdict, Verdict};

/// Intent-driven commands fed into the ECS on each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionIntent {
    VisitScene {
        location_id: EntityId,
    },
    Interview {
        person_id: EntityId,
        location_id: EntityId,
    },
    RequestCctv {
        location_id: EntityId,
    },
    SubmitForensics {
        location_id: EntityId,
        item_id: Option<EntityId>,
    },
    SetHypothesis {
        suspect_id: EntityId,
        claims: Vec<ClaimTag>,
        evidence_ids: Vec<EntityId>,
    },
    Arrest {
        person_id: EntityId,
        location_id: EntityId,
    },
}

impl ActionIntent {
    pub fn action(&self) -> ActionType {
        match self {
            ActionIntent::VisitScene { .. } => ActionType::VisitScene,
            ActionIntent::Interview { .. } => ActionType::Interview,
            ActionIntent::RequestCctv { .. } => ActionType::RequestCctv,
            ActionIntent::SubmitForensics { .. } => ActionType::SubmitForensics,
            ActionIntent::SetHypothesis { .. } => ActionType::SetHypothesis,
            ActionIntent::Arrest { .. } => ActionType::Arrest,
        }
    }
}

/// Resource storing the intents for the next run.
#[derive(Resource, Default, Debug)]
pub struct ActionQueue(pub Vec<ActionIntent>);

/// Inputs for starting a case.
#[derive(Debug, Clone, Default)]
pub struct CaseSetup {
    pub config: InvestigationConfig,
    pub blueprint: CaseBlueprint,
    pub standing: WorldStanding,
}

/// Data snapshot returned to front ends after each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSnapshot {
    pub case_id: String,
    pub time: Tick,
    pub time_limit: u32,
    pub pressure: u32,
    pub pressure_limit: u32,
    pub trust: u32,
    pub cooperation: f64,
    pub known_evidence: Vec<EvidenceItem>,
    pub leads: Vec<Lead>,
    pub hypothesis: Option<Hypothesis>,
    pub verdict: Option<Verdict>,
}

/// Wrapper around the ECS world and schedule for one case.
pub struct CaseSession {
    world: World,
    schedule: Schedule,
    seed: u64,
}

impl CaseSession {
    /// Start a case with default configuration and a fresh standing.
    pub fn new(seed: u64) -> Result<Self, TruthError> {
        Self::start(seed, CaseSetup::default())
    }

    pub fn start(seed: u64, setup: CaseSetup) -> Result<Self, TruthError> {
        Self::start_with_names(seed, setup, &mut StaticNames)
    }

    /// Generates and projects the case, then seeds the investigation from
    /// the standing carried in `setup`.
    pub fn start_with_names(
        seed: u64,
        setup: CaseSetup,
        names: &mut dyn NameSource,
    ) -> Result<Self, TruthError> {
        let mut rng = CaseRng::new(seed);
        let case = generate_case(&mut rng, names, setup.blueprint)?;
        let presentation = project_case(&case.truth, &mut rng.fork("projection"));

        let modifiers = setup.standing.case_start_modifiers(&setup.config);
        let mut leads = LeadBoard::build(&presentation, 0, &setup.config.lead_deadlines);
        leads.extend_all(modifiers.lead_deadline_delta, 0);
        let state = InvestigationState::new(setup.standing.trust, modifiers.cooperation, leads);
        info!(
            "{}: {} evidence item(s), cooperation {:.2}, lead delay +{}",
            case.truth.case_id,
            presentation.evidence.len(),
            modifiers.cooperation,
            modifiers.lead_deadline_delta
        );

        let mut world = create_world(setup.config, setup.standing);
        world.insert_resource(case.truth);
        world.insert_resource(case.facts);
        world.insert_resource(presentation);
        world.insert_resource(state);

        Ok(Self {
            world,
            schedule: create_schedule(),
            seed,
        })
    }

    /// Start the next case, carrying over this case's configuration and
    /// standing.
    pub fn next_case(&self, seed: u64, blueprint: CaseBlueprint) -> Result<Self, TruthError> {
        Self::start(
            seed,
            CaseSetup {
                config: self.config().clone(),
                blueprint,
                standing: *self.standing(),
            },
        )
    }

    /// Run the schedule with the provided intents and return a snapshot.
    pub fn run(&mut self, intents: Vec<ActionIntent>) -> CaseSnapshot {
        self.world.resource_mut::<ActionQueue>().0 = intents;
        self.schedule.run(&mut self.world);
        self.snapshot()
    }

    /// Perform a single action. Structural errors from the truth graph are
    /// returned; refusals come back as failed results.
    pub fn act(&mut self, intent: ActionIntent) -> Result<ActionResult, TruthError> {
        let action = intent.action();
        let (results_before, errors_before) = {
            let log = self.world.resource::<ActionLog>();
            (log.results.len(), log.errors.len())
        };
        self.world.resource_mut::<ActionQueue>().0.push(intent);
        self.schedule.run(&mut self.world);

        let log = self.world.resource::<ActionLog>();
        if let Some(err) = log.errors.get(errors_before) {
            return Err(err.clone());
        }
        Ok(log
            .results
            .get(results_before)
            .cloned()
            .unwrap_or_else(|| ActionResult::refused(action, "Action was not processed.")))
    }

    pub fn snapshot(&self) -> CaseSnapshot {
        let truth = self.truth();
        let state = self.state();
        let config = self.config();
        let presentation = self.presentation();
        let known_evidence = state
            .known_evidence
            .iter()
            .filter_map(|id| presentation.get(*id).cloned())
            .collect();
        CaseSnapshot {
            case_id: truth.case_id.clone(),
            time: state.time,
            time_limit: config.time_limit,
            pressure: state.pressure,
            pressure_limit: config.pressure_limit,
            trust: state.trust,
            cooperation: state.cooperation,
            known_evidence,
            leads: state.leads.leads.clone(),
            hypothesis: self.board().hypothesis.clone(),
            verdict: self.verdict().cloned(),
        }
    }

    /// Probable-cause check for the current state, without arresting.
    pub fn assess_arrest(&self) -> ArrestAssessment {
        evaluate_arrest(self.state(), self.config())
    }

    /// Scores the current hypothesis without arresting.
    pub fn preview_validation(&self) -> ValidationResult {
        validate_hypothesis(
            self.truth(),
            self.board(),
            self.presentation(),
            self.state(),
            self.config(),
        )
    }

    pub fn export(&self) -> CaseExport {
        CaseExport::new(self.truth(), self.presentation())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn facts(&self) -> &CaseFacts {
        self.world.resource::<CaseFacts>()
    }

    pub fn truth(&self) -> &TruthGraph {
        self.world.resource::<TruthGraph>()
    }

    pub fn presentation(&self) -> &Presentation {
        self.world.resource::<Presentation>()
    }

    pub fn state(&self) -> &InvestigationState {
        self.world.resource::<InvestigationState>()
    }

    pub fn config(&self) -> &InvestigationConfig {
        self.world.resource::<InvestigationConfig>()
    }

    pub fn board(&self) -> &DeductionBoard {
        self.world.resource::<DeductionBoard>()
    }

    pub fn standing(&self) -> &WorldStanding {
        self.world.resource::<WorldStanding>()
    }

    pub fn results(&self) -> &[ActionResult] {
        &self.world.resource::<ActionLog>().results
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.world.resource::<CaseVerdict>().0.as_ref()
    }
}
