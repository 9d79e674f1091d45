use bevy_ecs::prelude::*;
use bevy_ecs::schedule::SystemSet;

use crate::core::world::ActionQueue;
use crate::data::config::InvestigationConfig;
use crate::simulation::investigation::DeductionBoard;
use crate::systems::outcome::WorldStanding;
use crate::systems::{action_intake_system, verdict_system, ActionLog, CaseVerdict};

/// Canonical run ordering for a case session.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum CaseSet {
    Intake,
    Verdict,
}

/// Build the ECS world with the session-wide resources. Case resources
/// (truth, presentation, investigation state, facts) are inserted by the
/// session once the case is generated.
pub fn create_world(config: InvestigationConfig, standing: WorldStanding) -> World {
    let mut world = World::new();
    world.insert_resource(config);
    world.insert_resource(standing);
    world.insert_resource(ActionQueue::default());
    world.insert_resource(ActionLog::default());
    world.insert_resource(DeductionBoard::default());
    world.insert_resource(CaseVerdict::default());
    world
}

/// Build the system schedule in the canonical order.
pub fn create_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.configure_sets((CaseSet::Intake, CaseSet::Verdict).chain());

    schedule.add_systems((
        action_intake_system.in_set(CaseSet::Intake),
        verdict_system.in_set(CaseSet::Verdict),
    ));

    schedule
}
