use crate::components::identity::EntityId;
use crate::simulation::time::TimeWindow;
use crate::simulation::truth::{Event, EventKind, TruthGraph};

pub const MIN_TRAVEL_TIME: u32 = 1;

/// Locations `person_id` occupied at any point during `window`. Open-ended
/// stays are treated as a single tick at entry.
pub fn where_was(truth: &TruthGraph, person_id: EntityId, window: TimeWindow) -> Vec<EntityId> {
    truth
        .located_at()
        .iter()
        .filter(|edge| edge.person_id == person_id)
        .filter(|edge| {
            let stay = TimeWindow::new(edge.entry_time, edge.exit_time.unwrap_or(edge.entry_time));
            stay.overlaps(&window)
        })
        .map(|edge| edge.location_id)
        .collect()
}

pub fn events_in_window(truth: &TruthGraph, kind: EventKind, start: u32, end: u32) -> Vec<&Event> {
    truth
        .events()
        .iter()
        .filter(|event| event.kind == kind && start <= event.timestamp && event.timestamp <= end)
        .collect()
}

pub fn events_at(truth: &TruthGraph, location_id: EntityId) -> Vec<&Event> {
    truth
        .events()
        .iter()
        .filter(|event| event.location_id == location_id)
        .collect()
}

pub fn events_involving(truth: &TruthGraph, person_id: EntityId) -> Vec<&Event> {
    truth
        .events()
        .iter()
        .filter(|event| event.participants.contains(&person_id))
        .collect()
}

pub fn could_travel(from: EntityId, to: EntityId, window: TimeWindow) -> bool {
    if from == to {
        return true;
    }
    window.width() >= MIN_TRAVEL_TIME
}

pub fn has_precondition(truth: &TruthGraph, event_id: EntityId) -> bool {
    truth
        .enabled_by()
        .iter()
        .any(|edge| edge.event_id == event_id)
}

/// Whether `person_id` held `item_id` at some point in `window`.
pub fn possessed_during(
    truth: &TruthGraph,
    person_id: EntityId,
    item_id: EntityId,
    window: TimeWindow,
) -> bool {
    truth.possesses().iter().any(|edge| {
        edge.person_id == person_id
            && edge.item_id == item_id
            && TimeWindow::new(edge.start_time, edge.end_time.unwrap_or(u32::MAX)).overlaps(&window)
    })
}
