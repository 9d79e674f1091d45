use std::collections::BTreeMap;
use std::fmt;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::identity::{EntityId, IdAllocator, Person, RoleTag};
use crate::components::world::{Item, Location};
use crate::rules::rng::CaseRng;
use crate::simulation::case::CaseMeta;
use crate::simulation::time::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Approach,
    Confrontation,
    Kill,
    Discovery,
    Interview,
    InvestigateScene,
    RequestCctv,
    SubmitForensics,
    Arrest,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Approach => "approach",
            EventKind::Confrontation => "confrontation",
            EventKind::Kill => "kill",
            EventKind::Discovery => "discovery",
            EventKind::Interview => "interview",
            EventKind::InvestigateScene => "investigate_scene",
            EventKind::RequestCctv => "request_cctv",
            EventKind::SubmitForensics => "submit_forensics",
            EventKind::Arrest => "arrest",
        }
    }
}

/// Immutable record of something that happened (or was done) in the case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EntityId,
    pub kind: EventKind,
    pub timestamp: Tick,
    pub location_id: EntityId,
    pub participants: Vec<EntityId>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedAt {
    pub person_id: EntityId,
    pub location_id: EntityId,
    pub entry_time: Tick,
    pub exit_time: Option<Tick>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Possesses {
    pub person_id: EntityId,
    pub item_id: EntityId,
    pub start_time: Tick,
    pub end_time: Option<Tick>,
}

/// Causal link: `event_id` was made possible by `precondition_id`
/// (e.g. a kill enabled by its weapon).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledBy {
    pub event_id: EntityId,
    pub precondition_id: EntityId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Person,
    Location,
    Item,
    Event,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Person => "person",
            EntityKind::Location => "location",
            EntityKind::Item => "item",
            EntityKind::Event => "event",
        };
        write!(f, "{}", label)
    }
}

/// Structural errors. These mean the caller built an inconsistent case and
/// are not meant to be shown to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TruthError {
    UnknownEntity { kind: EntityKind, id: EntityId },
    DuplicateEntity { kind: EntityKind, id: EntityId },
    InvalidInterval { start: Tick, end: Tick },
}

impl fmt::Display for TruthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TruthError::UnknownEntity { kind, id } => write!(f, "unknown {} id: {}", kind, id),
            TruthError::DuplicateEntity { kind, id } => {
                write!(f, "{} id already present: {}", kind, id)
            }
            TruthError::InvalidInterval { start, end } => {
                write!(f, "end time {} is before start time {}", end, start)
            }
        }
    }
}

impl std::error::Error for TruthError {}

/// Ground truth for one case: typed tables plus typed edge lists, keyed by
/// [`EntityId`]. Written by the generator, then only appended to by
/// investigative actions through [`TruthGraph::record_event`].
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthGraph {
    pub case_id: String,
    pub seed: u64,
    people: Vec<Person>,
    locations: Vec<Location>,
    items: Vec<Item>,
    events: Vec<Event>,
    located_at: Vec<LocatedAt>,
    possesses: Vec<Possesses>,
    enabled_by: Vec<EnabledBy>,
    #[serde(default)]
    pub meta: Option<CaseMeta>,
    ids: IdAllocator,
}

impl TruthGraph {
    pub fn new(case_id: impl Into<String>, seed: u64) -> Self {
        let mut id_rng = CaseRng::new(seed).fork("ids");
        Self {
            case_id: case_id.into(),
            seed,
            people: Vec::new(),
            locations: Vec::new(),
            items: Vec::new(),
            events: Vec::new(),
            located_at: Vec::new(),
            possesses: Vec::new(),
            enabled_by: Vec::new(),
            meta: None,
            ids: IdAllocator::from_rng(&mut id_rng),
        }
    }

    pub fn next_id(&mut self) -> EntityId {
        self.ids.alloc()
    }

    pub fn add_person(&mut self, person: Person) -> Result<EntityId, TruthError> {
        if self.contains(person.id) {
            return Err(TruthError::DuplicateEntity {
                kind: EntityKind::Person,
                id: person.id,
            });
        }
        let id = person.id;
        self.people.push(person);
        Ok(id)
    }

    pub fn add_location(&mut self, location: Location) -> Result<EntityId, TruthError> {
        if self.contains(location.id) {
            return Err(TruthError::DuplicateEntity {
                kind: EntityKind::Location,
                id: location.id,
            });
        }
        let id = location.id;
        self.locations.push(location);
        Ok(id)
    }

    pub fn add_item(&mut self, item: Item) -> Result<EntityId, TruthError> {
        if self.contains(item.id) {
            return Err(TruthError::DuplicateEntity {
                kind: EntityKind::Item,
                id: item.id,
            });
        }
        let id = item.id;
        self.items.push(item);
        Ok(id)
    }

    /// Appends an event. The location and every participant must already be
    /// in the graph.
    pub fn record_event(
        &mut self,
        kind: EventKind,
        timestamp: Tick,
        location_id: EntityId,
        participants: &[EntityId],
        metadata: BTreeMap<String, String>,
    ) -> Result<EntityId, TruthError> {
        self.require_location(location_id)?;
        for person_id in participants {
            self.require_person(*person_id)?;
        }
        let id = self.next_id();
        self.events.push(Event {
            id,
            kind,
            timestamp,
            location_id,
            participants: participants.to_vec(),
            metadata,
        });
        Ok(id)
    }

    pub fn set_location(
        &mut self,
        person_id: EntityId,
        location_id: EntityId,
        entry_time: Tick,
        exit_time: Option<Tick>,
    ) -> Result<(), TruthError> {
        self.require_person(person_id)?;
        self.require_location(location_id)?;
        validate_interval(entry_time, exit_time)?;
        self.located_at.push(LocatedAt {
            person_id,
            location_id,
            entry_time,
            exit_time,
        });
        Ok(())
    }

    pub fn possess(
        &mut self,
        person_id: EntityId,
        item_id: EntityId,
        start_time: Tick,
        end_time: Option<Tick>,
    ) -> Result<(), TruthError> {
        self.require_person(person_id)?;
        self.require_item(item_id)?;
        validate_interval(start_time, end_time)?;
        self.possesses.push(Possesses {
            person_id,
            item_id,
            start_time,
            end_time,
        });
        Ok(())
    }

    pub fn link_causal(
        &mut self,
        event_id: EntityId,
        precondition_id: EntityId,
    ) -> Result<(), TruthError> {
        if self.event(event_id).is_none() {
            return Err(TruthError::UnknownEntity {
                kind: EntityKind::Event,
                id: event_id,
            });
        }
        if !self.contains(precondition_id) {
            return Err(TruthError::UnknownEntity {
                kind: EntityKind::Item,
                id: precondition_id,
            });
        }
        self.enabled_by.push(EnabledBy {
            event_id,
            precondition_id,
        });
        Ok(())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.person(id).is_some()
            || self.location(id).is_some()
            || self.item(id).is_some()
            || self.event(id).is_some()
    }

    pub fn person(&self, id: EntityId) -> Option<&Person> {
        self.people.iter().find(|person| person.id == id)
    }

    pub fn location(&self, id: EntityId) -> Option<&Location> {
        self.locations.iter().find(|location| location.id == id)
    }

    pub fn item(&self, id: EntityId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn event(&self, id: EntityId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Events in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn located_at(&self) -> &[LocatedAt] {
        &self.located_at
    }

    pub fn possesses(&self) -> &[Possesses] {
        &self.possesses
    }

    pub fn enabled_by(&self) -> &[EnabledBy] {
        &self.enabled_by
    }

    pub fn people_with_role(&self, role: RoleTag) -> impl Iterator<Item = &Person> {
        self.people.iter().filter(move |person| person.has_role(role))
    }

    pub fn offender(&self) -> Option<&Person> {
        self.people_with_role(RoleTag::Offender).next()
    }

    pub fn witnesses(&self) -> Vec<&Person> {
        self.people_with_role(RoleTag::Witness).collect()
    }

    /// Earliest event of `kind`; ties keep insertion order.
    pub fn first_event(&self, kind: EventKind) -> Option<&Event> {
        self.events
            .iter()
            .filter(|event| event.kind == kind)
            .min_by_key(|event| event.timestamp)
    }

    pub fn first_kill(&self) -> Option<&Event> {
        self.first_event(EventKind::Kill)
    }

    fn require_person(&self, id: EntityId) -> Result<(), TruthError> {
        match self.person(id) {
            Some(_) => Ok(()),
            None => Err(TruthError::UnknownEntity {
                kind: EntityKind::Person,
                id,
            }),
        }
    }

    fn require_location(&self, id: EntityId) -> Result<(), TruthError> {
        match self.location(id) {
            Some(_) => Ok(()),
            None => Err(TruthError::UnknownEntity {
                kind: EntityKind::Location,
                id,
            }),
        }
    }

    fn require_item(&self, id: EntityId) -> Result<(), TruthError> {
        match self.item(id) {
            Some(_) => Ok(()),
            None => Err(TruthError::UnknownEntity {
                kind: EntityKind::Item,
                id,
            }),
        }
    }
}

fn validate_interval(start: Tick, end: Option<Tick>) -> Result<(), TruthError> {
    match end {
        Some(end) if end < start => Err(TruthError::InvalidInterval { start, end }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::world::ItemCategory;

    fn small_graph() -> (TruthGraph, EntityId, EntityId, EntityId) {
        let mut truth = TruthGraph::new("case_test", 5);
        let scene = truth.next_id();
        truth
            .add_location(Location::new(scene, "Marlowe Diner", "harbor"))
            .unwrap();
        let person = truth.next_id();
        truth
            .add_person(Person::new(person, "Riley Hale", &[RoleTag::Witness]))
            .unwrap();
        let item = truth.next_id();
        truth
            .add_item(Item::new(item, "Kitchen Knife", ItemCategory::Weapon))
            .unwrap();
        (truth, scene, person, item)
    }

    #[test]
    fn record_event_rejects_unknown_participant() {
        let (mut truth, scene, _, _) = small_graph();
        let stranger = EntityId(12345);
        let err = truth
            .record_event(EventKind::Interview, 3, scene, &[stranger], BTreeMap::new())
            .unwrap_err();
        assert_eq!(
            err,
            TruthError::UnknownEntity {
                kind: EntityKind::Person,
                id: stranger
            }
        );
        assert!(truth.events().is_empty());
    }

    #[test]
    fn record_event_rejects_unknown_location() {
        let (mut truth, _, person, _) = small_graph();
        let err = truth
            .record_event(EventKind::Interview, 3, EntityId(9), &[person], BTreeMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            TruthError::UnknownEntity {
                kind: EntityKind::Location,
                ..
            }
        ));
    }

    #[test]
    fn inverted_intervals_are_fatal() {
        let (mut truth, scene, person, item) = small_graph();
        assert_eq!(
            truth.set_location(person, scene, 10, Some(9)),
            Err(TruthError::InvalidInterval { start: 10, end: 9 })
        );
        assert!(truth.possess(person, item, 4, Some(4)).is_ok());
        assert!(truth.set_location(person, scene, 4, None).is_ok());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let (mut truth, scene, _, _) = small_graph();
        let err = truth
            .add_person(Person::new(scene, "Copy", &[]))
            .unwrap_err();
        assert!(matches!(err, TruthError::DuplicateEntity { .. }));
    }

    #[test]
    fn first_kill_uses_earliest_timestamp() {
        let (mut truth, scene, person, item) = small_graph();
        let late = truth
            .record_event(EventKind::Kill, 22, scene, &[person], BTreeMap::new())
            .unwrap();
        let early = truth
            .record_event(EventKind::Kill, 20, scene, &[person], BTreeMap::new())
            .unwrap();
        assert_eq!(truth.first_kill().map(|event| event.id), Some(early));
        truth.link_causal(late, item).unwrap();
        assert_eq!(truth.enabled_by().len(), 1);
        assert!(truth.link_causal(EntityId(77), item).is_err());
    }
}
