use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rules::rng::{golden_step, mix64, CaseRng};

/// Opaque identifier for anything stored in a case (people, places, items,
/// events, evidence). Never reused across cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Per-case id source. Ids are a bijective mix of a seeded base and a
/// counter, so they are unique within the case and reproducible per seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    base: u64,
    next: u64,
}

impl IdAllocator {
    pub fn from_rng(rng: &mut CaseRng) -> Self {
        Self {
            base: rng.next_u64(),
            next: 0,
        }
    }

    pub fn alloc(&mut self) -> EntityId {
        let id = EntityId(mix64(self.base.wrapping_add(golden_step(self.next))));
        self.next += 1;
        id
    }

    pub fn allocated(&self) -> u64 {
        self.next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTag {
    Victim,
    Suspect,
    Witness,
    Offender,
}

impl RoleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTag::Victim => "victim",
            RoleTag::Suspect => "suspect",
            RoleTag::Witness => "witness",
            RoleTag::Offender => "offender",
        }
    }
}

/// Free-form trait value on a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitValue {
    Number(f64),
    Text(String),
}

impl TraitValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TraitValue::Number(value) => Some(*value),
            TraitValue::Text(text) => text.parse().ok(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            TraitValue::Number(value) => value.to_string(),
            TraitValue::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for TraitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: EntityId,
    pub name: String,
    pub roles: BTreeSet<RoleTag>,
    #[serde(default)]
    pub traits: BTreeMap<String, TraitValue>,
}

impl Person {
    pub fn new(id: EntityId, name: impl Into<String>, roles: &[RoleTag]) -> Self {
        Self {
            id,
            name: name.into(),
            roles: roles.iter().copied().collect(),
            traits: BTreeMap::new(),
        }
    }

    pub fn with_trait(mut self, key: &str, value: TraitValue) -> Self {
        self.traits.insert(key.to_string(), value);
        self
    }

    pub fn has_role(&self, role: RoleTag) -> bool {
        self.roles.contains(&role)
    }

    pub fn number_trait(&self, key: &str, default: f64) -> f64 {
        self.traits
            .get(key)
            .and_then(TraitValue::as_number)
            .unwrap_or(default)
    }

    pub fn text_trait(&self, key: &str) -> Option<String> {
        self.traits.get(key).map(TraitValue::as_text)
    }
}
