use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::identity::EntityId;
use crate::components::world::MethodCategory;
use crate::simulation::time::Tick;

pub const TRAIT_COMPETENCE: &str = "competence";
pub const TRAIT_RISK_TOLERANCE: &str = "risk_tolerance";
pub const TRAIT_RELATIONSHIP_DISTANCE: &str = "relationship_distance";

/// How close the offender was to the victim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipDistance {
    Intimate,
    Acquaintance,
    Stranger,
}

impl RelationshipDistance {
    pub const ALL: [RelationshipDistance; 3] = [
        RelationshipDistance::Intimate,
        RelationshipDistance::Acquaintance,
        RelationshipDistance::Stranger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipDistance::Intimate => "intimate",
            RelationshipDistance::Acquaintance => "acquaintance",
            RelationshipDistance::Stranger => "stranger",
        }
    }

    /// Unknown labels read as `Stranger`.
    pub fn parse(value: &str) -> Self {
        match value {
            "intimate" => RelationshipDistance::Intimate,
            "acquaintance" => RelationshipDistance::Acquaintance,
            _ => RelationshipDistance::Stranger,
        }
    }

    /// Spread of a witness's time estimate. Closer relationships make for
    /// murkier recollection of when things happened.
    pub fn memory_sigma(&self) -> f64 {
        match self {
            RelationshipDistance::Intimate => 3.0,
            RelationshipDistance::Acquaintance => 2.0,
            RelationshipDistance::Stranger => 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPath {
    ForcedEntry,
    SocialEntry,
    TrustedContact,
}

impl AccessPath {
    pub const ALL: [AccessPath; 3] = [
        AccessPath::ForcedEntry,
        AccessPath::SocialEntry,
        AccessPath::TrustedContact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessPath::ForcedEntry => "forced_entry",
            AccessPath::SocialEntry => "social_entry",
            AccessPath::TrustedContact => "trusted_contact",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motive {
    Money,
    Revenge,
    Obsession,
    Concealment,
    Thrill,
}

impl Motive {
    pub const ALL: [Motive; 5] = [
        Motive::Money,
        Motive::Revenge,
        Motive::Obsession,
        Motive::Concealment,
        Motive::Thrill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Motive::Money => "money",
            Motive::Revenge => "revenge",
            Motive::Obsession => "obsession",
            Motive::Concealment => "concealment",
            Motive::Thrill => "thrill",
        }
    }
}

/// Hidden modulators recorded by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseMeta {
    pub competence: f64,
    pub risk_tolerance: f64,
    pub relationship_distance: RelationshipDistance,
    pub access_path: AccessPath,
    pub motive: Motive,
    pub location_name: String,
    pub district: String,
    pub method_category: MethodCategory,
}

/// Ids and times front ends need to seed their first actions.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFacts {
    pub case_id: String,
    pub crime_time: Tick,
    pub crime_scene_id: EntityId,
    pub victim_id: EntityId,
    pub offender_id: EntityId,
    pub witness_id: EntityId,
    pub weapon_id: EntityId,
}

/// Optional overrides for the offender profile. Unset fields are rolled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseBlueprint {
    #[serde(default)]
    pub competence: Option<f64>,
    #[serde(default)]
    pub risk_tolerance: Option<f64>,
    #[serde(default)]
    pub relationship: Option<RelationshipDistance>,
}

impl CaseBlueprint {
    pub fn with_competence(mut self, value: f64) -> Self {
        self.competence = Some(value.clamp(0.0, 1.0));
        self
    }

    pub fn with_risk_tolerance(mut self, value: f64) -> Self {
        self.risk_tolerance = Some(value.clamp(0.0, 1.0));
        self
    }

    pub fn with_relationship(mut self, value: RelationshipDistance) -> Self {
        self.relationship = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_labels_round_trip() {
        for distance in RelationshipDistance::ALL {
            assert_eq!(RelationshipDistance::parse(distance.as_str()), distance);
        }
        assert_eq!(RelationshipDistance::parse("cousin"), RelationshipDistance::Stranger);
    }

    #[test]
    fn closer_relationships_blur_memory() {
        assert!(
            RelationshipDistance::Intimate.memory_sigma()
                > RelationshipDistance::Stranger.memory_sigma()
        );
    }

    #[test]
    fn blueprint_clamps_inputs() {
        let blueprint = CaseBlueprint::default()
            .with_competence(1.4)
            .with_risk_tolerance(-0.2);
        assert_eq!(blueprint.competence, Some(1.0));
        assert_eq!(blueprint.risk_tolerance, Some(0.0));
    }
}
