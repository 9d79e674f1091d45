use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::components::identity::EntityId;

pub const TAG_CCTV: &str = "cctv";
pub const TAG_CRIME_SCENE: &str = "crime_scene";
pub const TAG_PUBLIC: &str = "public";
pub const TAG_PRIVATE: &str = "private";

/// A place in the city. Tags drive projection (e.g. `cctv` coverage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: EntityId,
    pub name: String,
    pub district: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Location {
    pub fn new(id: EntityId, name: impl Into<String>, district: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            district: district.into(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|tag| tag.to_string()));
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_cctv(&self) -> bool {
        self.has_tag(TAG_CCTV)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Weapon,
    Document,
    Personal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    pub name: String,
    pub category: ItemCategory,
}

impl Item {
    pub fn new(id: EntityId, name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id,
            name: name.into(),
            category,
        }
    }
}

/// How the killing was done, read off a weapon's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodCategory {
    Sharp,
    Blunt,
    Poison,
    Unknown,
}

impl MethodCategory {
    pub fn from_weapon_name(name: &str) -> Self {
        let lowered = name.to_lowercase();
        if lowered.contains("poison") {
            return MethodCategory::Poison;
        }
        if ["blunt", "bat", "hammer"]
            .iter()
            .any(|keyword| lowered.contains(keyword))
        {
            return MethodCategory::Blunt;
        }
        MethodCategory::Sharp
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MethodCategory::Sharp => "sharp",
            MethodCategory::Blunt => "blunt",
            MethodCategory::Poison => "poison",
            MethodCategory::Unknown => "unknown",
        }
    }
}

/// "Marlowe Diner" -> "the Marlowe Diner"; leaves existing articles alone.
pub fn place_with_article(place: &str) -> String {
    let trimmed = place.trim();
    let lowered = trimmed.to_lowercase();
    if ["the ", "a ", "an "]
        .iter()
        .any(|article| lowered.starts_with(article))
    {
        return trimmed.to_string();
    }
    format!("the {}", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_category_keywords() {
        assert_eq!(MethodCategory::from_weapon_name("Rat Poison"), MethodCategory::Poison);
        assert_eq!(MethodCategory::from_weapon_name("Claw Hammer"), MethodCategory::Blunt);
        assert_eq!(MethodCategory::from_weapon_name("Baseball Bat"), MethodCategory::Blunt);
        assert_eq!(MethodCategory::from_weapon_name("Kitchen Knife"), MethodCategory::Sharp);
    }

    #[test]
    fn articles_are_added_once() {
        assert_eq!(place_with_article("Marlowe Diner"), "the Marlowe Diner");
        assert_eq!(place_with_article("The Crossline Motel"), "The Crossline Motel");
    }

    #[test]
    fn cctv_tag_detection() {
        let location = Location::new(EntityId(4), "Harbor Warehouse", "harbor")
            .with_tags(&[TAG_CRIME_SCENE, TAG_CCTV]);
        assert!(location.has_cctv());
        assert!(!location.has_tag(TAG_PRIVATE));
    }
}
