use std::fmt;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::identity::EntityId;
use crate::components::world::MethodCategory;
use crate::simulation::time::{Tick, TimeWindow};

pub const FADED_STATEMENT: &str =
    "I remember someone near the scene, but the details are gone now.";
pub const PARTIAL_CCTV_SUMMARY: &str = "CCTV report (partial)";
pub const INCONCLUSIVE_FORENSICS_SUMMARY: &str = "Forensics result (inconclusive)";
pub const INCONCLUSIVE_FINDING: &str = "The lab could not reach a firm conclusion.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceClass {
    Testimonial,
    Cctv,
    Forensics,
}

impl EvidenceClass {
    pub const ALL: [EvidenceClass; 3] = [
        EvidenceClass::Testimonial,
        EvidenceClass::Cctv,
        EvidenceClass::Forensics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceClass::Testimonial => "testimonial",
            EvidenceClass::Cctv => "cctv",
            EvidenceClass::Forensics => "forensics",
        }
    }
}

impl fmt::Display for EvidenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered weak < medium < strong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    Weak,
    Medium,
    Strong,
}

impl ConfidenceBand {
    /// Width ≤ 1 is strong, ≤ 3 medium, anything wider weak.
    pub fn from_window(window: &TimeWindow) -> Self {
        match window.width() {
            0..=1 => ConfidenceBand::Strong,
            2..=3 => ConfidenceBand::Medium,
            _ => ConfidenceBand::Weak,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::Weak => "weak",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Strong => "strong",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Class-specific payload. Serialized inline with a `class` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum EvidenceDetail {
    Testimonial {
        witness_id: EntityId,
        statement: String,
        reported_window: TimeWindow,
        location_id: EntityId,
        observed_person_ids: Vec<EntityId>,
    },
    Cctv {
        location_id: EntityId,
        time_window: TimeWindow,
        observed_person_ids: Vec<EntityId>,
    },
    Forensics {
        item_id: EntityId,
        finding: String,
        method: String,
        method_category: MethodCategory,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: EntityId,
    pub summary: String,
    pub source: String,
    pub time_collected: Tick,
    pub confidence: ConfidenceBand,
    #[serde(flatten)]
    pub detail: EvidenceDetail,
}

impl EvidenceItem {
    pub fn class(&self) -> EvidenceClass {
        match self.detail {
            EvidenceDetail::Testimonial { .. } => EvidenceClass::Testimonial,
            EvidenceDetail::Cctv { .. } => EvidenceClass::Cctv,
            EvidenceDetail::Forensics { .. } => EvidenceClass::Forensics,
        }
    }

    /// Reported/recorded window for testimonial and CCTV items.
    pub fn time_window(&self) -> Option<TimeWindow> {
        match &self.detail {
            EvidenceDetail::Testimonial {
                reported_window, ..
            } => Some(*reported_window),
            EvidenceDetail::Cctv { time_window, .. } => Some(*time_window),
            EvidenceDetail::Forensics { .. } => None,
        }
    }

    pub fn observed_person_ids(&self) -> &[EntityId] {
        match &self.detail {
            EvidenceDetail::Testimonial {
                observed_person_ids,
                ..
            }
            | EvidenceDetail::Cctv {
                observed_person_ids,
                ..
            } => observed_person_ids,
            EvidenceDetail::Forensics { .. } => &[],
        }
    }

    pub fn places(&self, person_id: EntityId) -> bool {
        self.observed_person_ids().contains(&person_id)
    }

    /// Late-lead version of this item: weak confidence, identifying detail
    /// stripped. Applying it to an already degraded item changes nothing.
    pub fn degraded(&self) -> EvidenceItem {
        let mut item = self.clone();
        item.confidence = ConfidenceBand::Weak;
        match &mut item.detail {
            EvidenceDetail::Testimonial {
                statement,
                observed_person_ids,
                ..
            } => {
                observed_person_ids.clear();
                *statement = FADED_STATEMENT.to_string();
            }
            EvidenceDetail::Cctv {
                observed_person_ids,
                ..
            } => {
                observed_person_ids.clear();
                item.summary = PARTIAL_CCTV_SUMMARY.to_string();
            }
            EvidenceDetail::Forensics {
                finding,
                method_category,
                ..
            } => {
                *finding = INCONCLUSIVE_FINDING.to_string();
                *method_category = MethodCategory::Unknown;
                item.summary = INCONCLUSIVE_FORENSICS_SUMMARY.to_string();
            }
        }
        item
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded() == *self
    }
}

/// Pre-decay version of an item, kept so the presentation stays auditable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRevision {
    pub revised_at: Tick,
    pub previous: EvidenceItem,
}

/// Player-visible projection of a case: evidence in projection order.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub case_id: String,
    pub seed: u64,
    pub evidence: Vec<EvidenceItem>,
    #[serde(default)]
    pub history: Vec<EvidenceRevision>,
}

impl Presentation {
    pub fn new(case_id: impl Into<String>, seed: u64) -> Self {
        Self {
            case_id: case_id.into(),
            seed,
            evidence: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&EvidenceItem> {
        self.evidence.iter().find(|item| item.id == id)
    }

    pub fn of_class(&self, class: EvidenceClass) -> impl Iterator<Item = &EvidenceItem> {
        self.evidence.iter().filter(move |item| item.class() == class)
    }

    pub fn has_class(&self, class: EvidenceClass) -> bool {
        self.of_class(class).next().is_some()
    }

    /// Swaps in the degraded version of `id`. Returns `false` if the item is
    /// unknown or already degraded, in which case nothing is recorded.
    pub fn degrade(&mut self, id: EntityId, at: Tick) -> bool {
        let Some(slot) = self.evidence.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        let degraded = slot.degraded();
        if degraded == *slot {
            return false;
        }
        let previous = std::mem::replace(slot, degraded);
        self.history.push(EvidenceRevision {
            revised_at: at,
            previous,
        });
        true
    }
}
