use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bevy_utils::tracing::info;
use serde::{Deserialize, Serialize};

use crate::components::identity::EntityId;
use crate::components::world::MethodCategory;
use crate::data::config::InvestigationConfig;
use crate::rules::thresholds::evaluate_arrest;
use crate::simulation::evidence::{
    ConfidenceBand, EvidenceClass, EvidenceDetail, EvidenceItem, Presentation,
};
use crate::simulation::investigation::{ClaimTag, DeductionBoard, InvestigationState};
use crate::simulation::time::{format_hour, TimeWindow};
use crate::simulation::truth::TruthGraph;

/// Intersections at most this wide count as a tight timeline.
pub const TIGHT_WINDOW: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrestTier {
    Clean,
    Shaky,
    Failed,
}

impl ArrestTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrestTier::Clean => "clean",
            ArrestTier::Shaky => "shaky",
            ArrestTier::Failed => "failed",
        }
    }
}

impl fmt::Display for ArrestTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Support classes counted toward the tier. CCTV and forensics are both
/// physical; temporal is synthetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportClass {
    Testimonial,
    Physical,
    Temporal,
}

impl SupportClass {
    pub fn of(class: EvidenceClass) -> Self {
        match class {
            EvidenceClass::Testimonial => SupportClass::Testimonial,
            EvidenceClass::Cctv | EvidenceClass::Forensics => SupportClass::Physical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportClass::Testimonial => "testimonial",
            SupportClass::Physical => "physical",
            SupportClass::Temporal => "temporal",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SupportClass::Testimonial => "Testimonial",
            SupportClass::Physical => "Physical",
            SupportClass::Temporal => "Temporal",
        }
    }
}

/// Strongest band seen in a class plus every distinct band seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassProfile {
    pub strongest: ConfidenceBand,
    pub labels: BTreeSet<ConfidenceBand>,
    pub items: usize,
}

impl ClassProfile {
    fn new(confidence: ConfidenceBand) -> Self {
        Self {
            strongest: confidence,
            labels: BTreeSet::from([confidence]),
            items: 1,
        }
    }

    fn observe(&mut self, confidence: ConfidenceBand) {
        self.strongest = self.strongest.max(confidence);
        self.labels.insert(confidence);
        self.items += 1;
    }

    pub fn has_weak(&self) -> bool {
        self.labels.contains(&ConfidenceBand::Weak)
    }

    pub fn is_mixed(&self) -> bool {
        self.labels.len() > 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TemporalStatus {
    /// No witness or CCTV windows in the hypothesis.
    None,
    /// Windows exist but none place the suspect.
    NoLink,
    /// Placing windows do not share a tick.
    Conflict { latest_start: u32, earliest_end: u32 },
    Tight { window: TimeWindow },
    Broad { window: TimeWindow },
}

impl TemporalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalStatus::None => "none",
            TemporalStatus::NoLink => "no_link",
            TemporalStatus::Conflict { .. } => "conflict",
            TemporalStatus::Tight { .. } => "tight",
            TemporalStatus::Broad { .. } => "broad",
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, TemporalStatus::Conflict { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_correct_suspect: bool,
    pub probable_cause: bool,
    pub tier: ArrestTier,
    pub summary: String,
    pub supports: Vec<String>,
    pub missing: Vec<String>,
    pub notes: Vec<String>,
    pub temporal: TemporalStatus,
    pub classes: BTreeMap<SupportClass, ClassProfile>,
}

/// Scores the board's hypothesis against the truth. Total: every input,
/// including no hypothesis at all, produces a tier.
pub fn validate_hypothesis(
    truth: &TruthGraph,
    board: &DeductionBoard,
    presentation: &Presentation,
    state: &InvestigationState,
    config: &InvestigationConfig,
) -> ValidationResult {
    let Some(hypothesis) = board.hypothesis.as_ref() else {
        return ValidationResult {
            is_correct_suspect: false,
            probable_cause: false,
            tier: ArrestTier::Failed,
            summary: "No hypothesis submitted.".to_string(),
            supports: Vec::new(),
            missing: vec!["Submit a hypothesis before arrest.".to_string()],
            notes: Vec::new(),
            temporal: TemporalStatus::None,
            classes: BTreeMap::new(),
        };
    };

    let assessment = evaluate_arrest(state, config);
    let is_correct = truth
        .offender()
        .map(|offender| offender.id == hypothesis.suspect_id)
        .unwrap_or(false);
    let evidence: Vec<&EvidenceItem> = hypothesis
        .evidence_ids
        .iter()
        .filter(|id| state.knows(**id))
        .filter_map(|id| presentation.get(*id))
        .collect();

    let mut classes = class_profiles(&evidence);
    let (temporal, temporal_band) = temporal_status(&evidence, hypothesis.suspect_id);
    if let (TemporalStatus::Tight { .. }, Some(band)) = (temporal, temporal_band) {
        if classes.contains_key(&SupportClass::Physical) {
            classes.insert(SupportClass::Temporal, ClassProfile::new(band));
        }
    }

    let mut supports = Vec::new();
    let mut missing = Vec::new();
    for claim in &hypothesis.claims {
        match claim_line(*claim, &evidence, hypothesis.suspect_id, &temporal) {
            Ok(line) => supports.push(line),
            Err(line) => missing.push(line),
        }
    }

    let mut tier = arrest_tier(is_correct, &classes, &temporal);
    if !assessment.is_probable {
        tier = ArrestTier::Failed;
    }

    let has_testimonial = classes.contains_key(&SupportClass::Testimonial);
    let has_physical = classes.contains_key(&SupportClass::Physical);
    if has_testimonial && !has_physical {
        missing.push("No physical corroboration supports the arrest.".to_string());
    }
    if has_physical && !has_testimonial {
        missing.push("No testimonial evidence anchors the narrative.".to_string());
    }
    if !hypothesis.makes_claim(ClaimTag::Opportunity) {
        match temporal_line(&temporal) {
            Ok(line) => supports.push(line),
            Err(line) => missing.push(line),
        }
    }
    for (class, profile) in &classes {
        if profile.has_weak() {
            missing.push(format!("{} evidence is weak.", class.label()));
        }
        if profile.is_mixed() {
            missing.push(format!("{} evidence is of mixed reliability.", class.label()));
        }
        if profile.items > 1 {
            missing.push(format!(
                "Extra {} evidence adds little; that ground is already covered.",
                class.as_str()
            ));
        }
    }

    let summary = match tier {
        ArrestTier::Clean => "Arrest holds. The case is likely to stick.",
        ArrestTier::Shaky => "Arrest is shaky. The case may not hold.",
        ArrestTier::Failed => "Arrest collapses. The case is not supported.",
    };
    let mut notes = assessment.explanation;
    if !is_correct {
        notes.push("The suspect does not match the case truth.".to_string());
    }

    info!(
        "{}: verdict {} (correct suspect: {}, temporal: {})",
        truth.case_id,
        tier,
        is_correct,
        temporal.as_str()
    );

    ValidationResult {
        is_correct_suspect: is_correct,
        probable_cause: assessment.is_probable,
        tier,
        summary: summary.to_string(),
        supports,
        missing,
        notes,
        temporal,
        classes,
    }
}

/// Partitions evidence into testimonial and physical support classes.
pub fn class_profiles(evidence: &[&EvidenceItem]) -> BTreeMap<SupportClass, ClassProfile> {
    let mut classes: BTreeMap<SupportClass, ClassProfile> = BTreeMap::new();
    for item in evidence {
        classes
            .entry(SupportClass::of(item.class()))
            .and_modify(|profile| profile.observe(item.confidence))
            .or_insert_with(|| ClassProfile::new(item.confidence));
    }
    classes
}

/// Intersects the witness/CCTV windows that place `suspect_id`. The band
/// returned alongside is the weakest band among those windows.
pub fn temporal_status(
    evidence: &[&EvidenceItem],
    suspect_id: EntityId,
) -> (TemporalStatus, Option<ConfidenceBand>) {
    let windowed: Vec<&EvidenceItem> = evidence
        .iter()
        .copied()
        .filter(|item| item.time_window().is_some())
        .collect();
    if windowed.is_empty() {
        return (TemporalStatus::None, None);
    }
    let placing: Vec<TimeWindow> = windowed
        .iter()
        .filter(|item| item.places(suspect_id))
        .filter_map(|item| item.time_window())
        .collect();
    let Some((start, end)) = TimeWindow::intersect_all(&placing) else {
        return (TemporalStatus::NoLink, None);
    };
    let band = placing.iter().map(ConfidenceBand::from_window).min();
    if start > end {
        return (
            TemporalStatus::Conflict {
                latest_start: start,
                earliest_end: end,
            },
            band,
        );
    }
    let window = TimeWindow::new(start, end);
    if window.width() <= TIGHT_WINDOW {
        (TemporalStatus::Tight { window }, band)
    } else {
        (TemporalStatus::Broad { window }, band)
    }
}

/// Tier before the probable-cause gate.
pub fn arrest_tier(
    is_correct: bool,
    classes: &BTreeMap<SupportClass, ClassProfile>,
    temporal: &TemporalStatus,
) -> ArrestTier {
    if !is_correct || classes.is_empty() {
        return ArrestTier::Failed;
    }
    let non_testimonial = classes
        .keys()
        .any(|class| *class != SupportClass::Testimonial);
    let any_weak = classes.values().any(ClassProfile::has_weak);
    let any_mixed = classes.values().any(ClassProfile::is_mixed);
    if classes.len() >= 2 && non_testimonial && !any_weak && !any_mixed && !temporal.is_conflict()
    {
        ArrestTier::Clean
    } else {
        ArrestTier::Shaky
    }
}

fn describe(window: &TimeWindow) -> String {
    if window.width() == 0 {
        format!("around {}", format_hour(window.start))
    } else {
        format!(
            "between {} and {}",
            format_hour(window.start),
            format_hour(window.end)
        )
    }
}

/// `Ok` is a support line, `Err` a missing line.
fn claim_line(
    claim: ClaimTag,
    evidence: &[&EvidenceItem],
    suspect_id: EntityId,
    temporal: &TemporalStatus,
) -> Result<String, String> {
    match claim {
        ClaimTag::Presence => evidence
            .iter()
            .find(|item| item.places(suspect_id))
            .map(|item| match item.class() {
                EvidenceClass::Cctv => "CCTV places the suspect at the scene.".to_string(),
                _ => format!("{} places the suspect at the scene.", item.source),
            })
            .ok_or_else(|| "Nothing you hold places the suspect at the scene.".to_string()),
        ClaimTag::Opportunity => match temporal {
            TemporalStatus::Tight { window } => Ok(format!(
                "Opportunity: the suspect is placed at the scene {}.",
                describe(window)
            )),
            TemporalStatus::Broad { window } => Err(format!(
                "Opportunity: placing the suspect {} is too broad to close the window.",
                describe(window)
            )),
            TemporalStatus::Conflict { .. } => {
                Err("Opportunity: the accounts of when the suspect was there contradict each other.".to_string())
            }
            TemporalStatus::NoLink => {
                Err("Opportunity: no time window ties the suspect to the scene.".to_string())
            }
            TemporalStatus::None => {
                Err("Opportunity: no witness or CCTV timing backs the claim.".to_string())
            }
        },
        ClaimTag::Motive => Err("Motive: nothing in evidence speaks to why.".to_string()),
        ClaimTag::Behavior => evidence
            .iter()
            .find_map(|item| match &item.detail {
                EvidenceDetail::Forensics {
                    method_category, ..
                } if *method_category != MethodCategory::Unknown => Some(*method_category),
                _ => None,
            })
            .map(|method| format!("Behavior: forensics points to a {} method.", method.as_str()))
            .ok_or_else(|| "Behavior: no forensic finding shows how it was done.".to_string()),
    }
}

fn temporal_line(temporal: &TemporalStatus) -> Result<String, String> {
    match temporal {
        TemporalStatus::Tight { window } => {
            Ok(format!("Placement windows agree {}.", describe(window)))
        }
        TemporalStatus::Broad { window } => Err(format!(
            "Placement windows agree only loosely ({}).",
            describe(window)
        )),
        TemporalStatus::Conflict { .. } => {
            Err("Placement windows contradict each other.".to_string())
        }
        TemporalStatus::NoLink => Err("No time window places the suspect.".to_string()),
        TemporalStatus::None => Err("No witness or CCTV timing is in the record.".to_string()),
    }
}
