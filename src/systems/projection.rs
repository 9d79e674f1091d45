use bevy_utils::tracing::{debug, info};

use crate::components::identity::{IdAllocator, Person};
use crate::components::world::{place_with_article, ItemCategory, MethodCategory};
use crate::rules::rng::CaseRng;
use crate::simulation::case::{
    RelationshipDistance, TRAIT_COMPETENCE, TRAIT_RELATIONSHIP_DISTANCE, TRAIT_RISK_TOLERANCE,
};
use crate::simulation::evidence::{
    ConfidenceBand, EvidenceDetail, EvidenceItem, Presentation, PARTIAL_CCTV_SUMMARY,
};
use crate::simulation::time::{Tick, TimeWindow};
use crate::simulation::truth::{Event, TruthGraph};

pub const CCTV_SOURCE: &str = "Traffic Control";
pub const FORENSICS_SOURCE: &str = "Forensics Lab";

const DEFAULT_TRAIT: f64 = 0.5;
const BASE_SEE_CHANCE: f64 = 0.5;

/// Chance a retained CCTV branch is dropped. Bold offenders are filmed more
/// reliably.
pub fn cctv_omit_chance(risk_tolerance: f64) -> f64 {
    (0.6 - risk_tolerance * 0.4).clamp(0.1, 0.7)
}

/// Chance the weapon yields no usable trace. Competent offenders clean up.
pub fn forensics_omit_chance(competence: f64) -> f64 {
    (0.1 + competence * 0.6).clamp(0.1, 0.8)
}

/// Chance a witness names the offender outright.
pub fn see_chance(relationship: RelationshipDistance, risk_tolerance: f64, cctv: bool) -> f64 {
    let mut chance = BASE_SEE_CHANCE;
    if relationship != RelationshipDistance::Stranger {
        chance += 0.1;
    }
    if risk_tolerance >= 0.6 {
        chance += 0.1;
    }
    if cctv {
        chance -= 0.1;
    }
    chance.clamp(0.1, 0.85)
}

/// Half-Gaussian time fuzz around `tick`.
pub fn fuzz_time(tick: Tick, sigma: f64, rng: &mut CaseRng) -> TimeWindow {
    let spread = rng.gaussian(0.0, sigma).abs().floor() as Tick;
    TimeWindow::around(tick, spread)
}

/// Derives the player-visible evidence for the first kill in `truth`.
///
/// Witness noise draws from per-witness forks (`witness:<id>`), evidence ids
/// from an `evidence-ids` fork, and the CCTV/forensics omission rolls from
/// `rng` itself, in that order. The truth graph is only read.
pub fn project_case(truth: &TruthGraph, rng: &mut CaseRng) -> Presentation {
    let mut presentation = Presentation::new(truth.case_id.clone(), truth.seed);
    let Some(kill) = truth.first_kill() else {
        debug!("{}: no kill event, empty presentation", truth.case_id);
        return presentation;
    };
    let mut ids = IdAllocator::from_rng(&mut rng.fork("evidence-ids"));

    let scene = truth.location(kill.location_id);
    let cctv_available = scene.map(|location| location.has_cctv()).unwrap_or(false);
    let place = place_with_article(scene.map(|location| location.name.as_str()).unwrap_or("building"));

    let offender = truth.offender();
    let competence = trait_or_default(offender, TRAIT_COMPETENCE);
    let risk_tolerance = trait_or_default(offender, TRAIT_RISK_TOLERANCE);
    let relationship = offender
        .and_then(|person| person.text_trait(TRAIT_RELATIONSHIP_DISTANCE))
        .map(|value| RelationshipDistance::parse(&value))
        .unwrap_or(RelationshipDistance::Stranger);

    for witness in truth.witnesses() {
        let mut witness_rng = rng.fork(&format!("witness:{}", witness.id));
        let window = fuzz_time(kill.timestamp, relationship.memory_sigma(), &mut witness_rng);
        let confidence = ConfidenceBand::from_window(&window);
        let mut observed = Vec::new();
        if let Some(offender) = offender {
            if witness_rng.chance(see_chance(relationship, risk_tolerance, cctv_available)) {
                observed.push(offender.id);
            }
        }
        let hedged = confidence == ConfidenceBand::Weak;
        let statement = match offender.filter(|_| !observed.is_empty()) {
            Some(offender) => format!(
                "{} {} outside {}.",
                if hedged { "I think I saw" } else { "I saw" },
                offender.name,
                place
            ),
            None => format!(
                "{} a struggle near {}.",
                if hedged { "I think I heard" } else { "I heard" },
                place
            ),
        };
        debug!(
            "{}: witness {} window {}-{} ({}), names offender: {}",
            truth.case_id,
            witness.id,
            window.start,
            window.end,
            confidence,
            !observed.is_empty()
        );
        presentation.evidence.push(EvidenceItem {
            id: ids.alloc(),
            summary: "Witness statement".to_string(),
            source: witness.name.clone(),
            time_collected: kill.timestamp + 1,
            confidence,
            detail: EvidenceDetail::Testimonial {
                witness_id: witness.id,
                statement,
                reported_window: window,
                location_id: kill.location_id,
                observed_person_ids: observed,
            },
        });
    }

    let mut cctv_added = false;
    if cctv_available {
        if rng.chance(cctv_omit_chance(risk_tolerance)) {
            debug!("{}: cctv omitted", truth.case_id);
        } else {
            presentation.evidence.push(cctv_report(&mut ids, kill));
            cctv_added = true;
        }
    }

    let weapons: Vec<_> = truth
        .items()
        .iter()
        .filter(|item| item.category == ItemCategory::Weapon)
        .collect();
    let mut forensics_added = false;
    for weapon in &weapons {
        if rng.chance(forensics_omit_chance(competence)) {
            debug!("{}: forensics on {} omitted", truth.case_id, weapon.name);
            continue;
        }
        presentation.evidence.push(EvidenceItem {
            id: ids.alloc(),
            summary: "Forensics result".to_string(),
            source: FORENSICS_SOURCE.to_string(),
            time_collected: kill.timestamp + 2,
            confidence: ConfidenceBand::Medium,
            detail: EvidenceDetail::Forensics {
                item_id: weapon.id,
                finding: format!("Trace evidence consistent with {}.", weapon.name),
                method: "trace".to_string(),
                method_category: MethodCategory::from_weapon_name(&weapon.name),
            },
        });
        forensics_added = true;
        break;
    }

    if !cctv_added && !forensics_added {
        if cctv_available {
            info!("{}: physical evidence omitted, adding partial cctv", truth.case_id);
            presentation.evidence.push(partial_cctv_report(&mut ids, kill));
        } else if let Some(weapon) = weapons.first() {
            info!("{}: physical evidence omitted, adding partial forensics", truth.case_id);
            presentation.evidence.push(EvidenceItem {
                id: ids.alloc(),
                summary: "Forensics result (partial)".to_string(),
                source: FORENSICS_SOURCE.to_string(),
                time_collected: kill.timestamp + 2,
                confidence: ConfidenceBand::Weak,
                detail: EvidenceDetail::Forensics {
                    item_id: weapon.id,
                    finding: "Partial trace evidence; the instrument cannot be identified."
                        .to_string(),
                    method: "trace".to_string(),
                    method_category: MethodCategory::Unknown,
                },
            });
        }
    }

    presentation
}

fn trait_or_default(person: Option<&Person>, key: &str) -> f64 {
    person
        .map(|person| person.number_trait(key, DEFAULT_TRAIT))
        .unwrap_or(DEFAULT_TRAIT)
}

/// Footage of the hour leading up to the kill; everyone in the kill event
/// is on camera.
fn cctv_report(ids: &mut IdAllocator, kill: &Event) -> EvidenceItem {
    let window = TimeWindow::new(kill.timestamp.saturating_sub(1), kill.timestamp);
    EvidenceItem {
        id: ids.alloc(),
        summary: "CCTV report".to_string(),
        source: CCTV_SOURCE.to_string(),
        time_collected: kill.timestamp + 1,
        confidence: ConfidenceBand::from_window(&window),
        detail: EvidenceDetail::Cctv {
            location_id: kill.location_id,
            time_window: window,
            observed_person_ids: kill.participants.clone(),
        },
    }
}

fn partial_cctv_report(ids: &mut IdAllocator, kill: &Event) -> EvidenceItem {
    let window = TimeWindow::around(kill.timestamp, 2);
    EvidenceItem {
        id: ids.alloc(),
        summary: PARTIAL_CCTV_SUMMARY.to_string(),
        source: CCTV_SOURCE.to_string(),
        time_collected: kill.timestamp + 1,
        confidence: ConfidenceBand::from_window(&window),
        detail: EvidenceDetail::Cctv {
            location_id: kill.location_id,
            time_window: window,
            observed_person_ids: Vec::new(),
        },
    }
}
