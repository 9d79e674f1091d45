use std::collections::BTreeMap;

use bevy_utils::tracing::info;

use crate::components::identity::{Person, RoleTag, TraitValue};
use crate::components::world::{
    Item, ItemCategory, Location, MethodCategory, TAG_CCTV, TAG_CRIME_SCENE, TAG_PRIVATE,
    TAG_PUBLIC,
};
use crate::rules::rng::CaseRng;
use crate::simulation::case::{
    AccessPath, CaseBlueprint, CaseFacts, CaseMeta, Motive, RelationshipDistance,
    TRAIT_COMPETENCE, TRAIT_RELATIONSHIP_DISTANCE, TRAIT_RISK_TOLERANCE,
};
use crate::simulation::truth::{EventKind, TruthError, TruthGraph};

const DISTRICTS: [&str; 4] = ["harbor", "midtown", "old_quarter", "riverside"];
const PUBLIC_LOCATIONS: [&str; 3] = ["Marlowe Diner", "Harbor Warehouse", "Crossline Motel"];
const PRIVATE_LOCATIONS: [&str; 2] = ["Riverside Apartment", "Northline Rowhouse"];
const WEAPONS: [&str; 6] = [
    "Kitchen Knife",
    "Box Cutter",
    "Glass Shard",
    "Claw Hammer",
    "Baseball Bat",
    "Rat Poison",
];

/// Offenders at or above this risk tolerance strike in public, on camera.
pub const PUBLIC_RISK_THRESHOLD: f64 = 0.6;

/// Supplies display names. Passed explicitly so name generation never
/// shares state with anything else.
pub trait NameSource {
    fn full_name(&mut self, rng: &mut CaseRng) -> String;
}

/// Fixed first/last name pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticNames;

const FIRST_NAMES: [&str; 6] = ["Alex", "Blake", "Casey", "Drew", "Morgan", "Riley"];
const LAST_NAMES: [&str; 6] = ["Hale", "Iverson", "Kerr", "Lane", "Maddox", "Sloane"];

impl NameSource for StaticNames {
    fn full_name(&mut self, rng: &mut CaseRng) -> String {
        let first = rng.choose(&FIRST_NAMES).copied().unwrap_or("Alex");
        let last = rng.choose(&LAST_NAMES).copied().unwrap_or("Hale");
        format!("{} {}", first, last)
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedCase {
    pub truth: TruthGraph,
    pub facts: CaseFacts,
}

/// Builds the ground truth of one homicide: scene, victim, offender,
/// witness, weapon, then approach/kill/discovery and the causal weapon
/// link. Names come from `rng.fork("names")`; everything else from `rng`.
pub fn generate_case(
    rng: &mut CaseRng,
    names: &mut dyn NameSource,
    blueprint: CaseBlueprint,
) -> Result<GeneratedCase, TruthError> {
    let case_id = format!("case_{}", rng.seed());
    let mut truth = TruthGraph::new(case_id.clone(), rng.seed());
    let mut name_rng = rng.fork("names");

    let competence = blueprint.competence.unwrap_or_else(|| round2(rng.next_f64()));
    let risk_tolerance = blueprint
        .risk_tolerance
        .unwrap_or_else(|| round2(rng.next_f64()));
    let relationship = match blueprint.relationship {
        Some(relationship) => relationship,
        None => *rng
            .choose(&RelationshipDistance::ALL)
            .unwrap_or(&RelationshipDistance::Stranger),
    };

    let (pool, tags): (&[&str], &[&str]) = if risk_tolerance >= PUBLIC_RISK_THRESHOLD {
        (&PUBLIC_LOCATIONS, &[TAG_CRIME_SCENE, TAG_CCTV, TAG_PUBLIC])
    } else {
        (&PRIVATE_LOCATIONS, &[TAG_CRIME_SCENE, TAG_PRIVATE])
    };
    let location_name = rng.choose(pool).copied().unwrap_or("Marlowe Diner");
    let district = rng.choose(&DISTRICTS).copied().unwrap_or("harbor");
    let scene_id = truth.next_id();
    truth.add_location(Location::new(scene_id, location_name, district).with_tags(tags))?;

    let victim_id = truth.next_id();
    truth.add_person(Person::new(
        victim_id,
        names.full_name(&mut name_rng),
        &[RoleTag::Victim],
    ))?;
    let offender_id = truth.next_id();
    truth.add_person(
        Person::new(
            offender_id,
            names.full_name(&mut name_rng),
            &[RoleTag::Suspect, RoleTag::Offender],
        )
        .with_trait(TRAIT_COMPETENCE, TraitValue::Number(competence))
        .with_trait(TRAIT_RISK_TOLERANCE, TraitValue::Number(risk_tolerance))
        .with_trait(
            TRAIT_RELATIONSHIP_DISTANCE,
            TraitValue::Text(relationship.as_str().to_string()),
        ),
    )?;
    let witness_id = truth.next_id();
    truth.add_person(Person::new(
        witness_id,
        names.full_name(&mut name_rng),
        &[RoleTag::Witness],
    ))?;

    let weapon_name = rng.choose(&WEAPONS).copied().unwrap_or("Kitchen Knife");
    let method_category = MethodCategory::from_weapon_name(weapon_name);
    let weapon_id = truth.next_id();
    truth.add_item(Item::new(weapon_id, weapon_name, ItemCategory::Weapon))?;

    let crime_time = rng.range_inclusive(20, 22) as u32;
    let approach_time = crime_time - 1;
    let discovery_time = crime_time + 2;

    truth.set_location(victim_id, scene_id, crime_time - 1, Some(crime_time + 1))?;
    truth.set_location(offender_id, scene_id, crime_time - 1, Some(crime_time + 1))?;
    truth.set_location(witness_id, scene_id, crime_time - 2, Some(crime_time))?;
    truth.possess(offender_id, weapon_id, crime_time - 2, Some(crime_time))?;

    let (access_path, motive) = draw_access_and_motive(rng, relationship);

    let approach_meta = metadata(&[
        ("method", weapon_name),
        ("method_category", method_category.as_str()),
        ("access_path", access_path.as_str()),
    ]);
    truth.record_event(
        EventKind::Approach,
        approach_time,
        scene_id,
        &[offender_id, victim_id],
        approach_meta,
    )?;
    let weapon_ref = weapon_id.to_string();
    let kill_meta = metadata(&[
        ("method", weapon_name),
        ("method_category", method_category.as_str()),
        ("weapon_id", weapon_ref.as_str()),
        ("motive_category", motive.as_str()),
    ]);
    let kill_id = truth.record_event(
        EventKind::Kill,
        crime_time,
        scene_id,
        &[offender_id, victim_id],
        kill_meta,
    )?;
    let victim_ref = victim_id.to_string();
    truth.record_event(
        EventKind::Discovery,
        discovery_time,
        scene_id,
        &[witness_id],
        metadata(&[("found_victim_id", victim_ref.as_str())]),
    )?;
    truth.link_causal(kill_id, weapon_id)?;

    truth.meta = Some(CaseMeta {
        competence,
        risk_tolerance,
        relationship_distance: relationship,
        access_path,
        motive,
        location_name: location_name.to_string(),
        district: district.to_string(),
        method_category,
    });

    info!(
        "generated {}: {} at {} ({}), kill at {}",
        case_id,
        weapon_name,
        location_name,
        relationship.as_str(),
        crime_time
    );

    let facts = CaseFacts {
        case_id,
        crime_time,
        crime_scene_id: scene_id,
        victim_id,
        offender_id,
        witness_id,
        weapon_id,
    };
    Ok(GeneratedCase { truth, facts })
}

/// Relationship pins the plausible motives and how the offender got in.
fn draw_access_and_motive(
    rng: &mut CaseRng,
    relationship: RelationshipDistance,
) -> (AccessPath, Motive) {
    let access = *rng.choose(&AccessPath::ALL).unwrap_or(&AccessPath::SocialEntry);
    let motive = *rng.choose(&Motive::ALL).unwrap_or(&Motive::Money);
    match relationship {
        RelationshipDistance::Intimate => {
            let close = [Motive::Revenge, Motive::Obsession, Motive::Concealment];
            let motive = *rng.choose(&close).unwrap_or(&Motive::Revenge);
            (AccessPath::TrustedContact, motive)
        }
        RelationshipDistance::Stranger => {
            let distant = [Motive::Thrill, Motive::Money];
            let motive = *rng.choose(&distant).unwrap_or(&Motive::Thrill);
            (AccessPath::ForcedEntry, motive)
        }
        RelationshipDistance::Acquaintance => (access, motive),
    }
}

fn metadata(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
