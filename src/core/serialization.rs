use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::config::DataError;
use crate::simulation::evidence::Presentation;
use crate::simulation::time::format_hour;
use crate::simulation::truth::TruthGraph;

pub const EXPORT_VERSION: u32 = 1;

/// Full case dump: hidden truth plus the player-facing projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseExport {
    #[serde(default = "default_export_version")]
    pub version: u32,
    pub case_id: String,
    pub seed: u64,
    pub truth: TruthGraph,
    pub presentation: Presentation,
}

fn default_export_version() -> u32 {
    EXPORT_VERSION
}

impl CaseExport {
    pub fn new(truth: &TruthGraph, presentation: &Presentation) -> Self {
        Self {
            version: EXPORT_VERSION,
            case_id: truth.case_id.clone(),
            seed: truth.seed,
            truth: truth.clone(),
            presentation: presentation.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Save an export to a JSON file.
pub fn save_export_to_path<P: AsRef<Path>>(export: &CaseExport, path: P) -> Result<(), DataError> {
    let path = path.as_ref();
    let json = export.to_json().map_err(|source| DataError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load an export from a JSON file.
pub fn load_export_from_path<P: AsRef<Path>>(path: P) -> Result<CaseExport, DataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DataError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Human-readable dump of the hidden truth, for debugging.
pub fn dump_truth(truth: &TruthGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Case: {} (seed {})", truth.case_id, truth.seed);
    if let Some(meta) = &truth.meta {
        let _ = writeln!(out, "Case meta:");
        let _ = writeln!(out, "- competence: {:.2}", meta.competence);
        let _ = writeln!(out, "- risk_tolerance: {:.2}", meta.risk_tolerance);
        let _ = writeln!(out, "- relationship: {}", meta.relationship_distance.as_str());
        let _ = writeln!(out, "- access_path: {}", meta.access_path.as_str());
        let _ = writeln!(out, "- motive: {}", meta.motive.as_str());
        let _ = writeln!(out, "- scene: {} ({})", meta.location_name, meta.district);
        let _ = writeln!(out, "- method: {}", meta.method_category.as_str());
    }

    let _ = writeln!(out, "\nPeople:");
    for person in truth.people() {
        let roles: Vec<&str> = person.roles.iter().map(|role| role.as_str()).collect();
        let traits: Vec<String> = person
            .traits
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        let _ = write!(out, "- {} [{}] ({})", person.name, person.id, roles.join(", "));
        if !traits.is_empty() {
            let _ = write!(out, " traits({})", traits.join(", "));
        }
        out.push('\n');
    }

    let _ = writeln!(out, "\nLocations:");
    for location in truth.locations() {
        let tags: Vec<&str> = location.tags.iter().map(String::as_str).collect();
        let _ = writeln!(
            out,
            "- {} [{}] {} [{}]",
            location.name,
            location.id,
            location.district,
            tags.join(", ")
        );
    }

    let _ = writeln!(out, "\nItems:");
    for item in truth.items() {
        let _ = writeln!(out, "- {} [{}]", item.name, item.id);
    }

    let _ = writeln!(out, "\nEvents:");
    let mut events: Vec<_> = truth.events().iter().collect();
    events.sort_by_key(|event| event.timestamp);
    for event in events {
        let participants: Vec<String> = event.participants.iter().map(|id| id.to_string()).collect();
        let _ = writeln!(
            out,
            "- t{} ({}) {} loc={} participants=[{}]",
            event.timestamp,
            format_hour(event.timestamp),
            event.kind.as_str(),
            event.location_id,
            participants.join(", ")
        );
    }
    out
}
