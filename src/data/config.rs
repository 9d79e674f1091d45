use std::fmt;
use std::fs;
use std::path::Path;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::rules::cost::CostTable;
use crate::simulation::evidence::EvidenceClass;

pub const TIME_LIMIT: u32 = 8;
pub const PRESSURE_LIMIT: u32 = 6;
pub const TRUST_LIMIT: u32 = 6;
pub const MIN_EVIDENCE_FOR_ARREST: usize = 2;

/// Ticks after case start before each lead goes cold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadDeadlines {
    pub testimonial: u32,
    pub cctv: u32,
    pub forensics: u32,
}

impl Default for LeadDeadlines {
    fn default() -> Self {
        Self {
            testimonial: 2,
            cctv: 3,
            forensics: 4,
        }
    }
}

impl LeadDeadlines {
    pub fn for_class(&self, class: EvidenceClass) -> u32 {
        match class {
            EvidenceClass::Testimonial => self.testimonial,
            EvidenceClass::Cctv => self.cctv,
            EvidenceClass::Forensics => self.forensics,
        }
    }
}

/// Budget limits, lead clocks and the action cost table for a session.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigationConfig {
    pub time_limit: u32,
    pub pressure_limit: u32,
    pub trust_limit: u32,
    pub min_evidence: usize,
    pub lead_deadlines: LeadDeadlines,
    pub costs: CostTable,
}

impl Default for InvestigationConfig {
    fn default() -> Self {
        Self {
            time_limit: TIME_LIMIT,
            pressure_limit: PRESSURE_LIMIT,
            trust_limit: TRUST_LIMIT,
            min_evidence: MIN_EVIDENCE_FOR_ARREST,
            lead_deadlines: LeadDeadlines::default(),
            costs: CostTable::default(),
        }
    }
}

#[derive(Debug)]
pub enum DataError {
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Io { path, source } => write!(f, "i/o error on {}: {}", path, source),
            DataError::Json { path, source } => write!(f, "failed to parse {}: {}", path, source),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Io { source, .. } => Some(source),
            DataError::Json { source, .. } => Some(source),
        }
    }
}

pub fn load_investigation_config(path: impl AsRef<Path>) -> Result<InvestigationConfig, DataError> {
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
