use serde::{Deserialize, Serialize};

use crate::components::identity::EntityId;
use crate::data::config::LeadDeadlines;
use crate::simulation::evidence::{EvidenceClass, Presentation};
use crate::simulation::time::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Active,
    Expired,
    Resolved,
}

/// Time-boxed chance to collect one evidence class at full quality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub class: EvidenceClass,
    pub label: String,
    pub action_hint: String,
    pub deadline: Tick,
    pub status: LeadStatus,
}

impl Lead {
    fn new(class: EvidenceClass, deadline: Tick) -> Self {
        let (label, action_hint) = match class {
            EvidenceClass::Testimonial => ("Witness lead", "Interview witness"),
            EvidenceClass::Cctv => ("CCTV lead", "Request CCTV"),
            EvidenceClass::Forensics => ("Forensics lead", "Submit forensics"),
        };
        Self {
            class,
            label: label.to_string(),
            action_hint: action_hint.to_string(),
            deadline,
            status: LeadStatus::Active,
        }
    }
}

/// What happened to a class's lead when that class was revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadReveal {
    pub degraded: Vec<EntityId>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadBoard {
    pub leads: Vec<Lead>,
}

impl LeadBoard {
    /// One active lead per evidence class present in the presentation.
    pub fn build(presentation: &Presentation, start_time: Tick, deadlines: &LeadDeadlines) -> Self {
        let leads = EvidenceClass::ALL
            .iter()
            .filter(|class| presentation.has_class(**class))
            .map(|class| Lead::new(*class, start_time + deadlines.for_class(*class)))
            .collect();
        Self { leads }
    }

    pub fn lead(&self, class: EvidenceClass) -> Option<&Lead> {
        self.leads.iter().find(|lead| lead.class == class)
    }

    fn lead_mut(&mut self, class: EvidenceClass) -> Option<&mut Lead> {
        self.leads.iter_mut().find(|lead| lead.class == class)
    }

    /// Moves active leads past their deadline to expired.
    pub fn update_statuses(&mut self, now: Tick) -> Vec<String> {
        let mut notes = Vec::new();
        for lead in self.leads.iter_mut() {
            if lead.status == LeadStatus::Active && now >= lead.deadline {
                lead.status = LeadStatus::Expired;
                notes.push(format!("Lead went cold: {}.", lead.label));
            }
        }
        notes
    }

    /// Shifts an active lead's deadline by `delta`. The deadline never lands
    /// before `now`; a lead pulled down to `now` expires immediately.
    pub fn shift_deadline(&mut self, class: EvidenceClass, delta: i64, now: Tick) -> Option<&Lead> {
        let lead = self.lead_mut(class)?;
        if lead.status != LeadStatus::Active {
            return None;
        }
        let shifted = (lead.deadline as i64 + delta).max(now as i64);
        lead.deadline = shifted.min(Tick::MAX as i64) as Tick;
        if now >= lead.deadline {
            lead.status = LeadStatus::Expired;
        }
        Some(&*lead)
    }

    /// Extends every active lead, e.g. when institutional friction slows the
    /// clock at case start.
    pub fn extend_all(&mut self, delta: u32, now: Tick) {
        for class in EvidenceClass::ALL {
            self.shift_deadline(class, delta as i64, now);
        }
    }

    /// Called when `class` is revealed at `now`. Resolves an active lead; for
    /// an expired lead, degrades every pending item. Each item decays at most
    /// once, however many reveals the class takes.
    pub fn on_reveal(
        &mut self,
        class: EvidenceClass,
        now: Tick,
        pending: &[EntityId],
        presentation: &mut Presentation,
    ) -> LeadReveal {
        let mut reveal = LeadReveal {
            degraded: Vec::new(),
            notes: Vec::new(),
        };
        let Some(lead) = self.lead_mut(class) else {
            return reveal;
        };
        match lead.status {
            LeadStatus::Active => {
                lead.status = LeadStatus::Resolved;
            }
            LeadStatus::Expired => {
                for id in pending {
                    if presentation.degrade(*id, now) {
                        reveal.degraded.push(*id);
                    }
                }
                if !reveal.degraded.is_empty() {
                    reveal.notes.push(decay_note(class).to_string());
                }
            }
            LeadStatus::Resolved => {}
        }
        reveal
    }
}

fn decay_note(class: EvidenceClass) -> &'static str {
    match class {
        EvidenceClass::Testimonial => "Witness lead expired; the statement is less certain.",
        EvidenceClass::Cctv => "CCTV lead expired; only partial footage remains.",
        EvidenceClass::Forensics => "Forensics lead expired; the lab report is inconclusive.",
    }
}
