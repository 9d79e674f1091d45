use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    VisitScene,
    Interview,
    RequestCctv,
    SubmitForensics,
    SetHypothesis,
    Arrest,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::VisitScene => "visit_scene",
            ActionType::Interview => "interview",
            ActionType::RequestCctv => "request_cctv",
            ActionType::SubmitForensics => "submit_forensics",
            ActionType::SetHypothesis => "set_hypothesis",
            ActionType::Arrest => "arrest",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionError {
    pub value: String,
}

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action {}", self.value)
    }
}

impl std::error::Error for ParseActionError {}

impl FromStr for ActionType {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visit_scene" => Ok(ActionType::VisitScene),
            "interview" => Ok(ActionType::Interview),
            "request_cctv" => Ok(ActionType::RequestCctv),
            "submit_forensics" => Ok(ActionType::SubmitForensics),
            "set_hypothesis" => Ok(ActionType::SetHypothesis),
            "arrest" => Ok(ActionType::Arrest),
            _ => Err(ParseActionError {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionCost {
    pub time: u32,
    pub pressure: u32,
    #[serde(default)]
    pub cooperation_delta: f64,
}

impl ActionCost {
    pub const fn new(time: u32, pressure: u32, cooperation_delta: f64) -> Self {
        Self {
            time,
            pressure,
            cooperation_delta,
        }
    }
}

/// Fixed per-action costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTable {
    pub visit_scene: ActionCost,
    pub interview: ActionCost,
    pub request_cctv: ActionCost,
    pub submit_forensics: ActionCost,
    pub set_hypothesis: ActionCost,
    pub arrest: ActionCost,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            visit_scene: ActionCost::new(1, 0, 0.0),
            interview: ActionCost::new(1, 0, -0.05),
            request_cctv: ActionCost::new(1, 1, 0.0),
            submit_forensics: ActionCost::new(2, 0, 0.0),
            set_hypothesis: ActionCost::new(1, 0, 0.0),
            arrest: ActionCost::new(1, 2, 0.0),
        }
    }
}

impl CostTable {
    pub fn cost_for(&self, action: ActionType) -> ActionCost {
        match action {
            ActionType::VisitScene => self.visit_scene,
            ActionType::Interview => self.interview,
            ActionType::RequestCctv => self.request_cctv,
            ActionType::SubmitForensics => self.submit_forensics,
            ActionType::SetHypothesis => self.set_hypothesis,
            ActionType::Arrest => self.arrest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetRefusal {
    OutOfTime,
    PressureTooHigh,
}

impl BudgetRefusal {
    pub fn reason(&self) -> &'static str {
        match self {
            BudgetRefusal::OutOfTime => "No time left for that action.",
            BudgetRefusal::PressureTooHigh => "Institutional pressure is too high for that action.",
        }
    }
}

/// Refuses an action whose cost would push time or pressure past a limit.
pub fn check_budget(
    time: u32,
    pressure: u32,
    cost: &ActionCost,
    time_limit: u32,
    pressure_limit: u32,
) -> Result<(), BudgetRefusal> {
    if time + cost.time > time_limit {
        return Err(BudgetRefusal::OutOfTime);
    }
    if pressure + cost.pressure > pressure_limit {
        return Err(BudgetRefusal::PressureTooHigh);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_action_costs() {
        let table = CostTable::default();
        assert_eq!(table.cost_for(ActionType::SubmitForensics).time, 2);
        assert_eq!(table.cost_for(ActionType::Arrest).pressure, 2);
        assert!(table.cost_for(ActionType::Interview).cooperation_delta < 0.0);
    }

    #[test]
    fn budget_checks_time_before_pressure() {
        let cost = ActionCost::new(2, 2, 0.0);
        assert_eq!(check_budget(7, 5, &cost, 8, 6), Err(BudgetRefusal::OutOfTime));
        assert_eq!(check_budget(6, 5, &cost, 8, 6), Err(BudgetRefusal::PressureTooHigh));
        assert_eq!(check_budget(6, 4, &cost, 8, 6), Ok(()));
    }

    #[test]
    fn action_names_parse() {
        assert_eq!("request_cctv".parse::<ActionType>(), Ok(ActionType::RequestCctv));
        assert!("stakeout".parse::<ActionType>().is_err());
    }
}
