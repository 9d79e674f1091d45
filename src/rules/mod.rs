pub mod cost;
pub mod rng;
pub mod thresholds;

pub use cost::{check_budget, ActionCost, ActionType, BudgetRefusal, CostTable, ParseActionError};
pub use rng::{fork_seed, CaseRng};
pub use thresholds::{evaluate_arrest, ArrestAssessment};
