// Re-export core modules for use by the binary or other consumers
pub mod components;
pub mod core;
pub mod data;
pub mod rules;
pub mod simulation;
pub mod systems;

// Expose the session wrapper and the types needed to drive it
pub use crate::core::serialization::CaseExport;
pub use crate::core::world::{ActionIntent, CaseSession, CaseSetup, CaseSnapshot};
