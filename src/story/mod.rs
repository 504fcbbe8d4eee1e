//! Phase scripts and the orchestrator that walks them.

pub mod orchestrator;
pub mod types;

pub use orchestrator::Orchestrator;
pub use types::*;
