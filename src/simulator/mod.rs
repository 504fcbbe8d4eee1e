//! Autopilot playthroughs of the built-in story for balance analysis.
//!
//! Every run drives a real `Session`, so the numbers reflect the same combat
//! and progression rules a player would face.

mod autopilot;
mod config;
mod report;
mod runner;

pub use autopilot::{choose_action, prepare};
pub use config::SimConfig;
pub use report::SimReport;
pub use runner::{run_simulation, simulate_single_run, RunStats};
