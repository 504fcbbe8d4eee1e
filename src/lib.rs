//! Zorg - a turn-based narrative RPG engine.
//!
//! A single character walks through ten story phases, fighting enemies in
//! turn-based encounters and growing stronger along the way. The crate is
//! presentation-agnostic: every operation returns events for a front end to
//! render.

pub mod abilities;
pub mod character;
pub mod combat;
pub mod content;
pub mod core;
pub mod items;
pub mod simulator;
pub mod story;

pub use crate::core::{GameState, Progress, Session};
