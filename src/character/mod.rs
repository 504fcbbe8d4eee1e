//! The player character: attributes, statuses, progression, and persistence.

pub mod attributes;
pub mod combatant;
pub mod progression;
pub mod save;
pub mod status;
pub mod types;

pub use attributes::{AttributeType, Attributes};
pub use combatant::{Combatant, Pool};
pub use progression::{grant_experience, LevelUpReport};
pub use save::SaveManager;
pub use status::{StatusEffect, StatusEffects, StatusKind, StatusTick};
pub use types::Character;
