//! Turn-based encounters: damage math, enemy policies, and the encounter
//! state machine.

pub mod ai;
pub mod damage;
pub mod elements;
pub mod logic;
pub mod types;

pub use elements::{Affinities, Affinity, Element};
pub use logic::Encounter;
pub use types::{
    Action, AiPolicy, CombatEvent, CombatantId, EncounterOutcome, EncounterState, Enemy,
    EnemyTemplate, OnHit,
};
