//! Error types for the engine.
//!
//! Action errors are always raised before any state is touched, so callers can
//! simply pick a different action. Save errors never leave a partially loaded
//! state behind.

use crate::items::EquipmentSlot;
use crate::story::types::StepId;
use thiserror::Error;

/// Rejection of a combat action. The encounter is unchanged when one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("not enough MP: need {required}, have {available}")]
    InsufficientMana { required: u32, available: u32 },
    #[error("item '{0}' is not in the inventory")]
    ItemNotFound(String),
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    #[error("ability '{0}' is not known")]
    UnknownAbility(String),
    #[error("item '{0}' cannot be used here")]
    ItemNotUsable(String),
    #[error("it is not the character's turn")]
    NotYourTurn,
    #[error("the encounter is already over")]
    EncounterOver,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("corrupt save data: {0}")]
    CorruptSaveData(String),
    #[error("incompatible save version {0}")]
    IncompatibleVersion(u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    #[error("resume for step {got} but the story is waiting on {expected}")]
    StepMismatch { expected: StepId, got: StepId },
    #[error("payload does not match the awaited step")]
    UnexpectedPayload,
    #[error("choice {index} is out of range ({options} options)")]
    ChoiceOutOfRange { index: usize, options: usize },
    #[error("the story has finished")]
    Finished,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("unknown enemy '{0}'")]
    UnknownEnemy(String),
    #[error("unknown item '{0}'")]
    UnknownItem(String),
    #[error("unknown ability '{0}'")]
    UnknownAbility(String),
    #[error("unknown equipment '{0}'")]
    UnknownEquipment(String),
    #[error("phase {phase} step {step}: a choice needs at least one option")]
    EmptyChoice { phase: usize, step: usize },
    #[error("phase {phase} step {step}: a fight needs at least one enemy")]
    EmptyEncounter { phase: usize, step: usize },
    #[error("expected {expected} phase scripts, found {found}")]
    WrongPhaseCount { expected: usize, found: usize },
    #[error("content parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Story(#[from] StoryError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("no encounter is active")]
    NoEncounter,
    #[error("an encounter is active")]
    EncounterActive,
    #[error("the current step is not a combat step")]
    NotACombatStep,
    #[error("nothing is equipped in the {} slot", .0.name())]
    SlotEmpty(EquipmentSlot),
    #[error("'{0}' is not traded")]
    NotForSale(String),
    #[error("not enough gold: costs {price}, have {gold}")]
    NotEnoughGold { price: u64, gold: u64 },
}
