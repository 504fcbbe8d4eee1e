use crate::character::types::Character;
use crate::story::types::PhaseState;
use serde::{Deserialize, Serialize};

/// Everything that persists between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub character: Character,
    pub phase: PhaseState,
}

impl GameState {
    /// A fresh character at the very start of the story, with no kit applied.
    pub fn new(character_name: String) -> Self {
        Self {
            character: Character::new(character_name),
            phase: PhaseState::new(),
        }
    }
}
