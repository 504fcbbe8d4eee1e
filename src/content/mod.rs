//! Static content tables: items, gear, abilities, enemies, and phase scripts.
//!
//! The engine only ever reads from a `Content`. A built-in set ships with the
//! crate; alternative sets can be loaded from JSON and are validated for
//! dangling references before use.

mod data;
mod phases;

use crate::abilities::{Ability, AbilityUnlock};
use crate::combat::types::EnemyTemplate;
use crate::core::balance::Balance;
use crate::core::constants::PHASE_COUNT;
use crate::core::error::ContentError;
use crate::items::{EquipmentPiece, ItemDef};
use crate::story::types::{PhaseScript, Step};
use serde::{Deserialize, Serialize};

/// What a new character starts with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingKit {
    /// Equipment ids, equipped immediately.
    pub equipment: Vec<String>,
    pub items: Vec<(String, u32)>,
    pub abilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub items: Vec<ItemDef>,
    pub equipment: Vec<EquipmentPiece>,
    pub abilities: Vec<Ability>,
    pub enemies: Vec<EnemyTemplate>,
    pub phases: Vec<PhaseScript>,
    #[serde(default)]
    pub unlocks: Vec<AbilityUnlock>,
    #[serde(default)]
    pub starting_kit: StartingKit,
    #[serde(default)]
    pub balance: Balance,
}

/// The content set shipped with the crate.
pub fn builtin() -> Content {
    Content {
        items: data::items(),
        equipment: data::equipment(),
        abilities: data::abilities(),
        enemies: data::enemies(),
        phases: phases::all_phases(),
        unlocks: data::unlocks(),
        starting_kit: data::starting_kit(),
        balance: Balance::default(),
    }
}

impl Content {
    /// Parses and validates a content set.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let content: Content = serde_json::from_str(json)?;
        content.validate()?;
        Ok(content)
    }

    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn equipment_piece(&self, id: &str) -> Option<&EquipmentPiece> {
        self.equipment.iter().find(|e| e.id == id)
    }

    pub fn ability(&self, id: &str) -> Option<&Ability> {
        self.abilities.iter().find(|a| a.id == id)
    }

    pub fn enemy(&self, id: &str) -> Option<&EnemyTemplate> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Display name for an item or equipment id, falling back to the id.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.item(id)
            .map(|i| i.name.as_str())
            .or_else(|| self.equipment_piece(id).map(|e| e.name.as_str()))
            .unwrap_or(id)
    }

    fn check_item_or_equipment(&self, id: &str) -> Result<(), ContentError> {
        if self.item(id).is_some() || self.equipment_piece(id).is_some() {
            Ok(())
        } else {
            Err(ContentError::UnknownItem(id.to_string()))
        }
    }

    fn check_ability(&self, id: &str) -> Result<(), ContentError> {
        match self.ability(id) {
            Some(_) => Ok(()),
            None => Err(ContentError::UnknownAbility(id.to_string())),
        }
    }

    fn check_equipment(&self, id: &str) -> Result<(), ContentError> {
        match self.equipment_piece(id) {
            Some(_) => Ok(()),
            None => Err(ContentError::UnknownEquipment(id.to_string())),
        }
    }

    /// Checks the phase count, that every id referenced anywhere resolves, and
    /// that no choice or fight step is empty.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.phases.len() != PHASE_COUNT {
            return Err(ContentError::WrongPhaseCount {
                expected: PHASE_COUNT,
                found: self.phases.len(),
            });
        }

        for piece in &self.equipment {
            if let Some(ability) = &piece.grants_ability {
                self.check_ability(ability)?;
            }
        }

        for enemy in &self.enemies {
            for ability in &enemy.abilities {
                self.check_ability(ability)?;
            }
            for entry in &enemy.loot.entries {
                self.check_item_or_equipment(&entry.item)?;
            }
            for (item, _) in &enemy.pouch {
                self.check_item_or_equipment(item)?;
            }
        }

        for unlock in &self.unlocks {
            self.check_ability(&unlock.ability)?;
        }

        for id in &self.starting_kit.equipment {
            self.check_equipment(id)?;
        }
        for (item, _) in &self.starting_kit.items {
            self.check_item_or_equipment(item)?;
        }
        for ability in &self.starting_kit.abilities {
            self.check_ability(ability)?;
        }

        for (phase_index, phase) in self.phases.iter().enumerate() {
            for (step_index, step) in phase.steps.iter().enumerate() {
                match step {
                    Step::Choice { options, .. } if options.is_empty() => {
                        return Err(ContentError::EmptyChoice {
                            phase: phase_index,
                            step: step_index,
                        });
                    }
                    Step::Combat { enemies, .. } => {
                        if enemies.is_empty() {
                            return Err(ContentError::EmptyEncounter {
                                phase: phase_index,
                                step: step_index,
                            });
                        }
                        for id in enemies {
                            if self.enemy(id).is_none() {
                                return Err(ContentError::UnknownEnemy(id.clone()));
                            }
                        }
                    }
                    Step::Reward(reward) => {
                        for (item, _) in &reward.items {
                            self.check_item_or_equipment(item)?;
                        }
                        for id in &reward.equipment {
                            self.check_equipment(id)?;
                        }
                        for ability in &reward.abilities {
                            self.check_ability(ability)?;
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_content_is_valid() {
        let content = builtin();
        content.validate().unwrap();
        assert_eq!(content.phases.len(), PHASE_COUNT);
    }

    #[test]
    fn test_builtin_round_trips_through_json() {
        let content = builtin();
        let json = serde_json::to_string(&content).unwrap();
        let reloaded = Content::from_json(&json).unwrap();
        assert_eq!(reloaded, content);
    }

    #[test]
    fn test_wrong_phase_count_rejected() {
        let mut content = builtin();
        content.phases.pop();
        assert!(matches!(
            content.validate(),
            Err(ContentError::WrongPhaseCount {
                expected: 10,
                found: 9
            })
        ));
    }

    #[test]
    fn test_dangling_enemy_rejected() {
        let mut content = builtin();
        content.phases[0].steps.push(Step::Combat {
            enemies: vec!["no_such_enemy".to_string()],
            fleeable: true,
            victory_text: None,
        });
        assert!(matches!(
            content.validate(),
            Err(ContentError::UnknownEnemy(id)) if id == "no_such_enemy"
        ));
    }

    #[test]
    fn test_choice_without_options_rejected() {
        let mut content = builtin();
        content.phases[0].steps.insert(
            0,
            Step::Choice {
                prompt: "Which way?".to_string(),
                options: vec![],
            },
        );
        assert!(matches!(
            content.validate(),
            Err(ContentError::EmptyChoice { phase: 0, step: 0 })
        ));
    }

    #[test]
    fn test_fight_without_enemies_rejected() {
        let mut content = builtin();
        let last = content.phases[2].steps.len();
        content.phases[2].steps.push(Step::Combat {
            enemies: vec![],
            fleeable: true,
            victory_text: None,
        });
        assert!(matches!(
            content.validate(),
            Err(ContentError::EmptyEncounter { phase: 2, step }) if step == last
        ));
        assert!(crate::Session::new_game("Zorg", content).is_err());
    }

    #[test]
    fn test_dangling_unlock_rejected() {
        let mut content = builtin();
        content.unlocks.push(AbilityUnlock {
            level: 3,
            ability: "no_such_ability".to_string(),
        });
        assert!(matches!(
            content.validate(),
            Err(ContentError::UnknownAbility(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            Content::from_json("{not json"),
            Err(ContentError::Parse(_))
        ));
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let content = builtin();
        assert_eq!(content.display_name("healing_potion"), "Healing Potion");
        assert_eq!(content.display_name("mystery"), "mystery");
    }
}
