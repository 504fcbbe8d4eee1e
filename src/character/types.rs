use super::attributes::Attributes;
use super::combatant::{Combatant, Pool};
use super::status::StatusEffects;
use crate::core::constants::*;
use crate::items::{Equipment, Inventory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// The player character. Owned by the session; never destroyed mid-session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: Uuid,
    pub name: String,
    pub hp: Pool,
    pub mp: Pool,
    pub attributes: Attributes,
    #[serde(default)]
    pub statuses: StatusEffects,
    pub level: u32,
    /// Cumulative, never decreases.
    pub experience: u64,
    #[serde(default)]
    pub gold: u64,
    #[serde(default)]
    pub equipment: Equipment,
    #[serde(default)]
    pub inventory: Inventory,
    /// Abilities learned by level or by script. Abilities granted by gear are
    /// not stored here.
    #[serde(default)]
    pub abilities: BTreeSet<String>,
}

impl Character {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            hp: Pool::full(STARTING_HP),
            mp: Pool::full(STARTING_MP),
            attributes: Attributes::new(
                STARTING_STRENGTH,
                STARTING_DEFENSE,
                STARTING_SPEED,
                STARTING_MAGIC,
            ),
            statuses: StatusEffects::new(),
            level: STARTING_LEVEL,
            experience: 0,
            gold: 0,
            equipment: Equipment::new(),
            inventory: Inventory::new(),
            abilities: BTreeSet::new(),
        }
    }

    /// Learned abilities plus the ones granted by equipped gear.
    pub fn knows_ability(&self, id: &str) -> bool {
        self.abilities.contains(id) || self.equipment.granted_abilities().any(|a| a == id)
    }

    /// All usable ability ids, learned first then gear-granted, deduplicated.
    pub fn usable_abilities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.abilities.iter().cloned().collect();
        for granted in self.equipment.granted_abilities() {
            if !ids.iter().any(|id| id == granted) {
                ids.push(granted.to_string());
            }
        }
        ids
    }

    pub fn learn_ability(&mut self, id: &str) -> bool {
        self.abilities.insert(id.to_string())
    }

    /// Restores HP and MP and drops combat statuses, e.g. after a rest.
    pub fn full_restore(&mut self) {
        self.hp.refill();
        self.mp.refill();
        self.statuses.clear();
    }
}

impl Combatant for Character {
    fn name(&self) -> &str {
        &self.name
    }

    fn hp(&self) -> &Pool {
        &self.hp
    }

    fn hp_mut(&mut self) -> &mut Pool {
        &mut self.hp
    }

    fn mp(&self) -> &Pool {
        &self.mp
    }

    fn mp_mut(&mut self) -> &mut Pool {
        &mut self.mp
    }

    fn base_attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn statuses(&self) -> &StatusEffects {
        &self.statuses
    }

    fn statuses_mut(&mut self) -> &mut StatusEffects {
        &mut self.statuses
    }

    fn equipment_bonuses(&self) -> Attributes {
        self.equipment.total_bonuses()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::status::{StatusEffect, StatusKind};
    use crate::items::{EquipmentPiece, EquipmentSlot, Rarity};

    fn sword() -> EquipmentPiece {
        EquipmentPiece {
            id: "flame_sword".to_string(),
            name: "Flame Sword".to_string(),
            slot: EquipmentSlot::Weapon,
            rarity: Rarity::Rare,
            bonuses: Attributes::new(6, 0, 0, 2),
            grants_ability: Some("flame_strike".to_string()),
            price: 180,
        }
    }

    #[test]
    fn test_new_character_defaults() {
        let hero = Character::new("Zorg".to_string());
        assert_eq!(hero.level, 1);
        assert_eq!(hero.hp.current(), STARTING_HP);
        assert_eq!(hero.mp.max(), STARTING_MP);
        assert!(hero.is_alive());
    }

    #[test]
    fn test_effective_attributes_combine_gear_and_status() {
        let mut hero = Character::new("Zorg".to_string());
        hero.equipment.equip(sword());
        hero.apply_status(StatusEffect::new(StatusKind::DefenseUp, 2, 3));
        let attrs = hero.effective_attributes();
        assert_eq!(attrs.strength(), STARTING_STRENGTH + 6);
        assert_eq!(attrs.magic(), STARTING_MAGIC + 2);
        assert_eq!(attrs.defense(), STARTING_DEFENSE + 3);
        // Base attributes are untouched.
        assert_eq!(hero.attributes.strength(), STARTING_STRENGTH);
    }

    #[test]
    fn test_damage_floors_hp_at_zero() {
        let mut hero = Character::new("Zorg".to_string());
        let taken = hero.apply_damage(STARTING_HP + 40);
        assert_eq!(taken, STARTING_HP);
        assert_eq!(hero.hp.current(), 0);
        assert!(!hero.is_alive());
        assert_eq!(hero.heal(10), 0);
    }

    #[test]
    fn test_spend_mp_rejects_without_change() {
        let mut hero = Character::new("Zorg".to_string());
        hero.mp = Pool::new(3, 20);
        let err = hero.spend_mp(5).unwrap_err();
        assert_eq!(
            err,
            crate::core::error::ActionError::InsufficientMana {
                required: 5,
                available: 3
            }
        );
        assert_eq!(hero.mp.current(), 3);
    }

    #[test]
    fn test_gear_grants_ability() {
        let mut hero = Character::new("Zorg".to_string());
        hero.learn_ability("power_strike");
        assert!(!hero.knows_ability("flame_strike"));
        hero.equipment.equip(sword());
        assert!(hero.knows_ability("flame_strike"));
        assert_eq!(
            hero.usable_abilities(),
            vec!["power_strike".to_string(), "flame_strike".to_string()]
        );
    }
}
