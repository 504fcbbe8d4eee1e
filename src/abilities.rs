//! Ability definitions.

use crate::character::status::{StatusEffect, StatusKind};
use crate::combat::elements::Element;
use serde::{Deserialize, Serialize};

/// Who an ability may be aimed at, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRule {
    SelfOnly,
    SingleEnemy,
    AllEnemies,
    SingleAlly,
}

impl TargetRule {
    pub fn is_hostile(&self) -> bool {
        matches!(self, TargetRule::SingleEnemy | TargetRule::AllEnemies)
    }
}

/// Which attribute drives an ability's damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DamageFormula {
    /// `magic + power - defense`
    #[default]
    Magical,
    /// `strength + power - defense`
    Physical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageSpec {
    #[serde(default)]
    pub formula: DamageFormula,
    pub power: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityEffect {
    pub damage: Option<DamageSpec>,
    pub heal: u32,
    pub inflict: Option<StatusEffect>,
    pub cure: Vec<StatusKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub mp_cost: u32,
    pub target: TargetRule,
    #[serde(default)]
    pub element: Element,
    #[serde(default)]
    pub effect: AbilityEffect,
}

impl Ability {
    pub fn deals_damage(&self) -> bool {
        self.effect.damage.is_some()
    }

    pub fn heals(&self) -> bool {
        self.effect.heal > 0
    }

    /// Raw power used to rank damaging abilities.
    pub fn power(&self) -> u32 {
        self.effect.damage.map_or(0, |d| d.power)
    }
}

/// Learned automatically when the character reaches `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityUnlock {
    pub level: u32,
    pub ability: String,
}
