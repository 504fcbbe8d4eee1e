use crate::character::attributes::Attributes;
use crate::character::status::{StatusEffect, StatusKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCategory {
    Consumable,
    /// Story items. Never consumed by use.
    KeyItem,
}

/// What a consumable does to its target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemEffect {
    pub heal_hp: u32,
    pub restore_mp: u32,
    pub cure: Vec<StatusKind>,
    pub inflict: Option<StatusEffect>,
    /// Flat damage, ignores defense.
    pub damage: u32,
}

impl ItemEffect {
    /// Whether the effect is meant for the user's side rather than a foe.
    pub fn is_supportive(&self) -> bool {
        self.damage == 0 && self.inflict.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ItemCategory,
    /// Shop price in gold. Zero means the item is not traded.
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub effect: ItemEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
    Armor,
    Shield,
}

impl EquipmentSlot {
    pub fn all() -> [EquipmentSlot; 3] {
        [
            EquipmentSlot::Weapon,
            EquipmentSlot::Armor,
            EquipmentSlot::Shield,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            EquipmentSlot::Weapon => "Weapon",
            EquipmentSlot::Armor => "Armor",
            EquipmentSlot::Shield => "Shield",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common = 0,
    Rare = 1,
    Epic = 2,
    Legendary = 3,
}

impl Rarity {
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentPiece {
    pub id: String,
    pub name: String,
    pub slot: EquipmentSlot,
    #[serde(default)]
    pub rarity: Rarity,
    /// Added on top of base attributes while equipped.
    #[serde(default)]
    pub bonuses: Attributes,
    /// Ability usable while this piece is equipped.
    #[serde(default)]
    pub grants_ability: Option<String>,
    /// Shop price in gold. Zero means the piece is not traded.
    #[serde(default)]
    pub price: u64,
}
