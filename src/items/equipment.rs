use super::types::{EquipmentPiece, EquipmentSlot};
use crate::character::attributes::Attributes;
use serde::{Deserialize, Serialize};

/// Equipped gear, at most one piece per slot.
///
/// When adding new slots, use `#[serde(default)]` so older saves still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<EquipmentPiece>,
    pub armor: Option<EquipmentPiece>,
    pub shield: Option<EquipmentPiece>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: EquipmentSlot) -> &Option<EquipmentPiece> {
        match slot {
            EquipmentSlot::Weapon => &self.weapon,
            EquipmentSlot::Armor => &self.armor,
            EquipmentSlot::Shield => &self.shield,
        }
    }

    /// Puts a piece in its slot and hands back whatever was there.
    pub fn equip(&mut self, piece: EquipmentPiece) -> Option<EquipmentPiece> {
        let slot = match piece.slot {
            EquipmentSlot::Weapon => &mut self.weapon,
            EquipmentSlot::Armor => &mut self.armor,
            EquipmentSlot::Shield => &mut self.shield,
        };
        slot.replace(piece)
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<EquipmentPiece> {
        match slot {
            EquipmentSlot::Weapon => self.weapon.take(),
            EquipmentSlot::Armor => self.armor.take(),
            EquipmentSlot::Shield => self.shield.take(),
        }
    }

    pub fn iter_equipped(&self) -> impl Iterator<Item = &EquipmentPiece> {
        [&self.weapon, &self.armor, &self.shield]
            .into_iter()
            .filter_map(|piece| piece.as_ref())
    }

    /// Sum of attribute bonuses across all equipped pieces.
    pub fn total_bonuses(&self) -> Attributes {
        let mut total = Attributes::default();
        for piece in self.iter_equipped() {
            total.add(&piece.bonuses);
        }
        total
    }

    pub fn granted_abilities(&self) -> impl Iterator<Item = &str> {
        self.iter_equipped()
            .filter_map(|piece| piece.grants_ability.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::Rarity;
    use super::*;

    fn piece(id: &str, slot: EquipmentSlot, bonuses: Attributes) -> EquipmentPiece {
        EquipmentPiece {
            id: id.to_string(),
            name: id.to_string(),
            slot,
            rarity: Rarity::Common,
            bonuses,
            grants_ability: None,
            price: 0,
        }
    }

    #[test]
    fn test_equip_returns_previous() {
        let mut gear = Equipment::new();
        assert!(gear
            .equip(piece("dagger", EquipmentSlot::Weapon, Attributes::new(3, 0, 0, 0)))
            .is_none());
        let previous = gear.equip(piece("sword", EquipmentSlot::Weapon, Attributes::new(6, 0, 0, 0)));
        assert_eq!(previous.unwrap().id, "dagger");
        assert_eq!(gear.weapon.as_ref().unwrap().id, "sword");
    }

    #[test]
    fn test_total_bonuses() {
        let mut gear = Equipment::new();
        gear.equip(piece("dagger", EquipmentSlot::Weapon, Attributes::new(3, 0, 0, 0)));
        gear.equip(piece("cloth", EquipmentSlot::Armor, Attributes::new(0, 1, 0, 0)));
        gear.equip(piece("buckler", EquipmentSlot::Shield, Attributes::new(0, 2, 0, 0)));
        assert_eq!(gear.total_bonuses(), Attributes::new(3, 3, 0, 0));
    }

    #[test]
    fn test_granted_abilities() {
        let mut gear = Equipment::new();
        let mut blade = piece("rune_sword", EquipmentSlot::Weapon, Attributes::default());
        blade.grants_ability = Some("flame_strike".to_string());
        gear.equip(blade);
        let granted: Vec<_> = gear.granted_abilities().collect();
        assert_eq!(granted, vec!["flame_strike"]);
    }

    #[test]
    fn test_unequip() {
        let mut gear = Equipment::new();
        gear.equip(piece("cloth", EquipmentSlot::Armor, Attributes::default()));
        assert!(gear.unequip(EquipmentSlot::Armor).is_some());
        assert!(gear.get(EquipmentSlot::Armor).is_none());
    }
}
