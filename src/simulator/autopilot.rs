//! A simple player policy: heal when low, hit hard, keep the best gear on.

use crate::abilities::{Ability, TargetRule};
use crate::character::attributes::AttributeType;
use crate::character::combatant::Combatant;
use crate::combat::types::{Action, CombatantId};
use crate::core::error::SessionError;
use crate::core::session::Session;
use crate::items::{EquipmentPiece, ItemCategory};

/// Heal in combat below this share of max HP.
const COMBAT_HEAL_BELOW_PERCENT: u32 = 35;
/// Drink potions between fights below this share of max HP.
const REST_HEAL_BELOW_PERCENT: u32 = 60;
/// Potions to carry into each fight when gold allows.
const POTION_STOCK: u32 = 3;

fn gear_score(piece: &EquipmentPiece) -> u32 {
    AttributeType::all()
        .iter()
        .map(|attr| piece.bonuses.get(*attr))
        .sum()
}

/// Strongest healing consumable in the inventory.
fn best_potion(session: &Session) -> Option<String> {
    let content = session.content();
    session
        .character()
        .inventory
        .iter()
        .filter_map(|(id, _)| content.item(id))
        .filter(|item| item.category == ItemCategory::Consumable && item.effect.heal_hp > 0)
        .max_by_key(|item| item.effect.heal_hp)
        .map(|item| item.id.clone())
}

/// Cheapest healing consumable the shop trades, with its price.
fn shop_potion(session: &Session) -> Option<(String, u64)> {
    session
        .content()
        .items
        .iter()
        .filter(|item| {
            item.category == ItemCategory::Consumable && item.effect.heal_hp > 0 && item.price > 0
        })
        .min_by_key(|item| item.price)
        .map(|item| (item.id.clone(), item.price))
}

/// Picks the character's action in the live encounter.
pub fn choose_action(session: &Session) -> Option<Action> {
    let encounter = session.encounter()?;
    let character = session.character();
    let content = session.content();
    let mp = character.mp().current();

    let usable: Vec<_> = character
        .usable_abilities()
        .iter()
        .filter_map(|id| content.ability(id))
        .filter(|ability| ability.mp_cost <= mp)
        .cloned()
        .collect();

    if character.hp().percent() < COMBAT_HEAL_BELOW_PERCENT {
        if let Some(heal) = usable
            .iter()
            .filter(|a| a.heals() && !a.target.is_hostile())
            .max_by_key(|a| a.effect.heal)
        {
            return Some(Action::Ability {
                id: heal.id.clone(),
                target: Some(CombatantId::Character),
            });
        }
        if let Some(potion) = best_potion(session) {
            return Some(Action::Item {
                id: potion,
                target: CombatantId::Character,
            });
        }
    }

    let weakest = encounter
        .living_enemies()
        .min_by_key(|(_, enemy)| enemy.hp().current())
        .map(|(index, _)| CombatantId::Enemy(index))?;

    // Earliest wins ties.
    let strike = usable
        .iter()
        .filter(|a| a.deals_damage() && a.target.is_hostile())
        .fold(None, |best: Option<&Ability>, a| match best {
            Some(b) if b.power() >= a.power() => Some(b),
            _ => Some(a),
        });
    if let Some(ability) = strike {
        let target = match ability.target {
            TargetRule::SingleEnemy => Some(weakest),
            _ => None,
        };
        return Some(Action::Ability {
            id: ability.id.clone(),
            target,
        });
    }

    Some(Action::Attack { target: weakest })
}

/// Between fights: swaps in better gear, tops up HP with potions, and
/// restocks potions with spare gold.
pub fn prepare(session: &mut Session) -> Result<(), SessionError> {
    let upgrades: Vec<String> = session
        .character()
        .inventory
        .iter()
        .filter_map(|(id, _)| session.content().equipment_piece(id))
        .filter(|piece| {
            let current = session.character().equipment.get(piece.slot);
            current.as_ref().map_or(0, gear_score) < gear_score(piece)
        })
        .map(|piece| piece.id.clone())
        .collect();
    for id in upgrades {
        // An earlier swap in the same slot may already have beaten this one.
        let better = session.content().equipment_piece(&id).is_some_and(|piece| {
            let current = session.character().equipment.get(piece.slot);
            current.as_ref().map_or(0, gear_score) < gear_score(piece)
        });
        if better {
            session.equip(&id)?;
        }
    }

    while session.character().hp().percent() < REST_HEAL_BELOW_PERCENT {
        let Some(potion) = best_potion(session) else {
            break;
        };
        session.use_item(&potion)?;
    }

    if let Some((potion, price)) = shop_potion(session) {
        while session.character().inventory.quantity(&potion) < POTION_STOCK
            && session.character().gold >= price
        {
            session.buy(&potion)?;
        }
    }
    Ok(())
}
