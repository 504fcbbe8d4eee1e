//! Damage, flee, and turn-order math. Pure functions, no state changes.

use super::elements::{Affinity, Element};
use super::types::CombatantId;
use crate::abilities::{DamageFormula, DamageSpec};
use crate::character::combatant::Combatant;
use crate::character::status::StatusKind;
use crate::core::balance::CombatBalance;
use std::cmp::Reverse;

/// Applies the defender's Guard, if any, keeping the result at `min_damage`.
fn apply_guard(damage: u32, defender: &dyn Combatant, balance: &CombatBalance) -> u32 {
    match defender.statuses().get(StatusKind::Guard) {
        Some(guard) if guard.duration > 0 => {
            let kept = 100u32.saturating_sub(guard.magnitude.min(100));
            ((damage as u64 * kept as u64 / 100) as u32).max(balance.min_damage)
        }
        _ => damage,
    }
}

/// Basic attack: `max(min_damage, STR - DEF)`, then Guard.
pub fn attack_damage(
    attacker: &dyn Combatant,
    defender: &dyn Combatant,
    balance: &CombatBalance,
) -> u32 {
    let strength = attacker.effective_attributes().strength();
    let defense = defender.effective_attributes().defense();
    let raw = strength.saturating_sub(defense).max(balance.min_damage);
    apply_guard(raw, defender, balance)
}

/// Ability hit: `max(min_damage, stat + power - DEF)`, then Guard, then the
/// defender's affinity for `element`. Immunity yields 0.
/// Returns (damage, affinity).
pub fn ability_damage(
    spec: &DamageSpec,
    element: Element,
    attacker: &dyn Combatant,
    defender: &dyn Combatant,
    balance: &CombatBalance,
) -> (u32, Affinity) {
    let attrs = attacker.effective_attributes();
    let stat = match spec.formula {
        DamageFormula::Magical => attrs.magic(),
        DamageFormula::Physical => attrs.strength(),
    };
    let defense = defender.effective_attributes().defense();
    let raw = (stat + spec.power)
        .saturating_sub(defense)
        .max(balance.min_damage);
    let guarded = apply_guard(raw, defender, balance);

    let affinity = defender.affinity(element);
    if affinity == Affinity::Immune {
        return (0, affinity);
    }
    let scaled = (guarded as u64 * affinity.multiplier() as u64 / 100) as u32;
    (scaled.max(balance.min_damage), affinity)
}

/// Flee success chance in percent, from the fleer's speed against the average
/// speed of the living enemies.
pub fn flee_chance(speed: u32, enemy_speeds: &[u32], balance: &CombatBalance) -> u32 {
    if enemy_speeds.is_empty() {
        return balance.flee_max_percent;
    }
    let total: u64 = enemy_speeds.iter().map(|s| *s as u64).sum();
    let average = (total / enemy_speeds.len() as u64).max(1);
    let chance = balance.flee_base_percent as u64 * speed as u64 / average;
    (chance.min(u32::MAX as u64) as u32).clamp(balance.flee_min_percent, balance.flee_max_percent)
}

/// Sorts by effective speed descending; ties go to the character, then to the
/// earlier roster position.
pub fn turn_order(speeds: &[(CombatantId, u32)]) -> Vec<CombatantId> {
    let mut entries = speeds.to_vec();
    entries.sort_by_key(|(id, speed)| (Reverse(*speed), *id));
    entries.into_iter().map(|(id, _)| id).collect()
}
