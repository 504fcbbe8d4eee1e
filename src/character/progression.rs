//! Experience, level thresholds, and stat growth.

use super::attributes::{AttributeType, Attributes};
use super::types::Character;
use crate::abilities::AbilityUnlock;
use crate::core::balance::{LevelGrowth, ProgressionBalance};
use log::info;

/// What a single level-up changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUpReport {
    pub old_level: u32,
    pub new_level: u32,
    pub hp_gain: u32,
    pub mp_gain: u32,
    pub attribute_gain: Attributes,
    pub abilities_unlocked: Vec<String>,
}

/// Cumulative experience needed to stand at `level`. Level 1 needs nothing.
/// Levels past `max_level` are treated as unreachable.
pub fn experience_for_level(level: u32, balance: &ProgressionBalance) -> Option<u64> {
    if level == 0 || level > balance.max_level {
        return None;
    }
    let mut total: u64 = 0;
    let mut step = balance.first_threshold;
    for _ in 1..level {
        total = total.saturating_add(step);
        step = step.saturating_mul(balance.threshold_growth_percent) / 100;
    }
    Some(total)
}

/// Highest level whose threshold does not exceed `experience`, capped at
/// `max_level`.
pub fn level_for_experience(experience: u64, balance: &ProgressionBalance) -> u32 {
    let mut level = 1;
    while level < balance.max_level {
        match experience_for_level(level + 1, balance) {
            Some(needed) if needed <= experience => level += 1,
            _ => break,
        }
    }
    level
}

/// Experience still missing for the next level, or None at the ceiling.
pub fn experience_to_next_level(character: &Character, balance: &ProgressionBalance) -> Option<u64> {
    experience_for_level(character.level + 1, balance)
        .map(|needed| needed.saturating_sub(character.experience))
}

/// Attribute deltas for reaching `new_level`.
pub fn attribute_growth(new_level: u32, growth: &LevelGrowth) -> Attributes {
    let bonus = |every: u32| if every == 0 { 0 } else { new_level / every };
    Attributes::new(
        growth.strength + bonus(growth.strength_bonus_every),
        growth.defense + bonus(growth.defense_bonus_every),
        growth.speed,
        growth.magic,
    )
}

/// Adds experience and applies every level-up it pays for, in order.
///
/// Each level raises max HP/MP and base attributes, refills HP/MP, and learns
/// any ability unlocked at that level. Returns one report per level gained.
pub fn grant_experience(
    character: &mut Character,
    amount: u64,
    balance: &ProgressionBalance,
    unlocks: &[AbilityUnlock],
) -> Vec<LevelUpReport> {
    character.experience = character.experience.saturating_add(amount);

    let target = level_for_experience(character.experience, balance);
    let mut reports = Vec::new();
    while character.level < target {
        reports.push(level_up(character, &balance.growth, unlocks));
    }
    reports
}

fn level_up(character: &mut Character, growth: &LevelGrowth, unlocks: &[AbilityUnlock]) -> LevelUpReport {
    let old_level = character.level;
    let new_level = old_level + 1;
    character.level = new_level;

    let hp_gain = growth.hp_base + new_level * growth.hp_per_level;
    let mp_gain = growth.mp_base + new_level * growth.mp_per_level;
    character.hp.raise_max(hp_gain);
    character.mp.raise_max(mp_gain);

    let attribute_gain = attribute_growth(new_level, growth);
    for attr in AttributeType::all() {
        character.attributes.raise(attr, attribute_gain.get(attr));
    }

    character.hp.refill();
    character.mp.refill();

    let abilities_unlocked: Vec<String> = unlocks
        .iter()
        .filter(|unlock| unlock.level == new_level)
        .filter(|unlock| character.learn_ability(&unlock.ability))
        .map(|unlock| unlock.ability.clone())
        .collect();

    info!(
        "{} reached level {} (+{} HP, +{} MP)",
        character.name, new_level, hp_gain, mp_gain
    );

    LevelUpReport {
        old_level,
        new_level,
        hp_gain,
        mp_gain,
        attribute_gain,
        abilities_unlocked,
    }
}
