//! Tunable balance coefficients.
//!
//! These ship with the content tables so that the combat and progression
//! formulas keep a fixed shape while their numbers come from data.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub combat: CombatBalance,
    #[serde(default)]
    pub progression: ProgressionBalance,
    #[serde(default)]
    pub ai: AiBalance,
    #[serde(default)]
    pub economy: EconomyBalance,
}

// =============================================================================
// COMBAT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatBalance {
    /// Floor for any non-immune hit.
    pub min_damage: u32,
    /// Incoming damage reduction while guarding.
    pub guard_reduction_percent: u32,
    /// Flee chance when the fleeing combatant matches the average enemy speed.
    pub flee_base_percent: u32,
    pub flee_min_percent: u32,
    pub flee_max_percent: u32,
}

impl Default for CombatBalance {
    fn default() -> Self {
        Self {
            min_damage: 1,
            guard_reduction_percent: 50,
            flee_base_percent: 50,
            flee_min_percent: 10,
            flee_max_percent: 90,
        }
    }
}

// =============================================================================
// ENEMY AI
// =============================================================================

/// HP and dice thresholds for the enemy policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiBalance {
    /// Tactical enemies heal below this HP percent.
    pub tactical_heal_below_percent: u32,
    /// Chance a tactical enemy prefers a damaging ability over a basic attack.
    pub tactical_ability_percent: u32,
    /// Defensive enemies reach for potions or heals below this HP percent.
    pub defensive_heal_below_percent: u32,
    /// Defensive enemies guard below this HP percent when nothing heals.
    pub defensive_guard_below_percent: u32,
}

impl Default for AiBalance {
    fn default() -> Self {
        Self {
            tactical_heal_below_percent: 40,
            tactical_ability_percent: 60,
            defensive_heal_below_percent: 50,
            defensive_guard_below_percent: 25,
        }
    }
}

// =============================================================================
// ECONOMY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyBalance {
    /// Share of the buy price paid back when selling.
    pub sell_percent: u64,
}

impl Default for EconomyBalance {
    fn default() -> Self {
        Self { sell_percent: 50 }
    }
}

impl EconomyBalance {
    pub fn sell_price(&self, price: u64) -> u64 {
        price.saturating_mul(self.sell_percent) / 100
    }
}

// =============================================================================
// LEVELING & PROGRESSION
// =============================================================================

/// Stat growth applied on each level-up. Gains are `base + level * per_level`
/// for HP and MP, evaluated with the new level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelGrowth {
    pub hp_base: u32,
    pub hp_per_level: u32,
    pub mp_base: u32,
    pub mp_per_level: u32,
    pub strength: u32,
    /// Extra strength every this many levels.
    pub strength_bonus_every: u32,
    pub defense: u32,
    /// Extra defense every this many levels.
    pub defense_bonus_every: u32,
    pub speed: u32,
    pub magic: u32,
}

impl Default for LevelGrowth {
    fn default() -> Self {
        Self {
            hp_base: 15,
            hp_per_level: 2,
            mp_base: 10,
            mp_per_level: 1,
            strength: 2,
            strength_bonus_every: 5,
            defense: 1,
            defense_bonus_every: 10,
            speed: 1,
            magic: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionBalance {
    /// Level beyond which thresholds stop advancing.
    pub max_level: u32,
    /// Experience needed to go from level 1 to level 2.
    pub first_threshold: u64,
    /// Each next step costs this percent of the previous step.
    pub threshold_growth_percent: u64,
    pub growth: LevelGrowth,
}

impl Default for ProgressionBalance {
    fn default() -> Self {
        Self {
            max_level: 30,
            first_threshold: 100,
            threshold_growth_percent: 150,
            growth: LevelGrowth::default(),
        }
    }
}
