//! Weighted loot tables rolled once per defeated enemy.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootEntry {
    /// Item or equipment id.
    pub item: String,
    pub weight: u32,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootTable {
    #[serde(default)]
    pub entries: Vec<LootEntry>,
    /// Weight of dropping nothing at all.
    #[serde(default)]
    pub nothing_weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootDrop {
    pub item: String,
    pub quantity: u32,
}

impl LootTable {
    pub fn new(entries: Vec<LootEntry>, nothing_weight: u32) -> Self {
        Self {
            entries,
            nothing_weight,
        }
    }

    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|e| e.weight).sum::<u32>() + self.nothing_weight
    }

    /// Picks at most one entry proportionally to its weight.
    pub fn roll(&self, rng: &mut impl Rng) -> Option<LootDrop> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }
        let mut pick = rng.gen_range(0..total);
        for entry in &self.entries {
            if pick < entry.weight {
                return Some(LootDrop {
                    item: entry.item.clone(),
                    quantity: entry.quantity,
                });
            }
            pick -= entry.weight;
        }
        None
    }
}
