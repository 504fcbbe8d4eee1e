use super::elements::{Affinities, Affinity, Element};
use crate::character::attributes::Attributes;
use crate::character::combatant::{Combatant, Pool};
use crate::character::progression::LevelUpReport;
use crate::character::status::{StatusEffect, StatusEffects, StatusKind};
use crate::items::{Inventory, LootTable};
use serde::{Deserialize, Serialize};

/// How an enemy picks its action each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiPolicy {
    /// Always a basic attack.
    #[default]
    Aggressive,
    /// Strongest affordable damaging ability, otherwise attack.
    Caster,
    /// Heals when hurt, buffs when unbuffed, mixes abilities and attacks.
    Tactical,
    /// Drinks from its pouch or heals when hurt, guards when critical.
    Defensive,
}

/// A status an enemy's basic attack may inflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnHit {
    pub status: StatusEffect,
    pub chance_percent: u32,
}

/// Static enemy definition from the content tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    pub max_hp: u32,
    #[serde(default)]
    pub max_mp: u32,
    pub attributes: Attributes,
    pub xp_yield: u64,
    #[serde(default)]
    pub gold_yield: u64,
    #[serde(default)]
    pub loot: LootTable,
    #[serde(default)]
    pub policy: AiPolicy,
    #[serde(default)]
    pub abilities: Vec<String>,
    /// Item ids and quantities the enemy starts with.
    #[serde(default)]
    pub pouch: Vec<(String, u32)>,
    #[serde(default)]
    pub affinities: Affinities,
    #[serde(default)]
    pub on_hit: Option<OnHit>,
}

/// A live enemy inside an encounter, created fresh from its template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    pub template_id: String,
    pub name: String,
    pub hp: Pool,
    pub mp: Pool,
    pub attributes: Attributes,
    pub statuses: StatusEffects,
    pub xp_yield: u64,
    pub gold_yield: u64,
    pub loot: LootTable,
    pub policy: AiPolicy,
    pub abilities: Vec<String>,
    pub pouch: Inventory,
    pub affinities: Affinities,
    pub on_hit: Option<OnHit>,
}

impl Enemy {
    pub fn from_template(template: &EnemyTemplate) -> Self {
        let mut pouch = Inventory::new();
        for (item, quantity) in &template.pouch {
            pouch.add(item, *quantity);
        }
        Self {
            template_id: template.id.clone(),
            name: template.name.clone(),
            hp: Pool::full(template.max_hp),
            mp: Pool::full(template.max_mp),
            attributes: template.attributes,
            statuses: StatusEffects::new(),
            xp_yield: template.xp_yield,
            gold_yield: template.gold_yield,
            loot: template.loot.clone(),
            policy: template.policy,
            abilities: template.abilities.clone(),
            pouch,
            affinities: template.affinities.clone(),
            on_hit: template.on_hit,
        }
    }
}

impl Combatant for Enemy {
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

    fn affinity(&self, element: Element) -> Affinity {
        self.affinities.get(element)
    }
}

/// Identifies a combatant inside one encounter.
///
/// The derived ordering puts the character before every enemy and enemies in
/// roster order, which is exactly the turn-order tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CombatantId {
    Character,
    Enemy(usize),
}

/// A choice made by the character or picked by an enemy policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Attack { target: CombatantId },
    /// `target` may be omitted for self and all-enemy abilities.
    Ability { id: String, target: Option<CombatantId> },
    /// Consumables are applied to `target`; equipment ids swap into their slot.
    Item { id: String, target: CombatantId },
    Defend,
    Flee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterState {
    AwaitingAction,
    Resolving,
    CheckEnd,
    Victory,
    Defeat,
    Fled,
}

impl EncounterState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EncounterState::Victory | EncounterState::Defeat | EncounterState::Fled
        )
    }
}

/// Terminal result handed back to the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterOutcome {
    Victory,
    Defeat,
    Fled,
}

/// Read-only observations of a round's resolution, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEvent {
    RoundStarted {
        round: u32,
        order: Vec<CombatantId>,
    },
    TurnSkipped {
        who: CombatantId,
    },
    Attacked {
        attacker: CombatantId,
        target: CombatantId,
    },
    AbilityUsed {
        user: CombatantId,
        ability: String,
        mp_spent: u32,
    },
    Damaged {
        target: CombatantId,
        amount: u32,
        affinity: Affinity,
    },
    Healed {
        target: CombatantId,
        amount: u32,
    },
    ManaRestored {
        target: CombatantId,
        amount: u32,
    },
    StatusApplied {
        target: CombatantId,
        status: StatusEffect,
    },
    StatusCured {
        target: CombatantId,
        kind: StatusKind,
    },
    StatusExpired {
        target: CombatantId,
        kind: StatusKind,
    },
    PoisonTick {
        target: CombatantId,
        damage: u32,
    },
    ItemUsed {
        user: CombatantId,
        item: String,
        target: CombatantId,
    },
    Equipped {
        item: String,
        replaced: Option<String>,
    },
    Defended {
        who: CombatantId,
    },
    FleeAttempted {
        chance_percent: u32,
        success: bool,
    },
    CombatantDefeated {
        who: CombatantId,
    },
    ExperienceGained {
        amount: u64,
    },
    LevelUp(LevelUpReport),
    GoldGained {
        amount: u64,
    },
    LootDropped {
        from: CombatantId,
        item: String,
        quantity: u32,
    },
    Victory,
    Defeat,
    Fled,
}
