//! Enemy action selection.
//!
//! Each policy is a function of the enemy and the content tables, plus the
//! RNG for the probabilistic ones. Given a seeded RNG the choice is
//! reproducible.

use super::types::{Action, AiPolicy, CombatantId, Enemy};
use crate::abilities::{Ability, TargetRule};
use crate::character::combatant::Combatant;
use crate::content::Content;
use rand::Rng;

/// Abilities the enemy knows and can pay for right now, in roster order.
fn affordable<'a>(enemy: &Enemy, content: &'a Content) -> Vec<&'a Ability> {
    enemy
        .abilities
        .iter()
        .filter_map(|id| content.ability(id))
        .filter(|a| a.mp_cost <= enemy.mp().current())
        .collect()
}

fn attack() -> Action {
    Action::Attack {
        target: CombatantId::Character,
    }
}

fn use_ability(ability: &Ability, me: CombatantId) -> Action {
    let target = match ability.target {
        TargetRule::SingleEnemy => Some(CombatantId::Character),
        TargetRule::SingleAlly | TargetRule::SelfOnly => Some(me),
        TargetRule::AllEnemies => None,
    };
    Action::Ability {
        id: ability.id.clone(),
        target,
    }
}

fn heal_ability<'a>(abilities: &[&'a Ability]) -> Option<&'a Ability> {
    abilities
        .iter()
        .copied()
        .filter(|a| a.heals() && !a.target.is_hostile())
        .max_by_key(|a| a.effect.heal)
}

fn damaging<'a>(abilities: &[&'a Ability]) -> Vec<&'a Ability> {
    abilities
        .iter()
        .copied()
        .filter(|a| a.deals_damage() && a.target.is_hostile())
        .collect()
}

/// Picks the action for the enemy at roster slot `index`.
pub fn choose_action(
    index: usize,
    enemy: &Enemy,
    content: &Content,
    rng: &mut impl Rng,
) -> Action {
    let me = CombatantId::Enemy(index);
    let abilities = affordable(enemy, content);
    let hp_percent = enemy.hp().percent();
    let thresholds = &content.balance.ai;

    match enemy.policy {
        AiPolicy::Aggressive => attack(),

        AiPolicy::Caster => {
            // Strongest first; the earliest listed wins ties.
            let mut best: Option<&Ability> = None;
            for ability in damaging(&abilities) {
                if best.map_or(true, |b| ability.power() > b.power()) {
                    best = Some(ability);
                }
            }
            best.map_or_else(attack, |a| use_ability(a, me))
        }

        AiPolicy::Tactical => {
            if hp_percent < thresholds.tactical_heal_below_percent {
                if let Some(heal) = heal_ability(&abilities) {
                    return use_ability(heal, me);
                }
            }

            let missing_buff = abilities.iter().copied().find(|a| {
                a.target == TargetRule::SelfOnly
                    && !a.heals()
                    && a.effect
                        .inflict
                        .is_some_and(|s| !s.kind.is_harmful() && !enemy.statuses().has(s.kind))
            });
            if let Some(buff) = missing_buff {
                return use_ability(buff, me);
            }

            let attacks = damaging(&abilities);
            if !attacks.is_empty()
                && rng.gen_range(0..100) < thresholds.tactical_ability_percent
            {
                let pick = attacks[rng.gen_range(0..attacks.len())];
                return use_ability(pick, me);
            }
            attack()
        }

        AiPolicy::Defensive => {
            if hp_percent < thresholds.defensive_heal_below_percent {
                let potion = enemy.pouch.iter().map(|(id, _)| id).find(|id| {
                    content
                        .item(id)
                        .is_some_and(|item| item.effect.heal_hp > 0)
                });
                if let Some(id) = potion {
                    return Action::Item {
                        id: id.to_string(),
                        target: me,
                    };
                }
                if let Some(heal) = heal_ability(&abilities) {
                    return use_ability(heal, me);
                }
                if hp_percent < thresholds.defensive_guard_below_percent {
                    return Action::Defend;
                }
            }
            attack()
        }
    }
}
