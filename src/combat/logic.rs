//! The encounter state machine.
//!
//! An `Encounter` owns its enemies and borrows the character for each call.
//! `begin` runs enemy turns until the character is up; `submit` resolves one
//! character action and again runs forward to the character's next turn or a
//! terminal state. Every call returns the events it produced, in order.

use super::ai;
use super::damage::{ability_damage, attack_damage, flee_chance, turn_order};
use super::elements::Affinity;
use super::types::{Action, CombatEvent, CombatantId, EncounterOutcome, EncounterState, Enemy};
use crate::abilities::{Ability, TargetRule};
use crate::character::combatant::Combatant;
use crate::character::progression::grant_experience;
use crate::character::status::{StatusEffect, StatusKind, StatusTick};
use crate::character::types::Character;
use crate::content::Content;
use crate::core::error::{ActionError, ContentError};
use crate::items::{EquipmentPiece, ItemCategory, ItemDef};
use log::{debug, info};
use rand::Rng;
use std::collections::VecDeque;

fn as_dyn<'a>(
    id: CombatantId,
    character: &'a Character,
    enemies: &'a [Enemy],
) -> Option<&'a dyn Combatant> {
    match id {
        CombatantId::Character => Some(character as &dyn Combatant),
        CombatantId::Enemy(i) => enemies.get(i).map(|e| e as &dyn Combatant),
    }
}

fn as_dyn_mut<'a>(
    id: CombatantId,
    character: &'a mut Character,
    enemies: &'a mut [Enemy],
) -> Option<&'a mut dyn Combatant> {
    match id {
        CombatantId::Character => Some(character as &mut dyn Combatant),
        CombatantId::Enemy(i) => enemies.get_mut(i).map(|e| e as &mut dyn Combatant),
    }
}

fn same_side(a: CombatantId, b: CombatantId) -> bool {
    matches!(
        (a, b),
        (CombatantId::Character, CombatantId::Character)
            | (CombatantId::Enemy(_), CombatantId::Enemy(_))
    )
}

fn invalid(reason: impl Into<String>) -> ActionError {
    ActionError::InvalidTarget(reason.into())
}

/// Applies damage and records it, plus the defeat if this blow was lethal.
fn deal_damage(
    id: CombatantId,
    target: &mut dyn Combatant,
    amount: u32,
    affinity: Affinity,
    events: &mut Vec<CombatEvent>,
) {
    let was_alive = target.is_alive();
    let dealt = target.apply_damage(amount);
    events.push(CombatEvent::Damaged {
        target: id,
        amount: dealt,
        affinity,
    });
    if was_alive && !target.is_alive() {
        events.push(CombatEvent::CombatantDefeated { who: id });
    }
}

fn tick_events(id: CombatantId, tick: &StatusTick) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    if tick.damage > 0 {
        events.push(CombatEvent::PoisonTick {
            target: id,
            damage: tick.damage,
        });
    }
    if tick.healing > 0 {
        events.push(CombatEvent::Healed {
            target: id,
            amount: tick.healing,
        });
    }
    for kind in &tick.expired {
        events.push(CombatEvent::StatusExpired {
            target: id,
            kind: *kind,
        });
    }
    events
}

/// An action that passed validation and can no longer fail.
enum Resolved {
    Attack(CombatantId),
    Ability {
        ability: Ability,
        targets: Vec<CombatantId>,
    },
    Item {
        item: ItemDef,
        target: CombatantId,
    },
    Equip(EquipmentPiece),
    Defend,
    Flee,
}

#[derive(Debug, Clone)]
pub struct Encounter {
    enemies: Vec<Enemy>,
    state: EncounterState,
    round: u32,
    queue: VecDeque<CombatantId>,
    rewards_granted: bool,
    fleeable: bool,
}

impl Encounter {
    pub fn new(enemies: Vec<Enemy>, fleeable: bool) -> Self {
        Self {
            enemies,
            state: EncounterState::Resolving,
            round: 0,
            queue: VecDeque::new(),
            rewards_granted: false,
            fleeable,
        }
    }

    /// Builds fresh enemies from their template ids.
    pub fn from_ids(ids: &[String], fleeable: bool, content: &Content) -> Result<Self, ContentError> {
        let enemies = ids
            .iter()
            .map(|id| {
                content
                    .enemy(id)
                    .map(Enemy::from_template)
                    .ok_or_else(|| ContentError::UnknownEnemy(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(enemies, fleeable))
    }

    pub fn state(&self) -> EncounterState {
        self.state
    }

    pub fn outcome(&self) -> Option<EncounterOutcome> {
        match self.state {
            EncounterState::Victory => Some(EncounterOutcome::Victory),
            EncounterState::Defeat => Some(EncounterOutcome::Defeat),
            EncounterState::Fled => Some(EncounterOutcome::Fled),
            _ => None,
        }
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_fleeable(&self) -> bool {
        self.fleeable
    }

    /// Roster slots of the enemies still standing.
    pub fn living_enemies(&self) -> impl Iterator<Item = (usize, &Enemy)> {
        self.enemies.iter().enumerate().filter(|(_, e)| e.is_alive())
    }

    /// Starts the fight: runs any enemy turns that come before the character.
    pub fn begin(
        &mut self,
        character: &mut Character,
        content: &Content,
        rng: &mut impl Rng,
    ) -> Vec<CombatEvent> {
        info!(
            "Encounter started: {} vs {}",
            character.name,
            self.enemies
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut events = self.check_end(character, content, rng);
        events.extend(self.advance(character, content, rng));
        events
    }

    /// Resolves the character's action, then plays forward until the
    /// character is up again or the encounter ends.
    ///
    /// A rejected action leaves the encounter and the character untouched.
    pub fn submit(
        &mut self,
        action: Action,
        character: &mut Character,
        content: &Content,
        rng: &mut impl Rng,
    ) -> Result<Vec<CombatEvent>, ActionError> {
        if self.state.is_terminal() {
            return Err(ActionError::EncounterOver);
        }
        if self.state != EncounterState::AwaitingAction {
            return Err(ActionError::NotYourTurn);
        }

        let mut events = self
            .take_turn(CombatantId::Character, &action, character, content, rng)
            .inspect_err(|err| debug!("Rejected {:?}: {}", action, err))?;
        events.extend(self.advance(character, content, rng));
        Ok(events)
    }

    fn take_turn(
        &mut self,
        actor: CombatantId,
        action: &Action,
        character: &mut Character,
        content: &Content,
        rng: &mut impl Rng,
    ) -> Result<Vec<CombatEvent>, ActionError> {
        let resolved = self.validate(actor, action, character, content)?;

        self.state = EncounterState::Resolving;
        let mut events = self.execute(actor, resolved, character, content, rng);

        if self.state != EncounterState::Fled {
            self.state = EncounterState::CheckEnd;
        }
        events.extend(self.check_end(character, content, rng));
        Ok(events)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    fn is_living(&self, id: CombatantId, character: &Character) -> bool {
        as_dyn(id, character, &self.enemies).is_some_and(|c| c.is_alive())
    }

    fn opponents(&self, actor: CombatantId, character: &Character) -> Vec<CombatantId> {
        match actor {
            CombatantId::Character => self
                .living_enemies()
                .map(|(i, _)| CombatantId::Enemy(i))
                .collect(),
            CombatantId::Enemy(_) if character.is_alive() => vec![CombatantId::Character],
            CombatantId::Enemy(_) => vec![],
        }
    }

    fn check_target(
        &self,
        actor: CombatantId,
        target: CombatantId,
        friendly: bool,
        character: &Character,
    ) -> Result<CombatantId, ActionError> {
        if same_side(actor, target) != friendly {
            return Err(invalid(if friendly {
                "target must be on the user's side"
            } else {
                "target must be an opponent"
            }));
        }
        match as_dyn(target, character, &self.enemies) {
            Some(c) if c.is_alive() => Ok(target),
            Some(c) => Err(invalid(format!("{} is already defeated", c.name()))),
            None => Err(invalid(format!("no combatant at {:?}", target))),
        }
    }

    fn validate(
        &self,
        actor: CombatantId,
        action: &Action,
        character: &Character,
        content: &Content,
    ) -> Result<Resolved, ActionError> {
        let user = as_dyn(actor, character, &self.enemies)
            .ok_or_else(|| invalid(format!("no combatant at {:?}", actor)))?;

        match action {
            Action::Attack { target } => {
                Ok(Resolved::Attack(self.check_target(actor, *target, false, character)?))
            }

            Action::Ability { id, target } => {
                let known = match actor {
                    CombatantId::Character => character.knows_ability(id),
                    CombatantId::Enemy(i) => self.enemies[i].abilities.iter().any(|a| a == id),
                };
                let ability = content
                    .ability(id)
                    .filter(|_| known)
                    .ok_or_else(|| ActionError::UnknownAbility(id.clone()))?;

                let available = user.mp().current();
                if ability.mp_cost > available {
                    return Err(ActionError::InsufficientMana {
                        required: ability.mp_cost,
                        available,
                    });
                }

                let targets = match (ability.target, target) {
                    (TargetRule::SelfOnly, None) => vec![actor],
                    (TargetRule::SelfOnly, Some(t)) if *t == actor => vec![actor],
                    (TargetRule::SelfOnly, Some(_)) => {
                        return Err(invalid(format!("{} can only target its user", ability.name)))
                    }
                    (TargetRule::SingleEnemy, Some(t)) => {
                        vec![self.check_target(actor, *t, false, character)?]
                    }
                    (TargetRule::SingleEnemy, None) => {
                        return Err(invalid(format!("{} needs a target", ability.name)))
                    }
                    (TargetRule::AllEnemies, _) => self.opponents(actor, character),
                    (TargetRule::SingleAlly, None) => vec![actor],
                    (TargetRule::SingleAlly, Some(t)) => {
                        vec![self.check_target(actor, *t, true, character)?]
                    }
                };

                Ok(Resolved::Ability {
                    ability: ability.clone(),
                    targets,
                })
            }

            Action::Item { id, target } => {
                let owned = match actor {
                    CombatantId::Character => character.inventory.contains(id),
                    CombatantId::Enemy(i) => self.enemies[i].pouch.contains(id),
                };
                if !owned {
                    return Err(ActionError::ItemNotFound(id.clone()));
                }

                if actor == CombatantId::Character {
                    if let Some(piece) = content.equipment_piece(id) {
                        return Ok(Resolved::Equip(piece.clone()));
                    }
                }

                let item = content
                    .item(id)
                    .filter(|item| item.category == ItemCategory::Consumable)
                    .ok_or_else(|| ActionError::ItemNotUsable(id.clone()))?;
                let target =
                    self.check_target(actor, *target, item.effect.is_supportive(), character)?;
                Ok(Resolved::Item {
                    item: item.clone(),
                    target,
                })
            }

            Action::Defend => Ok(Resolved::Defend),

            Action::Flee => {
                if actor != CombatantId::Character || !self.fleeable {
                    return Err(invalid("there is no escape from this fight"));
                }
                Ok(Resolved::Flee)
            }
        }
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    fn execute(
        &mut self,
        actor: CombatantId,
        resolved: Resolved,
        character: &mut Character,
        content: &Content,
        rng: &mut impl Rng,
    ) -> Vec<CombatEvent> {
        let balance = &content.balance.combat;
        let mut events = Vec::new();

        match resolved {
            Resolved::Attack(target) => {
                let damage = match (
                    as_dyn(actor, character, &self.enemies),
                    as_dyn(target, character, &self.enemies),
                ) {
                    (Some(a), Some(d)) => attack_damage(a, d, balance),
                    _ => return events,
                };
                events.push(CombatEvent::Attacked {
                    attacker: actor,
                    target,
                });
                if let Some(defender) = as_dyn_mut(target, character, &mut self.enemies) {
                    deal_damage(target, defender, damage, Affinity::Neutral, &mut events);
                }

                if let CombatantId::Enemy(i) = actor {
                    if let Some(on_hit) = self.enemies[i].on_hit {
                        if character.is_alive()
                            && rng.gen_range(0..100) < on_hit.chance_percent
                        {
                            character.apply_status(on_hit.status);
                            events.push(CombatEvent::StatusApplied {
                                target,
                                status: on_hit.status,
                            });
                        }
                    }
                }
            }

            Resolved::Ability { ability, targets } => {
                if let Some(user) = as_dyn_mut(actor, character, &mut self.enemies) {
                    if let Err(e) = user.spend_mp(ability.mp_cost) {
                        debug!("{} lost its turn: {}", user.name(), e);
                        return events;
                    }
                }
                events.push(CombatEvent::AbilityUsed {
                    user: actor,
                    ability: ability.id.clone(),
                    mp_spent: ability.mp_cost,
                });

                for target in targets {
                    if let Some(spec) = &ability.effect.damage {
                        let hit = match (
                            as_dyn(actor, character, &self.enemies),
                            as_dyn(target, character, &self.enemies),
                        ) {
                            (Some(a), Some(d)) => {
                                Some(ability_damage(spec, ability.element, a, d, balance))
                            }
                            _ => None,
                        };
                        if let (Some((amount, affinity)), Some(defender)) =
                            (hit, as_dyn_mut(target, character, &mut self.enemies))
                        {
                            deal_damage(target, defender, amount, affinity, &mut events);
                        }
                    }

                    let Some(recipient) = as_dyn_mut(target, character, &mut self.enemies) else {
                        continue;
                    };
                    if !recipient.is_alive() {
                        continue;
                    }
                    if ability.effect.heal > 0 {
                        let amount = recipient.heal(ability.effect.heal);
                        events.push(CombatEvent::Healed { target, amount });
                    }
                    if let Some(status) = ability.effect.inflict {
                        recipient.apply_status(status);
                        events.push(CombatEvent::StatusApplied { target, status });
                    }
                    for kind in &ability.effect.cure {
                        if recipient.cure_status(*kind) {
                            events.push(CombatEvent::StatusCured {
                                target,
                                kind: *kind,
                            });
                        }
                    }
                }
            }

            Resolved::Item { item, target } => {
                // Ownership was checked during validation.
                let _ = match actor {
                    CombatantId::Character => character.inventory.take_one(&item.id),
                    CombatantId::Enemy(i) => self.enemies[i].pouch.take_one(&item.id),
                };
                events.push(CombatEvent::ItemUsed {
                    user: actor,
                    item: item.id.clone(),
                    target,
                });

                let Some(recipient) = as_dyn_mut(target, character, &mut self.enemies) else {
                    return events;
                };
                let effect = &item.effect;
                if effect.damage > 0 {
                    deal_damage(target, recipient, effect.damage, Affinity::Neutral, &mut events);
                }
                if !recipient.is_alive() {
                    return events;
                }
                if effect.heal_hp > 0 {
                    let amount = recipient.heal(effect.heal_hp);
                    events.push(CombatEvent::Healed { target, amount });
                }
                if effect.restore_mp > 0 {
                    let amount = recipient.restore_mp(effect.restore_mp);
                    events.push(CombatEvent::ManaRestored { target, amount });
                }
                for kind in &effect.cure {
                    if recipient.cure_status(*kind) {
                        events.push(CombatEvent::StatusCured {
                            target,
                            kind: *kind,
                        });
                    }
                }
                if let Some(status) = effect.inflict {
                    recipient.apply_status(status);
                    events.push(CombatEvent::StatusApplied { target, status });
                }
            }

            Resolved::Equip(piece) => {
                let _ = character.inventory.take_one(&piece.id);
                let replaced = character.equipment.equip(piece.clone()).map(|old| {
                    character.inventory.add(&old.id, 1);
                    old.id
                });
                events.push(CombatEvent::Equipped {
                    item: piece.id,
                    replaced,
                });
            }

            Resolved::Defend => {
                let guard = StatusEffect::new(StatusKind::Guard, 1, balance.guard_reduction_percent);
                if let Some(user) = as_dyn_mut(actor, character, &mut self.enemies) {
                    user.apply_status(guard);
                }
                events.push(CombatEvent::Defended { who: actor });
            }

            Resolved::Flee => {
                let speeds: Vec<u32> = self
                    .living_enemies()
                    .map(|(_, e)| e.effective_attributes().speed())
                    .collect();
                let chance = flee_chance(character.effective_attributes().speed(), &speeds, balance);
                let success = rng.gen_range(0..100) < chance;
                events.push(CombatEvent::FleeAttempted {
                    chance_percent: chance,
                    success,
                });
                if success {
                    self.state = EncounterState::Fled;
                    self.queue.clear();
                }
            }
        }

        events
    }

    // =========================================================================
    // Turn flow
    // =========================================================================

    fn start_round(&mut self, character: &Character) -> CombatEvent {
        self.round += 1;
        let mut speeds = Vec::new();
        if character.is_alive() {
            speeds.push((
                CombatantId::Character,
                character.effective_attributes().speed(),
            ));
        }
        for (i, enemy) in self.living_enemies() {
            speeds.push((CombatantId::Enemy(i), enemy.effective_attributes().speed()));
        }
        let order = turn_order(&speeds);
        self.queue = order.iter().copied().collect();
        debug!("Round {} order: {:?}", self.round, order);
        CombatEvent::RoundStarted {
            round: self.round,
            order,
        }
    }

    /// Runs turns until the character must act or the encounter is over.
    fn advance(
        &mut self,
        character: &mut Character,
        content: &Content,
        rng: &mut impl Rng,
    ) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        loop {
            if self.state.is_terminal() {
                return events;
            }

            let Some(actor) = self.queue.pop_front() else {
                events.push(self.start_round(character));
                continue;
            };
            if !self.is_living(actor, character) {
                continue;
            }

            let Some(combatant) = as_dyn_mut(actor, character, &mut self.enemies) else {
                continue;
            };
            let tick = combatant.start_turn();
            let survived = combatant.is_alive();
            events.extend(tick_events(actor, &tick));
            if !survived {
                events.push(CombatEvent::CombatantDefeated { who: actor });
                self.state = EncounterState::CheckEnd;
                events.extend(self.check_end(character, content, rng));
                continue;
            }
            if tick.stunned {
                events.push(CombatEvent::TurnSkipped { who: actor });
                continue;
            }

            match actor {
                CombatantId::Character => {
                    self.state = EncounterState::AwaitingAction;
                    return events;
                }
                CombatantId::Enemy(i) => {
                    events.extend(self.enemy_turn(i, character, content, rng));
                }
            }
        }
    }

    fn enemy_turn(
        &mut self,
        index: usize,
        character: &mut Character,
        content: &Content,
        rng: &mut impl Rng,
    ) -> Vec<CombatEvent> {
        let me = CombatantId::Enemy(index);
        let action = ai::choose_action(index, &self.enemies[index], content, rng);
        match self.take_turn(me, &action, character, content, rng) {
            Ok(events) => events,
            Err(err) => {
                debug!(
                    "{} could not {:?} ({}), attacking instead",
                    self.enemies[index].name, action, err
                );
                let fallback = Action::Attack {
                    target: CombatantId::Character,
                };
                self.take_turn(me, &fallback, character, content, rng)
                    .unwrap_or_default()
            }
        }
    }

    /// Moves to a terminal state when one side is down. Victory rewards are
    /// paid exactly once.
    fn check_end(
        &mut self,
        character: &mut Character,
        content: &Content,
        rng: &mut impl Rng,
    ) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        match self.state {
            EncounterState::Fled => {
                info!("{} fled after {} rounds", character.name, self.round);
                events.push(CombatEvent::Fled);
            }
            state if state.is_terminal() => return events,
            _ if !character.is_alive() => {
                self.state = EncounterState::Defeat;
                info!("{} was defeated in round {}", character.name, self.round);
                events.push(CombatEvent::Defeat);
            }
            _ if self.enemies.iter().all(|e| !e.is_alive()) => {
                self.state = EncounterState::Victory;
                events.extend(self.grant_rewards(character, content, rng));
                events.push(CombatEvent::Victory);
            }
            _ => return events,
        }

        self.queue.clear();
        character.statuses.clear();
        events
    }

    fn grant_rewards(
        &mut self,
        character: &mut Character,
        content: &Content,
        rng: &mut impl Rng,
    ) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        if self.rewards_granted {
            return events;
        }
        self.rewards_granted = true;

        let experience: u64 = self.enemies.iter().map(|e| e.xp_yield).sum();
        let gold: u64 = self.enemies.iter().map(|e| e.gold_yield).sum();
        info!(
            "Victory in round {}: {} XP, {} gold",
            self.round, experience, gold
        );

        events.push(CombatEvent::ExperienceGained { amount: experience });
        for report in grant_experience(
            character,
            experience,
            &content.balance.progression,
            &content.unlocks,
        ) {
            events.push(CombatEvent::LevelUp(report));
        }

        if gold > 0 {
            character.gold = character.gold.saturating_add(gold);
            events.push(CombatEvent::GoldGained { amount: gold });
        }

        for (i, enemy) in self.enemies.iter().enumerate() {
            if let Some(loot) = enemy.loot.roll(rng) {
                character.inventory.add(&loot.item, loot.quantity);
                events.push(CombatEvent::LootDropped {
                    from: CombatantId::Enemy(i),
                    item: loot.item,
                    quantity: loot.quantity,
                });
            }
        }
        events
    }
}
