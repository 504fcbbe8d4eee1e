//! One running game: the persistent state, the content it plays against, and
//! at most one live encounter.
//!
//! The session is the only place story rewards touch the character and the
//! only place combat outcomes are fed back to the orchestrator.

use super::error::{ActionError, SessionError, StoryError};
use super::game_state::GameState;
use crate::character::combatant::Combatant;
use crate::character::progression::{grant_experience, LevelUpReport};
use crate::character::save;
use crate::character::types::Character;
use crate::combat::logic::Encounter;
use crate::combat::types::{Action, CombatEvent};
use crate::content::Content;
use crate::items::{EquipmentSlot, ItemCategory};
use crate::story::orchestrator::Orchestrator;
use crate::story::types::{ResumePayload, Reward, StepDescriptor, StepId, StoryEvent};
use log::{debug, info};
use rand::Rng;

/// Everything one call moved forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    pub combat: Vec<CombatEvent>,
    pub story: Vec<StoryEvent>,
    /// Level-ups paid for by story rewards. Combat level-ups are reported as
    /// combat events.
    pub level_ups: Vec<LevelUpReport>,
}

/// What a consumable did when used outside of combat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUse {
    pub healed: u32,
    pub mana_restored: u32,
    pub cured: usize,
}

fn apply_reward(character: &mut Character, reward: &Reward, content: &Content) -> Vec<LevelUpReport> {
    for (item, quantity) in &reward.items {
        character.inventory.add(item, *quantity);
    }
    for id in &reward.equipment {
        match content.equipment_piece(id) {
            Some(piece) if character.equipment.get(piece.slot).is_none() => {
                character.equipment.equip(piece.clone());
            }
            _ => character.inventory.add(id, 1),
        }
    }
    for ability in &reward.abilities {
        character.learn_ability(ability);
    }
    character.gold = character.gold.saturating_add(reward.gold);

    let level_ups = grant_experience(
        character,
        reward.experience,
        &content.balance.progression,
        &content.unlocks,
    );
    if reward.restore {
        character.full_restore();
    }
    level_ups
}

pub struct Session {
    state: GameState,
    content: Content,
    encounter: Option<Encounter>,
}

impl Session {
    /// Starts a new story with the content's starting kit applied.
    pub fn new_game(name: &str, content: Content) -> Result<(Self, Progress), SessionError> {
        content.validate()?;
        let mut state = GameState::new(name.to_string());

        let kit = &content.starting_kit;
        for id in &kit.equipment {
            if let Some(piece) = content.equipment_piece(id) {
                state.character.equipment.equip(piece.clone());
            }
        }
        for (item, quantity) in &kit.items {
            state.character.inventory.add(item, *quantity);
        }
        for ability in &kit.abilities {
            state.character.learn_ability(ability);
        }
        info!("New game for {}", state.character.name);

        let mut session = Self {
            state,
            content,
            encounter: None,
        };
        let story = Orchestrator::new(&session.content.phases).start(&mut session.state.phase);
        let progress = session.absorb(Vec::new(), story);
        Ok((session, progress))
    }

    /// Resumes from a previously saved state.
    pub fn from_state(state: GameState, content: Content) -> Result<(Self, Progress), SessionError> {
        content.validate()?;
        let mut session = Self {
            state,
            content,
            encounter: None,
        };
        let story = Orchestrator::new(&session.content.phases).settle(&mut session.state.phase);
        let progress = session.absorb(Vec::new(), story);
        Ok((session, progress))
    }

    pub fn from_save(bytes: &[u8], content: Content) -> Result<(Self, Progress), SessionError> {
        let state = save::decode(bytes)?;
        Self::from_state(state, content)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn character(&self) -> &Character {
        &self.state.character
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn encounter(&self) -> Option<&Encounter> {
        self.encounter.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn character_mut(&mut self) -> &mut Character {
        &mut self.state.character
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn current_step(&self) -> StepDescriptor {
        Orchestrator::new(&self.content.phases).current_step(&self.state.phase)
    }

    /// Applies story rewards and bundles the events.
    fn absorb(&mut self, combat: Vec<CombatEvent>, story: Vec<StoryEvent>) -> Progress {
        let mut level_ups = Vec::new();
        for event in &story {
            if let StoryEvent::RewardGranted(reward) = event {
                debug!("Applying reward {:?}", reward);
                level_ups.extend(apply_reward(&mut self.state.character, reward, &self.content));
            }
        }
        Progress {
            combat,
            story,
            level_ups,
        }
    }

    /// Acknowledges a narrative beat or answers a choice. Combat steps are
    /// resolved through `start_encounter` and `act` instead.
    pub fn resume(&mut self, id: StepId, payload: ResumePayload) -> Result<Progress, SessionError> {
        if self.encounter.is_some() {
            return Err(SessionError::EncounterActive);
        }
        if matches!(payload, ResumePayload::CombatResult(_)) {
            return Err(StoryError::UnexpectedPayload.into());
        }
        let story =
            Orchestrator::new(&self.content.phases).resume(&mut self.state.phase, id, payload)?;
        Ok(self.absorb(Vec::new(), story))
    }

    /// Builds the encounter for the current combat step and runs it up to
    /// the character's first turn.
    pub fn start_encounter(&mut self, rng: &mut impl Rng) -> Result<Progress, SessionError> {
        if self.encounter.is_some() {
            return Err(SessionError::EncounterActive);
        }
        let StepDescriptor::Combat {
            enemies, fleeable, ..
        } = self.current_step()
        else {
            return Err(SessionError::NotACombatStep);
        };

        let mut encounter = Encounter::from_ids(&enemies, fleeable, &self.content)?;
        let combat = encounter.begin(&mut self.state.character, &self.content, rng);
        self.encounter = Some(encounter);
        self.finish_if_over(combat)
    }

    /// Submits the character's action in the live encounter.
    pub fn act(&mut self, action: Action, rng: &mut impl Rng) -> Result<Progress, SessionError> {
        let encounter = self.encounter.as_mut().ok_or(SessionError::NoEncounter)?;
        let combat = encounter.submit(action, &mut self.state.character, &self.content, rng)?;
        self.finish_if_over(combat)
    }

    fn finish_if_over(&mut self, combat: Vec<CombatEvent>) -> Result<Progress, SessionError> {
        let Some(outcome) = self.encounter.as_ref().and_then(Encounter::outcome) else {
            return Ok(self.absorb(combat, Vec::new()));
        };
        self.encounter = None;

        let orchestrator = Orchestrator::new(&self.content.phases);
        let id = self.state.phase.step_id();
        let story = orchestrator.resume(
            &mut self.state.phase,
            id,
            ResumePayload::CombatResult(outcome),
        )?;
        Ok(self.absorb(combat, story))
    }

    /// Uses a consumable or equips a piece of gear between fights.
    pub fn use_item(&mut self, id: &str) -> Result<ItemUse, SessionError> {
        if self.encounter.is_some() {
            return Err(SessionError::EncounterActive);
        }
        if self.content.equipment_piece(id).is_some() {
            self.equip(id)?;
            return Ok(ItemUse::default());
        }

        let character = &mut self.state.character;
        if !character.inventory.contains(id) {
            return Err(ActionError::ItemNotFound(id.to_string()).into());
        }
        let item = self
            .content
            .item(id)
            .filter(|item| item.category == ItemCategory::Consumable && item.effect.is_supportive())
            .ok_or_else(|| ActionError::ItemNotUsable(id.to_string()))?;

        character.inventory.take_one(id)?;
        let effect = &item.effect;
        let used = ItemUse {
            healed: character.heal(effect.heal_hp),
            mana_restored: character.restore_mp(effect.restore_mp),
            cured: effect
                .cure
                .iter()
                .filter(|kind| character.cure_status(**kind))
                .count(),
        };
        debug!("{} used {}: {:?}", character.name, id, used);
        Ok(used)
    }

    /// Equips a piece from the inventory; the replaced piece goes back in.
    pub fn equip(&mut self, id: &str) -> Result<Option<String>, SessionError> {
        if self.encounter.is_some() {
            return Err(SessionError::EncounterActive);
        }
        let piece = self
            .content
            .equipment_piece(id)
            .ok_or_else(|| ActionError::ItemNotUsable(id.to_string()))?;
        let character = &mut self.state.character;
        character.inventory.take_one(id)?;
        let replaced = character.equipment.equip(piece.clone()).map(|old| {
            character.inventory.add(&old.id, 1);
            old.id
        });
        Ok(replaced)
    }

    /// Takes off the piece in `slot` and puts it in the inventory.
    pub fn unequip(&mut self, slot: EquipmentSlot) -> Result<String, SessionError> {
        if self.encounter.is_some() {
            return Err(SessionError::EncounterActive);
        }
        let character = &mut self.state.character;
        let piece = character
            .equipment
            .unequip(slot)
            .ok_or(SessionError::SlotEmpty(slot))?;
        character.inventory.add(&piece.id, 1);
        debug!("{} unequipped {}", character.name, piece.id);
        Ok(piece.id)
    }

    // =========================================================================
    // Shop
    // =========================================================================

    /// Buy price of an item or piece of gear. Zero for anything not traded.
    pub fn price_of(&self, id: &str) -> u64 {
        self.content
            .item(id)
            .map(|item| item.price)
            .or_else(|| self.content.equipment_piece(id).map(|piece| piece.price))
            .unwrap_or(0)
    }

    /// Buys one unit into the inventory. Returns the gold left.
    pub fn buy(&mut self, id: &str) -> Result<u64, SessionError> {
        if self.encounter.is_some() {
            return Err(SessionError::EncounterActive);
        }
        let price = self.price_of(id);
        if price == 0 {
            return Err(SessionError::NotForSale(id.to_string()));
        }
        let character = &mut self.state.character;
        if character.gold < price {
            return Err(SessionError::NotEnoughGold {
                price,
                gold: character.gold,
            });
        }
        character.gold -= price;
        character.inventory.add(id, 1);
        info!("{} bought {} for {} gold", character.name, id, price);
        Ok(character.gold)
    }

    /// Sells one unit from the inventory. Returns the gold received.
    pub fn sell(&mut self, id: &str) -> Result<u64, SessionError> {
        if self.encounter.is_some() {
            return Err(SessionError::EncounterActive);
        }
        let value = self.content.balance.economy.sell_price(self.price_of(id));
        if value == 0 {
            return Err(SessionError::NotForSale(id.to_string()));
        }
        let character = &mut self.state.character;
        character.inventory.take_one(id)?;
        character.gold = character.gold.saturating_add(value);
        info!("{} sold {} for {} gold", character.name, id, value);
        Ok(value)
    }

    /// Encodes the current state. Not allowed mid-encounter.
    pub fn save_bytes(&self) -> Result<Vec<u8>, SessionError> {
        if self.encounter.is_some() {
            return Err(SessionError::EncounterActive);
        }
        Ok(save::encode(&self.state)?)
    }
}
