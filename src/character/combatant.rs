//! The capability shared by everything that fights.

use super::attributes::Attributes;
use super::status::{StatusEffect, StatusEffects, StatusKind, StatusTick};
use crate::combat::elements::{Affinity, Element};
use crate::core::error::ActionError;
use serde::{Deserialize, Serialize};

/// A bounded resource (HP or MP). `current` never exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    current: u32,
    max: u32,
}

impl Pool {
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Builds a pool, clamping `current` into range.
    pub fn new(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    pub fn is_valid(&self) -> bool {
        self.current <= self.max
    }

    /// Current as a percentage of max (0-100).
    pub fn percent(&self) -> u32 {
        if self.max == 0 {
            return 0;
        }
        ((self.current as u64 * 100) / self.max as u64) as u32
    }

    /// Removes up to `amount`, returns what was actually removed.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.current);
        self.current -= removed;
        removed
    }

    /// Adds up to `amount` without passing max, returns what was actually added.
    pub fn fill(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.max.saturating_sub(self.current));
        self.current += added;
        added
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }

    pub fn raise_max(&mut self, amount: u32) {
        self.max = self.max.saturating_add(amount);
    }
}

/// Polymorphic view of a Character or an Enemy for the combat engine.
pub trait Combatant {
    fn name(&self) -> &str;
    fn hp(&self) -> &Pool;
    fn hp_mut(&mut self) -> &mut Pool;
    fn mp(&self) -> &Pool;
    fn mp_mut(&mut self) -> &mut Pool;
    fn base_attributes(&self) -> &Attributes;
    fn statuses(&self) -> &StatusEffects;
    fn statuses_mut(&mut self) -> &mut StatusEffects;

    /// Bonuses from equipped gear. Enemies carry none.
    fn equipment_bonuses(&self) -> Attributes {
        Attributes::default()
    }

    fn affinity(&self, _element: Element) -> Affinity {
        Affinity::Neutral
    }

    /// Base + equipment + status modifiers, recomputed on every call.
    fn effective_attributes(&self) -> Attributes {
        let mut attrs = *self.base_attributes();
        attrs.add(&self.equipment_bonuses());
        self.statuses().modify(&mut attrs);
        attrs
    }

    fn is_alive(&self) -> bool {
        !self.hp().is_empty()
    }

    /// Lowers HP, flooring at zero. Returns the damage actually taken.
    fn apply_damage(&mut self, amount: u32) -> u32 {
        self.hp_mut().drain(amount)
    }

    /// Restores HP up to max. The defeated cannot be healed.
    fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        self.hp_mut().fill(amount)
    }

    fn restore_mp(&mut self, amount: u32) -> u32 {
        self.mp_mut().fill(amount)
    }

    /// Pays an MP cost, or fails leaving MP untouched.
    fn spend_mp(&mut self, cost: u32) -> Result<(), ActionError> {
        let available = self.mp().current();
        if cost > available {
            return Err(ActionError::InsufficientMana {
                required: cost,
                available,
            });
        }
        self.mp_mut().drain(cost);
        Ok(())
    }

    fn apply_status(&mut self, effect: StatusEffect) {
        self.statuses_mut().apply(effect);
    }

    fn cure_status(&mut self, kind: StatusKind) -> bool {
        self.statuses_mut().cure(kind)
    }

    /// Ticks statuses and applies damage/healing over time. The returned tick
    /// holds the amounts actually applied.
    fn start_turn(&mut self) -> StatusTick {
        let mut tick = self.statuses_mut().tick();
        tick.damage = self.apply_damage(tick.damage);
        tick.healing = self.heal(tick.healing);
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_floors_at_zero() {
        let mut pool = Pool::full(10);
        assert_eq!(pool.drain(25), 10);
        assert_eq!(pool.current(), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_fill_caps_at_max() {
        let mut pool = Pool::new(4, 10);
        assert_eq!(pool.fill(100), 6);
        assert_eq!(pool.current(), 10);
    }

    #[test]
    fn test_new_clamps() {
        let pool = Pool::new(50, 10);
        assert_eq!(pool.current(), 10);
        assert!(pool.is_valid());
    }

    #[test]
    fn test_percent() {
        assert_eq!(Pool::new(25, 50).percent(), 50);
        assert_eq!(Pool::new(0, 0).percent(), 0);
    }
}
