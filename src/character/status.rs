//! Timed status effects attached to combatants.

use super::attributes::{AttributeType, Attributes};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Loses `magnitude` HP at the start of each turn.
    Poison,
    /// Regains `magnitude` HP at the start of each turn.
    Regeneration,
    /// Skips the turn.
    Stun,
    StrengthUp,
    DefenseUp,
    SpeedUp,
    /// Lowers strength by `magnitude`.
    Weaken,
    /// Reduces incoming damage by `magnitude` percent.
    Guard,
}

impl StatusKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatusKind::Poison => "Poison",
            StatusKind::Regeneration => "Regeneration",
            StatusKind::Stun => "Stun",
            StatusKind::StrengthUp => "Strength Up",
            StatusKind::DefenseUp => "Defense Up",
            StatusKind::SpeedUp => "Speed Up",
            StatusKind::Weaken => "Weaken",
            StatusKind::Guard => "Guard",
        }
    }

    /// Harmful statuses are the ones a cure-all removes.
    pub fn is_harmful(&self) -> bool {
        matches!(
            self,
            StatusKind::Poison | StatusKind::Stun | StatusKind::Weaken
        )
    }

    /// Signed attribute modifier contributed by a status of this kind.
    fn modifier(&self, magnitude: u32) -> Option<(AttributeType, i64)> {
        let m = magnitude as i64;
        match self {
            StatusKind::StrengthUp => Some((AttributeType::Strength, m)),
            StatusKind::DefenseUp => Some((AttributeType::Defense, m)),
            StatusKind::SpeedUp => Some((AttributeType::Speed, m)),
            StatusKind::Weaken => Some((AttributeType::Strength, -m)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Remaining turns.
    pub duration: u32,
    pub magnitude: u32,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, duration: u32, magnitude: u32) -> Self {
        Self {
            kind,
            duration,
            magnitude,
        }
    }
}

/// What happened when a combatant's statuses ticked at the start of its turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTick {
    pub damage: u32,
    pub healing: u32,
    pub stunned: bool,
    pub expired: Vec<StatusKind>,
}

/// Ordered list of active statuses, at most one per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind).is_some_and(|e| e.duration > 0)
    }

    /// Appends the status, or refreshes an existing one of the same kind.
    /// A refresh replaces duration and magnitude; durations never stack.
    pub fn apply(&mut self, effect: StatusEffect) {
        match self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            Some(existing) => {
                existing.duration = effect.duration;
                existing.magnitude = effect.magnitude;
            }
            None => self.effects.push(effect),
        }
    }

    /// Removes a status. Returns whether it was present.
    pub fn cure(&mut self, kind: StatusKind) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.kind != kind);
        self.effects.len() != before
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Applies status modifiers on top of already-equipped attributes.
    pub fn modify(&self, attributes: &mut Attributes) {
        for effect in self.effects.iter().filter(|e| e.duration > 0) {
            if let Some((attr, delta)) = effect.kind.modifier(effect.magnitude) {
                attributes.shift(attr, delta);
            }
        }
    }

    /// Start-of-turn processing: drops statuses already at zero, totals
    /// damage/healing over time, notes a stun, then decrements every duration
    /// and removes the ones that reach zero.
    pub fn tick(&mut self) -> StatusTick {
        let mut tick = StatusTick::default();
        self.effects.retain(|e| {
            if e.duration == 0 {
                tick.expired.push(e.kind);
            }
            e.duration > 0
        });

        for effect in &mut self.effects {
            match effect.kind {
                StatusKind::Poison => tick.damage += effect.magnitude,
                StatusKind::Regeneration => tick.healing += effect.magnitude,
                StatusKind::Stun => tick.stunned = true,
                _ => {}
            }
            effect.duration -= 1;
        }

        self.effects.retain(|e| {
            if e.duration == 0 {
                tick.expired.push(e.kind);
            }
            e.duration > 0
        });
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reapply_replaces_duration() {
        let mut statuses = StatusEffects::new();
        statuses.apply(StatusEffect::new(StatusKind::Poison, 3, 4));
        statuses.apply(StatusEffect::new(StatusKind::Poison, 2, 4));
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses.get(StatusKind::Poison).unwrap().duration, 2);
    }

    #[test]
    fn test_apply_keeps_order() {
        let mut statuses = StatusEffects::new();
        statuses.apply(StatusEffect::new(StatusKind::Poison, 3, 4));
        statuses.apply(StatusEffect::new(StatusKind::DefenseUp, 3, 5));
        statuses.apply(StatusEffect::new(StatusKind::Poison, 1, 6));
        let kinds: Vec<_> = statuses.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![StatusKind::Poison, StatusKind::DefenseUp]);
    }

    #[test]
    fn test_tick_poison_and_expiry() {
        let mut statuses = StatusEffects::new();
        statuses.apply(StatusEffect::new(StatusKind::Poison, 2, 4));

        let first = statuses.tick();
        assert_eq!(first.damage, 4);
        assert!(first.expired.is_empty());

        let second = statuses.tick();
        assert_eq!(second.damage, 4);
        assert_eq!(second.expired, vec![StatusKind::Poison]);
        assert!(statuses.is_empty());
    }

    #[test]
    fn test_zero_duration_removed_without_effect() {
        let mut statuses = StatusEffects::new();
        statuses.apply(StatusEffect::new(StatusKind::Poison, 0, 9));
        let tick = statuses.tick();
        assert_eq!(tick.damage, 0);
        assert_eq!(tick.expired, vec![StatusKind::Poison]);
        assert!(statuses.is_empty());
    }

    #[test]
    fn test_stun_consumes_its_own_duration() {
        let mut statuses = StatusEffects::new();
        statuses.apply(StatusEffect::new(StatusKind::Stun, 1, 0));
        let tick = statuses.tick();
        assert!(tick.stunned);
        assert!(!statuses.has(StatusKind::Stun));
    }

    #[test]
    fn test_modifiers() {
        let mut statuses = StatusEffects::new();
        statuses.apply(StatusEffect::new(StatusKind::DefenseUp, 3, 5));
        statuses.apply(StatusEffect::new(StatusKind::Weaken, 2, 10));
        let mut attrs = Attributes::new(6, 2, 10, 5);
        statuses.modify(&mut attrs);
        assert_eq!(attrs.defense(), 7);
        assert_eq!(attrs.strength(), 0);
    }

    #[test]
    fn test_cure() {
        let mut statuses = StatusEffects::new();
        statuses.apply(StatusEffect::new(StatusKind::Poison, 3, 4));
        assert!(statuses.cure(StatusKind::Poison));
        assert!(!statuses.cure(StatusKind::Poison));
    }
}
