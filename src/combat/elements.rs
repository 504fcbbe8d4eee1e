use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Element {
    #[default]
    Neutral,
    Physical,
    Fire,
    Ice,
    Shadow,
    Light,
    Nature,
    Arcane,
    Divine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Affinity {
    Immune,
    Resist,
    #[default]
    Neutral,
    Weak,
}

impl Affinity {
    /// Damage multiplier x100.
    pub fn multiplier(&self) -> u32 {
        match self {
            Affinity::Immune => 0,
            Affinity::Resist => 50,
            Affinity::Neutral => 100,
            Affinity::Weak => 150,
        }
    }
}

/// A combatant's elemental resistances and weaknesses. Elements not listed are
/// neutral.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affinities {
    entries: Vec<(Element, Affinity)>,
}

impl Affinities {
    pub fn new(entries: Vec<(Element, Affinity)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, element: Element) -> Affinity {
        self.entries
            .iter()
            .find(|(e, _)| *e == element)
            .map_or(Affinity::Neutral, |(_, a)| *a)
    }

    /// Scales damage by the affinity for `element`.
    pub fn scale(&self, element: Element, damage: u32) -> u32 {
        ((damage as u64 * self.get(element).multiplier() as u64) / 100) as u32
    }
}
