use serde::{Deserialize, Serialize};

pub const NUM_ATTRIBUTES: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Strength,
    Defense,
    Speed,
    Magic,
}

impl AttributeType {
    pub fn all() -> [AttributeType; NUM_ATTRIBUTES] {
        [
            AttributeType::Strength,
            AttributeType::Defense,
            AttributeType::Speed,
            AttributeType::Magic,
        ]
    }

    pub fn abbrev(&self) -> &str {
        match self {
            AttributeType::Strength => "STR",
            AttributeType::Defense => "DEF",
            AttributeType::Speed => "SPD",
            AttributeType::Magic => "MAG",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            AttributeType::Strength => 0,
            AttributeType::Defense => 1,
            AttributeType::Speed => 2,
            AttributeType::Magic => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attributes {
    values: [u32; NUM_ATTRIBUTES],
}

impl Attributes {
    pub fn new(strength: u32, defense: u32, speed: u32, magic: u32) -> Self {
        Self {
            values: [strength, defense, speed, magic],
        }
    }

    pub fn get(&self, attr: AttributeType) -> u32 {
        self.values[attr.index()]
    }

    pub fn set(&mut self, attr: AttributeType, value: u32) {
        self.values[attr.index()] = value;
    }

    pub fn strength(&self) -> u32 {
        self.get(AttributeType::Strength)
    }

    pub fn defense(&self) -> u32 {
        self.get(AttributeType::Defense)
    }

    pub fn speed(&self) -> u32 {
        self.get(AttributeType::Speed)
    }

    pub fn magic(&self) -> u32 {
        self.get(AttributeType::Magic)
    }

    /// Raises an attribute. Never lowers it.
    pub fn raise(&mut self, attr: AttributeType, amount: u32) {
        self.values[attr.index()] = self.values[attr.index()].saturating_add(amount);
    }

    /// Adds another Attributes' values to this one (for equipment bonuses).
    pub fn add(&mut self, other: &Attributes) {
        for attr in AttributeType::all() {
            self.raise(attr, other.get(attr));
        }
    }

    /// Applies a signed modifier, flooring the attribute at zero.
    pub fn shift(&mut self, attr: AttributeType, delta: i64) {
        let value = (self.get(attr) as i64 + delta).clamp(0, u32::MAX as i64);
        self.set(attr, value as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut attrs = Attributes::new(7, 2, 10, 5);
        attrs.set(AttributeType::Strength, 16);
        assert_eq!(attrs.strength(), 16);
        assert_eq!(attrs.defense(), 2);
    }

    #[test]
    fn test_add() {
        let mut attrs = Attributes::new(7, 2, 10, 5);
        attrs.add(&Attributes::new(3, 0, 1, 0));
        assert_eq!(attrs, Attributes::new(10, 2, 11, 5));
    }

    #[test]
    fn test_shift_floors_at_zero() {
        let mut attrs = Attributes::new(4, 2, 10, 5);
        attrs.shift(AttributeType::Strength, -10);
        assert_eq!(attrs.strength(), 0);
        attrs.shift(AttributeType::Defense, 5);
        assert_eq!(attrs.defense(), 7);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, attr) in AttributeType::all().iter().enumerate() {
            assert_eq!(attr.index(), i);
        }
    }
}
