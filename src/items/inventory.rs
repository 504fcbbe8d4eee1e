use crate::core::error::ActionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multiset of item/equipment ids. Empty stacks are dropped, so every stored
/// quantity is at least one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    stacks: BTreeMap<String, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quantity(&self, id: &str) -> u32 {
        self.stacks.get(id).copied().unwrap_or(0)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.quantity(id) > 0
    }

    pub fn add(&mut self, id: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let stack = self.stacks.entry(id.to_string()).or_insert(0);
        *stack = stack.saturating_add(quantity);
    }

    /// Takes one unit out. Fails without changes when the stack is empty.
    pub fn take_one(&mut self, id: &str) -> Result<(), ActionError> {
        match self.stacks.get_mut(id) {
            Some(stack) if *stack > 0 => {
                *stack -= 1;
                if *stack == 0 {
                    self.stacks.remove(id);
                }
                Ok(())
            }
            _ => Err(ActionError::ItemNotFound(id.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.stacks.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn total_units(&self) -> u32 {
        self.stacks.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_take() {
        let mut inv = Inventory::new();
        inv.add("healing_potion", 2);
        inv.take_one("healing_potion").unwrap();
        assert_eq!(inv.quantity("healing_potion"), 1);
        inv.take_one("healing_potion").unwrap();
        assert!(!inv.contains("healing_potion"));
        assert!(inv.is_empty());
    }

    #[test]
    fn test_take_missing_fails_without_change() {
        let mut inv = Inventory::new();
        inv.add("antidote", 1);
        let err = inv.take_one("healing_potion").unwrap_err();
        assert_eq!(err, ActionError::ItemNotFound("healing_potion".to_string()));
        assert_eq!(inv.total_units(), 1);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut inv = Inventory::new();
        inv.add("antidote", 0);
        assert!(inv.is_empty());
    }

    #[test]
    fn test_iter_is_sorted_by_id() {
        let mut inv = Inventory::new();
        inv.add("mana_potion", 1);
        inv.add("antidote", 3);
        let ids: Vec<_> = inv.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["antidote", "mana_potion"]);
    }
}
