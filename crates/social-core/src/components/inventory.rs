//! Inventory Components
//!
//! Items, per-agent inventories and the eagerly loaded item catalog used by
//! the item-grant primitive.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::CollaboratorError;

/// Reserved pseudo-item id for the gold balance
pub const GOLD_ITEM: &str = "gold";

/// Broad item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Potion,
    Food,
    Material,
    Weapon,
    Armor,
    Quest,
    Disguise,
}

impl ItemCategory {
    /// Stackable items merge into one entry by name
    pub fn stackable(&self) -> bool {
        matches!(self, ItemCategory::Potion | ItemCategory::Food | ItemCategory::Material)
    }
}

/// One inventory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category: ItemCategory,
    pub quantity: u32,
    /// Disguise tag, for disguise items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disguise: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            quantity: 1,
            disguise: None,
        }
    }

    pub fn with_disguise(mut self, tag: impl Into<String>) -> Self {
        self.disguise = Some(tag.into());
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Items carried by an agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item; stackables merge by name, other categories get new entries
    pub fn add(&mut self, item: Item) {
        if item.category.stackable() {
            if let Some(existing) = self.items.iter_mut().find(|i| i.name == item.name) {
                existing.quantity += item.quantity;
                return;
            }
            self.items.push(item);
            return;
        }

        for _ in 0..item.quantity.max(1) {
            self.items.push(Item {
                quantity: 1,
                ..item.clone()
            });
        }
    }

    /// Total quantity held of an item id
    pub fn count(&self, item_id: &str) -> u32 {
        self.items
            .iter()
            .filter(|i| i.id == item_id)
            .map(|i| i.quantity)
            .sum()
    }

    pub fn has(&self, item_id: &str, quantity: u32) -> bool {
        self.count(item_id) >= quantity.max(1)
    }

    /// Removes `quantity` units of an item id. Returns false (and removes
    /// nothing) if not enough are held.
    pub fn remove(&mut self, item_id: &str, quantity: u32) -> bool {
        if !self.has(item_id, quantity) {
            return false;
        }

        let mut remaining = quantity;
        for item in self.items.iter_mut().filter(|i| i.id == item_id) {
            let taken = remaining.min(item.quantity);
            item.quantity -= taken;
            remaining -= taken;
            if remaining == 0 {
                break;
            }
        }
        self.items.retain(|i| i.quantity > 0);
        true
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Static item definitions, loaded at startup
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<String, Item>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, item: Item) {
        self.items.insert(item.id.clone(), item);
    }

    pub fn get(&self, item_id: &str) -> Option<&Item> {
        self.items.get(item_id)
    }

    /// Creates `quantity` units of a catalog item
    pub fn instantiate(&self, item_id: &str, quantity: u32) -> Result<Item, CollaboratorError> {
        self.items
            .get(item_id)
            .map(|template| template.clone().with_quantity(quantity))
            .ok_or_else(|| CollaboratorError::UnknownItem(item_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn potion() -> Item {
        Item::new("healing_potion", "Healing Potion", ItemCategory::Potion)
    }

    fn sword() -> Item {
        Item::new("iron_sword", "Iron Sword", ItemCategory::Weapon)
    }

    #[test]
    fn test_potions_stack_by_name() {
        let mut inv = Inventory::new();
        inv.add(potion());
        inv.add(potion().with_quantity(2));
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.count("healing_potion"), 3);
    }

    #[test]
    fn test_weapons_get_new_entries() {
        let mut inv = Inventory::new();
        inv.add(sword());
        inv.add(sword().with_quantity(2));
        assert_eq!(inv.len(), 3);
        assert_eq!(inv.count("iron_sword"), 3);
    }

    #[test]
    fn test_remove_insufficient_is_noop() {
        let mut inv = Inventory::new();
        inv.add(potion());
        assert!(!inv.remove("healing_potion", 2));
        assert_eq!(inv.count("healing_potion"), 1);

        assert!(inv.remove("healing_potion", 1));
        assert!(inv.is_empty());
    }

    #[test]
    fn test_remove_across_entries() {
        let mut inv = Inventory::new();
        inv.add(sword().with_quantity(3));
        assert!(inv.remove("iron_sword", 2));
        assert_eq!(inv.count("iron_sword"), 1);
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn test_catalog_unknown_item() {
        let catalog = ItemCatalog::new();
        let err = catalog.instantiate("nothing", 1).unwrap_err();
        assert_eq!(err, CollaboratorError::UnknownItem("nothing".to_string()));
    }
}
