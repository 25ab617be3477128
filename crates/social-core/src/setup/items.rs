//! Item Setup
//!
//! The static item catalog dialogue effects grant from.

use crate::components::inventory::{Item, ItemCatalog, ItemCategory};

/// (id, name, category)
const ITEMS: &[(&str, &str, ItemCategory)] = &[
    ("health_potion", "Health Potion", ItemCategory::Potion),
    ("antidote", "Antidote", ItemCategory::Potion),
    ("bread", "Loaf of Bread", ItemCategory::Food),
    ("apple", "Apple", ItemCategory::Food),
    ("iron_ore", "Iron Ore", ItemCategory::Material),
    ("herbs", "Bundle of Herbs", ItemCategory::Material),
    ("iron_sword", "Iron Sword", ItemCategory::Weapon),
    ("hunting_bow", "Hunting Bow", ItemCategory::Weapon),
    ("leather_armor", "Leather Armor", ItemCategory::Armor),
    ("supply_crate", "Merchant Supply Crate", ItemCategory::Quest),
    ("gate_pass", "Signed Gate Pass", ItemCategory::Quest),
];

/// (id, name, disguise tag)
const DISGUISES: &[(&str, &str, &str)] = &[
    ("banana_guard", "Banana Guard Outfit", "banana_guard"),
    ("bandit_mask", "Bandit Mask", "bandit_mask"),
    ("merchant_robes", "Merchant Robes", "merchant_robes"),
];

/// Create the item catalog
pub fn create_item_catalog() -> ItemCatalog {
    let mut catalog = ItemCatalog::new();
    for (id, name, category) in ITEMS {
        catalog.register(Item::new(*id, *name, *category));
    }
    for (id, name, tag) in DISGUISES {
        catalog.register(Item::new(*id, *name, ItemCategory::Disguise).with_disguise(*tag));
    }
    catalog
}
