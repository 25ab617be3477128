//! World Setup
//!
//! Factions, items, quests, dialogue content and the village roster.

pub mod dialogues;
pub mod factions;
pub mod items;
pub mod quests;
pub mod village;

pub use dialogues::load_dialogue_library;
pub use factions::create_factions;
pub use items::create_item_catalog;
pub use quests::create_quest_book;
pub use village::{spawn_village, PLAYER_ID};
