//! Quest Setup
//!
//! The quests dialogue content can start and complete.

use crate::quests::{Objective, QuestBook, QuestDef, ReputationReward, Requirement};

/// Create the quest book
pub fn create_quest_book() -> QuestBook {
    let mut book = QuestBook::new();

    // Needs both the crate in hand and two bandits questioned
    book.register(QuestDef {
        id: "lost_crate".to_string(),
        name: "The Lost Crate".to_string(),
        objectives: vec![Objective {
            id: "recover".to_string(),
            requirements: vec![
                Requirement::HasItem {
                    item: "supply_crate".to_string(),
                    quantity: 1,
                },
                Requirement::Counter {
                    counter: "bandits_questioned".to_string(),
                    target: 2,
                },
            ],
        }],
        rewards: vec![ReputationReward {
            faction: "merchants".into(),
            amount: 20.0,
        }],
    });

    book.register(QuestDef {
        id: "guard_patrol".to_string(),
        name: "Walk the Wall".to_string(),
        objectives: vec![Objective {
            id: "patrol".to_string(),
            requirements: vec![Requirement::Flag {
                flag: "patrol_done".to_string(),
            }],
        }],
        rewards: vec![ReputationReward {
            faction: "guards".into(),
            amount: 15.0,
        }],
    });

    book
}
