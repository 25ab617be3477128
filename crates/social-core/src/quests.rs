//! Quest Subsystem
//!
//! The quest collaborator the dialogue engine talks to. `QuestLog` is the
//! seam; `QuestBook` is the default in-memory implementation with composite
//! objectives and reputation rewards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::components::agent::Agent;
use crate::components::faction::FactionId;
use crate::components::world::StoryFlags;
use crate::error::QuestError;

/// Faction standing granted on completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationReward {
    pub faction: FactionId,
    pub amount: f32,
}

/// Quest start/complete primitive consumed by dialogue effects
pub trait QuestLog: fmt::Debug + Send + Sync {
    /// Starts a quest. Returns false if it was already started or finished.
    fn start_quest(&mut self, quest: &str, tick: u64) -> Result<bool, QuestError>;

    /// Completes an active quest and hands back its reputation rewards
    fn complete_quest(&mut self, quest: &str, tick: u64)
        -> Result<Vec<ReputationReward>, QuestError>;

    fn is_active(&self, quest: &str) -> bool;

    /// Adds progress to a quest counter and returns the new value
    fn advance_counter(&mut self, quest: &str, counter: &str, by: u32) -> Result<u32, QuestError>;

    /// Whether every requirement of one objective currently holds
    fn objective_complete(
        &self,
        quest: &str,
        objective: &str,
        player: &Agent,
        flags: &StoryFlags,
    ) -> bool;
}

/// One independently tracked sub-condition of an objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    HasItem { item: String, quantity: u32 },
    Counter { counter: String, target: u32 },
    Flag { flag: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub requirements: Vec<Requirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestDef {
    pub id: String,
    pub name: String,
    pub objectives: Vec<Objective>,
    pub rewards: Vec<ReputationReward>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuestState {
    Active { started: u64 },
    Completed { started: u64, finished: u64 },
}

/// Default quest log
#[derive(Debug, Clone, Default)]
pub struct QuestBook {
    defs: BTreeMap<String, QuestDef>,
    states: BTreeMap<String, QuestState>,
    /// Maps (quest, counter) -> progress
    counters: BTreeMap<(String, String), u32>,
}

impl QuestBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: QuestDef) {
        self.defs.insert(def.id.clone(), def);
    }

    pub fn get(&self, quest: &str) -> Option<&QuestDef> {
        self.defs.get(quest)
    }

    pub fn state(&self, quest: &str) -> Option<QuestState> {
        self.states.get(quest).copied()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn counter(&self, quest: &str, counter: &str) -> u32 {
        self.counters
            .get(&(quest.to_string(), counter.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn requirement_met(
        &self,
        quest: &str,
        requirement: &Requirement,
        player: &Agent,
        flags: &StoryFlags,
    ) -> bool {
        match requirement {
            Requirement::HasItem { item, quantity } => player.inventory.has(item, *quantity),
            Requirement::Counter { counter, target } => self.counter(quest, counter) >= *target,
            Requirement::Flag { flag } => flags.is_set(flag),
        }
    }
}

impl QuestLog for QuestBook {
    fn start_quest(&mut self, quest: &str, tick: u64) -> Result<bool, QuestError> {
        if !self.defs.contains_key(quest) {
            return Err(QuestError::UnknownQuest(quest.to_string()));
        }
        if self.states.contains_key(quest) {
            return Ok(false);
        }
        self.states
            .insert(quest.to_string(), QuestState::Active { started: tick });
        tracing::info!("Quest '{}' started at tick {}", quest, tick);
        Ok(true)
    }

    fn complete_quest(
        &mut self,
        quest: &str,
        tick: u64,
    ) -> Result<Vec<ReputationReward>, QuestError> {
        let def = self
            .defs
            .get(quest)
            .ok_or_else(|| QuestError::UnknownQuest(quest.to_string()))?;

        match self.states.get(quest).copied() {
            Some(QuestState::Active { started }) => {
                self.states.insert(
                    quest.to_string(),
                    QuestState::Completed {
                        started,
                        finished: tick,
                    },
                );
                tracing::info!("Quest '{}' completed at tick {}", quest, tick);
                Ok(def.rewards.clone())
            }
            _ => Err(QuestError::NotActive(quest.to_string())),
        }
    }

    fn is_active(&self, quest: &str) -> bool {
        matches!(self.states.get(quest), Some(QuestState::Active { .. }))
    }

    fn advance_counter(&mut self, quest: &str, counter: &str, by: u32) -> Result<u32, QuestError> {
        if !self.defs.contains_key(quest) {
            return Err(QuestError::UnknownQuest(quest.to_string()));
        }
        let value = self
            .counters
            .entry((quest.to_string(), counter.to_string()))
            .or_insert(0);
        *value += by;
        Ok(*value)
    }

    fn objective_complete(
        &self,
        quest: &str,
        objective: &str,
        player: &Agent,
        flags: &StoryFlags,
    ) -> bool {
        let Some(def) = self.defs.get(quest) else {
            tracing::debug!("Objective check on unknown quest '{}'", quest);
            return false;
        };
        def.objectives
            .iter()
            .find(|o| o.id == objective)
            .is_some_and(|o| {
                o.requirements
                    .iter()
                    .all(|r| self.requirement_met(quest, r, player, flags))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::inventory::{Item, ItemCategory};

    fn book() -> QuestBook {
        let mut book = QuestBook::new();
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
                faction: FactionId::from("merchants"),
                amount: 20.0,
            }],
        });
        book
    }

    #[test]
    fn test_lifecycle() {
        let mut book = book();
        assert!(!book.is_active("lost_crate"));
        assert!(book.start_quest("lost_crate", 1).unwrap());
        assert!(!book.start_quest("lost_crate", 2).unwrap());
        assert!(book.is_active("lost_crate"));

        let rewards = book.complete_quest("lost_crate", 5).unwrap();
        assert_eq!(rewards.len(), 1);
        assert!(!book.is_active("lost_crate"));
        assert_eq!(
            book.state("lost_crate"),
            Some(QuestState::Completed {
                started: 1,
                finished: 5
            })
        );
    }

    #[test]
    fn test_errors() {
        let mut book = book();
        assert_eq!(
            book.start_quest("nope", 0),
            Err(QuestError::UnknownQuest("nope".to_string()))
        );
        assert_eq!(
            book.complete_quest("lost_crate", 0),
            Err(QuestError::NotActive("lost_crate".to_string()))
        );
    }

    #[test]
    fn test_composite_objective_needs_every_requirement() {
        let mut book = book();
        let flags = StoryFlags::default();
        let mut player = Agent::player("player", "Player");

        assert!(!book.objective_complete("lost_crate", "recover", &player, &flags));

        player
            .inventory
            .add(Item::new("supply_crate", "Supply Crate", ItemCategory::Quest));
        assert!(!book.objective_complete("lost_crate", "recover", &player, &flags));

        book.advance_counter("lost_crate", "bandits_questioned", 1).unwrap();
        assert!(!book.objective_complete("lost_crate", "recover", &player, &flags));
        assert_eq!(book.advance_counter("lost_crate", "bandits_questioned", 1), Ok(2));
        assert!(book.objective_complete("lost_crate", "recover", &player, &flags));

        assert!(!book.objective_complete("lost_crate", "missing", &player, &flags));
    }
}
