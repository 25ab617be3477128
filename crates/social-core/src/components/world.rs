//! World State
//!
//! `SocialWorld` bundles everything the resolver, dialogue engine and tick
//! systems mutate: the clock, agents, relationships, story flags, the quest
//! collaborator and the event bus.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use social_events::{FlagValue, SocialEvent};
use std::collections::BTreeMap;

use super::agent::{Agent, AgentId, AgentRoster};
use super::memory::Memory;
use super::relationship::{RelationRecord, RelationshipStore, StandingRecord};
use crate::config::Tuning;
use crate::events::EventBus;
use crate::quests::{QuestBook, QuestLog};

/// Current simulation tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldClock {
    pub tick: u64,
}

impl WorldClock {
    pub fn advance_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// Global named switches gating later content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryFlags(BTreeMap<String, FlagValue>);

impl StoryFlags {
    pub fn set(&mut self, flag: impl Into<String>, value: FlagValue) {
        self.0.insert(flag.into(), value);
    }

    pub fn get(&self, flag: &str) -> Option<&FlagValue> {
        self.0.get(flag)
    }

    /// Present and truthy
    pub fn is_set(&self, flag: &str) -> bool {
        self.0.get(flag).is_some_and(FlagValue::is_truthy)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Serializable dump of the mutable social state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldDump {
    pub tick: u64,
    pub relations: Vec<RelationRecord>,
    pub standings: Vec<StandingRecord>,
    pub memories: BTreeMap<AgentId, Memory>,
    pub flags: StoryFlags,
}

/// Resource: the mutable social state
#[derive(Resource, Debug)]
pub struct SocialWorld {
    pub clock: WorldClock,
    pub agents: AgentRoster,
    pub relations: RelationshipStore,
    pub flags: StoryFlags,
    pub quests: Box<dyn QuestLog>,
    pub bus: EventBus,
}

impl SocialWorld {
    pub fn new(tuning: &Tuning, quests: Box<dyn QuestLog>, bus: EventBus) -> Self {
        Self {
            clock: WorldClock::default(),
            agents: AgentRoster::new(),
            relations: RelationshipStore::new(tuning.relationship),
            flags: StoryFlags::default(),
            quests,
            bus,
        }
    }

    /// Default tuning, an empty quest book and no event sink
    pub fn with_defaults() -> Self {
        Self::new(&Tuning::default(), Box::new(QuestBook::new()), EventBus::null())
    }

    pub fn tick(&self) -> u64 {
        self.clock.tick
    }

    pub fn spawn(&mut self, agent: Agent) {
        self.agents.insert(agent);
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn agent_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn set_story_flag(&mut self, flag: &str, value: FlagValue, tick: u64) {
        self.flags.set(flag, value.clone());
        self.bus.emit(
            tick,
            SocialEvent::StoryFlagSet {
                flag: flag.to_string(),
                value,
            },
        );
    }

    pub fn story_flag(&self, flag: &str) -> Option<&FlagValue> {
        self.flags.get(flag)
    }

    /// Everything needed to reconstruct relationships, memories and flags
    pub fn dump(&self) -> WorldDump {
        WorldDump {
            tick: self.clock.tick,
            relations: self.relations.dump(),
            standings: self.relations.standings_dump(),
            memories: self
                .agents
                .iter()
                .map(|a| (a.id.clone(), a.memory.clone()))
                .collect(),
            flags: self.flags.clone(),
        }
    }
}
