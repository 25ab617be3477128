//! Agent Components
//!
//! Identity, position, vitals, faction membership, traits, inventory and the
//! agent's own memory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::faction::FactionId;
use super::inventory::{Inventory, Item};
use super::memory::Memory;
use super::traits::{Trait, TraitRegistry, TraitSet};

/// Unique identifier for an agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// World position; distances are only defined within one chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub chunk: (i32, i32),
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(chunk: (i32, i32), x: i32, y: i32) -> Self {
        Self { chunk, x, y }
    }

    /// Manhattan distance, or None across chunks
    pub fn distance(&self, other: &Position) -> Option<i32> {
        if self.chunk != other.chunk {
            return None;
        }
        Some((self.x - other.x).abs() + (self.y - other.y).abs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub frozen: bool,
    pub in_combat: bool,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            health: 20,
            max_health: 20,
            alive: true,
            frozen: false,
            in_combat: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub strength: i32,
    pub charisma: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            strength: 10,
            charisma: 10,
        }
    }
}

/// A player or NPC
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub position: Position,
    pub vitals: Vitals,
    pub stats: Stats,
    pub faction: Option<FactionId>,
    pub traits: TraitSet,
    pub inventory: Inventory,
    pub gold: u32,
    /// Currently worn item; a disguise tag here can mask hostility
    pub equipped: Option<Item>,
    pub hostile: bool,
    pub is_player: bool,
    pub companion_of: Option<AgentId>,
    pub memory: Memory,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: Position::default(),
            vitals: Vitals::default(),
            stats: Stats::default(),
            faction: None,
            traits: TraitSet::empty(),
            inventory: Inventory::new(),
            gold: 0,
            equipped: None,
            hostile: false,
            is_player: false,
            companion_of: None,
            memory: Memory::default(),
        }
    }

    pub fn player(id: impl Into<AgentId>, name: impl Into<String>) -> Self {
        Self {
            is_player: true,
            ..Self::new(id, name)
        }
    }

    pub fn with_faction(mut self, faction: impl Into<FactionId>) -> Self {
        self.faction = Some(faction.into());
        self
    }

    pub fn with_traits(mut self, traits: TraitSet) -> Self {
        self.traits = traits;
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_gold(mut self, gold: u32) -> Self {
        self.gold = gold;
        self
    }

    pub fn with_stats(mut self, strength: i32, charisma: i32) -> Self {
        self.stats = Stats { strength, charisma };
        self
    }

    pub fn with_memory(mut self, memory: Memory) -> Self {
        self.memory = memory;
        self
    }

    pub fn has_trait(&self, t: Trait) -> bool {
        self.traits.has(t)
    }

    /// Strength-derived intimidation plus trait bonuses
    pub fn intimidation(&self, registry: &TraitRegistry) -> i32 {
        self.stats.strength / 2 + registry.intimidation(&self.traits)
    }

    /// Disguise tag of the equipped item, if any
    pub fn disguise(&self) -> Option<&str> {
        self.equipped.as_ref().and_then(|i| i.disguise.as_deref())
    }

    /// Alive, not frozen, not fighting
    pub fn is_available(&self) -> bool {
        self.vitals.alive && !self.vitals.frozen && !self.vitals.in_combat
    }
}

/// Every agent by id, iterated in id order
#[derive(Debug, Clone, Default)]
pub struct AgentRoster {
    agents: BTreeMap<AgentId, Agent>,
}

impl AgentRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, agent: Agent) -> Option<Agent> {
        self.agents.insert(agent.id.clone(), agent)
    }

    /// Despawns an agent. Its relationships stay in the store.
    pub fn remove(&mut self, id: &AgentId) -> Option<Agent> {
        self.agents.remove(id)
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn get_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().cloned().collect()
    }

    /// Members of a faction, in id order
    pub fn members_of(&self, faction: &FactionId) -> Vec<AgentId> {
        self.agents
            .values()
            .filter(|a| a.faction.as_ref() == Some(faction))
            .map(|a| a.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::inventory::ItemCategory;

    #[test]
    fn test_distance_within_chunk() {
        let a = Position::new((0, 0), 1, 1);
        let b = Position::new((0, 0), 4, 3);
        let c = Position::new((1, 0), 1, 1);
        assert_eq!(a.distance(&b), Some(5));
        assert_eq!(a.distance(&c), None);
    }

    #[test]
    fn test_intimidation() {
        let registry = TraitRegistry::standard();
        let brute = Agent::new("brute", "Brute")
            .with_stats(16, 4)
            .with_traits(TraitSet::new(&registry, &[Trait::Aggressive, Trait::Brave]).unwrap());
        assert_eq!(brute.intimidation(&registry), 8 + 3 + 2);

        let mouse = Agent::new("mouse", "Mouse")
            .with_stats(6, 10)
            .with_traits(TraitSet::new(&registry, &[Trait::Cowardly]).unwrap());
        assert_eq!(mouse.intimidation(&registry), 0);
    }

    #[test]
    fn test_disguise_tag() {
        let mut agent = Agent::new("thief", "Thief");
        assert_eq!(agent.disguise(), None);
        agent.equipped = Some(
            Item::new("banana_guard", "Banana Guard Outfit", ItemCategory::Disguise)
                .with_disguise("banana_guard"),
        );
        assert_eq!(agent.disguise(), Some("banana_guard"));
    }

    #[test]
    fn test_roster_members_sorted() {
        let mut roster = AgentRoster::new();
        roster.insert(Agent::new("guard_b", "B").with_faction("guards"));
        roster.insert(Agent::new("guard_a", "A").with_faction("guards"));
        roster.insert(Agent::new("farmer", "F").with_faction("villagers"));

        let guards = roster.members_of(&FactionId::from("guards"));
        assert_eq!(guards, vec![AgentId::from("guard_a"), AgentId::from("guard_b")]);
        assert!(roster.remove(&AgentId::from("farmer")).is_some());
        assert_eq!(roster.len(), 2);
    }
}
