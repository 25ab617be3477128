//! Components
//!
//! Agents, traits, inventory, relationships, memory, factions and world state.

pub mod agent;
pub mod faction;
pub mod inventory;
pub mod memory;
pub mod relationship;
pub mod traits;
pub mod world;

pub use agent::{Agent, AgentId, AgentRoster, Position, Stats, Vitals};
pub use faction::{Faction, FactionGraph, FactionId, FactionValue};
pub use inventory::{Inventory, Item, ItemCatalog, ItemCategory, GOLD_ITEM};
pub use memory::{Memory, MemoryEventKind, Rumor};
pub use relationship::{Axis, RelationDelta, Relationship, RelationshipStore};
pub use traits::{Trait, TraitRegistry, TraitSet};
pub use world::{SocialWorld, StoryFlags, WorldClock, WorldDump};
