//! Social Simulation Core
//!
//! Directional multi-axis relationships, agent memory with grudges and
//! favors, a faction graph with reputation propagation, a social action
//! resolver, an NPC scheduler and a condition-gated dialogue engine.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod actions;
pub mod components;
pub mod config;
pub mod content;
pub mod dialogue;
pub mod error;
pub mod events;
pub mod quests;
pub mod setup;
pub mod systems;

pub use components::*;
pub use content::SocialContent;
pub use error::{ActionRejected, CollaboratorError, DialogueError, QuestError};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
