//! Static Content
//!
//! Everything loaded once at startup and read-only afterwards: trait table,
//! faction graph, action catalog, item catalog, dialogue library and tuning.

use bevy_ecs::prelude::*;

use crate::actions::{ActionCatalog, SocialResolver};
use crate::components::faction::FactionGraph;
use crate::components::inventory::ItemCatalog;
use crate::components::traits::TraitRegistry;
use crate::config::Tuning;
use crate::dialogue::{DialogueEngine, DialogueLibrary};
use crate::setup;
use crate::systems::reputation::ReputationPropagator;

/// Resource: read-only simulation content
#[derive(Resource, Debug, Clone)]
pub struct SocialContent {
    pub tuning: Tuning,
    pub traits: TraitRegistry,
    pub factions: FactionGraph,
    pub actions: ActionCatalog,
    pub items: ItemCatalog,
    pub dialogues: DialogueLibrary,
}

impl SocialContent {
    /// The built-in content set
    pub fn standard(tuning: Tuning) -> Result<Self, serde_json::Error> {
        Ok(Self {
            factions: setup::create_factions(tuning.faction),
            traits: TraitRegistry::standard(),
            actions: ActionCatalog::standard(),
            items: setup::create_item_catalog(),
            dialogues: setup::load_dialogue_library()?,
            tuning,
        })
    }

    pub fn resolver(&self) -> SocialResolver<'_> {
        SocialResolver::new(&self.actions, &self.traits, &self.factions)
    }

    pub fn propagator(&self) -> ReputationPropagator<'_> {
        ReputationPropagator::new(&self.factions)
    }

    pub fn dialogue_engine(&self) -> DialogueEngine<'_> {
        DialogueEngine::new(&self.dialogues, &self.items, self.propagator())
    }
}
