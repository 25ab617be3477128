//! Faction Components
//!
//! The static faction graph: authored inter-faction relations, value tags,
//! trait preferences and the disguise table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::traits::Trait;
use crate::config::FactionConfig;

/// Unique identifier for a faction
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(pub String);

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FactionId {
    fn from(s: &str) -> Self {
        FactionId(s.to_string())
    }
}

impl From<String> for FactionId {
    fn from(s: String) -> Self {
        FactionId(s)
    }
}

/// What a faction cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionValue {
    Community,
    Isolation,
    Order,
    Freedom,
    Wealth,
    Knowledge,
    Tradition,
    Violence,
}

/// A faction definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub values: Vec<FactionValue>,
    /// Authoring metadata: how much the faction likes each trait
    pub trait_preferences: Vec<(Trait, f32)>,
}

impl Faction {
    pub fn new(id: impl Into<FactionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            values: Vec::new(),
            trait_preferences: Vec::new(),
        }
    }

    pub fn with_values(mut self, values: &[FactionValue]) -> Self {
        self.values = values.to_vec();
        self
    }

    pub fn with_trait_preferences(mut self, prefs: &[(Trait, f32)]) -> Self {
        self.trait_preferences = prefs.to_vec();
        self
    }

    pub fn holds(&self, value: FactionValue) -> bool {
        self.values.contains(&value)
    }
}

/// Static faction data
#[derive(Debug, Clone, Default)]
pub struct FactionGraph {
    factions: BTreeMap<FactionId, Faction>,
    /// Maps (from, to) -> authored relation strength
    relations: BTreeMap<(FactionId, FactionId), f32>,
    /// Maps disguise tag -> faction it impersonates
    disguises: BTreeMap<String, FactionId>,
    config: FactionConfig,
}

impl FactionGraph {
    pub fn new(config: FactionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &FactionConfig {
        &self.config
    }

    pub fn register(&mut self, faction: Faction) {
        self.factions.insert(faction.id.clone(), faction);
    }

    /// Sets the relation `from` holds toward `to`
    pub fn set_relation(&mut self, from: impl Into<FactionId>, to: impl Into<FactionId>, value: f32) {
        self.relations.insert((from.into(), to.into()), value);
    }

    pub fn register_disguise(&mut self, tag: impl Into<String>, faction: impl Into<FactionId>) {
        self.disguises.insert(tag.into(), faction.into());
    }

    pub fn get(&self, id: &FactionId) -> Option<&Faction> {
        self.factions.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &FactionId> {
        self.factions.keys()
    }

    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }

    /// Authored relation; unknown factions read as neutral
    pub fn relation(&self, from: &FactionId, to: &FactionId) -> f32 {
        if !self.factions.contains_key(from) || !self.factions.contains_key(to) {
            tracing::debug!("Unknown faction in relation lookup: {} -> {}", from, to);
            return 0.0;
        }
        self.relations
            .get(&(from.clone(), to.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn are_factions_hostile(&self, a: &FactionId, b: &FactionId) -> bool {
        self.relation(a, b) < self.config.hostility_threshold
    }

    /// Whether members of `target_faction` treat the actor as hostile. A
    /// disguise impersonating the target faction suppresses hostility.
    pub fn is_hostile_toward(
        &self,
        actor_faction: Option<&FactionId>,
        disguise: Option<&str>,
        target_faction: &FactionId,
    ) -> bool {
        if let Some(tag) = disguise {
            if self.disguises.get(tag) == Some(target_faction) {
                return false;
            }
        }
        match actor_faction {
            Some(actor) => self.are_factions_hostile(target_faction, actor),
            None => false,
        }
    }

    /// Factions `faction` relates to at or above the ally threshold
    pub fn allies_of(&self, faction: &FactionId) -> Vec<FactionId> {
        self.factions
            .keys()
            .filter(|other| *other != faction)
            .filter(|other| self.relation(faction, other) >= self.config.ally_threshold)
            .cloned()
            .collect()
    }

    /// Factions `faction` relates to below the hostility threshold
    pub fn enemies_of(&self, faction: &FactionId) -> Vec<FactionId> {
        self.factions
            .keys()
            .filter(|other| *other != faction)
            .filter(|other| self.are_factions_hostile(faction, other))
            .cloned()
            .collect()
    }

    /// Whether an optional faction holds a value tag
    pub fn holds_value(&self, faction: Option<&FactionId>, value: FactionValue) -> bool {
        faction
            .and_then(|f| self.factions.get(f))
            .is_some_and(|f| f.holds(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::create_factions;

    fn id(s: &str) -> FactionId {
        FactionId::from(s)
    }

    #[test]
    fn test_guards_and_bandits_hostile() {
        let graph = create_factions(FactionConfig::default());
        assert_eq!(graph.relation(&id("guards"), &id("bandits")), -150.0);
        assert!(graph.are_factions_hostile(&id("guards"), &id("bandits")));
        assert!(!graph.are_factions_hostile(&id("guards"), &id("merchants")));
    }

    #[test]
    fn test_disguise_overrides_hostility() {
        let graph = create_factions(FactionConfig::default());
        let bandits = id("bandits");
        let guards = id("guards");

        assert!(graph.is_hostile_toward(Some(&bandits), None, &guards));
        assert!(!graph.is_hostile_toward(Some(&bandits), Some("banana_guard"), &guards));
        // Only the impersonated faction is fooled
        assert!(graph.is_hostile_toward(Some(&bandits), Some("merchant_robes"), &guards));
    }

    #[test]
    fn test_unknown_faction_is_neutral() {
        let graph = create_factions(FactionConfig::default());
        assert_eq!(graph.relation(&id("guards"), &id("pirates")), 0.0);
        assert!(!graph.are_factions_hostile(&id("pirates"), &id("guards")));
    }

    #[test]
    fn test_allies_and_enemies() {
        let graph = create_factions(FactionConfig::default());
        let guards = id("guards");
        assert!(graph.enemies_of(&guards).contains(&id("bandits")));
        assert!(graph.allies_of(&guards).contains(&id("merchants")));
        assert!(!graph.allies_of(&guards).contains(&guards));
    }

    #[test]
    fn test_value_tags() {
        let graph = create_factions(FactionConfig::default());
        assert!(graph.holds_value(Some(&id("villagers")), FactionValue::Community));
        assert!(!graph.holds_value(None, FactionValue::Community));
    }
}
