//! Configuration System
//!
//! Loads tuning parameters from a TOML file for easy adjustment without
//! recompiling. Every section falls back to its defaults when omitted.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tuning {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub relationship: RelationshipConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub faction: FactionConfig,
}

impl Tuning {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads from the given path, or uses defaults if it cannot be read
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", path.display(), e);
            Self::default()
        })
    }

    /// Serializes the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Simulation run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub default_ticks: u64,
    /// Ticks between progress lines in the demo binary
    pub report_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_ticks: 500,
            report_interval: 50,
        }
    }
}

/// Relationship store parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
    /// Interaction history entries kept per relationship
    pub history_limit: usize,
    /// Per-tick retention factors
    pub value_retention: f32,
    pub trust_retention: f32,
    pub fear_retention: f32,
    pub respect_retention: f32,
    /// Cooldown set after a resolved social action
    pub action_cooldown_ticks: u64,
    /// Overall attitude weights
    pub faction_attitude_weight: f32,
    pub trust_attitude_weight: f32,
    pub fear_attitude_weight: f32,
    pub respect_attitude_weight: f32,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            history_limit: 20,
            value_retention: 0.995,
            trust_retention: 0.996,
            fear_retention: 0.997,
            respect_retention: 0.996,
            action_cooldown_ticks: 2,
            faction_attitude_weight: 0.3,
            trust_attitude_weight: 0.2,
            fear_attitude_weight: 0.1,
            respect_attitude_weight: 0.2,
        }
    }
}

/// Memory parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Recent events kept in the episodic log
    pub event_limit: usize,
    /// Per-tick weight retention for grudges
    pub grudge_decay: f32,
    /// Per-tick weight retention for favors
    pub favor_decay: f32,
    /// A rumor stops being shareable once a copy has spread this often
    pub rumor_spread_limit: u32,
    /// Ticks between pruning passes
    pub prune_interval: u64,
    /// Entries older than this are pruned or marked settled
    pub max_age: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            event_limit: 20,
            grudge_decay: 0.985,
            favor_decay: 0.99,
            rumor_spread_limit: 3,
            prune_interval: 100,
            max_age: 1000,
        }
    }
}

/// NPC social scheduler parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub base_chance: f32,
    pub max_chance: f32,
    pub community_bonus: f32,
    pub isolation_penalty: f32,
    /// Manhattan distance for candidate targets
    pub interaction_radius: i32,
    pub friendly_threshold: f32,
    pub hostile_threshold: f32,
    /// Added to every candidate's intensity so strangers can be picked
    pub intensity_floor: f32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            base_chance: 0.10,
            max_chance: 0.30,
            community_bonus: 0.05,
            isolation_penalty: 0.05,
            interaction_radius: 5,
            friendly_threshold: 50.0,
            hostile_threshold: -20.0,
            intensity_floor: 10.0,
        }
    }
}

/// Faction graph and reputation propagation parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FactionConfig {
    /// Relations strictly below this are hostile
    pub hostility_threshold: f32,
    /// Relations at or above this count as allies
    pub ally_threshold: f32,
    /// Share of a standing change passed to allies
    pub ally_share: f32,
    /// Share of a standing change passed (negated) to enemies
    pub enemy_share: f32,
    /// Share applied to members' personal value toward the agent
    pub member_share: f32,
}

impl Default for FactionConfig {
    fn default() -> Self {
        Self {
            hostility_threshold: -50.0,
            ally_threshold: 50.0,
            ally_share: 0.5,
            enemy_share: 0.25,
            member_share: 0.2,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Generates a default tuning file content.
pub fn default_tuning_toml() -> String {
    r#"# Social simulation tuning

[simulation]
default_ticks = 500
report_interval = 50

[relationship]
history_limit = 20
value_retention = 0.995
trust_retention = 0.996
fear_retention = 0.997
respect_retention = 0.996
action_cooldown_ticks = 2
faction_attitude_weight = 0.3
trust_attitude_weight = 0.2
fear_attitude_weight = 0.1
respect_attitude_weight = 0.2

[memory]
event_limit = 20
grudge_decay = 0.985
favor_decay = 0.99
rumor_spread_limit = 3
prune_interval = 100
max_age = 1000

[scheduler]
base_chance = 0.10
max_chance = 0.30
community_bonus = 0.05
isolation_penalty = 0.05
interaction_radius = 5
friendly_threshold = 50.0
hostile_threshold = -20.0
intensity_floor = 10.0

[faction]
hostility_threshold = -50.0
ally_threshold = 50.0
ally_share = 0.5
enemy_share = 0.25
member_share = 0.2
"#
    .to_string()
}
