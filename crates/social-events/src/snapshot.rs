//! Snapshot Types
//!
//! Plain value records carried inside events: relationship state after a
//! mutation, dialogue choice history and story flag values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Post-mutation view of one directional relationship
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelationSnapshot {
    pub value: f32,
    pub trust: f32,
    pub fear: f32,
    pub respect: f32,
    pub last_interaction: u64,
    pub cooldown_until: u64,
}

impl RelationSnapshot {
    /// Sum of absolute axis magnitudes
    pub fn intensity(&self) -> f32 {
        self.value.abs() + self.trust.abs() + self.fear.abs() + self.respect.abs()
    }
}

/// One selected dialogue choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    /// Node the choice was made on
    pub node_id: String,
    /// Index into the node's declared choice list
    pub choice_index: usize,
    /// Display text of the choice
    pub text: String,
    pub tick: u64,
}

/// Value stored under a story flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl FlagValue {
    /// Whether the flag counts as "set" for gating purposes
    pub fn is_truthy(&self) -> bool {
        match self {
            FlagValue::Bool(b) => *b,
            FlagValue::Number(n) => *n != 0,
            FlagValue::Text(s) => !s.is_empty(),
        }
    }
}

impl Default for FlagValue {
    fn default() -> Self {
        FlagValue::Bool(true)
    }
}

impl From<bool> for FlagValue {
    fn from(b: bool) -> Self {
        FlagValue::Bool(b)
    }
}

impl From<i64> for FlagValue {
    fn from(n: i64) -> Self {
        FlagValue::Number(n)
    }
}

impl From<&str> for FlagValue {
    fn from(s: &str) -> Self {
        FlagValue::Text(s.to_string())
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Number(n) => write!(f, "{}", n),
            FlagValue::Text(s) => write!(f, "{}", s),
        }
    }
}
