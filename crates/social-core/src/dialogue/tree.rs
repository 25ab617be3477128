//! Dialogue Trees
//!
//! Authored conversation graphs, loaded from JSON once at startup.

use serde::{de, Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::conditions::Condition;
use super::effects::Effect;
use crate::components::traits::Trait;

/// An NPC line: one string or several joined with a space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Line {
    Single(String),
    Many(Vec<String>),
}

impl Line {
    pub fn text(&self) -> String {
        match self {
            Line::Single(s) => s.clone(),
            Line::Many(lines) => lines.join(" "),
        }
    }
}

impl Default for Line {
    fn default() -> Self {
        Line::Single(String::new())
    }
}

/// One edge out of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub end: bool,
}

impl Choice {
    /// Whether taking this choice ends the conversation
    pub fn is_terminal(&self) -> bool {
        self.end || self.next.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    #[serde(default)]
    pub line: Line,
    /// Trait-conditioned replacements for `line`
    #[serde(default)]
    pub variants: HashMap<Trait, String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Applied every time the node is entered
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub end: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTree {
    pub id: String,
    pub start: String,
    pub nodes: BTreeMap<String, DialogueNode>,
}

impl DialogueTree {
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }
}

/// Every dialogue tree, keyed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogueLibrary {
    trees: BTreeMap<String, DialogueTree>,
}

impl DialogueLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON array of trees. A tree that starts on an end node is an error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let trees: Vec<DialogueTree> = serde_json::from_str(json)?;
        let mut library = Self::new();
        for tree in trees {
            if tree.node(&tree.start).is_some_and(|start| start.end) {
                return Err(de::Error::custom(format!(
                    "dialogue tree '{}' starts on an end node",
                    tree.id
                )));
            }
            library.insert(tree);
        }
        Ok(library)
    }

    pub fn insert(&mut self, tree: DialogueTree) {
        let missing: Vec<&str> = tree
            .nodes
            .values()
            .flat_map(|n| n.choices.iter())
            .filter_map(|c| c.next.as_deref())
            .chain(std::iter::once(tree.start.as_str()))
            .filter(|next| !tree.nodes.contains_key(*next))
            .collect();
        if !missing.is_empty() {
            tracing::warn!("Dialogue tree '{}' references missing nodes: {:?}", tree.id, missing);
        }
        self.trees.insert(tree.id.clone(), tree);
    }

    pub fn get(&self, id: &str) -> Option<&DialogueTree> {
        self.trees.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
