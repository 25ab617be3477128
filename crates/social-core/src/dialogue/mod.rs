//! Dialogue
//!
//! Authored trees, choice conditions, effects and the engine that walks a
//! conversation through them.

pub mod conditions;
pub mod effects;
pub mod engine;
pub mod tree;

pub use conditions::{evaluate_all, Condition, ConditionContext, Direction, Parties, Party};
pub use effects::{apply_all, Effect, EffectEnv};
pub use engine::{ConversationSlot, DialogueEngine, DialogueSession, RenderedChoice, RenderedNode};
pub use tree::{Choice, DialogueLibrary, DialogueNode, DialogueTree, Line};
