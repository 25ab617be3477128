//! Error types
//!
//! Rejections carry no state change. Collaborator errors are surfaced to the
//! caller synchronously.

use thiserror::Error;

use crate::components::agent::AgentId;

/// A social action that was not performed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionRejected {
    #[error("unknown social action '{0}'")]
    UnknownAction(String),
    #[error("unknown agent '{0}'")]
    UnknownAgent(AgentId),
    #[error("an agent cannot target itself")]
    SelfTarget,
    #[error("{action} refused: {reason}")]
    RequirementFailed { action: String, reason: String },
    #[error("on cooldown until tick {until}")]
    OnCooldown { until: u64 },
}

/// Failure in the quest subsystem
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuestError {
    #[error("unknown quest '{0}'")]
    UnknownQuest(String),
    #[error("quest '{0}' is not active")]
    NotActive(String),
}

/// Failure of an injected collaborator (item catalog, quest log)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollaboratorError {
    #[error("unknown item '{0}'")]
    UnknownItem(String),
    #[error("unknown agent '{0}'")]
    UnknownAgent(AgentId),
    #[error(transparent)]
    Quest(#[from] QuestError),
}

/// Dialogue engine failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DialogueError {
    #[error("a conversation is already in progress")]
    SessionActive,
    #[error("no conversation is in progress")]
    NoSession,
    #[error("unknown dialogue tree '{0}'")]
    UnknownTree(String),
    #[error("dialogue node '{0}' not found")]
    MissingNode(String),
    #[error("unknown agent '{0}'")]
    UnknownAgent(AgentId),
    #[error("choice {index} is not available ({available} offered)")]
    InvalidChoice { index: usize, available: usize },
    #[error("dialogue effect failed: {0}")]
    Collaborator(#[from] CollaboratorError),
}
