//! Social Actions
//!
//! The action catalog, reaction lines and the resolver that applies them.

pub mod catalog;
pub mod reactions;
pub mod resolver;

pub use catalog::{
    ActionCatalog, ActionContext, ActionDef, ActionParams, AgentView, SideEffect, SocialActionKind,
};
pub use resolver::{ActionOutcome, SocialResolver};
