//! Shared event types and serialization for the social simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for the core crate and for any consumer of the
//! event stream (UI log, quest triggers, analytics).

pub mod event;
pub mod snapshot;

// Re-export event types
pub use event::{generate_event_id, Event, EventCategory, SocialEvent};

// Re-export snapshot types
pub use snapshot::{ChoiceRecord, FlagValue, RelationSnapshot};
