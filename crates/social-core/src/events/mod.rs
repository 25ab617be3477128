//! Event System
//!
//! The in-process event bus and its optional JSONL sink. Event types live in
//! the `social-events` crate.

pub mod bus;

pub use bus::EventBus;
pub use social_events::{Event, EventCategory, SocialEvent};
