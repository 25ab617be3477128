//! Event Bus
//!
//! Every observable state change is pushed here with a sequential id. Events
//! accumulate until drained; when a sink is attached they are also appended
//! to a JSONL file.

use social_events::{generate_event_id, Event, EventCategory, SocialEvent};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Collects emitted events
#[derive(Debug)]
pub struct EventBus {
    writer: Option<BufWriter<File>>,
    pending: Vec<Event>,
    emitted: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::null()
    }
}

impl EventBus {
    /// Create a bus that also appends every event to a JSONL file
    pub fn with_sink(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            pending: Vec::new(),
            emitted: 0,
        })
    }

    /// Create a bus with no file sink
    pub fn null() -> Self {
        Self {
            writer: None,
            pending: Vec::new(),
            emitted: 0,
        }
    }

    /// Record an event and return its id
    pub fn emit(&mut self, tick: u64, kind: SocialEvent) -> String {
        self.emitted += 1;
        let event = Event::new(generate_event_id(self.emitted), tick, kind);
        tracing::trace!(id = %event.event_id, event = event.kind.name(), "emit");

        if let Some(ref mut writer) = self.writer {
            let written = event
                .to_jsonl()
                .map_err(std::io::Error::from)
                .and_then(|line| writeln!(writer, "{}", line));
            if let Err(e) = written {
                tracing::warn!("Failed to write event {}: {}", event.event_id, e);
            }
        }

        let id = event.event_id.clone();
        self.pending.push(event);
        id
    }

    /// Events not yet drained, oldest first
    pub fn events(&self) -> &[Event] {
        &self.pending
    }

    /// Pending events of one category
    pub fn by_category(&self, category: EventCategory) -> impl Iterator<Item = &Event> {
        self.pending
            .iter()
            .filter(move |e| e.kind.category() == category)
    }

    /// Take every pending event
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    /// Total events emitted since creation
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Flush the file sink
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush event bus: {}", e);
        }
    }
}
