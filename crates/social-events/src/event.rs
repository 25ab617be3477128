//! Event Types
//!
//! Every notification the social core emits, wrapped in a numbered envelope.

use serde::{Deserialize, Serialize};

use crate::snapshot::{ChoiceRecord, FlagValue, RelationSnapshot};

/// Coarse event categories, used by consumers for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Relationship,
    Faction,
    Action,
    Dialogue,
    Inventory,
    Quest,
    World,
}

/// Payload of a single emitted event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SocialEvent {
    /// A directional relationship was mutated
    RelationshipChanged {
        from: String,
        to: String,
        reason: String,
        snapshot: RelationSnapshot,
    },
    /// An agent's standing with a faction changed
    FactionStandingChanged {
        agent: String,
        faction: String,
        old_standing: f32,
        new_standing: f32,
    },
    /// A faction change was cascaded to related factions and members
    ReputationPropagated {
        agent: String,
        origin_faction: String,
        amount: f32,
        affected_factions: Vec<(String, f32)>,
        affected_members: usize,
    },
    /// A social action resolved successfully
    ActionPerformed {
        actor: String,
        target: String,
        action: String,
    },
    /// A line spoken by an agent
    DialogueLine {
        speaker: String,
        listener: String,
        text: String,
    },
    DialogueStarted {
        session_id: String,
        player: String,
        npc: String,
        tree: String,
    },
    DialogueEnded {
        session_id: String,
        player: String,
        npc: String,
        tree: String,
        final_node: String,
        history: Vec<ChoiceRecord>,
    },
    /// A rumor was passed on
    RumorShared {
        teller: String,
        listener: String,
        subject: String,
        detail: String,
    },
    StoryFlagSet {
        flag: String,
        value: FlagValue,
    },
    ItemGranted {
        agent: String,
        item: String,
        quantity: u32,
    },
    ItemRemoved {
        agent: String,
        item: String,
        quantity: u32,
    },
    GoldTransferred {
        from: String,
        to: Option<String>,
        amount: u32,
    },
    QuestStarted {
        quest: String,
    },
    QuestCompleted {
        quest: String,
    },
    /// An NPC turned hostile toward an agent
    TurnedHostile {
        npc: String,
        toward: String,
    },
    Recruited {
        recruiter: String,
        recruit: String,
    },
    TradeOpened {
        buyer: String,
        seller: String,
    },
    /// Authored event emitted by dialogue content
    Custom {
        name: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
}

impl SocialEvent {
    /// Short machine name of the event
    pub fn name(&self) -> &str {
        match self {
            SocialEvent::RelationshipChanged { .. } => "relationship_changed",
            SocialEvent::FactionStandingChanged { .. } => "faction_standing_changed",
            SocialEvent::ReputationPropagated { .. } => "reputation_propagated",
            SocialEvent::ActionPerformed { .. } => "action_performed",
            SocialEvent::DialogueLine { .. } => "dialogue_line",
            SocialEvent::DialogueStarted { .. } => "dialogue_started",
            SocialEvent::DialogueEnded { .. } => "dialogue_ended",
            SocialEvent::RumorShared { .. } => "rumor_shared",
            SocialEvent::StoryFlagSet { .. } => "story_flag_set",
            SocialEvent::ItemGranted { .. } => "item_granted",
            SocialEvent::ItemRemoved { .. } => "item_removed",
            SocialEvent::GoldTransferred { .. } => "gold_transferred",
            SocialEvent::QuestStarted { .. } => "quest_started",
            SocialEvent::QuestCompleted { .. } => "quest_completed",
            SocialEvent::TurnedHostile { .. } => "turned_hostile",
            SocialEvent::Recruited { .. } => "recruited",
            SocialEvent::TradeOpened { .. } => "trade_opened",
            SocialEvent::Custom { name, .. } => name,
        }
    }

    pub fn category(&self) -> EventCategory {
        match self {
            SocialEvent::RelationshipChanged { .. } => EventCategory::Relationship,
            SocialEvent::FactionStandingChanged { .. }
            | SocialEvent::ReputationPropagated { .. } => EventCategory::Faction,
            SocialEvent::ActionPerformed { .. }
            | SocialEvent::Recruited { .. }
            | SocialEvent::TradeOpened { .. }
            | SocialEvent::RumorShared { .. } => EventCategory::Action,
            SocialEvent::DialogueLine { .. }
            | SocialEvent::DialogueStarted { .. }
            | SocialEvent::DialogueEnded { .. } => EventCategory::Dialogue,
            SocialEvent::ItemGranted { .. }
            | SocialEvent::ItemRemoved { .. }
            | SocialEvent::GoldTransferred { .. } => EventCategory::Inventory,
            SocialEvent::QuestStarted { .. } | SocialEvent::QuestCompleted { .. } => {
                EventCategory::Quest
            }
            SocialEvent::StoryFlagSet { .. }
            | SocialEvent::TurnedHostile { .. }
            | SocialEvent::Custom { .. } => EventCategory::World,
        }
    }
}

/// Numbered event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (e.g., "evt_00000042")
    pub event_id: String,
    /// Tick the event was emitted on
    pub tick: u64,
    pub kind: SocialEvent,
}

impl Event {
    pub fn new(event_id: impl Into<String>, tick: u64, kind: SocialEvent) -> Self {
        Self {
            event_id: event_id.into(),
            tick,
            kind,
        }
    }

    /// Serializes the event to a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}
