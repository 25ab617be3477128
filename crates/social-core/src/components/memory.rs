//! Memory Components
//!
//! Each agent owns one `Memory`: a bounded episodic log, grudge and favor
//! ledgers scored with time decay on every read, a knowledge map and the
//! rumors it has heard.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::agent::AgentId;
use crate::config::MemoryConfig;

/// Something that happened to the owner of a memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MemoryEventKind {
    AttackedBy { by: AgentId, amount: f32 },
    InsultedBy { by: AgentId, amount: f32 },
    ThreatenedBy { by: AgentId, amount: f32 },
    StolenFrom { by: AgentId, amount: f32 },
    BetrayedBy { by: AgentId, amount: f32 },
    GiftFrom { by: AgentId, amount: f32 },
    HelpedBy { by: AgentId, amount: f32 },
    ComplimentedBy { by: AgentId, amount: f32 },
    SavedBy { by: AgentId, amount: f32 },
    Conversation {
        with: AgentId,
        turns: usize,
        final_node: String,
    },
    SocialAction { actor: AgentId, action: String },
    RumorHeard { from: AgentId, subject: String },
    Other { label: String },
}

/// A logged memory event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEvent {
    pub kind: MemoryEventKind,
    pub tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrudgeKind {
    Violence,
    Insult,
    Intimidation,
    Theft,
    Betrayal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavorKind {
    Gift,
    Help,
    Kindness,
    Rescue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grudge {
    pub kind: GrudgeKind,
    pub severity: f32,
    pub tick: u64,
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favor {
    pub kind: FavorKind,
    pub value: f32,
    pub tick: u64,
    pub repaid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Knowledge {
    pub value: String,
    pub tick: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rumor {
    pub subject: String,
    pub detail: String,
    pub source: Option<AgentId>,
    pub learned_tick: u64,
    pub spread_count: u32,
}

impl Rumor {
    pub fn new(subject: impl Into<String>, detail: impl Into<String>, tick: u64) -> Self {
        Self {
            subject: subject.into(),
            detail: detail.into(),
            source: None,
            learned_tick: tick,
            spread_count: 0,
        }
    }

    fn same_as(&self, subject: &str, detail: &str) -> bool {
        self.subject == subject && self.detail == detail
    }
}

enum Ledger {
    Grudge(AgentId, GrudgeKind, f32),
    Favor(AgentId, FavorKind, f32),
    LogOnly,
}

impl MemoryEventKind {
    fn ledger(&self) -> Ledger {
        use MemoryEventKind::*;
        match self {
            AttackedBy { by, amount } => Ledger::Grudge(by.clone(), GrudgeKind::Violence, *amount),
            InsultedBy { by, amount } => Ledger::Grudge(by.clone(), GrudgeKind::Insult, *amount),
            ThreatenedBy { by, amount } => {
                Ledger::Grudge(by.clone(), GrudgeKind::Intimidation, *amount)
            }
            StolenFrom { by, amount } => Ledger::Grudge(by.clone(), GrudgeKind::Theft, *amount),
            BetrayedBy { by, amount } => Ledger::Grudge(by.clone(), GrudgeKind::Betrayal, *amount),
            GiftFrom { by, amount } => Ledger::Favor(by.clone(), FavorKind::Gift, *amount),
            HelpedBy { by, amount } => Ledger::Favor(by.clone(), FavorKind::Help, *amount),
            ComplimentedBy { by, amount } => Ledger::Favor(by.clone(), FavorKind::Kindness, *amount),
            SavedBy { by, amount } => Ledger::Favor(by.clone(), FavorKind::Rescue, *amount),
            Conversation { .. } | SocialAction { .. } | RumorHeard { .. } | Other { .. } => {
                Ledger::LogOnly
            }
        }
    }
}

/// An agent's memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    #[serde(skip)]
    config: MemoryConfig,
    events: VecDeque<MemoryEvent>,
    grudges: BTreeMap<AgentId, Vec<Grudge>>,
    favors: BTreeMap<AgentId, Vec<Favor>>,
    knowledge: BTreeMap<String, Knowledge>,
    rumors: Vec<Rumor>,
}

impl Memory {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Logs an event and updates the grudge or favor ledger it belongs to
    pub fn remember(&mut self, kind: MemoryEventKind, tick: u64) {
        match kind.ledger() {
            Ledger::Grudge(entity, kind, severity) => {
                self.grudges.entry(entity).or_default().push(Grudge {
                    kind,
                    severity,
                    tick,
                    resolved: false,
                });
            }
            Ledger::Favor(entity, kind, value) => {
                self.favors.entry(entity).or_default().push(Favor {
                    kind,
                    value,
                    tick,
                    repaid: false,
                });
            }
            Ledger::LogOnly => {
                if let MemoryEventKind::Other { label } = &kind {
                    tracing::debug!("Unrecognized memory event '{}' logged without effect", label);
                }
            }
        }

        self.events.push_back(MemoryEvent { kind, tick });
        while self.events.len() > self.config.event_limit {
            self.events.pop_front();
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &MemoryEvent> {
        self.events.iter()
    }

    pub fn grudges_against(&self, entity: &AgentId) -> &[Grudge] {
        self.grudges.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn favors_from(&self, entity: &AgentId) -> &[Favor] {
        self.favors.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn grudge_score(&self, entity: &AgentId, tick: u64) -> f32 {
        let decay = self.config.grudge_decay;
        self.grudges_against(entity)
            .iter()
            .filter(|g| !g.resolved)
            .map(|g| g.severity * decay.powf(tick.saturating_sub(g.tick) as f32))
            .sum()
    }

    pub fn favor_score(&self, entity: &AgentId, tick: u64) -> f32 {
        let decay = self.config.favor_decay;
        self.favors_from(entity)
            .iter()
            .filter(|f| !f.repaid)
            .map(|f| f.value * decay.powf(tick.saturating_sub(f.tick) as f32))
            .sum()
    }

    /// Favor minus grudge toward an entity
    pub fn attitude(&self, entity: &AgentId, tick: u64) -> f32 {
        self.favor_score(entity, tick) - self.grudge_score(entity, tick)
    }

    /// Marks every grudge against an entity resolved. Returns how many changed.
    pub fn resolve_grudges_against(&mut self, entity: &AgentId) -> usize {
        let mut resolved = 0;
        if let Some(list) = self.grudges.get_mut(entity) {
            for g in list.iter_mut().filter(|g| !g.resolved) {
                g.resolved = true;
                resolved += 1;
            }
        }
        resolved
    }

    pub fn learn(&mut self, key: impl Into<String>, value: impl Into<String>, tick: u64) {
        self.knowledge.insert(
            key.into(),
            Knowledge {
                value: value.into(),
                tick,
            },
        );
    }

    pub fn recall(&self, key: &str) -> Option<&Knowledge> {
        self.knowledge.get(key)
    }

    /// Stores a rumor unless an identical (subject, detail) pair is known
    pub fn add_rumor(&mut self, rumor: Rumor) -> bool {
        if self.rumors.iter().any(|r| r.same_as(&rumor.subject, &rumor.detail)) {
            return false;
        }
        self.rumors.push(rumor);
        true
    }

    pub fn rumors(&self) -> &[Rumor] {
        &self.rumors
    }

    pub fn shareable_rumors(&self) -> impl Iterator<Item = &Rumor> {
        let limit = self.config.rumor_spread_limit;
        self.rumors.iter().filter(move |r| r.spread_count < limit)
    }

    /// Passes every shareable rumor to `recipient`. Only rumors the recipient
    /// did not already know count against the sharer's spread limit; those
    /// are returned as (subject, detail) pairs.
    pub fn share_rumors_with(
        &mut self,
        sharer: &AgentId,
        recipient: &mut Memory,
        tick: u64,
    ) -> Vec<(String, String)> {
        let limit = self.config.rumor_spread_limit;
        let mut transferred = Vec::new();

        for rumor in self.rumors.iter_mut().filter(|r| r.spread_count < limit) {
            let copy = Rumor {
                source: Some(sharer.clone()),
                learned_tick: tick,
                spread_count: 0,
                ..rumor.clone()
            };
            if !recipient.add_rumor(copy) {
                continue;
            }
            rumor.spread_count += 1;
            recipient.remember(
                MemoryEventKind::RumorHeard {
                    from: sharer.clone(),
                    subject: rumor.subject.clone(),
                },
                tick,
            );
            transferred.push((rumor.subject.clone(), rumor.detail.clone()));
        }
        transferred
    }

    /// Drops log entries older than `max_age` and settles old ledger entries
    pub fn prune_old_memories(&mut self, max_age: u64, tick: u64) {
        let too_old = |t: u64| tick.saturating_sub(t) > max_age;

        self.events.retain(|e| !too_old(e.tick));
        for g in self.grudges.values_mut().flatten() {
            if too_old(g.tick) {
                g.resolved = true;
            }
        }
        for f in self.favors.values_mut().flatten() {
            if too_old(f.tick) {
                f.repaid = true;
            }
        }
    }
}
