//! Relationship Components
//!
//! Directional multi-axis relationships between agents (A→B is independent
//! of B→A), per-agent faction standings, cooldowns and passive decay.

use serde::{Deserialize, Serialize};
use social_events::{RelationSnapshot, SocialEvent};
use std::collections::{HashMap, VecDeque};

use super::agent::AgentId;
use super::faction::FactionId;
use crate::config::RelationshipConfig;
use crate::events::EventBus;

/// Range of every signed axis and of faction standings
pub const AXIS_MIN: f32 = -100.0;
pub const AXIS_MAX: f32 = 100.0;

/// One of the four relationship axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Value,
    Trust,
    Fear,
    Respect,
}

impl Axis {
    /// Inclusive bounds of the axis
    pub fn range(&self) -> (f32, f32) {
        match self {
            Axis::Fear => (0.0, AXIS_MAX),
            _ => (AXIS_MIN, AXIS_MAX),
        }
    }

    pub fn read(&self, snapshot: &RelationSnapshot) -> f32 {
        match self {
            Axis::Value => snapshot.value,
            Axis::Trust => snapshot.trust,
            Axis::Fear => snapshot.fear,
            Axis::Respect => snapshot.respect,
        }
    }
}

/// Partial change to a relationship; absent fields are zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationDelta {
    pub value: f32,
    pub trust: f32,
    pub fear: f32,
    pub respect: f32,
}

impl RelationDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, v: f32) -> Self {
        self.value = v;
        self
    }

    pub fn trust(mut self, v: f32) -> Self {
        self.trust = v;
        self
    }

    pub fn fear(mut self, v: f32) -> Self {
        self.fear = v;
        self
    }

    pub fn respect(mut self, v: f32) -> Self {
        self.respect = v;
        self
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0 && self.trust == 0.0 && self.fear == 0.0 && self.respect == 0.0
    }
}

/// A recorded mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub delta: RelationDelta,
    pub reason: String,
    pub tick: u64,
}

/// How one agent feels about another
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub value: f32,
    pub trust: f32,
    pub fear: f32,
    pub respect: f32,
    /// Most recent mutations, oldest first
    pub history: VecDeque<HistoryEntry>,
    pub last_interaction: u64,
    pub cooldown_until: u64,
}

impl Relationship {
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Adds a delta and clamps every axis
    fn apply(&mut self, delta: &RelationDelta) {
        self.value = (self.value + delta.value).clamp(AXIS_MIN, AXIS_MAX);
        self.trust = (self.trust + delta.trust).clamp(AXIS_MIN, AXIS_MAX);
        self.fear = (self.fear + delta.fear).clamp(0.0, AXIS_MAX);
        self.respect = (self.respect + delta.respect).clamp(AXIS_MIN, AXIS_MAX);
    }

    fn decay(&mut self, config: &RelationshipConfig) {
        self.value *= config.value_retention;
        self.trust *= config.trust_retention;
        self.fear *= config.fear_retention;
        self.respect *= config.respect_retention;
    }

    pub fn snapshot(&self) -> RelationSnapshot {
        RelationSnapshot {
            value: self.value,
            trust: self.trust,
            fear: self.fear,
            respect: self.respect,
            last_interaction: self.last_interaction,
            cooldown_until: self.cooldown_until,
        }
    }
}

/// One row of a store dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub from: AgentId,
    pub to: AgentId,
    pub relationship: Relationship,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRecord {
    pub agent: AgentId,
    pub faction: FactionId,
    pub standing: f32,
}

/// Every directional relationship plus faction standings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipStore {
    /// Maps (from_agent_id, to_agent_id) -> Relationship
    relations: HashMap<(AgentId, AgentId), Relationship>,
    /// Maps (agent_id, faction_id) -> standing
    standings: HashMap<(AgentId, FactionId), f32>,
    config: RelationshipConfig,
}

impl RelationshipStore {
    pub fn new(config: RelationshipConfig) -> Self {
        Self {
            relations: HashMap::new(),
            standings: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RelationshipConfig {
        &self.config
    }

    /// Get relationship from one agent to another, creating a neutral one if absent
    pub fn get_relation(&mut self, from: &AgentId, to: &AgentId) -> &Relationship {
        self.relations
            .entry((from.clone(), to.clone()))
            .or_insert_with(Relationship::neutral)
    }

    /// Existing relationship, if any
    pub fn relation(&self, from: &AgentId, to: &AgentId) -> Option<&Relationship> {
        self.relations.get(&(from.clone(), to.clone()))
    }

    /// Read-only view; a missing relationship reads as neutral and is not created
    pub fn snapshot(&self, from: &AgentId, to: &AgentId) -> RelationSnapshot {
        self.relation(from, to)
            .map(Relationship::snapshot)
            .unwrap_or_default()
    }

    /// Adds a delta, clamps, records history and emits the post-mutation snapshot
    pub fn modify_relation(
        &mut self,
        from: &AgentId,
        to: &AgentId,
        delta: &RelationDelta,
        reason: &str,
        tick: u64,
        bus: &mut EventBus,
    ) -> RelationSnapshot {
        let limit = self.config.history_limit;
        let rel = self
            .relations
            .entry((from.clone(), to.clone()))
            .or_insert_with(Relationship::neutral);

        rel.apply(delta);
        rel.history.push_back(HistoryEntry {
            delta: *delta,
            reason: reason.to_string(),
            tick,
        });
        while rel.history.len() > limit {
            rel.history.pop_front();
        }
        rel.last_interaction = tick;

        let snapshot = rel.snapshot();
        bus.emit(
            tick,
            SocialEvent::RelationshipChanged {
                from: from.to_string(),
                to: to.to_string(),
                reason: reason.to_string(),
                snapshot,
            },
        );
        snapshot
    }

    /// Whether `a` may act on `b` this tick
    pub fn can_interact(&self, a: &AgentId, b: &AgentId, tick: u64) -> bool {
        tick >= self.cooldown_until(a, b)
    }

    pub fn cooldown_until(&self, a: &AgentId, b: &AgentId) -> u64 {
        self.relation(a, b).map_or(0, |r| r.cooldown_until)
    }

    /// Blocks `a` from acting on `b` for `turns` ticks; `b` toward `a` is unaffected
    pub fn set_cooldown(&mut self, a: &AgentId, b: &AgentId, turns: u64, tick: u64) {
        let rel = self
            .relations
            .entry((a.clone(), b.clone()))
            .or_insert_with(Relationship::neutral);
        rel.cooldown_until = tick + turns;
    }

    /// Applies per-axis retention to every stored relationship
    pub fn decay_relations(&mut self) {
        let config = self.config;
        for rel in self.relations.values_mut() {
            rel.decay(&config);
        }
    }

    pub fn faction_standing(&self, agent: &AgentId, faction: &FactionId) -> f32 {
        self.standings
            .get(&(agent.clone(), faction.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Adds to a faction standing, clamps and emits the change. Returns the new standing.
    pub fn modify_faction_standing(
        &mut self,
        agent: &AgentId,
        faction: &FactionId,
        delta: f32,
        tick: u64,
        bus: &mut EventBus,
    ) -> f32 {
        let standing = self
            .standings
            .entry((agent.clone(), faction.clone()))
            .or_insert(0.0);
        let old = *standing;
        *standing = (old + delta).clamp(AXIS_MIN, AXIS_MAX);
        let new = *standing;

        bus.emit(
            tick,
            SocialEvent::FactionStandingChanged {
                agent: agent.to_string(),
                faction: faction.to_string(),
                old_standing: old,
                new_standing: new,
            },
        );
        new
    }

    /// Composite attitude used for tone selection and menu colouring
    pub fn overall_attitude(
        &self,
        from: &AgentId,
        from_faction: Option<&FactionId>,
        to: &AgentId,
    ) -> f32 {
        let rel = self.snapshot(from, to);
        let faction_term = from_faction
            .map(|f| self.faction_standing(to, f) * self.config.faction_attitude_weight)
            .unwrap_or(0.0);

        rel.value + faction_term + rel.trust * self.config.trust_attitude_weight
            - rel.fear * self.config.fear_attitude_weight
            + rel.respect * self.config.respect_attitude_weight
    }

    /// Outgoing relationships of an agent
    pub fn relationships_from<'a>(
        &'a self,
        agent: &'a AgentId,
    ) -> impl Iterator<Item = (&'a AgentId, &'a Relationship)> + 'a {
        self.relations
            .iter()
            .filter(move |((from, _), _)| from == agent)
            .map(|((_, to), rel)| (to, rel))
    }

    /// Sorted, serializable rows of every relationship
    pub fn dump(&self) -> Vec<RelationRecord> {
        let mut rows: Vec<RelationRecord> = self
            .relations
            .iter()
            .map(|((from, to), rel)| RelationRecord {
                from: from.clone(),
                to: to.clone(),
                relationship: rel.clone(),
            })
            .collect();
        rows.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));
        rows
    }

    /// Sorted, serializable rows of every faction standing
    pub fn standings_dump(&self) -> Vec<StandingRecord> {
        let mut rows: Vec<StandingRecord> = self
            .standings
            .iter()
            .map(|((agent, faction), standing)| StandingRecord {
                agent: agent.clone(),
                faction: faction.clone(),
                standing: *standing,
            })
            .collect();
        rows.sort_by(|a, b| (&a.agent, &a.faction).cmp(&(&b.agent, &b.faction)));
        rows
    }

    /// Drops every relationship and standing involving an agent
    pub fn prune_agent(&mut self, agent: &AgentId) -> usize {
        let before = self.relations.len() + self.standings.len();
        self.relations
            .retain(|(from, to), _| from != agent && to != agent);
        self.standings.retain(|(a, _), _| a != agent);
        before - (self.relations.len() + self.standings.len())
    }

    /// Clears everything (new game)
    pub fn reset_all(&mut self) {
        self.relations.clear();
        self.standings.clear();
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
