//! Reputation Propagation
//!
//! A change to an agent's standing with one faction spills over to the
//! faction's allies and enemies and to how its members feel about the agent.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use social_events::SocialEvent;

use crate::components::agent::AgentId;
use crate::components::faction::{FactionGraph, FactionId};
use crate::components::relationship::RelationDelta;
use crate::components::world::SocialWorld;
use crate::content::SocialContent;

/// Reason recorded on member relationships touched by propagation
pub const FACTION_REPUTATION_REASON: &str = "faction_reputation";

/// What one propagation touched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationReport {
    pub agent: AgentId,
    pub origin: FactionId,
    pub amount: f32,
    /// Standing with the origin faction afterwards
    pub origin_standing: f32,
    /// Other factions and the delta each received
    pub affected_factions: Vec<(FactionId, f32)>,
    pub affected_members: Vec<AgentId>,
}

/// Cascades faction standing changes
#[derive(Debug, Clone, Copy)]
pub struct ReputationPropagator<'a> {
    factions: &'a FactionGraph,
}

impl<'a> ReputationPropagator<'a> {
    pub fn new(factions: &'a FactionGraph) -> Self {
        Self { factions }
    }

    pub fn propagate(
        &self,
        world: &mut SocialWorld,
        agent: &AgentId,
        faction: &FactionId,
        amount: f32,
        tick: u64,
    ) -> PropagationReport {
        let config = *self.factions.config();
        if self.factions.get(faction).is_none() {
            tracing::debug!("Reputation change for unknown faction '{}'", faction);
        }

        let origin_standing =
            world
                .relations
                .modify_faction_standing(agent, faction, amount, tick, &mut world.bus);

        let mut affected_factions = Vec::new();
        for ally in self.factions.allies_of(faction) {
            let delta = amount * config.ally_share;
            world
                .relations
                .modify_faction_standing(agent, &ally, delta, tick, &mut world.bus);
            affected_factions.push((ally, delta));
        }
        for enemy in self.factions.enemies_of(faction) {
            let delta = -amount * config.enemy_share;
            world
                .relations
                .modify_faction_standing(agent, &enemy, delta, tick, &mut world.bus);
            affected_factions.push((enemy, delta));
        }

        let members: Vec<AgentId> = world
            .agents
            .members_of(faction)
            .into_iter()
            .filter(|m| m != agent)
            .collect();
        let member_delta = RelationDelta::new().value(amount * config.member_share);
        for member in &members {
            world.relations.modify_relation(
                member,
                agent,
                &member_delta,
                FACTION_REPUTATION_REASON,
                tick,
                &mut world.bus,
            );
        }

        world.bus.emit(
            tick,
            SocialEvent::ReputationPropagated {
                agent: agent.to_string(),
                origin_faction: faction.to_string(),
                amount,
                affected_factions: affected_factions
                    .iter()
                    .map(|(f, d)| (f.to_string(), *d))
                    .collect(),
                affected_members: members.len(),
            },
        );

        tracing::info!(
            "{} reputation with {} changed by {:+.1} ({} factions, {} members affected)",
            agent,
            faction,
            amount,
            affected_factions.len(),
            members.len()
        );

        PropagationReport {
            agent: agent.clone(),
            origin: faction.clone(),
            amount,
            origin_standing,
            affected_factions,
            affected_members: members,
        }
    }
}

/// A standing change waiting for the next tick
#[derive(Debug, Clone, PartialEq)]
pub struct ReputationChange {
    pub agent: AgentId,
    pub faction: FactionId,
    pub amount: f32,
}

/// Resource: queued reputation changes, drained once per tick
#[derive(Resource, Debug, Default)]
pub struct ReputationQueue {
    changes: Vec<ReputationChange>,
}

impl ReputationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, agent: impl Into<AgentId>, faction: impl Into<FactionId>, amount: f32) {
        self.changes.push(ReputationChange {
            agent: agent.into(),
            faction: faction.into(),
            amount,
        });
    }

    pub fn drain(&mut self) -> Vec<ReputationChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// System: apply every queued reputation change
pub fn process_reputation_queue(
    mut world: ResMut<SocialWorld>,
    mut queue: ResMut<ReputationQueue>,
    content: Res<SocialContent>,
) {
    let propagator = ReputationPropagator::new(&content.factions);
    let tick = world.tick();
    for change in queue.drain() {
        propagator.propagate(&mut world, &change.agent, &change.faction, change.amount, tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::Agent;
    use crate::config::FactionConfig;
    use crate::setup::create_factions;

    fn id(s: &str) -> AgentId {
        AgentId::from(s)
    }

    fn fid(s: &str) -> FactionId {
        FactionId::from(s)
    }

    #[test]
    fn test_propagation_shares() {
        let factions = create_factions(FactionConfig::default());
        let mut world = SocialWorld::with_defaults();
        world.spawn(Agent::player("player", "Player"));
        world.spawn(Agent::new("guard_1", "Hale").with_faction("guards"));
        world.spawn(Agent::new("guard_2", "Bryn").with_faction("guards"));
        world.spawn(Agent::new("bandit_1", "Rook").with_faction("bandits"));

        let report =
            ReputationPropagator::new(&factions).propagate(&mut world, &id("player"), &fid("guards"), 20.0, 3);

        assert_eq!(report.origin_standing, 20.0);
        // merchants (60) and villagers (50) are allies of the guards
        assert_eq!(world.relations.faction_standing(&id("player"), &fid("merchants")), 10.0);
        assert_eq!(world.relations.faction_standing(&id("player"), &fid("villagers")), 10.0);
        // bandits (-150) and cultists (-80) are enemies
        assert_eq!(world.relations.faction_standing(&id("player"), &fid("bandits")), -5.0);
        assert_eq!(world.relations.faction_standing(&id("player"), &fid("cultists")), -5.0);
        // scholars (30) are neither
        assert_eq!(world.relations.faction_standing(&id("player"), &fid("scholars")), 0.0);

        assert_eq!(report.affected_members, vec![id("guard_1"), id("guard_2")]);
        assert_eq!(world.relations.snapshot(&id("guard_1"), &id("player")).value, 4.0);
        assert_eq!(world.relations.snapshot(&id("bandit_1"), &id("player")).value, 0.0);

        let last = world.bus.events().last().unwrap();
        assert_eq!(last.kind.name(), "reputation_propagated");
    }

    #[test]
    fn test_member_does_not_rate_self() {
        let factions = create_factions(FactionConfig::default());
        let mut world = SocialWorld::with_defaults();
        world.spawn(Agent::new("guard_1", "Hale").with_faction("guards"));

        let report =
            ReputationPropagator::new(&factions).propagate(&mut world, &id("guard_1"), &fid("guards"), 10.0, 0);
        assert!(report.affected_members.is_empty());
        assert!(world.relations.is_empty());
    }

    #[test]
    fn test_queue_drains() {
        let mut queue = ReputationQueue::new();
        queue.push("player", "guards", 5.0);
        queue.push("player", "bandits", -5.0);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain().len(), 2);
        assert!(queue.is_empty());
    }
}
