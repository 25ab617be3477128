//! Per-Tick Upkeep
//!
//! Clock, relationship decay, memory pruning and event flushing.

use bevy_ecs::prelude::*;
use social_events::EventCategory;
use std::collections::HashMap;

use crate::components::world::SocialWorld;
use crate::content::SocialContent;

/// Resource: running totals of drained events
#[derive(Resource, Debug, Default)]
pub struct EventTally {
    pub by_category: HashMap<EventCategory, u64>,
    pub total: u64,
    /// Events drained by the most recent flush
    pub last_tick: u64,
}

impl EventTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, category: EventCategory) -> u64 {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}

/// System: advance the world clock
pub fn advance_clock(mut world: ResMut<SocialWorld>) {
    world.clock.advance_tick();
}

/// System: decay every relationship toward neutral
pub fn decay_relations(mut world: ResMut<SocialWorld>) {
    world.relations.decay_relations();
}

/// System: periodically drop stale memories
pub fn prune_memories(mut world: ResMut<SocialWorld>, content: Res<SocialContent>) {
    let config = content.tuning.memory;
    let tick = world.tick();
    if config.prune_interval == 0 || tick % config.prune_interval != 0 {
        return;
    }

    let ids = world.agents.ids();
    for id in &ids {
        if let Some(agent) = world.agent_mut(id) {
            agent.memory.prune_old_memories(config.max_age, tick);
        }
    }
    tracing::debug!("Tick {}: pruned memories of {} agents", tick, ids.len());
}

/// System: drain the event bus into the tally and flush the sink
pub fn flush_events(mut world: ResMut<SocialWorld>, mut tally: ResMut<EventTally>) {
    let drained = world.bus.drain();
    tally.last_tick = drained.len() as u64;
    tally.total += drained.len() as u64;
    for event in &drained {
        *tally.by_category.entry(event.kind.category()).or_insert(0) += 1;
    }

    if let Err(e) = world.bus.flush() {
        tracing::warn!("Failed to flush events: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::{Agent, AgentId};
    use crate::components::memory::MemoryEventKind;
    use crate::components::relationship::RelationDelta;
    use crate::config::Tuning;

    fn setup() -> World {
        let mut ecs = World::new();
        ecs.insert_resource(SocialWorld::with_defaults());
        ecs.insert_resource(SocialContent::standard(Tuning::default()).unwrap());
        ecs.insert_resource(EventTally::new());
        ecs
    }

    #[test]
    fn test_flush_tallies_categories() {
        let mut ecs = setup();
        {
            let mut world = ecs.resource_mut::<SocialWorld>();
            let world = &mut *world;
            let delta = RelationDelta::new().value(5.0);
            world
                .relations
                .modify_relation(&"a".into(), &"b".into(), &delta, "test", 0, &mut world.bus);
            world.set_story_flag("gate_open", true.into(), 0);
        }

        let mut schedule = Schedule::default();
        schedule.add_systems(flush_events);
        schedule.run(&mut ecs);

        let tally = ecs.resource::<EventTally>();
        assert_eq!(tally.total, 2);
        assert_eq!(tally.count(EventCategory::Relationship), 1);
        assert_eq!(tally.count(EventCategory::World), 1);
        assert!(ecs.resource::<SocialWorld>().bus.is_empty());
    }

    #[test]
    fn test_prune_runs_on_interval() {
        let mut ecs = setup();
        {
            let mut world = ecs.resource_mut::<SocialWorld>();
            let mut agent = Agent::new("npc", "Npc");
            agent.memory.remember(
                MemoryEventKind::InsultedBy {
                    by: "player".into(),
                    amount: 5.0,
                },
                0,
            );
            world.spawn(agent);
            world.clock.tick = 1100;
        }

        let mut schedule = Schedule::default();
        schedule.add_systems(prune_memories);
        schedule.run(&mut ecs);

        let world = ecs.resource::<SocialWorld>();
        let memory = &world.agent(&AgentId::from("npc")).unwrap().memory;
        assert_eq!(memory.events().count(), 0);
    }

    #[test]
    fn test_clock_advances() {
        let mut ecs = setup();
        let mut schedule = Schedule::default();
        schedule.add_systems(advance_clock);
        schedule.run(&mut ecs);
        schedule.run(&mut ecs);
        assert_eq!(ecs.resource::<SocialWorld>().tick(), 2);
    }
}
