//! ECS Systems
//!
//! Tick systems for the clock, reputation queue, relationship decay, memory
//! pruning, the NPC scheduler and event flushing.

pub mod reputation;
pub mod scheduler;
pub mod upkeep;

use bevy_ecs::prelude::*;

pub use reputation::{
    process_reputation_queue, PropagationReport, ReputationChange, ReputationPropagator, ReputationQueue,
};
pub use scheduler::{
    action_pool, candidate_targets, run_scheduler_pass, run_social_scheduler, socialize_chance, weighted_choice,
    SchedulerReport,
};
pub use upkeep::{advance_clock, decay_relations, flush_events, prune_memories, EventTally};

/// The per-tick schedule, in order
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    // Queued reputation lands before anything reads standings
    schedule.add_systems(
        (
            advance_clock,
            process_reputation_queue,
            decay_relations,
            prune_memories,
            run_social_scheduler,
            flush_events,
        )
            .chain(),
    );

    schedule
}
