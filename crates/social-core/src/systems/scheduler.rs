//! NPC Social Scheduler
//!
//! Once per tick, each available NPC may strike up a social action with
//! someone nearby. Target and action are both weighted random picks.

use bevy_ecs::prelude::*;
use rand::Rng;
use social_events::RelationSnapshot;

use crate::actions::{ActionParams, SocialActionKind};
use crate::components::agent::{Agent, AgentId};
use crate::components::faction::FactionValue;
use crate::components::traits::Trait;
use crate::components::world::SocialWorld;
use crate::config::SchedulerConfig;
use crate::content::SocialContent;
use crate::SimRng;

/// Base weights for the scheduler's action pools
pub mod scheduler_weights {
    pub const CHAT: f32 = 3.0;
    pub const CHAT_NEUTRAL: f32 = 4.0;
    pub const CHAT_HOSTILE: f32 = 0.5;
    pub const COMPLIMENT: f32 = 2.0;
    pub const COMPLIMENT_NEUTRAL: f32 = 1.0;
    pub const GIFT: f32 = 1.0;
    pub const SHARE_RUMOR: f32 = 1.0;
    pub const TRADE: f32 = 1.0;
    pub const INSULT: f32 = 2.0;
    pub const INSULT_NEUTRAL: f32 = 0.5;
    pub const THREATEN: f32 = 1.0;
    pub const APOLOGIZE: f32 = 1.0;
    /// Gold an NPC offers when it decides to give a gift
    pub const GIFT_AMOUNT: u32 = 10;
}

use scheduler_weights::*;

/// Relationship band used to pick an action pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Friendly,
    Neutral,
    Hostile,
}

impl Band {
    pub fn of(value: f32, config: &SchedulerConfig) -> Self {
        if value >= config.friendly_threshold {
            Band::Friendly
        } else if value <= config.hostile_threshold {
            Band::Hostile
        } else {
            Band::Neutral
        }
    }
}

/// Outcome counts of one scheduler pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub eligible: usize,
    pub socialized: usize,
    pub performed: usize,
    pub rejected: usize,
    pub cooled_down: usize,
}

/// Per-tick probability that an NPC initiates something
pub fn socialize_chance(npc: &Agent, content: &SocialContent) -> f32 {
    let config = &content.tuning.scheduler;
    let mut chance = config.base_chance + content.traits.social_chance(&npc.traits);
    if content.factions.holds_value(npc.faction.as_ref(), FactionValue::Community) {
        chance += config.community_bonus;
    }
    if content.factions.holds_value(npc.faction.as_ref(), FactionValue::Isolation) {
        chance -= config.isolation_penalty;
    }
    chance.clamp(0.0, config.max_chance)
}

/// Living agents in the same chunk within the interaction radius, weighted
/// by relationship intensity
pub fn candidate_targets(world: &SocialWorld, npc: &Agent, config: &SchedulerConfig) -> Vec<(AgentId, f32)> {
    world
        .agents
        .iter()
        .filter(|other| other.id != npc.id && other.vitals.alive)
        .filter(|other| {
            npc.position
                .distance(&other.position)
                .is_some_and(|d| d <= config.interaction_radius)
        })
        .map(|other| {
            let intensity = world.relations.snapshot(&npc.id, &other.id).intensity();
            (other.id.clone(), intensity + config.intensity_floor)
        })
        .collect()
}

/// Weighted action candidates for an NPC toward one target
pub fn action_pool(
    npc: &Agent,
    relation: &RelationSnapshot,
    content: &SocialContent,
) -> Vec<(SocialActionKind, f32)> {
    use SocialActionKind::*;

    let factions = &content.factions;
    let gossip = if npc.has_trait(Trait::Secretive) || npc.memory.shareable_rumors().next().is_none() {
        0.0
    } else if npc.has_trait(Trait::Gossipy) {
        SHARE_RUMOR * 3.0
    } else {
        SHARE_RUMOR
    };

    let mut pool = match Band::of(relation.value, &content.tuning.scheduler) {
        Band::Friendly => {
            let gift = if npc.gold < GIFT_AMOUNT {
                0.0
            } else if npc.has_trait(Trait::Generous) {
                GIFT * 2.0
            } else if npc.has_trait(Trait::Greedy) {
                GIFT * 0.25
            } else {
                GIFT
            };
            vec![(Chat, CHAT), (Compliment, COMPLIMENT), (Gift, gift), (ShareRumor, gossip)]
        }
        Band::Neutral => {
            let trade = if factions.holds_value(npc.faction.as_ref(), FactionValue::Wealth) {
                TRADE
            } else {
                0.0
            };
            let insult = if npc.has_trait(Trait::Aggressive) {
                INSULT_NEUTRAL
            } else {
                0.0
            };
            vec![
                (Chat, CHAT_NEUTRAL),
                (Compliment, COMPLIMENT_NEUTRAL),
                (ShareRumor, gossip),
                (Trade, trade),
                (Insult, insult),
            ]
        }
        Band::Hostile => {
            let mut threaten = if npc.has_trait(Trait::Cowardly) || npc.has_trait(Trait::Peaceful) {
                0.0
            } else if npc.has_trait(Trait::Aggressive) {
                THREATEN * 2.0
            } else {
                THREATEN
            };
            if threaten > 0.0 && factions.holds_value(npc.faction.as_ref(), FactionValue::Violence) {
                threaten += THREATEN;
            }
            let insult = if npc.has_trait(Trait::Peaceful) {
                INSULT * 0.25
            } else {
                INSULT
            };
            let apologize = if npc.has_trait(Trait::Peaceful) {
                APOLOGIZE
            } else {
                0.0
            };
            vec![
                (Insult, insult),
                (Threaten, threaten),
                (Chat, CHAT_HOSTILE),
                (Apologize, apologize),
            ]
        }
    };

    pool.retain(|(_, w)| *w > 0.0);
    pool
}

/// Weighted random pick; `None` when no weight is positive
pub fn weighted_choice<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [(T, f32)]) -> Option<&'a T> {
    let total: f32 = items.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }

    let r = rng.gen::<f32>() * total;
    let mut cumulative = 0.0;
    for (item, weight) in items {
        cumulative += weight.max(0.0);
        if r < cumulative {
            return Some(item);
        }
    }
    items.iter().rev().find(|(_, w)| *w > 0.0).map(|(item, _)| item)
}

/// Runs one scheduler pass over every NPC, in id order
pub fn run_scheduler_pass<R: Rng + ?Sized>(
    world: &mut SocialWorld,
    content: &SocialContent,
    rng: &mut R,
    tick: u64,
) -> SchedulerReport {
    let config = content.tuning.scheduler;
    let resolver = content.resolver();
    let mut report = SchedulerReport::default();

    for npc_id in world.agents.ids() {
        let Some(npc) = world.agent(&npc_id) else {
            continue;
        };
        if npc.is_player || !npc.is_available() {
            continue;
        }
        report.eligible += 1;

        if rng.gen::<f32>() >= socialize_chance(npc, content) {
            continue;
        }
        report.socialized += 1;

        let candidates = candidate_targets(world, npc, &config);
        let Some(target_id) = weighted_choice(rng, &candidates).cloned() else {
            continue;
        };
        if !world.relations.can_interact(&npc_id, &target_id, tick) {
            report.cooled_down += 1;
            continue;
        }

        let relation = world.relations.snapshot(&npc_id, &target_id);
        let pool = action_pool(npc, &relation, content);
        let kind = weighted_choice(rng, &pool)
            .copied()
            .unwrap_or(SocialActionKind::Chat);
        let params = match kind {
            SocialActionKind::Gift => ActionParams::gold(GIFT_AMOUNT),
            _ => ActionParams::default(),
        };

        match resolver.execute(world, &npc_id, &target_id, kind, &params, tick) {
            Ok(_) => report.performed += 1,
            Err(_) => report.rejected += 1,
        }
    }

    report
}

/// System: let NPCs socialize
pub fn run_social_scheduler(
    mut world: ResMut<SocialWorld>,
    mut rng: ResMut<SimRng>,
    content: Res<SocialContent>,
) {
    let tick = world.tick();
    let report = run_scheduler_pass(&mut world, &content, &mut rng.0, tick);
    if report.socialized > 0 {
        tracing::debug!(
            "Tick {}: {} NPCs socialized, {} actions performed, {} rejected, {} on cooldown",
            tick,
            report.socialized,
            report.performed,
            report.rejected,
            report.cooled_down
        );
    }
}
