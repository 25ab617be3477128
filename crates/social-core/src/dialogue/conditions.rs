//! Choice Conditions
//!
//! A choice is offered only when every one of its conditions holds.

use rand::Rng;
use serde::{Deserialize, Serialize};
use social_events::FlagValue;

use crate::components::agent::{Agent, AgentId};
use crate::components::inventory::GOLD_ITEM;
use crate::components::relationship::Axis;
use crate::components::traits::Trait;
use crate::components::world::SocialWorld;

/// The two sides of a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parties {
    pub player: AgentId,
    pub npc: AgentId,
}

/// Which directional relationship a condition or effect addresses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// How the NPC feels about the player
    #[default]
    NpcToPlayer,
    PlayerToNpc,
}

impl Direction {
    /// (from, to) for this direction
    pub fn pair<'a>(&self, parties: &'a Parties) -> (&'a AgentId, &'a AgentId) {
        match self {
            Direction::NpcToPlayer => (&parties.npc, &parties.player),
            Direction::PlayerToNpc => (&parties.player, &parties.npc),
        }
    }
}

/// Whose traits a `has_trait` condition inspects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    #[default]
    Npc,
    Player,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    HasTrait {
        #[serde(rename = "trait")]
        trait_id: Trait,
        #[serde(default)]
        party: Party,
    },
    /// Truthy flag, or an exact value when one is given
    Flag {
        flag: String,
        #[serde(default)]
        value: Option<FlagValue>,
    },
    RelationAtLeast {
        axis: Axis,
        value: f32,
        #[serde(default)]
        direction: Direction,
    },
    RelationBelow {
        axis: Axis,
        value: f32,
        #[serde(default)]
        direction: Direction,
    },
    /// Holds when a fresh draw lands under `probability`
    Chance { probability: f32 },
    HasItem {
        item: String,
        #[serde(default = "one")]
        quantity: u32,
    },
    MinGold { amount: u32 },
    QuestActive { quest: String },
    ObjectiveComplete { quest: String, objective: String },
    Not { condition: Box<Condition> },
}

/// Read-only view a condition is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    pub world: &'a SocialWorld,
    pub parties: &'a Parties,
    pub player: &'a Agent,
    pub npc: &'a Agent,
}

impl Condition {
    pub fn evaluate<R: Rng + ?Sized>(&self, ctx: &ConditionContext<'_>, rng: &mut R) -> bool {
        match self {
            Condition::HasTrait { trait_id, party } => match party {
                Party::Npc => ctx.npc.has_trait(*trait_id),
                Party::Player => ctx.player.has_trait(*trait_id),
            },
            Condition::Flag { flag, value } => match value {
                Some(expected) => ctx.world.story_flag(flag) == Some(expected),
                None => ctx.world.flags.is_set(flag),
            },
            Condition::RelationAtLeast { axis, value, direction } => {
                let (from, to) = direction.pair(ctx.parties);
                axis.read(&ctx.world.relations.snapshot(from, to)) >= *value
            }
            Condition::RelationBelow { axis, value, direction } => {
                let (from, to) = direction.pair(ctx.parties);
                axis.read(&ctx.world.relations.snapshot(from, to)) < *value
            }
            Condition::Chance { probability } => rng.gen::<f32>() < *probability,
            Condition::HasItem { item, quantity } if item == GOLD_ITEM => ctx.player.gold >= *quantity,
            Condition::HasItem { item, quantity } => ctx.player.inventory.has(item, *quantity),
            Condition::MinGold { amount } => ctx.player.gold >= *amount,
            Condition::QuestActive { quest } => ctx.world.quests.is_active(quest),
            Condition::ObjectiveComplete { quest, objective } => {
                ctx.world
                    .quests
                    .objective_complete(quest, objective, ctx.player, &ctx.world.flags)
            }
            Condition::Not { condition } => !condition.evaluate(ctx, rng),
        }
    }
}

/// Logical AND over a condition list; an empty list holds
pub fn evaluate_all<R: Rng + ?Sized>(conditions: &[Condition], ctx: &ConditionContext<'_>, rng: &mut R) -> bool {
    conditions.iter().all(|c| c.evaluate(ctx, rng))
}
