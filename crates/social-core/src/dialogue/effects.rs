//! Dialogue Effects
//!
//! Applied in declaration order when a choice is taken or a node is
//! entered. Effects are not transactional; the first collaborator failure
//! stops the rest of the list.

use serde::{Deserialize, Serialize};
use social_events::{FlagValue, SocialEvent};

use super::conditions::{Direction, Parties};
use crate::components::agent::AgentId;
use crate::components::faction::FactionId;
use crate::components::inventory::{ItemCatalog, GOLD_ITEM};
use crate::components::memory::{MemoryEventKind, Rumor};
use crate::components::relationship::RelationDelta;
use crate::components::world::SocialWorld;
use crate::error::CollaboratorError;
use crate::systems::reputation::ReputationPropagator;

/// History reason for relationship effects without one
pub const DIALOGUE_REASON: &str = "dialogue";

/// `emit` events with this name are handled like the `rumor_shared` effect
pub const RUMOR_SHARED_EVENT: &str = "rumor_shared";

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Relation {
        #[serde(default)]
        value: f32,
        #[serde(default)]
        trust: f32,
        #[serde(default)]
        fear: f32,
        #[serde(default)]
        respect: f32,
        #[serde(default)]
        direction: Direction,
        #[serde(default)]
        reason: Option<String>,
    },
    /// Player standing with a faction, cascaded through the propagator
    Faction { faction: FactionId, amount: f32 },
    Emit {
        event: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
    /// The player tells the NPC a rumor
    RumorShared { subject: String, detail: String },
    SetFlag {
        flag: String,
        #[serde(default)]
        value: FlagValue,
    },
    GiveItem {
        item: String,
        #[serde(default = "one")]
        quantity: u32,
    },
    RemoveItem {
        item: String,
        #[serde(default = "one")]
        quantity: u32,
    },
    StartQuest { quest: String },
    CompleteQuest { quest: String },
    QuestProgress {
        quest: String,
        counter: String,
        #[serde(default = "one")]
        amount: u32,
    },
    TurnHostile,
}

/// Collaborators an effect may call into
#[derive(Debug, Clone, Copy)]
pub struct EffectEnv<'a> {
    pub items: &'a ItemCatalog,
    pub propagator: ReputationPropagator<'a>,
    pub parties: &'a Parties,
    pub tick: u64,
}

impl Effect {
    pub fn apply(&self, world: &mut SocialWorld, env: &EffectEnv<'_>) -> Result<(), CollaboratorError> {
        let Parties { player, npc } = env.parties;
        let tick = env.tick;

        match self {
            Effect::Relation {
                value,
                trust,
                fear,
                respect,
                direction,
                reason,
            } => {
                let (from, to) = direction.pair(env.parties);
                let delta = RelationDelta::new()
                    .value(*value)
                    .trust(*trust)
                    .fear(*fear)
                    .respect(*respect);
                let reason = reason.as_deref().unwrap_or(DIALOGUE_REASON);
                world
                    .relations
                    .modify_relation(from, to, &delta, reason, tick, &mut world.bus);
            }
            Effect::Faction { faction, amount } => {
                env.propagator.propagate(world, player, faction, *amount, tick);
            }
            Effect::Emit { event, payload } if event == RUMOR_SHARED_EVENT => {
                let field = |key: &str| payload.get(key).and_then(serde_json::Value::as_str);
                match (field("subject"), field("detail")) {
                    (Some(subject), Some(detail)) => share_rumor(world, player, npc, subject, detail, tick)?,
                    _ => tracing::warn!("'{}' event without subject and detail; ignored", RUMOR_SHARED_EVENT),
                }
            }
            Effect::Emit { event, payload } => {
                world.bus.emit(
                    tick,
                    SocialEvent::Custom {
                        name: event.clone(),
                        payload: payload.clone(),
                    },
                );
            }
            Effect::RumorShared { subject, detail } => {
                share_rumor(world, player, npc, subject, detail, tick)?;
            }
            Effect::SetFlag { flag, value } => {
                world.set_story_flag(flag, value.clone(), tick);
            }
            Effect::GiveItem { item, quantity } => {
                let agent = world
                    .agents
                    .get_mut(player)
                    .ok_or_else(|| CollaboratorError::UnknownAgent(player.clone()))?;
                if item == GOLD_ITEM {
                    agent.gold += quantity;
                } else {
                    agent.inventory.add(env.items.instantiate(item, *quantity)?);
                }
                world.bus.emit(
                    tick,
                    SocialEvent::ItemGranted {
                        agent: player.to_string(),
                        item: item.clone(),
                        quantity: *quantity,
                    },
                );
            }
            Effect::RemoveItem { item, quantity } => {
                let agent = world
                    .agents
                    .get_mut(player)
                    .ok_or_else(|| CollaboratorError::UnknownAgent(player.clone()))?;
                if item == GOLD_ITEM {
                    if agent.gold < *quantity {
                        tracing::debug!("{} cannot pay {} gold; skipped", player, quantity);
                        return Ok(());
                    }
                    agent.gold -= quantity;
                    world.bus.emit(
                        tick,
                        SocialEvent::GoldTransferred {
                            from: player.to_string(),
                            to: Some(npc.to_string()),
                            amount: *quantity,
                        },
                    );
                } else if agent.inventory.remove(item, *quantity) {
                    world.bus.emit(
                        tick,
                        SocialEvent::ItemRemoved {
                            agent: player.to_string(),
                            item: item.clone(),
                            quantity: *quantity,
                        },
                    );
                } else {
                    tracing::debug!("{} does not hold {} x{}; skipped", player, item, quantity);
                }
            }
            Effect::StartQuest { quest } => {
                if world.quests.start_quest(quest, tick)? {
                    world.bus.emit(tick, SocialEvent::QuestStarted { quest: quest.clone() });
                }
            }
            Effect::CompleteQuest { quest } => {
                let rewards = world.quests.complete_quest(quest, tick)?;
                world.bus.emit(tick, SocialEvent::QuestCompleted { quest: quest.clone() });
                for reward in rewards {
                    env.propagator
                        .propagate(world, player, &reward.faction, reward.amount, tick);
                }
            }
            Effect::QuestProgress { quest, counter, amount } => {
                let progress = world.quests.advance_counter(quest, counter, *amount)?;
                tracing::debug!("Quest {} counter {} now {}", quest, counter, progress);
            }
            Effect::TurnHostile => {
                let agent = world
                    .agents
                    .get_mut(npc)
                    .ok_or_else(|| CollaboratorError::UnknownAgent(npc.clone()))?;
                agent.hostile = true;
                world.bus.emit(
                    tick,
                    SocialEvent::TurnedHostile {
                        npc: npc.to_string(),
                        toward: player.to_string(),
                    },
                );
            }
        }
        Ok(())
    }
}

/// The player tells `npc` a rumor; the NPC remembers it unless already known
fn share_rumor(
    world: &mut SocialWorld,
    player: &AgentId,
    npc: &AgentId,
    subject: &str,
    detail: &str,
    tick: u64,
) -> Result<(), CollaboratorError> {
    let listener = world
        .agents
        .get_mut(npc)
        .ok_or_else(|| CollaboratorError::UnknownAgent(npc.clone()))?;
    let rumor = Rumor {
        source: Some(player.clone()),
        ..Rumor::new(subject, detail, tick)
    };
    if listener.memory.add_rumor(rumor) {
        listener.memory.remember(
            MemoryEventKind::RumorHeard {
                from: player.clone(),
                subject: subject.to_string(),
            },
            tick,
        );
    }
    world.bus.emit(
        tick,
        SocialEvent::RumorShared {
            teller: player.to_string(),
            listener: npc.to_string(),
            subject: subject.to_string(),
            detail: detail.to_string(),
        },
    );
    Ok(())
}

/// Applies effects in order, stopping at the first failure
pub fn apply_all(effects: &[Effect], world: &mut SocialWorld, env: &EffectEnv<'_>) -> Result<(), CollaboratorError> {
    for effect in effects {
        effect.apply(world, env).inspect_err(|e| {
            tracing::warn!("Dialogue effect {:?} failed: {}", effect, e);
        })?;
    }
    Ok(())
}
