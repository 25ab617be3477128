//! Village Setup
//!
//! Spawns the player and a small cast of NPCs across two chunks, with a few
//! authored relationships and rumors to start from.

use rand::Rng;

use crate::components::agent::{Agent, AgentId, Position};
use crate::components::memory::{Memory, Rumor};
use crate::components::relationship::RelationDelta;
use crate::components::traits::{Trait, TraitError, TraitRegistry, TraitSet};
use crate::components::world::SocialWorld;
use crate::config::MemoryConfig;

/// Id of the player agent
pub const PLAYER_ID: &str = "player";

/// Reason recorded on authored starting relationships
const BACKSTORY_REASON: &str = "backstory";

struct NpcSpec {
    id: &'static str,
    name: &'static str,
    faction: &'static str,
    traits: &'static [Trait],
    /// Extra random traits drawn on top of the authored ones
    random_traits: usize,
    chunk: (i32, i32),
    x: i32,
    y: i32,
    gold: u32,
    strength: i32,
    charisma: i32,
}

const TOWN: (i32, i32) = (0, 0);
const WOODS: (i32, i32) = (1, 0);

const NPCS: &[NpcSpec] = &[
    NpcSpec { id: "guard_hale", name: "Hale", faction: "guards", traits: &[Trait::Brave, Trait::Honest, Trait::Proud], random_traits: 0, chunk: TOWN, x: 4, y: 5, gold: 20, strength: 14, charisma: 9 },
    NpcSpec { id: "guard_bryn", name: "Bryn", faction: "guards", traits: &[Trait::Greedy, Trait::Brave], random_traits: 0, chunk: TOWN, x: 6, y: 4, gold: 15, strength: 13, charisma: 8 },
    NpcSpec { id: "merchant_ilsa", name: "Ilsa", faction: "merchants", traits: &[Trait::Greedy, Trait::Honest], random_traits: 0, chunk: TOWN, x: 5, y: 7, gold: 120, strength: 8, charisma: 13 },
    NpcSpec { id: "merchant_tomas", name: "Tomas", faction: "merchants", traits: &[Trait::Generous, Trait::Gossipy], random_traits: 0, chunk: TOWN, x: 3, y: 6, gold: 80, strength: 9, charisma: 12 },
    NpcSpec { id: "villager_mara", name: "Mara", faction: "villagers", traits: &[], random_traits: 2, chunk: TOWN, x: 7, y: 6, gold: 15, strength: 10, charisma: 10 },
    NpcSpec { id: "villager_odo", name: "Odo", faction: "villagers", traits: &[], random_traits: 2, chunk: TOWN, x: 6, y: 7, gold: 10, strength: 12, charisma: 9 },
    NpcSpec { id: "villager_pell", name: "Pell", faction: "villagers", traits: &[Trait::Peaceful], random_traits: 1, chunk: TOWN, x: 2, y: 3, gold: 5, strength: 9, charisma: 11 },
    NpcSpec { id: "scholar_wynn", name: "Wynn", faction: "scholars", traits: &[Trait::Humble, Trait::Secretive], random_traits: 0, chunk: TOWN, x: 8, y: 8, gold: 30, strength: 7, charisma: 10 },
    NpcSpec { id: "bandit_rook", name: "Rook", faction: "bandits", traits: &[Trait::Aggressive, Trait::Greedy], random_traits: 0, chunk: WOODS, x: 2, y: 2, gold: 40, strength: 15, charisma: 7 },
    NpcSpec { id: "bandit_sable", name: "Sable", faction: "bandits", traits: &[Trait::Deceitful, Trait::Cowardly], random_traits: 0, chunk: WOODS, x: 3, y: 2, gold: 25, strength: 9, charisma: 12 },
    NpcSpec { id: "cultist_vey", name: "Vey", faction: "cultists", traits: &[Trait::Secretive, Trait::Deceitful], random_traits: 0, chunk: WOODS, x: 4, y: 4, gold: 10, strength: 10, charisma: 11 },
];

/// (from, to, value, trust)
const BACKSTORY: &[(&str, &str, f32, f32)] = &[
    ("guard_hale", "guard_bryn", 40.0, 30.0),
    ("guard_bryn", "guard_hale", 35.0, 20.0),
    ("merchant_ilsa", "merchant_tomas", 55.0, 40.0),
    ("merchant_tomas", "merchant_ilsa", 60.0, 35.0),
    ("villager_mara", "villager_odo", 50.0, 50.0),
    ("bandit_rook", "bandit_sable", 20.0, -10.0),
    ("guard_hale", "bandit_rook", -60.0, -40.0),
];

/// (holder, subject, detail)
const RUMORS: &[(&str, &str, &str)] = &[
    ("merchant_tomas", "bandit_rook", "hides stolen goods by the old mill"),
    ("villager_mara", "mayor", "skims the tax chest"),
    ("bandit_sable", "guard_bryn", "takes bribes at the east gate"),
];

fn roll_traits<R: Rng + ?Sized>(
    registry: &TraitRegistry,
    rng: &mut R,
    fixed: &[Trait],
    extra: usize,
) -> Result<TraitSet, TraitError> {
    if extra == 0 {
        return TraitSet::new(registry, fixed);
    }

    // keep the authored traits and add whatever random ones fit
    let mut traits = fixed.to_vec();
    for candidate in TraitSet::random(registry, rng, extra).iter() {
        if !traits.iter().any(|t| *t == candidate || registry.are_opposed(*t, candidate)) {
            traits.push(candidate);
        }
    }
    TraitSet::new(registry, &traits)
}

/// Spawn the player and every NPC. Returns the spawned ids in spawn order.
pub fn spawn_village<R: Rng + ?Sized>(
    world: &mut SocialWorld,
    registry: &TraitRegistry,
    memory: MemoryConfig,
    rng: &mut R,
) -> Result<Vec<AgentId>, TraitError> {
    let mut spawned = Vec::with_capacity(NPCS.len() + 1);

    let player = Agent::player(PLAYER_ID, "Wanderer")
        .at(Position::new(TOWN, 5, 5))
        .with_gold(50)
        .with_stats(12, 12)
        .with_memory(Memory::new(memory));
    spawned.push(player.id.clone());
    world.spawn(player);

    for spec in NPCS {
        let traits = roll_traits(registry, rng, spec.traits, spec.random_traits)?;
        let npc = Agent::new(spec.id, spec.name)
            .with_faction(spec.faction)
            .with_traits(traits)
            .at(Position::new(spec.chunk, spec.x, spec.y))
            .with_gold(spec.gold)
            .with_stats(spec.strength, spec.charisma)
            .with_memory(Memory::new(memory));
        spawned.push(npc.id.clone());
        world.spawn(npc);
    }

    for (from, to, value, trust) in BACKSTORY {
        let delta = RelationDelta::new().value(*value).trust(*trust);
        world.relations.modify_relation(
            &AgentId::from(*from),
            &AgentId::from(*to),
            &delta,
            BACKSTORY_REASON,
            0,
            &mut world.bus,
        );
    }

    for (holder, subject, detail) in RUMORS {
        if let Some(agent) = world.agent_mut(&AgentId::from(*holder)) {
            agent.memory.add_rumor(Rumor::new(*subject, *detail, 0));
        }
    }

    tracing::info!("Spawned {} agents", spawned.len());
    Ok(spawned)
}
