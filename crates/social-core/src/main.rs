//! Social Simulation Demo
//!
//! Spawns the village, runs the world tick for a while, then plays a short
//! scripted scene: a few player actions and one conversation at the gate.

use bevy_ecs::prelude::*;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use social_core::actions::{ActionParams, SocialActionKind};
use social_core::components::{AgentId, SocialWorld};
use social_core::config::{default_tuning_toml, Tuning, DEFAULT_TUNING_PATH};
use social_core::dialogue::ConversationSlot;
use social_core::events::{EventBus, EventCategory};
use social_core::setup::{self, PLAYER_ID};
use social_core::systems::{build_schedule, EventTally, ReputationQueue};
use social_core::{SimRng, SocialContent};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "social_sim")]
#[command(about = "Relationship, faction and dialogue simulation")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate (defaults to the tuning file)
    #[arg(long)]
    ticks: Option<u64>,

    /// Tuning file
    #[arg(long, default_value = DEFAULT_TUNING_PATH)]
    tuning: PathBuf,

    /// Append every event to this JSONL file
    #[arg(long)]
    events_out: Option<PathBuf>,

    /// Ticks between progress lines (defaults to the tuning file)
    #[arg(long)]
    report_interval: Option<u64>,

    /// Print the default tuning file and exit
    #[arg(long)]
    print_tuning: bool,

    /// Print the final relationship/memory dump as JSON
    #[arg(long)]
    dump: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "social_core=info,social_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if args.print_tuning {
        print!("{}", default_tuning_toml());
        return;
    }

    let tuning = if args.tuning.exists() {
        Tuning::load_or_default(&args.tuning)
    } else {
        Tuning::default()
    };
    let ticks = args.ticks.unwrap_or(tuning.simulation.default_ticks);
    let report_interval = args
        .report_interval
        .unwrap_or(tuning.simulation.report_interval)
        .max(1);

    println!("Social Simulation");
    println!("=================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {}", ticks);
    println!();

    let content = match SocialContent::standard(tuning.clone()) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Could not load dialogue content: {}", e);
            std::process::exit(1);
        }
    };

    let bus = match &args.events_out {
        Some(path) => EventBus::with_sink(path).unwrap_or_else(|e| {
            eprintln!("Warning: Could not open {}: {}. Events will not be written.", path.display(), e);
            EventBus::null()
        }),
        None => EventBus::null(),
    };

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let mut social = SocialWorld::new(&tuning, Box::new(setup::create_quest_book()), bus);
    println!("Spawning village...");
    match setup::spawn_village(&mut social, &content.traits, tuning.memory, &mut rng) {
        Ok(ids) => println!("  Spawned {} agents", ids.len()),
        Err(e) => {
            eprintln!("Could not spawn village: {}", e);
            std::process::exit(1);
        }
    }

    // Initialize the ECS world
    let mut world = World::new();
    world.insert_resource(social);
    world.insert_resource(content.clone());
    world.insert_resource(SimRng(rng));
    world.insert_resource(ReputationQueue::new());
    world.insert_resource(EventTally::new());

    let mut schedule = build_schedule();

    println!();
    println!("Starting simulation...");
    println!();

    for _ in 0..ticks {
        schedule.run(&mut world);

        let tick = world.resource::<SocialWorld>().tick();
        if tick % report_interval == 0 {
            let tally = world.resource::<EventTally>();
            let social = world.resource::<SocialWorld>();
            println!(
                "[Tick {:>4}] {} relationships, {} events ({} actions, {} dialogue lines)",
                tick,
                social.relations.len(),
                tally.total,
                tally.count(EventCategory::Action),
                tally.count(EventCategory::Dialogue),
            );
        }
    }

    println!();
    println!("Playing the scripted scene...");
    let mut scene_rng = SmallRng::seed_from_u64(args.seed.wrapping_add(1));
    {
        let mut social = world.resource_mut::<SocialWorld>();
        play_scene(&mut social, &content, &mut scene_rng);
    }
    world
        .resource_mut::<ReputationQueue>()
        .push(PLAYER_ID, "villagers", 5.0);
    schedule.run(&mut world);

    print_summary(&world);

    if args.dump {
        let dump = world.resource::<SocialWorld>().dump();
        match serde_json::to_string_pretty(&dump) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Could not serialize dump: {}", e),
        }
    }
}

/// A few player actions, then one conversation with the gate guard
fn play_scene(social: &mut SocialWorld, content: &SocialContent, rng: &mut SmallRng) {
    let tick = social.tick();
    let player = AgentId::from(PLAYER_ID);
    let resolver = content.resolver();

    let actions = [
        ("merchant_tomas", SocialActionKind::Compliment, ActionParams::default()),
        ("merchant_tomas", SocialActionKind::ShareRumor, ActionParams::default()),
        ("guard_hale", SocialActionKind::Gift, ActionParams::gold(10)),
        ("guard_hale", SocialActionKind::Chat, ActionParams::default()),
    ];
    for (target, kind, params) in &actions {
        match resolver.execute(social, &player, &AgentId::from(*target), *kind, params, tick) {
            Ok(outcome) => println!("  {} -> {}: \"{}\"", kind, target, outcome.reaction),
            Err(e) => println!("  {} -> {} refused: {}", kind, target, e),
        }
    }

    let engine = content.dialogue_engine();
    let mut slot = ConversationSlot::new();
    let guard = AgentId::from("guard_hale");
    if let Err(e) = engine.start_dialogue(&mut slot, social, &player, &guard, "gate_guard", tick) {
        println!("  Could not talk to the guard: {}", e);
        return;
    }

    // Take the first offered choice each time until the conversation ends
    let mut node = engine.get_current_node(&mut slot, social, rng).ok();
    while let Some(current) = node.take() {
        println!("  {}: {}", current.speaker, current.text);
        if current.terminal {
            break;
        }
        let Some(choice) = current.choices.first() else {
            engine.end_dialogue(&mut slot, social, tick);
            break;
        };
        println!("  > {}", choice.text);
        match engine.select_choice(&mut slot, social, rng, choice.index, tick) {
            Ok(next) => node = next,
            Err(e) => {
                println!("  Dialogue failed: {}", e);
                engine.end_dialogue(&mut slot, social, tick);
            }
        }
    }
}

fn print_summary(world: &World) {
    let social = world.resource::<SocialWorld>();
    let tally = world.resource::<EventTally>();
    let player = AgentId::from(PLAYER_ID);

    println!();
    println!("Simulation complete at tick {}.", social.tick());
    println!("  {} events emitted", tally.total);
    println!("  {} relationships tracked", social.relations.len());
    for faction in ["guards", "merchants", "villagers", "bandits"] {
        println!(
            "  Player standing with {}: {:+.1}",
            faction,
            social.relations.faction_standing(&player, &faction.into())
        );
    }
    println!(
        "  Guard patrol quest active: {}",
        social.quests.is_active("guard_patrol")
    );
}
