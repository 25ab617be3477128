//! Dialogue flow tests against the bundled content

use rand::rngs::SmallRng;
use rand::SeedableRng;

use social_core::components::{AgentId, RelationDelta, SocialWorld};
use social_core::config::Tuning;
use social_core::dialogue::{ConversationSlot, RenderedNode};
use social_core::events::EventBus;
use social_core::setup::{self, PLAYER_ID};
use social_core::SocialContent;

struct Scene {
    content: SocialContent,
    world: SocialWorld,
    slot: ConversationSlot,
    rng: SmallRng,
}

impl Scene {
    fn new() -> Self {
        let tuning = Tuning::default();
        let content = SocialContent::standard(tuning.clone()).unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut world = SocialWorld::new(&tuning, Box::new(setup::create_quest_book()), EventBus::null());
        setup::spawn_village(&mut world, &content.traits, tuning.memory, &mut rng).unwrap();
        Self {
            content,
            world,
            slot: ConversationSlot::new(),
            rng,
        }
    }

    fn player() -> AgentId {
        AgentId::from(PLAYER_ID)
    }

    fn start(&mut self, npc: &str, tree: &str) -> RenderedNode {
        let engine = self.content.dialogue_engine();
        engine
            .start_dialogue(&mut self.slot, &mut self.world, &Self::player(), &npc.into(), tree, 1)
            .unwrap();
        engine
            .get_current_node(&mut self.slot, &self.world, &mut self.rng)
            .unwrap()
    }

    /// Selects the offered choice with this text
    fn pick(&mut self, node: &RenderedNode, text: &str) -> Option<RenderedNode> {
        let choice = node
            .choices
            .iter()
            .find(|c| c.text == text)
            .unwrap_or_else(|| panic!("'{}' not offered on {}", text, node.node_id));
        self.content
            .dialogue_engine()
            .select_choice(&mut self.slot, &mut self.world, &mut self.rng, choice.index, 2)
            .unwrap()
    }

    fn nudge(&mut self, from: &str, delta: RelationDelta) {
        let world = &mut self.world;
        world
            .relations
            .modify_relation(&from.into(), &Self::player(), &delta, "test", 0, &mut world.bus);
    }

    fn offers(node: &RenderedNode, text: &str) -> bool {
        node.choices.iter().any(|c| c.text == text)
    }
}

const TRUSTED: &str = "You know me. Let me through.";

#[test]
fn test_trust_gate_at_boundary() {
    let mut scene = Scene::new();
    scene.nudge("guard_hale", RelationDelta::new().trust(49.0));
    let node = scene.start("guard_hale", "gate_guard");
    assert!(!Scene::offers(&node, TRUSTED));

    scene.nudge("guard_hale", RelationDelta::new().trust(1.0));
    let node = scene
        .content
        .dialogue_engine()
        .get_current_node(&mut scene.slot, &scene.world, &mut scene.rng)
        .unwrap();
    assert!(Scene::offers(&node, TRUSTED));
}

#[test]
fn test_proud_guard_variant() {
    let mut scene = Scene::new();
    let node = scene.start("guard_hale", "gate_guard");
    assert_eq!(node.text, "Halt. You stand before the Town Guard, so mind your tongue.");
    assert!(scene.world.flags.is_set("met_gate_guard"));
}

#[test]
fn test_insulting_the_guard() {
    let mut scene = Scene::new();
    let node = scene.start("guard_hale", "gate_guard");
    assert_eq!(scene.pick(&node, "Out of my way, tin can."), None);

    let player = Scene::player();
    let hale = AgentId::from("guard_hale");
    assert!(scene.world.agent(&hale).unwrap().hostile);
    assert_eq!(scene.world.relations.faction_standing(&player, &"guards".into()), -10.0);
    let view = scene.world.relations.snapshot(&hale, &player);
    // -20 from the choice, then -2 as a guard member
    assert_eq!(view.value, -22.0);
    assert!(!scene.slot.is_active());
}

#[test]
fn test_lost_crate_quest() {
    let mut scene = Scene::new();
    let player = Scene::player();

    let node = scene.start("merchant_ilsa", "merchant");
    let node = scene.pick(&node, "I hear you lost a shipment.").unwrap();
    let node = scene.pick(&node, "I'll find it.").unwrap();
    assert!(scene.world.quests.is_active("lost_crate"));
    assert!(!Scene::offers(&node, "I hear you lost a shipment."));
    assert!(!Scene::offers(&node, "Here's your crate."));
    assert_eq!(scene.pick(&node, "Just browsing."), None);

    for bandit in ["bandit_rook", "bandit_sable"] {
        scene.nudge(bandit, RelationDelta::new().fear(15.0));
        let node = scene.start(bandit, "bandit_interrogation");
        let end = scene
            .pick(&node, "Who ordered the raid on the merchant's cart?")
            .unwrap();
        assert_eq!(end.node_id, "confess");
        assert!(end.terminal);
    }
    assert!(scene.world.flags.is_set("crate_location_known"));

    let crate_item = scene.content.items.instantiate("supply_crate", 1).unwrap();
    scene.world.agent_mut(&player).unwrap().inventory.add(crate_item);
    let gold_before = scene.world.agent(&player).unwrap().gold;

    let node = scene.start("merchant_ilsa", "merchant");
    let end = scene.pick(&node, "Here's your crate.").unwrap();
    assert_eq!(end.node_id, "grateful");

    let social = &scene.world;
    assert!(!social.quests.is_active("lost_crate"));
    assert_eq!(social.agent(&player).unwrap().gold, gold_before + 25);
    assert_eq!(social.agent(&player).unwrap().inventory.count("supply_crate"), 0);
    assert_eq!(social.relations.faction_standing(&player, &"merchants".into()), 20.0);
    assert_eq!(social.relations.faction_standing(&player, &"guards".into()), 10.0);
    assert_eq!(social.relations.faction_standing(&player, &"bandits".into()), -5.0);

    let names: Vec<&str> = social.bus.events().iter().map(|e| e.kind.name()).collect();
    assert!(names.contains(&"merchant_hired_player"));
    assert!(names.contains(&"quest_completed"));
}

#[test]
fn test_interrogation_without_fear_refuses() {
    let mut scene = Scene::new();
    scene.world.quests.start_quest("lost_crate", 0).unwrap();
    let node = scene.start("bandit_rook", "bandit_interrogation");
    let end = scene
        .pick(&node, "Who ordered the raid on the merchant's cart?")
        .unwrap();
    assert_eq!(end.node_id, "refuse");
    assert!(!scene.world.flags.is_set("crate_location_known"));
}

#[test]
fn test_conversation_is_remembered() {
    let mut scene = Scene::new();
    let node = scene.start("merchant_tomas", "merchant");
    scene.pick(&node, "Just browsing.");

    let tomas = scene.world.agent(&"merchant_tomas".into()).unwrap();
    assert!(tomas.memory.recall("talked_to:player").is_some());
    let last = scene.world.bus.events().last().unwrap();
    assert_eq!(last.kind.name(), "dialogue_ended");
}
