//! Dialogue Engine
//!
//! Runs one player-NPC conversation at a time through a dialogue tree.
//! Rendering filters choices by their conditions and remembers exactly
//! which ones were offered; selecting validates against that list, applies
//! the choice's effects, then enters the next node and applies its effects.

use bevy_ecs::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use social_events::{ChoiceRecord, SocialEvent};

use super::conditions::{evaluate_all, ConditionContext, Parties};
use super::effects::{apply_all, Effect, EffectEnv};
use super::tree::{DialogueLibrary, DialogueNode, DialogueTree};
use crate::components::agent::AgentId;
use crate::components::inventory::ItemCatalog;
use crate::components::memory::MemoryEventKind;
use crate::components::traits::{select_variant, VARIANT_PRECEDENCE};
use crate::components::world::SocialWorld;
use crate::error::DialogueError;
use crate::systems::reputation::ReputationPropagator;

/// Knowledge key an NPC stores after talking to someone
pub fn talked_to_key(player: &AgentId) -> String {
    format!("talked_to:{}", player)
}

/// An in-progress conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueSession {
    pub id: String,
    pub player: AgentId,
    pub npc: AgentId,
    pub tree: String,
    pub current_node: String,
    pub history: Vec<ChoiceRecord>,
    /// Declared choice indices shown by the last render
    pub offered: Option<Vec<usize>>,
}

impl DialogueSession {
    fn parties(&self) -> Parties {
        Parties {
            player: self.player.clone(),
            npc: self.npc.clone(),
        }
    }
}

/// Holds at most one conversation
#[derive(Resource, Debug, Clone, Default)]
pub struct ConversationSlot(Option<DialogueSession>);

impl ConversationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DialogueSession> {
        self.0.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.0.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedChoice {
    /// Position in the offered list; pass this to `select_choice`
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedNode {
    pub node_id: String,
    pub speaker: String,
    pub text: String,
    pub choices: Vec<RenderedChoice>,
    /// The conversation ended on this node
    pub terminal: bool,
}

/// Conversation driver with its collaborators injected
#[derive(Debug, Clone, Copy)]
pub struct DialogueEngine<'a> {
    library: &'a DialogueLibrary,
    items: &'a ItemCatalog,
    propagator: ReputationPropagator<'a>,
}

impl<'a> DialogueEngine<'a> {
    pub fn new(library: &'a DialogueLibrary, items: &'a ItemCatalog, propagator: ReputationPropagator<'a>) -> Self {
        Self {
            library,
            items,
            propagator,
        }
    }

    /// Opens a conversation and enters the tree's start node
    pub fn start_dialogue(
        &self,
        slot: &mut ConversationSlot,
        world: &mut SocialWorld,
        player: &AgentId,
        npc: &AgentId,
        tree_id: &str,
        tick: u64,
    ) -> Result<(), DialogueError> {
        if slot.is_active() {
            return Err(DialogueError::SessionActive);
        }
        let tree = self
            .library
            .get(tree_id)
            .ok_or_else(|| DialogueError::UnknownTree(tree_id.to_string()))?;
        let start = tree
            .node(&tree.start)
            .ok_or_else(|| DialogueError::MissingNode(tree.start.clone()))?;
        for id in [player, npc] {
            if world.agent(id).is_none() {
                return Err(DialogueError::UnknownAgent(id.clone()));
            }
        }

        let session = DialogueSession {
            id: uuid::Uuid::new_v4().to_string(),
            player: player.clone(),
            npc: npc.clone(),
            tree: tree.id.clone(),
            current_node: tree.start.clone(),
            history: Vec::new(),
            offered: None,
        };
        world.bus.emit(
            tick,
            SocialEvent::DialogueStarted {
                session_id: session.id.clone(),
                player: player.to_string(),
                npc: npc.to_string(),
                tree: tree.id.clone(),
            },
        );
        tracing::info!("{} started '{}' with {}", player, tree.id, npc);

        let parties = session.parties();
        slot.0 = Some(session);
        if let Err(e) = self.apply_effects(&start.effects, world, &parties, tick) {
            self.end_dialogue(slot, world, tick);
            return Err(e);
        }
        Ok(())
    }

    /// Renders the current node for the player
    pub fn get_current_node<R: Rng + ?Sized>(
        &self,
        slot: &mut ConversationSlot,
        world: &SocialWorld,
        rng: &mut R,
    ) -> Result<RenderedNode, DialogueError> {
        let session = slot.0.as_mut().ok_or(DialogueError::NoSession)?;
        let (_, node) = self.locate(session)?;

        let parties = session.parties();
        let player = world
            .agent(&parties.player)
            .ok_or_else(|| DialogueError::UnknownAgent(parties.player.clone()))?;
        let npc = world
            .agent(&parties.npc)
            .ok_or_else(|| DialogueError::UnknownAgent(parties.npc.clone()))?;
        let ctx = ConditionContext {
            world,
            parties: &parties,
            player,
            npc,
        };

        // chance conditions draw once here and the result sticks until the next render
        let offered: Vec<usize> = node
            .choices
            .iter()
            .enumerate()
            .filter(|(_, choice)| evaluate_all(&choice.conditions, &ctx, rng))
            .map(|(i, _)| i)
            .collect();

        let text = select_variant(&npc.traits, VARIANT_PRECEDENCE, &node.variants)
            .cloned()
            .unwrap_or_else(|| node.line.text());
        let choices = offered
            .iter()
            .enumerate()
            .map(|(index, declared)| RenderedChoice {
                index,
                text: node.choices[*declared].text.clone(),
            })
            .collect();

        let rendered = RenderedNode {
            node_id: session.current_node.clone(),
            speaker: npc.name.clone(),
            text,
            choices,
            terminal: node.end,
        };
        session.offered = Some(offered);
        Ok(rendered)
    }

    /// Takes an offered choice. Returns the next rendered node, or `None`
    /// when the conversation ended.
    pub fn select_choice<R: Rng + ?Sized>(
        &self,
        slot: &mut ConversationSlot,
        world: &mut SocialWorld,
        rng: &mut R,
        index: usize,
        tick: u64,
    ) -> Result<Option<RenderedNode>, DialogueError> {
        let needs_render = slot.session().ok_or(DialogueError::NoSession)?.offered.is_none();
        if needs_render {
            self.get_current_node(slot, world, rng)?;
        }

        let session = slot.0.as_mut().ok_or(DialogueError::NoSession)?;
        let offered = session.offered.clone().unwrap_or_default();
        let declared = *offered.get(index).ok_or(DialogueError::InvalidChoice {
            index,
            available: offered.len(),
        })?;
        let (tree, node) = self.locate(session)?;
        let choice = &node.choices[declared];

        session.history.push(ChoiceRecord {
            node_id: session.current_node.clone(),
            choice_index: declared,
            text: choice.text.clone(),
            tick,
        });
        session.offered = None;
        let parties = session.parties();

        self.apply_effects(&choice.effects, world, &parties, tick)?;

        let next_id = match (&choice.next, choice.end) {
            (Some(next), false) => next,
            _ => {
                self.end_dialogue(slot, world, tick);
                return Ok(None);
            }
        };
        let Some(next) = tree.node(next_id) else {
            tracing::warn!("Dialogue tree '{}' has no node '{}'; ending", tree.id, next_id);
            self.end_dialogue(slot, world, tick);
            return Ok(None);
        };

        if let Some(session) = slot.0.as_mut() {
            session.current_node = next_id.clone();
        }
        self.apply_effects(&next.effects, world, &parties, tick)?;

        let mut rendered = self.get_current_node(slot, world, rng)?;
        if next.end {
            rendered.terminal = true;
            self.end_dialogue(slot, world, tick);
        }
        Ok(Some(rendered))
    }

    /// Closes the conversation. Without one this does nothing.
    pub fn end_dialogue(
        &self,
        slot: &mut ConversationSlot,
        world: &mut SocialWorld,
        tick: u64,
    ) -> Option<DialogueSession> {
        let session = slot.0.take()?;

        world.bus.emit(
            tick,
            SocialEvent::DialogueEnded {
                session_id: session.id.clone(),
                player: session.player.to_string(),
                npc: session.npc.to_string(),
                tree: session.tree.clone(),
                final_node: session.current_node.clone(),
                history: session.history.clone(),
            },
        );

        if let Some(npc) = world.agent_mut(&session.npc) {
            npc.memory.remember(
                MemoryEventKind::Conversation {
                    with: session.player.clone(),
                    turns: session.history.len(),
                    final_node: session.current_node.clone(),
                },
                tick,
            );
            npc.memory.learn(talked_to_key(&session.player), session.tree.as_str(), tick);
        }

        tracing::info!(
            "{} ended '{}' with {} after {} choices",
            session.player,
            session.tree,
            session.npc,
            session.history.len()
        );
        Some(session)
    }

    fn locate(&self, session: &DialogueSession) -> Result<(&'a DialogueTree, &'a DialogueNode), DialogueError> {
        let tree = self
            .library
            .get(&session.tree)
            .ok_or_else(|| DialogueError::UnknownTree(session.tree.clone()))?;
        let node = tree
            .node(&session.current_node)
            .ok_or_else(|| DialogueError::MissingNode(session.current_node.clone()))?;
        Ok((tree, node))
    }

    fn apply_effects(
        &self,
        effects: &[Effect],
        world: &mut SocialWorld,
        parties: &Parties,
        tick: u64,
    ) -> Result<(), DialogueError> {
        let env = EffectEnv {
            items: self.items,
            propagator: self.propagator,
            parties,
            tick,
        };
        Ok(apply_all(effects, world, &env)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::Agent;
    use crate::components::relationship::RelationDelta;
    use crate::components::traits::{Trait, TraitRegistry, TraitSet};
    use crate::config::FactionConfig;
    use crate::error::CollaboratorError;
    use crate::setup::{create_factions, create_item_catalog};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const TREES: &str = r#"[
        {
            "id": "gate",
            "start": "greet",
            "nodes": {
                "greet": {
                    "line": "Halt.",
                    "variants": { "greedy": "Halt. Toll's due.", "proud": "Halt, commoner." },
                    "effects": [{ "type": "set_flag", "flag": "met_gate_guard" }],
                    "choices": [
                        { "text": "Let me through, friend.",
                          "conditions": [{ "type": "relation_at_least", "axis": "trust", "value": 50 }],
                          "next": "open" },
                        { "text": "Here's some coin.",
                          "effects": [{ "type": "remove_item", "item": "gold", "quantity": 5 }],
                          "next": "open" },
                        { "text": "Never mind.", "end": true }
                    ]
                },
                "open": {
                    "line": "Go on, then.",
                    "effects": [{ "type": "relation", "trust": 5 }],
                    "end": true
                },
                "broken": {
                    "line": "...",
                    "choices": [{ "text": "Huh?", "next": "missing" }]
                }
            }
        },
        {
            "id": "smuggler",
            "start": "offer",
            "nodes": {
                "offer": {
                    "line": "Take this and go.",
                    "effects": [{ "type": "give_item", "item": "dragon_egg" }],
                    "choices": [{ "text": "Thanks.", "end": true }]
                }
            }
        }
    ]"#;

    struct Fixture {
        library: DialogueLibrary,
        items: ItemCatalog,
        factions: crate::components::faction::FactionGraph,
        world: SocialWorld,
        slot: ConversationSlot,
        rng: SmallRng,
    }

    impl Fixture {
        fn new(guard_traits: &[Trait]) -> Self {
            let registry = TraitRegistry::standard();
            let mut world = SocialWorld::with_defaults();
            world.spawn(Agent::player("player", "Player").with_gold(10));
            world.spawn(
                Agent::new("guard", "Hale")
                    .with_faction("guards")
                    .with_traits(TraitSet::new(&registry, guard_traits).unwrap()),
            );
            Self {
                library: DialogueLibrary::from_json(TREES).unwrap(),
                items: create_item_catalog(),
                factions: create_factions(FactionConfig::default()),
                world,
                slot: ConversationSlot::new(),
                rng: SmallRng::seed_from_u64(3),
            }
        }

        fn engine(&self) -> DialogueEngine<'_> {
            DialogueEngine::new(&self.library, &self.items, ReputationPropagator::new(&self.factions))
        }

        fn start(&mut self) -> Result<(), DialogueError> {
            let engine = DialogueEngine::new(&self.library, &self.items, ReputationPropagator::new(&self.factions));
            engine.start_dialogue(
                &mut self.slot,
                &mut self.world,
                &"player".into(),
                &"guard".into(),
                "gate",
                1,
            )
        }

        fn render(&mut self) -> RenderedNode {
            let engine = DialogueEngine::new(&self.library, &self.items, ReputationPropagator::new(&self.factions));
            engine
                .get_current_node(&mut self.slot, &self.world, &mut self.rng)
                .unwrap()
        }

        fn select(&mut self, index: usize) -> Result<Option<RenderedNode>, DialogueError> {
            let engine = DialogueEngine::new(&self.library, &self.items, ReputationPropagator::new(&self.factions));
            engine.select_choice(&mut self.slot, &mut self.world, &mut self.rng, index, 2)
        }

        fn set_trust(&mut self, trust: f32) {
            let world = &mut self.world;
            world.relations.modify_relation(
                &"guard".into(),
                &"player".into(),
                &RelationDelta::new().trust(trust),
                "test",
                0,
                &mut world.bus,
            );
        }
    }

    #[test]
    fn test_start_fires_entry_effects() {
        let mut fx = Fixture::new(&[]);
        fx.start().unwrap();
        assert!(fx.world.flags.is_set("met_gate_guard"));
        assert!(fx.slot.is_active());
        assert_eq!(fx.start().unwrap_err(), DialogueError::SessionActive);
    }

    #[test]
    fn test_start_failures_leave_slot_empty() {
        let fx = Fixture::new(&[]);
        let engine = fx.engine();
        let mut slot = ConversationSlot::new();
        let mut world = SocialWorld::with_defaults();
        world.spawn(Agent::player("player", "Player"));

        let err = engine
            .start_dialogue(&mut slot, &mut world, &"player".into(), &"ghost".into(), "gate", 0)
            .unwrap_err();
        assert_eq!(err, DialogueError::UnknownAgent("ghost".into()));
        let err = engine
            .start_dialogue(&mut slot, &mut world, &"player".into(), &"ghost".into(), "nope", 0)
            .unwrap_err();
        assert_eq!(err, DialogueError::UnknownTree("nope".to_string()));
        assert!(!slot.is_active());
        assert!(world.bus.is_empty());
    }

    #[test]
    fn test_failed_entry_effect_closes_session() {
        let mut fx = Fixture::new(&[]);
        let engine = DialogueEngine::new(&fx.library, &fx.items, ReputationPropagator::new(&fx.factions));
        let err = engine
            .start_dialogue(&mut fx.slot, &mut fx.world, &"player".into(), &"guard".into(), "smuggler", 1)
            .unwrap_err();
        assert_eq!(err, DialogueError::Collaborator(CollaboratorError::UnknownItem("dragon_egg".to_string())));
        assert!(!fx.slot.is_active());
        assert_eq!(fx.world.bus.events().last().unwrap().kind.name(), "dialogue_ended");

        fx.start().unwrap();
        assert!(fx.slot.is_active());
    }

    #[test]
    fn test_trust_gate_boundary() {
        let mut fx = Fixture::new(&[]);
        fx.start().unwrap();

        fx.set_trust(49.0);
        let texts: Vec<String> = fx.render().choices.into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["Here's some coin.", "Never mind."]);

        fx.set_trust(1.0);
        let texts: Vec<String> = fx.render().choices.into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["Let me through, friend.", "Here's some coin.", "Never mind."]);
    }

    #[test]
    fn test_variant_precedence() {
        let mut fx = Fixture::new(&[Trait::Greedy, Trait::Proud]);
        fx.start().unwrap();
        assert_eq!(fx.render().text, "Halt, commoner.");

        let mut fx = Fixture::new(&[Trait::Greedy]);
        fx.start().unwrap();
        assert_eq!(fx.render().text, "Halt. Toll's due.");

        let mut fx = Fixture::new(&[Trait::Brave]);
        fx.start().unwrap();
        let node = fx.render();
        assert_eq!(node.text, "Halt.");
        assert_eq!(node.speaker, "Hale");
    }

    #[test]
    fn test_select_validates_against_offered() {
        let mut fx = Fixture::new(&[]);
        fx.start().unwrap();
        // trust gate hides the first choice, so only two are offered
        let err = fx.select(2).unwrap_err();
        assert_eq!(err, DialogueError::InvalidChoice { index: 2, available: 2 });
        assert!(fx.slot.session().unwrap().history.is_empty());
    }

    #[test]
    fn test_paying_enters_end_node() {
        let mut fx = Fixture::new(&[]);
        fx.start().unwrap();
        fx.render();

        let node = fx.select(0).unwrap().unwrap();
        assert_eq!(node.node_id, "open");
        assert!(node.terminal);
        assert!(!fx.slot.is_active());

        let player = fx.world.agent(&"player".into()).unwrap();
        assert_eq!(player.gold, 5);
        // node entry effect
        assert_eq!(fx.world.relations.snapshot(&"guard".into(), &"player".into()).trust, 5.0);

        let guard = fx.world.agent(&"guard".into()).unwrap();
        assert!(guard.memory.recall(&talked_to_key(&"player".into())).is_some());
        let last = fx.world.bus.events().last().unwrap();
        assert_eq!(last.kind.name(), "dialogue_ended");
    }

    #[test]
    fn test_end_choice_returns_none() {
        let mut fx = Fixture::new(&[]);
        fx.start().unwrap();
        fx.render();
        assert_eq!(fx.select(1).unwrap(), None);
        assert!(!fx.slot.is_active());
    }

    #[test]
    fn test_missing_next_node_ends() {
        let mut fx = Fixture::new(&[]);
        fx.start().unwrap();
        if let Some(session) = fx.slot.0.as_mut() {
            session.current_node = "broken".to_string();
            session.offered = None;
        }
        assert_eq!(fx.select(0).unwrap(), None);
        assert!(!fx.slot.is_active());
    }

    #[test]
    fn test_end_without_session_is_noop() {
        let mut fx = Fixture::new(&[]);
        let engine = DialogueEngine::new(&fx.library, &fx.items, ReputationPropagator::new(&fx.factions));
        assert!(engine.end_dialogue(&mut fx.slot, &mut fx.world, 0).is_none());
        assert!(fx.world.bus.is_empty());
    }
}
