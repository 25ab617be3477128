//! Social Resolver
//!
//! Executes one social action between two agents. Lookup, context building,
//! requirement and cooldown checks run against an immutable world; nothing
//! is mutated unless all of them pass.

use social_events::{RelationSnapshot, SocialEvent};
use tracing::{debug, info};

use super::catalog::{
    ActionCatalog, ActionContext, ActionDef, ActionParams, AgentView, SideEffect, SocialActionKind,
};
use super::reactions::{reaction_template, render_template};
use crate::components::agent::{Agent, AgentId};
use crate::components::faction::{FactionGraph, FactionId};
use crate::components::memory::MemoryEventKind;
use crate::components::relationship::RelationDelta;
use crate::components::traits::{TraitRegistry, TraitSet};
use crate::components::world::SocialWorld;
use crate::error::ActionRejected;

/// Result of a performed action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub action: SocialActionKind,
    /// Actor→target relationship after the action
    pub forward: RelationSnapshot,
    /// Target→actor relationship after the mirror delta, if any
    pub mirror: Option<RelationSnapshot>,
    pub side_effects: Vec<SideEffect>,
    /// What the target said
    pub reaction: String,
}

/// Everything decided before the first mutation
struct Plan {
    def: ActionDef,
    forward: RelationDelta,
    mirror: Option<RelationDelta>,
    side_effects: Vec<SideEffect>,
    memory: MemoryEventKind,
    actor_name: String,
    target_name: String,
    target_traits: TraitSet,
    target_faction: Option<FactionId>,
}

/// Applies catalog actions to a world
#[derive(Debug, Clone, Copy)]
pub struct SocialResolver<'a> {
    catalog: &'a ActionCatalog,
    traits: &'a TraitRegistry,
    factions: &'a FactionGraph,
}

impl<'a> SocialResolver<'a> {
    pub fn new(catalog: &'a ActionCatalog, traits: &'a TraitRegistry, factions: &'a FactionGraph) -> Self {
        Self {
            catalog,
            traits,
            factions,
        }
    }

    /// Resolves an action given by name
    pub fn execute_named(
        &self,
        world: &mut SocialWorld,
        actor: &AgentId,
        target: &AgentId,
        action: &str,
        params: &ActionParams,
        tick: u64,
    ) -> Result<ActionOutcome, ActionRejected> {
        let kind = action.parse::<SocialActionKind>().inspect_err(|e| {
            info!("{} could not act on {}: {}", actor, target, e);
        })?;
        self.execute(world, actor, target, kind, params, tick)
    }

    /// Resolves an action. On `Err` the world is untouched.
    pub fn execute(
        &self,
        world: &mut SocialWorld,
        actor: &AgentId,
        target: &AgentId,
        kind: SocialActionKind,
        params: &ActionParams,
        tick: u64,
    ) -> Result<ActionOutcome, ActionRejected> {
        let plan = self.plan(world, actor, target, kind, params, tick).inspect_err(|e| {
            info!("{} could not {} {}: {}", actor, kind, target, e);
        })?;

        let reason = plan.def.kind.name();
        let forward =
            world
                .relations
                .modify_relation(actor, target, &plan.forward, reason, tick, &mut world.bus);

        let mirror = plan.mirror.map(|delta| {
            world
                .relations
                .modify_relation(target, actor, &delta, reason, tick, &mut world.bus)
        });

        for effect in &plan.side_effects {
            self.apply_side_effect(world, actor, target, effect, tick);
        }

        let attitude = world
            .relations
            .overall_attitude(target, plan.target_faction.as_ref(), actor);
        let template = reaction_template(kind, &plan.target_traits, attitude);
        let reaction = render_template(template, &plan.actor_name, &plan.target_name);

        if let Some(target_agent) = world.agent_mut(target) {
            target_agent.memory.remember(plan.memory, tick);
        }

        world.bus.emit(
            tick,
            SocialEvent::ActionPerformed {
                actor: actor.to_string(),
                target: target.to_string(),
                action: kind.name().to_string(),
            },
        );
        world.bus.emit(
            tick,
            SocialEvent::DialogueLine {
                speaker: target.to_string(),
                listener: actor.to_string(),
                text: reaction.clone(),
            },
        );

        let cooldown = world.relations.config().action_cooldown_ticks;
        world.relations.set_cooldown(actor, target, cooldown, tick);

        debug!("{} performed {} on {}: \"{}\"", actor, kind, target, reaction);

        Ok(ActionOutcome {
            action: kind,
            forward,
            mirror,
            side_effects: plan.side_effects,
            reaction,
        })
    }

    fn view<'b>(&self, agent: &'b Agent) -> AgentView<'b> {
        AgentView {
            agent,
            intimidation: agent.intimidation(self.traits),
            gift_multiplier: self.traits.gift_multiplier(&agent.traits),
            fear_multiplier: self.traits.fear_multiplier(&agent.traits),
            compliment_multiplier: self.traits.compliment_multiplier(&agent.traits),
        }
    }

    fn plan(
        &self,
        world: &SocialWorld,
        actor_id: &AgentId,
        target_id: &AgentId,
        kind: SocialActionKind,
        params: &ActionParams,
        tick: u64,
    ) -> Result<Plan, ActionRejected> {
        let def = self
            .catalog
            .get(kind)
            .copied()
            .ok_or_else(|| ActionRejected::UnknownAction(kind.name().to_string()))?;

        if actor_id == target_id {
            return Err(ActionRejected::SelfTarget);
        }
        let actor = world
            .agent(actor_id)
            .ok_or_else(|| ActionRejected::UnknownAgent(actor_id.clone()))?;
        let target = world
            .agent(target_id)
            .ok_or_else(|| ActionRejected::UnknownAgent(target_id.clone()))?;

        let factions_hostile = target.faction.as_ref().is_some_and(|target_faction| {
            self.factions
                .is_hostile_toward(actor.faction.as_ref(), actor.disguise(), target_faction)
        });

        let ctx = ActionContext {
            actor: self.view(actor),
            target: self.view(target),
            actor_to_target: world.relations.snapshot(actor_id, target_id),
            target_to_actor: world.relations.snapshot(target_id, actor_id),
            factions_hostile,
            target_grudge: target.memory.grudge_score(actor_id, tick),
            action: kind,
            params,
            tick,
        };

        if !(def.requires)(&ctx) {
            return Err(ActionRejected::RequirementFailed {
                action: kind.name().to_string(),
                reason: def.refusal.to_string(),
            });
        }

        if !world.relations.can_interact(actor_id, target_id, tick) {
            return Err(ActionRejected::OnCooldown {
                until: world.relations.cooldown_until(actor_id, target_id),
            });
        }

        Ok(Plan {
            def,
            forward: (def.effects)(&ctx),
            mirror: def.mirror.map(|f| f(&ctx)),
            side_effects: def.side_effect.map(|f| f(&ctx)).unwrap_or_default(),
            memory: (def.memory)(&ctx),
            actor_name: actor.name.clone(),
            target_name: target.name.clone(),
            target_traits: target.traits.clone(),
            target_faction: target.faction.clone(),
        })
    }

    fn apply_side_effect(
        &self,
        world: &mut SocialWorld,
        actor: &AgentId,
        target: &AgentId,
        effect: &SideEffect,
        tick: u64,
    ) {
        match effect {
            SideEffect::TransferGold { amount } => {
                if let Some(giver) = world.agent_mut(actor) {
                    giver.gold = giver.gold.saturating_sub(*amount);
                }
                if let Some(receiver) = world.agent_mut(target) {
                    receiver.gold += amount;
                }
                world.bus.emit(
                    tick,
                    SocialEvent::GoldTransferred {
                        from: actor.to_string(),
                        to: Some(target.to_string()),
                        amount: *amount,
                    },
                );
            }
            SideEffect::TransferRumors => self.transfer_rumors(world, actor, target, tick),
            SideEffect::Recruit => {
                if let Some(recruit) = world.agent_mut(target) {
                    recruit.companion_of = Some(actor.clone());
                }
                world.bus.emit(
                    tick,
                    SocialEvent::Recruited {
                        recruiter: actor.to_string(),
                        recruit: target.to_string(),
                    },
                );
            }
            SideEffect::OpenTrade => {
                world.bus.emit(
                    tick,
                    SocialEvent::TradeOpened {
                        buyer: actor.to_string(),
                        seller: target.to_string(),
                    },
                );
            }
            SideEffect::Forgive => {
                if let Some(forgiver) = world.agent_mut(target) {
                    let resolved = forgiver.memory.resolve_grudges_against(actor);
                    debug!("{} let go of {} grudges against {}", target, resolved, actor);
                }
            }
        }
    }

    fn transfer_rumors(&self, world: &mut SocialWorld, teller: &AgentId, listener: &AgentId, tick: u64) {
        let Some(mut listener_memory) = world.agent_mut(listener).map(|a| std::mem::take(&mut a.memory))
        else {
            return;
        };

        let shared = match world.agent_mut(teller) {
            Some(teller_agent) => teller_agent
                .memory
                .share_rumors_with(teller, &mut listener_memory, tick),
            None => Vec::new(),
        };

        if let Some(listener_agent) = world.agent_mut(listener) {
            listener_agent.memory = listener_memory;
        }

        for (subject, detail) in shared {
            world.bus.emit(
                tick,
                SocialEvent::RumorShared {
                    teller: teller.to_string(),
                    listener: listener.to_string(),
                    subject,
                    detail,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::memory::Rumor;
    use crate::components::relationship::RelationDelta;
    use crate::components::traits::Trait;
    use crate::config::FactionConfig;
    use crate::setup::create_factions;

    struct Fixture {
        catalog: ActionCatalog,
        traits: TraitRegistry,
        factions: FactionGraph,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: ActionCatalog::standard(),
                traits: TraitRegistry::standard(),
                factions: create_factions(FactionConfig::default()),
            }
        }

        fn resolver(&self) -> SocialResolver<'_> {
            SocialResolver::new(&self.catalog, &self.traits, &self.factions)
        }
    }

    fn id(s: &str) -> AgentId {
        AgentId::from(s)
    }

    fn world_with(agents: Vec<Agent>) -> SocialWorld {
        let mut world = SocialWorld::with_defaults();
        for agent in agents {
            world.spawn(agent);
        }
        world
    }

    #[test]
    fn test_greedy_target_gift() {
        let fx = Fixture::new();
        let greedy = TraitSet::new(&fx.traits, &[Trait::Greedy]).unwrap();
        let mut world = world_with(vec![
            Agent::new("a", "Ada").with_traits(greedy),
            Agent::new("b", "Bram").with_gold(30),
        ]);

        let outcome = fx
            .resolver()
            .execute(&mut world, &id("b"), &id("a"), SocialActionKind::Gift, &ActionParams::gold(20), 1)
            .unwrap();

        let mirror = outcome.mirror.unwrap();
        assert_eq!(mirror.value, 4.0);
        assert_eq!(mirror.trust, 2.0);
        assert_eq!(world.agent(&id("b")).unwrap().gold, 10);
        assert_eq!(world.agent(&id("a")).unwrap().gold, 20);
        assert!(outcome.reaction.starts_with("Is that all?"));
    }

    #[test]
    fn test_failed_threaten_changes_nothing() {
        let fx = Fixture::new();
        let mut world = world_with(vec![
            Agent::new("weak", "Weak").with_stats(6, 10),
            Agent::new("t", "Target"),
        ]);
        world
            .relations
            .modify_relation(&id("weak"), &id("t"), &RelationDelta::new().value(-10.0), "setup", 0, &mut world.bus);
        world.bus.drain();
        let before = serde_json::to_string(&world.dump()).unwrap();

        let err = fx
            .resolver()
            .execute(&mut world, &id("weak"), &id("t"), SocialActionKind::Threaten, &ActionParams::default(), 1)
            .unwrap_err();

        assert_eq!(
            err,
            ActionRejected::RequirementFailed {
                action: "threaten".to_string(),
                reason: "not intimidating enough".to_string()
            }
        );
        assert_eq!(serde_json::to_string(&world.dump()).unwrap(), before);
        assert!(world.bus.is_empty());
        assert!(world.relations.can_interact(&id("weak"), &id("t"), 1));
    }

    #[test]
    fn test_rejection_does_not_create_relationships() {
        let fx = Fixture::new();
        let mut world = world_with(vec![Agent::new("a", "A"), Agent::new("b", "B")]);
        let result = fx
            .resolver()
            .execute(&mut world, &id("a"), &id("b"), SocialActionKind::Gift, &ActionParams::gold(5), 0);
        assert!(result.is_err());
        assert!(world.relations.is_empty());
    }

    #[test]
    fn test_cooldown_blocks_second_action() {
        let fx = Fixture::new();
        let mut world = world_with(vec![Agent::new("a", "A"), Agent::new("b", "B")]);
        let resolver = fx.resolver();

        resolver
            .execute(&mut world, &id("a"), &id("b"), SocialActionKind::Chat, &ActionParams::default(), 5)
            .unwrap();
        let err = resolver
            .execute(&mut world, &id("a"), &id("b"), SocialActionKind::Chat, &ActionParams::default(), 6)
            .unwrap_err();
        assert_eq!(err, ActionRejected::OnCooldown { until: 7 });

        // The reverse direction is free
        assert!(resolver
            .execute(&mut world, &id("b"), &id("a"), SocialActionKind::Chat, &ActionParams::default(), 6)
            .is_ok());
        assert!(resolver
            .execute(&mut world, &id("a"), &id("b"), SocialActionKind::Chat, &ActionParams::default(), 7)
            .is_ok());
    }

    #[test]
    fn test_unknown_and_self_targets() {
        let fx = Fixture::new();
        let mut world = world_with(vec![Agent::new("a", "A")]);
        let resolver = fx.resolver();

        assert_eq!(
            resolver.execute_named(&mut world, &id("a"), &id("b"), "juggle", &ActionParams::default(), 0),
            Err(ActionRejected::UnknownAction("juggle".to_string()))
        );
        assert_eq!(
            resolver.execute(&mut world, &id("a"), &id("a"), SocialActionKind::Chat, &ActionParams::default(), 0),
            Err(ActionRejected::SelfTarget)
        );
        assert_eq!(
            resolver.execute(&mut world, &id("a"), &id("b"), SocialActionKind::Chat, &ActionParams::default(), 0),
            Err(ActionRejected::UnknownAgent(id("b")))
        );
    }

    #[test]
    fn test_action_events_and_memory() {
        let fx = Fixture::new();
        let mut world = world_with(vec![Agent::new("a", "Ada"), Agent::new("b", "Bram")]);

        fx.resolver()
            .execute(&mut world, &id("a"), &id("b"), SocialActionKind::Insult, &ActionParams::default(), 3)
            .unwrap();

        let names: Vec<&str> = world.bus.events().iter().map(|e| e.kind.name()).collect();
        assert_eq!(
            names,
            vec!["relationship_changed", "relationship_changed", "action_performed", "dialogue_line"]
        );
        let bram = world.agent(&id("b")).unwrap();
        assert!(bram.memory.grudge_score(&id("a"), 3) > 0.0);
        assert_eq!(world.relations.snapshot(&id("b"), &id("a")).value, -8.0);
    }

    #[test]
    fn test_share_rumor_transfers() {
        let fx = Fixture::new();
        let mut gossip = Agent::new("x", "Xan");
        gossip.memory.add_rumor(Rumor::new("miller", "waters the flour", 0));
        let mut world = world_with(vec![gossip, Agent::new("y", "Yva")]);

        fx.resolver()
            .execute(&mut world, &id("x"), &id("y"), SocialActionKind::ShareRumor, &ActionParams::default(), 2)
            .unwrap();

        assert_eq!(world.agent(&id("x")).unwrap().memory.rumors()[0].spread_count, 1);
        let heard = &world.agent(&id("y")).unwrap().memory.rumors()[0];
        assert_eq!(heard.spread_count, 0);
        assert_eq!(heard.source, Some(id("x")));
        assert_eq!(world.bus.events().iter().filter(|e| e.kind.name() == "rumor_shared").count(), 1);
    }

    #[test]
    fn test_share_rumor_with_someone_who_knows_it() {
        let fx = Fixture::new();
        let mut gossip = Agent::new("x", "Xan");
        gossip.memory.add_rumor(Rumor::new("miller", "waters flour", 0));
        let mut listener = Agent::new("y", "Yva");
        listener.memory.add_rumor(Rumor::new("miller", "waters flour", 0));
        let mut world = world_with(vec![gossip, listener]);

        for tick in [10, 20, 30] {
            fx.resolver()
                .execute(&mut world, &id("x"), &id("y"), SocialActionKind::ShareRumor, &ActionParams::default(), tick)
                .unwrap();
        }

        assert_eq!(world.agent(&id("x")).unwrap().memory.rumors()[0].spread_count, 0);
        assert_eq!(world.agent(&id("y")).unwrap().memory.rumors().len(), 1);
        assert_eq!(world.bus.events().iter().filter(|e| e.kind.name() == "rumor_shared").count(), 0);
    }

    #[test]
    fn test_apologize_forgives() {
        let fx = Fixture::new();
        let mut victim = Agent::new("v", "Vic");
        victim.memory.remember(MemoryEventKind::InsultedBy { by: id("o"), amount: 8.0 }, 0);
        let mut world = world_with(vec![victim, Agent::new("o", "Olf")]);
        let resolver = fx.resolver();

        resolver
            .execute(&mut world, &id("o"), &id("v"), SocialActionKind::Apologize, &ActionParams::default(), 1)
            .unwrap();
        assert_eq!(world.agent(&id("v")).unwrap().memory.grudge_score(&id("o"), 1), 0.0);

        let err = resolver
            .execute(&mut world, &id("o"), &id("v"), SocialActionKind::Apologize, &ActionParams::default(), 5)
            .unwrap_err();
        assert!(matches!(err, ActionRejected::RequirementFailed { .. }));
    }

    #[test]
    fn test_trade_refused_across_hostile_factions_unless_disguised() {
        use crate::components::inventory::{Item, ItemCategory};

        let fx = Fixture::new();
        let mut world = world_with(vec![
            Agent::new("bandit", "Rook").with_faction("bandits"),
            Agent::new("guard", "Hale").with_faction("guards"),
        ]);
        let resolver = fx.resolver();

        assert!(resolver
            .execute(&mut world, &id("bandit"), &id("guard"), SocialActionKind::Trade, &ActionParams::default(), 0)
            .is_err());

        world.agent_mut(&id("bandit")).unwrap().equipped = Some(
            Item::new("banana_guard", "Banana Guard Outfit", ItemCategory::Disguise).with_disguise("banana_guard"),
        );
        assert!(resolver
            .execute(&mut world, &id("bandit"), &id("guard"), SocialActionKind::Trade, &ActionParams::default(), 0)
            .is_ok());
    }
}
