//! Social Action Catalog
//!
//! Static table of social actions. Each entry is plain data plus function
//! pointers: a requirement predicate, the actor→target delta, an optional
//! target→actor mirror, optional side effects and the memory the target
//! keeps of it.

use serde::{Deserialize, Serialize};
use social_events::RelationSnapshot;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::components::agent::Agent;
use crate::components::memory::MemoryEventKind;
use crate::components::relationship::RelationDelta;
use crate::error::ActionRejected;

/// Type of social action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialActionKind {
    Chat,
    Compliment,
    Gift,
    Insult,
    Threaten,
    ShareRumor,
    Trade,
    Recruit,
    Apologize,
}

impl SocialActionKind {
    pub const ALL: [SocialActionKind; 9] = [
        SocialActionKind::Chat,
        SocialActionKind::Compliment,
        SocialActionKind::Gift,
        SocialActionKind::Insult,
        SocialActionKind::Threaten,
        SocialActionKind::ShareRumor,
        SocialActionKind::Trade,
        SocialActionKind::Recruit,
        SocialActionKind::Apologize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SocialActionKind::Chat => "chat",
            SocialActionKind::Compliment => "compliment",
            SocialActionKind::Gift => "gift",
            SocialActionKind::Insult => "insult",
            SocialActionKind::Threaten => "threaten",
            SocialActionKind::ShareRumor => "share_rumor",
            SocialActionKind::Trade => "trade",
            SocialActionKind::Recruit => "recruit",
            SocialActionKind::Apologize => "apologize",
        }
    }
}

impl fmt::Display for SocialActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SocialActionKind {
    type Err = ActionRejected;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SocialActionKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| ActionRejected::UnknownAction(s.to_string()))
    }
}

/// Caller-supplied extras
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionParams {
    /// Gold offered by a gift
    pub amount: u32,
    pub topic: Option<String>,
}

impl ActionParams {
    pub fn gold(amount: u32) -> Self {
        Self {
            amount,
            ..Self::default()
        }
    }
}

/// One side of an action with its trait-derived numbers resolved
#[derive(Debug, Clone, Copy)]
pub struct AgentView<'a> {
    pub agent: &'a Agent,
    pub intimidation: i32,
    pub gift_multiplier: f32,
    pub fear_multiplier: f32,
    pub compliment_multiplier: f32,
}

/// Everything a catalog function may read. Built from pre-action state.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub actor: AgentView<'a>,
    pub target: AgentView<'a>,
    pub actor_to_target: RelationSnapshot,
    pub target_to_actor: RelationSnapshot,
    /// Target's faction treats the actor as hostile (disguises considered)
    pub factions_hostile: bool,
    /// Target's unresolved grudge score against the actor
    pub target_grudge: f32,
    pub action: SocialActionKind,
    pub params: &'a ActionParams,
    pub tick: u64,
}

/// Non-relationship consequence of an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SideEffect {
    TransferGold { amount: u32 },
    TransferRumors,
    Recruit,
    OpenTrade,
    Forgive,
}

type Predicate = fn(&ActionContext<'_>) -> bool;
type DeltaFn = fn(&ActionContext<'_>) -> RelationDelta;
type SideEffectFn = fn(&ActionContext<'_>) -> Vec<SideEffect>;
type MemoryFn = fn(&ActionContext<'_>) -> MemoryEventKind;

/// Catalog entry
#[derive(Clone, Copy)]
pub struct ActionDef {
    pub kind: SocialActionKind,
    pub label: &'static str,
    /// Reason reported when `requires` fails
    pub refusal: &'static str,
    pub requires: Predicate,
    pub effects: DeltaFn,
    pub mirror: Option<DeltaFn>,
    pub side_effect: Option<SideEffectFn>,
    pub memory: MemoryFn,
}

impl fmt::Debug for ActionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Tunable numbers for the standard catalog
pub mod action_constants {
    /// Intimidation needed to threaten someone you don't already dislike
    pub const THREATEN_MIN_INTIMIDATION: i32 = 10;
    /// Actor→target value at or below which threatening needs no muscle
    pub const THREATEN_HOSTILE_VALUE: f32 = -20.0;
    /// Target→actor value at or below which compliments are refused
    pub const COMPLIMENT_REFUSAL_VALUE: f32 = -50.0;
    /// Target→actor value at or below which trade is refused
    pub const TRADE_REFUSAL_VALUE: f32 = -20.0;
    /// Target→actor value and trust needed to recruit
    pub const RECRUIT_MIN_VALUE: f32 = 50.0;
    pub const RECRUIT_MIN_TRUST: f32 = 30.0;
}

use action_constants::*;

fn always(_: &ActionContext<'_>) -> bool {
    true
}

fn social(ctx: &ActionContext<'_>) -> MemoryEventKind {
    MemoryEventKind::SocialAction {
        actor: ctx.actor.agent.id.clone(),
        action: ctx.action.name().to_string(),
    }
}

fn chat() -> ActionDef {
    ActionDef {
        kind: SocialActionKind::Chat,
        label: "Chat",
        refusal: "doesn't want to talk",
        requires: always,
        effects: |_| RelationDelta::new().value(1.0),
        mirror: Some(|_| RelationDelta::new().value(2.0).trust(1.0)),
        side_effect: None,
        memory: social,
    }
}

fn compliment() -> ActionDef {
    ActionDef {
        kind: SocialActionKind::Compliment,
        label: "Compliment",
        refusal: "too hostile",
        requires: |ctx| ctx.target_to_actor.value > COMPLIMENT_REFUSAL_VALUE,
        effects: |_| RelationDelta::new().value(1.0),
        mirror: Some(|ctx| {
            RelationDelta::new()
                .value(3.0 * ctx.target.compliment_multiplier)
                .respect(1.0)
        }),
        side_effect: None,
        memory: |ctx| MemoryEventKind::ComplimentedBy {
            by: ctx.actor.agent.id.clone(),
            amount: 3.0 * ctx.target.compliment_multiplier,
        },
    }
}

fn gift() -> ActionDef {
    ActionDef {
        kind: SocialActionKind::Gift,
        label: "Give gold",
        refusal: "not enough gold",
        requires: |ctx| ctx.params.amount > 0 && ctx.actor.agent.gold >= ctx.params.amount,
        effects: |_| RelationDelta::new().value(1.0),
        mirror: Some(|ctx| {
            let gained = (ctx.params.amount as f32 * ctx.target.gift_multiplier / 10.0).floor();
            RelationDelta::new().value(gained).trust(2.0)
        }),
        side_effect: Some(|ctx| {
            vec![SideEffect::TransferGold {
                amount: ctx.params.amount,
            }]
        }),
        memory: |ctx| MemoryEventKind::GiftFrom {
            by: ctx.actor.agent.id.clone(),
            amount: ctx.params.amount as f32 * ctx.target.gift_multiplier / 2.0,
        },
    }
}

fn insult() -> ActionDef {
    ActionDef {
        kind: SocialActionKind::Insult,
        label: "Insult",
        refusal: "won't dignify that",
        requires: always,
        effects: |_| RelationDelta::new().value(-2.0),
        mirror: Some(|_| RelationDelta::new().value(-8.0).respect(-3.0)),
        side_effect: None,
        memory: |ctx| MemoryEventKind::InsultedBy {
            by: ctx.actor.agent.id.clone(),
            amount: 8.0,
        },
    }
}

fn threaten() -> ActionDef {
    ActionDef {
        kind: SocialActionKind::Threaten,
        label: "Threaten",
        refusal: "not intimidating enough",
        requires: |ctx| {
            ctx.actor.intimidation >= THREATEN_MIN_INTIMIDATION
                || ctx.actor_to_target.value <= THREATEN_HOSTILE_VALUE
        },
        effects: |_| RelationDelta::new().value(-2.0),
        mirror: Some(|ctx| {
            RelationDelta::new()
                .fear(10.0 * ctx.target.fear_multiplier)
                .value(-6.0)
                .trust(-5.0)
        }),
        side_effect: None,
        memory: |ctx| MemoryEventKind::ThreatenedBy {
            by: ctx.actor.agent.id.clone(),
            amount: 10.0 * ctx.target.fear_multiplier,
        },
    }
}

fn share_rumor() -> ActionDef {
    ActionDef {
        kind: SocialActionKind::ShareRumor,
        label: "Share gossip",
        refusal: "has nothing to share",
        requires: |ctx| ctx.actor.agent.memory.shareable_rumors().next().is_some(),
        effects: |_| RelationDelta::new().value(1.0),
        mirror: Some(|_| RelationDelta::new().value(2.0).trust(1.0)),
        side_effect: Some(|_| vec![SideEffect::TransferRumors]),
        memory: social,
    }
}

fn trade() -> ActionDef {
    ActionDef {
        kind: SocialActionKind::Trade,
        label: "Trade",
        refusal: "won't trade with you",
        requires: |ctx| {
            !ctx.factions_hostile
                && !ctx.target.agent.hostile
                && ctx.target_to_actor.value > TRADE_REFUSAL_VALUE
        },
        effects: |_| RelationDelta::new(),
        mirror: Some(|_| RelationDelta::new().trust(1.0)),
        side_effect: Some(|_| vec![SideEffect::OpenTrade]),
        memory: social,
    }
}

fn recruit() -> ActionDef {
    ActionDef {
        kind: SocialActionKind::Recruit,
        label: "Recruit",
        refusal: "not loyal enough",
        requires: |ctx| {
            !ctx.target.agent.is_player
                && ctx.target.agent.companion_of.is_none()
                && ctx.target_to_actor.value >= RECRUIT_MIN_VALUE
                && ctx.target_to_actor.trust >= RECRUIT_MIN_TRUST
        },
        effects: |_| RelationDelta::new().trust(2.0),
        mirror: Some(|_| RelationDelta::new().respect(5.0)),
        side_effect: Some(|_| vec![SideEffect::Recruit]),
        memory: |ctx| MemoryEventKind::HelpedBy {
            by: ctx.actor.agent.id.clone(),
            amount: 5.0,
        },
    }
}

fn apologize() -> ActionDef {
    ActionDef {
        kind: SocialActionKind::Apologize,
        label: "Apologize",
        refusal: "has nothing to forgive",
        requires: |ctx| ctx.target_grudge > 0.0,
        effects: |_| RelationDelta::new(),
        mirror: Some(|_| RelationDelta::new().value(5.0).trust(2.0)),
        side_effect: Some(|_| vec![SideEffect::Forgive]),
        memory: social,
    }
}

/// Every known social action
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    defs: BTreeMap<SocialActionKind, ActionDef>,
}

impl ActionCatalog {
    /// The built-in catalog
    pub fn standard() -> Self {
        let mut catalog = Self::default();
        for def in [
            chat(),
            compliment(),
            gift(),
            insult(),
            threaten(),
            share_rumor(),
            trade(),
            recruit(),
            apologize(),
        ] {
            catalog.register(def);
        }
        catalog
    }

    pub fn register(&mut self, def: ActionDef) {
        self.defs.insert(def.kind, def);
    }

    pub fn get(&self, kind: SocialActionKind) -> Option<&ActionDef> {
        self.defs.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDef> {
        self.defs.values()
    }

    pub fn kinds(&self) -> impl Iterator<Item = SocialActionKind> + '_ {
        self.defs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::traits::{Trait, TraitRegistry, TraitSet};

    fn view<'a>(agent: &'a Agent, registry: &TraitRegistry) -> AgentView<'a> {
        AgentView {
            agent,
            intimidation: agent.intimidation(registry),
            gift_multiplier: registry.gift_multiplier(&agent.traits),
            fear_multiplier: registry.fear_multiplier(&agent.traits),
            compliment_multiplier: registry.compliment_multiplier(&agent.traits),
        }
    }

    fn context<'a>(
        actor: AgentView<'a>,
        target: AgentView<'a>,
        action: SocialActionKind,
        params: &'a ActionParams,
    ) -> ActionContext<'a> {
        ActionContext {
            actor,
            target,
            actor_to_target: RelationSnapshot::default(),
            target_to_actor: RelationSnapshot::default(),
            factions_hostile: false,
            target_grudge: 0.0,
            action,
            params,
            tick: 0,
        }
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!("share_rumor".parse::<SocialActionKind>(), Ok(SocialActionKind::ShareRumor));
        assert_eq!(
            "dance".parse::<SocialActionKind>(),
            Err(ActionRejected::UnknownAction("dance".to_string()))
        );
    }

    #[test]
    fn test_standard_catalog_is_complete() {
        let catalog = ActionCatalog::standard();
        assert_eq!(catalog.len(), SocialActionKind::ALL.len());
        for kind in SocialActionKind::ALL {
            assert_eq!(catalog.get(kind).map(|d| d.kind), Some(kind));
        }
    }

    #[test]
    fn test_greedy_gift_mirror() {
        let registry = TraitRegistry::standard();
        let giver = Agent::new("b", "B").with_gold(50);
        let greedy = Agent::new("a", "A")
            .with_traits(TraitSet::new(&registry, &[Trait::Greedy]).unwrap());
        let params = ActionParams::gold(20);
        let ctx = context(view(&giver, &registry), view(&greedy, &registry), SocialActionKind::Gift, &params);

        let def = gift();
        assert!((def.requires)(&ctx));
        let mirror = (def.mirror.unwrap())(&ctx);
        assert_eq!(mirror.value, 4.0);
        assert_eq!(mirror.trust, 2.0);
    }

    #[test]
    fn test_gift_needs_gold() {
        let registry = TraitRegistry::standard();
        let giver = Agent::new("b", "B").with_gold(5);
        let target = Agent::new("a", "A");
        let params = ActionParams::gold(20);
        let ctx = context(view(&giver, &registry), view(&target, &registry), SocialActionKind::Gift, &params);
        assert!(!(gift().requires)(&ctx));
    }

    #[test]
    fn test_threaten_requirement() {
        let registry = TraitRegistry::standard();
        let weakling = Agent::new("w", "W").with_stats(8, 10);
        let target = Agent::new("t", "T");
        let params = ActionParams::default();
        let mut ctx = context(
            view(&weakling, &registry),
            view(&target, &registry),
            SocialActionKind::Threaten,
            &params,
        );
        assert!(!(threaten().requires)(&ctx));

        ctx.actor_to_target.value = -20.0;
        assert!((threaten().requires)(&ctx));
    }

    #[test]
    fn test_cowardly_target_fears_more() {
        let registry = TraitRegistry::standard();
        let brute = Agent::new("b", "B").with_stats(20, 5);
        let coward = Agent::new("c", "C")
            .with_traits(TraitSet::new(&registry, &[Trait::Cowardly]).unwrap());
        let params = ActionParams::default();
        let ctx = context(view(&brute, &registry), view(&coward, &registry), SocialActionKind::Threaten, &params);

        let mirror = (threaten().mirror.unwrap())(&ctx);
        assert_eq!(mirror.fear, 20.0);
    }
}
