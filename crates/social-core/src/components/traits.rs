//! Trait Registry
//!
//! Static table of personality traits, their opposition pairs and the
//! numeric modifiers the resolver and scheduler read.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Maximum number of traits an agent carries
pub const MAX_TRAITS: usize = 3;

/// Order in which trait-conditioned dialogue variants are tried
pub const VARIANT_PRECEDENCE: &[Trait] = &[Trait::Proud, Trait::Humble, Trait::Greedy];

/// Personality trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Proud,
    Humble,
    Greedy,
    Generous,
    Brave,
    Cowardly,
    Gossipy,
    Secretive,
    Aggressive,
    Peaceful,
    Honest,
    Deceitful,
}

impl Trait {
    pub const ALL: [Trait; 12] = [
        Trait::Proud,
        Trait::Humble,
        Trait::Greedy,
        Trait::Generous,
        Trait::Brave,
        Trait::Cowardly,
        Trait::Gossipy,
        Trait::Secretive,
        Trait::Aggressive,
        Trait::Peaceful,
        Trait::Honest,
        Trait::Deceitful,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Trait::Proud => "proud",
            Trait::Humble => "humble",
            Trait::Greedy => "greedy",
            Trait::Generous => "generous",
            Trait::Brave => "brave",
            Trait::Cowardly => "cowardly",
            Trait::Gossipy => "gossipy",
            Trait::Secretive => "secretive",
            Trait::Aggressive => "aggressive",
            Trait::Peaceful => "peaceful",
            Trait::Honest => "honest",
            Trait::Deceitful => "deceitful",
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric effects of a trait
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitModifiers {
    /// Added to the per-tick socialize chance
    pub social_chance: f32,
    /// Scales the value gained from received gifts
    pub gift_multiplier: f32,
    /// Added to intimidation
    pub intimidation: i32,
    /// Scales fear gained from threats
    pub fear_multiplier: f32,
    /// Scales value gained from compliments
    pub compliment_multiplier: f32,
}

impl Default for TraitModifiers {
    fn default() -> Self {
        Self {
            social_chance: 0.0,
            gift_multiplier: 1.0,
            intimidation: 0,
            fear_multiplier: 1.0,
            compliment_multiplier: 1.0,
        }
    }
}

/// Registry entry
#[derive(Debug, Clone, Copy)]
pub struct TraitDef {
    pub id: Trait,
    pub opposite: Trait,
    pub modifiers: TraitModifiers,
}

/// Trait set construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraitError {
    #[error("traits '{0}' and '{1}' oppose each other")]
    Opposed(Trait, Trait),
    #[error("{0} traits exceed the per-agent limit")]
    TooMany(usize),
}

/// Static trait table
#[derive(Debug, Clone)]
pub struct TraitRegistry {
    defs: HashMap<Trait, TraitDef>,
}

impl TraitRegistry {
    /// The built-in trait table
    pub fn standard() -> Self {
        let m = TraitModifiers::default;
        let table = [
            (Trait::Proud, Trait::Humble, TraitModifiers { compliment_multiplier: 2.0, ..m() }),
            (Trait::Humble, Trait::Proud, TraitModifiers { compliment_multiplier: 0.5, ..m() }),
            (Trait::Greedy, Trait::Generous, TraitModifiers { gift_multiplier: 2.0, ..m() }),
            (Trait::Generous, Trait::Greedy, TraitModifiers { gift_multiplier: 1.5, ..m() }),
            (
                Trait::Brave,
                Trait::Cowardly,
                TraitModifiers { intimidation: 2, fear_multiplier: 0.5, ..m() },
            ),
            (
                Trait::Cowardly,
                Trait::Brave,
                TraitModifiers { intimidation: -3, fear_multiplier: 2.0, ..m() },
            ),
            (Trait::Gossipy, Trait::Secretive, TraitModifiers { social_chance: 0.10, ..m() }),
            (Trait::Secretive, Trait::Gossipy, TraitModifiers { social_chance: -0.05, ..m() }),
            (
                Trait::Aggressive,
                Trait::Peaceful,
                TraitModifiers { social_chance: 0.05, intimidation: 3, ..m() },
            ),
            (Trait::Peaceful, Trait::Aggressive, TraitModifiers { social_chance: 0.05, ..m() }),
            (Trait::Honest, Trait::Deceitful, m()),
            (Trait::Deceitful, Trait::Honest, m()),
        ];

        let defs = table
            .into_iter()
            .map(|(id, opposite, modifiers)| (id, TraitDef { id, opposite, modifiers }))
            .collect();
        Self { defs }
    }

    pub fn get(&self, id: Trait) -> Option<&TraitDef> {
        self.defs.get(&id)
    }

    pub fn modifiers(&self, id: Trait) -> TraitModifiers {
        self.defs.get(&id).map(|d| d.modifiers).unwrap_or_default()
    }

    pub fn are_opposed(&self, a: Trait, b: Trait) -> bool {
        self.defs.get(&a).is_some_and(|d| d.opposite == b)
    }

    /// Sum of social chance adjustments for a trait set
    pub fn social_chance(&self, traits: &TraitSet) -> f32 {
        traits.iter().map(|t| self.modifiers(t).social_chance).sum()
    }

    /// Product of gift multipliers for a trait set
    pub fn gift_multiplier(&self, traits: &TraitSet) -> f32 {
        traits.iter().map(|t| self.modifiers(t).gift_multiplier).product()
    }

    pub fn fear_multiplier(&self, traits: &TraitSet) -> f32 {
        traits.iter().map(|t| self.modifiers(t).fear_multiplier).product()
    }

    pub fn compliment_multiplier(&self, traits: &TraitSet) -> f32 {
        traits.iter().map(|t| self.modifiers(t).compliment_multiplier).product()
    }

    pub fn intimidation(&self, traits: &TraitSet) -> i32 {
        traits.iter().map(|t| self.modifiers(t).intimidation).sum()
    }
}

impl Default for TraitRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// A small set of mutually non-opposing traits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitSet(Vec<Trait>);

impl TraitSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a validated set; duplicates are collapsed
    pub fn new(registry: &TraitRegistry, traits: &[Trait]) -> Result<Self, TraitError> {
        let mut set: Vec<Trait> = Vec::with_capacity(traits.len());
        for &t in traits {
            if set.contains(&t) {
                continue;
            }
            if let Some(&other) = set.iter().find(|&&o| registry.are_opposed(o, t)) {
                return Err(TraitError::Opposed(other, t));
            }
            set.push(t);
        }
        if set.len() > MAX_TRAITS {
            return Err(TraitError::TooMany(set.len()));
        }
        Ok(Self(set))
    }

    /// Draws up to `count` traits, skipping any that oppose one already drawn
    pub fn random<R: Rng + ?Sized>(registry: &TraitRegistry, rng: &mut R, count: usize) -> Self {
        let mut pool = Trait::ALL.to_vec();
        pool.shuffle(rng);

        let mut set = Vec::new();
        for t in pool {
            if set.len() >= count.min(MAX_TRAITS) {
                break;
            }
            if set.iter().all(|&o| !registry.are_opposed(o, t)) {
                set.push(t);
            }
        }
        Self(set)
    }

    pub fn has(&self, t: Trait) -> bool {
        self.0.contains(&t)
    }

    pub fn iter(&self) -> impl Iterator<Item = Trait> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// First rule whose trait is present wins
pub fn first_match<'a, T>(traits: &TraitSet, rules: &'a [(Trait, T)]) -> Option<&'a T> {
    rules.iter().find(|(t, _)| traits.has(*t)).map(|(_, v)| v)
}

/// Picks the trait-keyed variant following a fixed precedence list
pub fn select_variant<'a, V>(
    traits: &TraitSet,
    precedence: &[Trait],
    variants: &'a HashMap<Trait, V>,
) -> Option<&'a V> {
    precedence
        .iter()
        .filter(|t| traits.has(**t))
        .find_map(|t| variants.get(t))
}
