//! Reaction Lines
//!
//! One-off lines a target speaks after a social action. The line comes from
//! the target's attitude band, unless a trait override for that action
//! matches first.

use super::catalog::SocialActionKind;
use crate::components::traits::{first_match, Trait, TraitSet};

/// Attitude at or above which a target reacts warmly
pub const WARM_ATTITUDE: f32 = 50.0;
/// Attitude at or below which a target reacts coldly
pub const COLD_ATTITUDE: f32 = -20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttitudeBand {
    Warm,
    Neutral,
    Cold,
}

impl AttitudeBand {
    pub fn from_attitude(attitude: f32) -> Self {
        if attitude >= WARM_ATTITUDE {
            AttitudeBand::Warm
        } else if attitude <= COLD_ATTITUDE {
            AttitudeBand::Cold
        } else {
            AttitudeBand::Neutral
        }
    }
}

/// Trait overrides, checked in order before the band table
const OVERRIDES: &[(SocialActionKind, Trait, &str)] = &[
    (SocialActionKind::Compliment, Trait::Proud, "Naturally. I'm glad you noticed, {actor}."),
    (SocialActionKind::Compliment, Trait::Humble, "Oh, you're too kind, {actor}. Really."),
    (SocialActionKind::Gift, Trait::Greedy, "Is that all? ...I'll take it, {actor}."),
    (SocialActionKind::Gift, Trait::Generous, "You shouldn't have, {actor}. I'll pass the kindness on."),
    (SocialActionKind::Threaten, Trait::Brave, "You don't scare me, {actor}."),
    (SocialActionKind::Threaten, Trait::Cowardly, "P-please, {actor}, I don't want any trouble!"),
    (SocialActionKind::Insult, Trait::Aggressive, "Say that again, {actor}. I dare you."),
    (SocialActionKind::Insult, Trait::Peaceful, "Harsh words won't help either of us, {actor}."),
    (SocialActionKind::ShareRumor, Trait::Gossipy, "No! Tell me everything, {actor}."),
    (SocialActionKind::ShareRumor, Trait::Secretive, "Hm. I'll keep that to myself."),
    (SocialActionKind::Apologize, Trait::Proud, "An apology. How overdue, {actor}."),
];

fn band_template(action: SocialActionKind, band: AttitudeBand) -> &'static str {
    use AttitudeBand::*;
    use SocialActionKind::*;
    match (action, band) {
        (Chat, Warm) => "Always good to see you, {actor}!",
        (Chat, Neutral) => "Hello, {actor}.",
        (Chat, Cold) => "What do you want, {actor}?",
        (Compliment, Warm) => "Thank you, {actor}, that means a lot.",
        (Compliment, Neutral) => "Why, thank you.",
        (Compliment, Cold) => "Flattery won't work on me, {actor}.",
        (Gift, Cold) => "I suppose I'll take it.",
        (Gift, _) => "Thank you, {actor}! That's generous.",
        (Insult, Warm) => "I thought we were friends, {actor}.",
        (Insult, _) => "How dare you!",
        (Threaten, Cold) => "You'll regret this, {actor}.",
        (Threaten, _) => "Alright, alright! No need for that.",
        (ShareRumor, Cold) => "Why should I believe you?",
        (ShareRumor, _) => "Really? I hadn't heard that.",
        (Trade, Cold) => "Make it quick.",
        (Trade, _) => "Let's see what you've got, {actor}.",
        (Recruit, _) => "I'll follow you, {actor}.",
        (Apologize, Cold) => "Words are cheap, {actor}. But fine.",
        (Apologize, _) => "Apology accepted, {actor}.",
    }
}

/// Picks the reaction template for a target
pub fn reaction_template(action: SocialActionKind, traits: &TraitSet, attitude: f32) -> &'static str {
    let rules: Vec<(Trait, &'static str)> = OVERRIDES
        .iter()
        .filter(|(kind, _, _)| *kind == action)
        .map(|(_, t, line)| (*t, *line))
        .collect();

    first_match(traits, &rules)
        .copied()
        .unwrap_or_else(|| band_template(action, AttitudeBand::from_attitude(attitude)))
}

/// Fills `{actor}` and `{target}` placeholders
pub fn render_template(template: &str, actor: &str, target: &str) -> String {
    template.replace("{actor}", actor).replace("{target}", target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::traits::TraitRegistry;

    #[test]
    fn test_bands() {
        assert_eq!(AttitudeBand::from_attitude(50.0), AttitudeBand::Warm);
        assert_eq!(AttitudeBand::from_attitude(0.0), AttitudeBand::Neutral);
        assert_eq!(AttitudeBand::from_attitude(-20.0), AttitudeBand::Cold);
    }

    #[test]
    fn test_override_beats_band() {
        let registry = TraitRegistry::standard();
        let proud = TraitSet::new(&registry, &[Trait::Proud]).unwrap();
        let line = reaction_template(SocialActionKind::Compliment, &proud, -40.0);
        assert!(line.starts_with("Naturally"));
    }

    #[test]
    fn test_override_only_for_its_action() {
        let registry = TraitRegistry::standard();
        let proud = TraitSet::new(&registry, &[Trait::Proud]).unwrap();
        let line = reaction_template(SocialActionKind::Chat, &proud, 60.0);
        assert_eq!(line, "Always good to see you, {actor}!");
    }

    #[test]
    fn test_render() {
        assert_eq!(
            render_template("{target} waves at {actor}.", "Ann", "Bo"),
            "Bo waves at Ann."
        );
    }
}
