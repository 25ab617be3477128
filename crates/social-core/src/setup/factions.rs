//! Faction Setup
//!
//! Creates the six factions, their authored relations and the disguise table.

use crate::components::faction::{Faction, FactionGraph, FactionValue};
use crate::components::traits::Trait;
use crate::config::FactionConfig;

/// Authored relation each faction holds toward the others
const RELATIONS: &[(&str, &[(&str, f32)])] = &[
    (
        "guards",
        &[("bandits", -150.0), ("merchants", 60.0), ("villagers", 50.0), ("scholars", 30.0), ("cultists", -80.0)],
    ),
    (
        "bandits",
        &[("guards", -150.0), ("merchants", -60.0), ("villagers", -30.0), ("scholars", 0.0), ("cultists", 20.0)],
    ),
    (
        "merchants",
        &[("guards", 60.0), ("bandits", -60.0), ("villagers", 40.0), ("scholars", 30.0), ("cultists", -40.0)],
    ),
    (
        "villagers",
        &[("guards", 50.0), ("bandits", -40.0), ("merchants", 50.0), ("scholars", 20.0), ("cultists", -60.0)],
    ),
    (
        "scholars",
        &[("guards", 30.0), ("bandits", -10.0), ("merchants", 30.0), ("villagers", 30.0), ("cultists", -70.0)],
    ),
    (
        "cultists",
        &[("guards", -80.0), ("bandits", 20.0), ("merchants", -30.0), ("villagers", -50.0), ("scholars", -70.0)],
    ),
];

/// Create all factions and register them
pub fn create_factions(config: FactionConfig) -> FactionGraph {
    use FactionValue::*;

    let mut graph = FactionGraph::new(config);

    // Keepers of the peace; suspicious of anyone in a mask
    graph.register(
        Faction::new("guards", "Town Guard")
            .with_values(&[Order, Community, Tradition])
            .with_trait_preferences(&[(Trait::Brave, 0.8), (Trait::Honest, 0.6), (Trait::Cowardly, -0.5)]),
    );

    graph.register(
        Faction::new("bandits", "Forest Bandits")
            .with_values(&[Freedom, Wealth, Violence])
            .with_trait_preferences(&[(Trait::Aggressive, 0.7), (Trait::Greedy, 0.5), (Trait::Honest, -0.4)]),
    );

    graph.register(
        Faction::new("merchants", "Merchant Guild")
            .with_values(&[Wealth, Order])
            .with_trait_preferences(&[(Trait::Greedy, 0.4), (Trait::Honest, 0.3)]),
    );

    graph.register(
        Faction::new("villagers", "Villagers")
            .with_values(&[Community, Tradition])
            .with_trait_preferences(&[(Trait::Generous, 0.6), (Trait::Peaceful, 0.5), (Trait::Gossipy, 0.2)]),
    );

    graph.register(
        Faction::new("scholars", "Scholars of the Archive")
            .with_values(&[Knowledge, Isolation])
            .with_trait_preferences(&[(Trait::Secretive, 0.4), (Trait::Humble, 0.3)]),
    );

    // Reclusive and dangerous
    graph.register(
        Faction::new("cultists", "Cult of the Hollow Moon")
            .with_values(&[Isolation, Violence, Knowledge])
            .with_trait_preferences(&[(Trait::Deceitful, 0.6), (Trait::Secretive, 0.6)]),
    );

    for (from, row) in RELATIONS {
        for (to, value) in row.iter() {
            graph.set_relation(*from, *to, *value);
        }
    }

    graph.register_disguise("banana_guard", "guards");
    graph.register_disguise("bandit_mask", "bandits");
    graph.register_disguise("merchant_robes", "merchants");

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::faction::FactionId;

    #[test]
    fn test_six_factions() {
        let graph = create_factions(FactionConfig::default());
        assert_eq!(graph.len(), 6);
    }

    #[test]
    fn test_relations_independently_authored() {
        let graph = create_factions(FactionConfig::default());
        let scholars = FactionId::from("scholars");
        let cultists = FactionId::from("cultists");
        let bandits = FactionId::from("bandits");
        assert_eq!(graph.relation(&scholars, &bandits), -10.0);
        assert_eq!(graph.relation(&bandits, &scholars), 0.0);
        assert!(graph.are_factions_hostile(&scholars, &cultists));
    }
}
