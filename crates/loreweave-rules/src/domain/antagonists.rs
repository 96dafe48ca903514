//! Regional antagonist pools for hostile encounters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How dangerous an antagonist is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    /// Nuisance.
    Low,
    /// Even fight.
    Medium,
    /// Outmatches a lone character.
    High,
    /// Story-level threat.
    Elite,
}

/// Descriptor of an antagonist that can appear in a hostile encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Antagonist {
    /// Stable key, used in the event subtype.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Faction the antagonist serves.
    pub faction: String,
    /// Danger tier.
    pub threat_level: ThreatLevel,
    /// How it behaves.
    pub behavior: String,
    /// What it is vulnerable to.
    pub weaknesses: String,
    /// Visual description.
    pub description: String,
}

/// Antagonist pools keyed by region slug.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AntagonistRegistry {
    pools: HashMap<String, Vec<Antagonist>>,
}

impl AntagonistRegistry {
    /// An empty registry: every hostile encounter is generic.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds `antagonist` to the pool of `region`.
    #[must_use]
    pub fn with(mut self, region: &str, antagonist: Antagonist) -> Self {
        self.pools
            .entry(region.to_owned())
            .or_default()
            .push(antagonist);
        self
    }

    /// The pool registered for `region`; empty when none is.
    #[must_use]
    pub fn pool(&self, region: &str) -> &[Antagonist] {
        self.pools.get(region).map_or(&[], Vec::as_slice)
    }

    /// The built-in pools for the default world regions.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with(
                "neoterra",
                antagonist(
                    "centinela_lumen",
                    "Lumen Sentinel",
                    "axis_prime",
                    ThreatLevel::Medium,
                    "Patrols by logic, reacting to intrusions and anomalies.",
                    "Light saturation and overloading its core.",
                    "A flawless humanoid with white synthetic skin, constant neon-blue eyes and a glowing core in its chest.",
                ),
            )
            .with(
                "neoterra",
                antagonist(
                    "verdugo_hexadecimal",
                    "Hexadecimal Executioner",
                    "axis_prime",
                    ThreatLevel::High,
                    "Hunts targets flagged by the central system, relentless.",
                    "Interruptions in its data stream and electromagnetic noise.",
                    "Tall and slender, a featureless digital mask projecting floating binary symbols, wielding a translucent energy blade.",
                ),
            )
            .with(
                "restos_grisaceos",
                antagonist(
                    "carronero_blindado",
                    "Armored Scavenger",
                    "restauradores",
                    ThreatLevel::Medium,
                    "Ambushes caravans and steals reusable parts.",
                    "Blind spots at the joints of its recycled armor.",
                    "Armor made of recycled plates, heavy but tough.",
                ),
            )
            .with(
                "vasto_delta",
                antagonist(
                    "espectro_datos",
                    "Data Wraith",
                    "ecos_libres",
                    ThreatLevel::Medium,
                    "Appears near anomalies and digital distortions.",
                    "Anchoring fields and stable synchronization rituals.",
                    "A humanoid made of floating digital particles.",
                ),
            )
            .with(
                "el_hueco",
                antagonist(
                    "oraculo_glitcheado",
                    "Glitched Oracle",
                    "ecos_libres",
                    ThreatLevel::Elite,
                    "Distorts perception and rewrites memories.",
                    "Abruptly broken observation loops and analog mirrors.",
                    "A suspended entity with many overlapping human faces, speaking in an out-of-phase echo.",
                ),
            )
            .with(
                "cielorritos",
                antagonist(
                    "director_segunda_sincronia",
                    "Director of the Second Synchrony",
                    "conclave_oscurecido",
                    ThreatLevel::Elite,
                    "Coordinates orbital-scale experiments and steers swarms.",
                    "Forced desynchronization of its many AI links.",
                    "A body suspended in a floating capsule, wired into several intelligences at once.",
                ),
            )
    }
}

fn antagonist(
    id: &str,
    name: &str,
    faction: &str,
    threat_level: ThreatLevel,
    behavior: &str,
    weaknesses: &str,
    description: &str,
) -> Antagonist {
    Antagonist {
        id: id.to_owned(),
        name: name.to_owned(),
        faction: faction.to_owned(),
        threat_level,
        behavior: behavior.to_owned(),
        weaknesses: weaknesses.to_owned(),
        description: description.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_has_two_neoterra_antagonists() {
        let registry = AntagonistRegistry::standard();
        assert_eq!(registry.pool("neoterra").len(), 2);
    }

    #[test]
    fn test_unknown_region_has_empty_pool() {
        let registry = AntagonistRegistry::standard();
        assert!(registry.pool("atlantis").is_empty());
    }

    #[test]
    fn test_threat_level_serializes_snake_case() {
        let json = serde_json::to_value(ThreatLevel::Elite).unwrap();
        assert_eq!(json, serde_json::json!("elite"));
    }
}
