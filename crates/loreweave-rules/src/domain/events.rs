//! Story-beat vocabulary and the category → beat table.

use loreweave_core::model::DiceCategory;
use loreweave_core::rng::DeterministicRng;
use serde::Serialize;

use super::antagonists::{Antagonist, AntagonistRegistry};
use super::dice::DiceRoll;

/// Kind of story beat injected into a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// An antagonist confronts the party.
    HostileEncounter,
    /// Weather, terrain or distortion turns dangerous.
    EnvironmentalHazard,
    /// Something valuable is discovered.
    ResourceFind,
    /// Gear or a technological upgrade shows up.
    EquipmentGain,
    /// Something essential breaks or is lost.
    EquipmentLoss,
    /// A moment of refuge.
    RestRefuge,
    /// New information redirects the plot.
    NarrativeTwist,
}

impl EventType {
    /// Maps a roll category to its beat. Total over the five categories.
    #[must_use]
    pub fn for_category(category: DiceCategory) -> Self {
        match category {
            DiceCategory::CriticalBad => Self::HostileEncounter,
            DiceCategory::Bad => Self::EnvironmentalHazard,
            DiceCategory::Neutral => Self::NarrativeTwist,
            DiceCategory::Good => Self::EquipmentGain,
            DiceCategory::CriticalGood => Self::ResourceFind,
        }
    }

    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HostileEncounter => "hostile_encounter",
            Self::EnvironmentalHazard => "environmental_hazard",
            Self::ResourceFind => "resource_find",
            Self::EquipmentGain => "equipment_gain",
            Self::EquipmentLoss => "equipment_loss",
            Self::RestRefuge => "rest_refuge",
            Self::NarrativeTwist => "narrative_twist",
        }
    }

    /// Subtype used when no antagonist specialises it.
    #[must_use]
    pub fn default_subtype(self) -> &'static str {
        match self {
            Self::HostileEncounter => "enemy_generic",
            Self::EnvironmentalHazard => "hazard",
            Self::ResourceFind => "resource",
            Self::EquipmentGain => "equipment",
            Self::EquipmentLoss => "loss",
            Self::RestRefuge => "rest",
            Self::NarrativeTwist => "twist",
        }
    }

    /// Directive for the narrative prompt.
    #[must_use]
    pub fn narrative_instruction(self) -> &'static str {
        match self {
            Self::HostileEncounter => {
                "A hostile encounter has occurred. Clearly introduce the enemy, its intentions and the immediate threat. \
                 Describe how the surroundings react to its presence and end the scene with two concrete options the character could take to face it or escape."
            }
            Self::EnvironmentalHazard => {
                "A dangerous environmental event (storm, distortion, collapse or similar) fitting the current region is triggered. \
                 Show the immediate consequences and close the scene with at least two possible ways to mitigate the danger or retreat."
            }
            Self::ResourceFind => {
                "The group discovers a valuable resource consistent with the technology and remains of the region. \
                 Suggest how this find could tip the odds in their favor and include two possible decisions about how to use or protect it."
            }
            Self::EquipmentGain => {
                "Equipment or a technological upgrade appears that can be woven into the story. \
                 Briefly describe how it changes the group's capabilities and include two options about who uses it or what risk it carries."
            }
            Self::EquipmentLoss => {
                "Something essential breaks, is lost or falls out of reach. \
                 Emphasize the emotional and tactical impact, offering two routes to adapt to the loss at the end."
            }
            Self::RestRefuge => {
                "A space of peace or makeshift refuge opens up. \
                 Use it to deepen relationships and introspection, including two possible decisions about how to spend that time."
            }
            Self::NarrativeTwist => {
                "Introduce a plot twist or new information connected to the main story. \
                 Offer at least two interpretive paths or decisions that could redefine the course of the plot."
            }
        }
    }

    /// Directive for the image prompt.
    #[must_use]
    pub fn image_instruction(self) -> &'static str {
        match self {
            Self::HostileEncounter => {
                "Visually reinforce the enemy's presence and the imminent danger, highlighting its aesthetic against the current region."
            }
            Self::EnvironmentalHazard => {
                "Emphasize the extreme weather, environmental distortion and the group's vulnerability in the regional landscape."
            }
            Self::ResourceFind => {
                "Highlight the contrast between ruin and a shining find, focused on the discovered object or place."
            }
            Self::EquipmentGain => {
                "Show the new equipment in the foreground, integrated into the region's aesthetic, with dramatic lighting."
            }
            Self::EquipmentLoss => {
                "Highlight the absence or destruction of the equipment, focused on the character's gestures and immediate surroundings."
            }
            Self::RestRefuge => {
                "A calmer scene, soft lighting, a precarious refuge amid the hostile regional landscape."
            }
            Self::NarrativeTwist => {
                "Visualize the moment of the twist: a discovery, revelation or symbol in the environment that changes how the place is perceived."
            }
        }
    }
}

/// Everything downstream stages need to know about the rolled beat.
#[derive(Debug, Clone, Serialize)]
pub struct EventContext {
    /// The roll that produced the beat.
    pub dice: DiceRoll,
    /// Beat kind.
    pub event_type: EventType,
    /// Beat subtype (`enemy_<id>` for antagonists).
    pub subtype: String,
    /// Antagonist for hostile encounters in regions with a pool.
    pub antagonist: Option<Antagonist>,
    /// Directive for narrative generation.
    pub narrative_instruction: String,
    /// Directive for image-prompt construction.
    pub image_instruction: String,
}

impl EventContext {
    /// Category of the roll.
    #[must_use]
    pub fn category(&self) -> DiceCategory {
        self.dice.category
    }

    /// Payload persisted with the event row.
    #[must_use]
    pub fn payload(&self) -> serde_json::Value {
        match &self.antagonist {
            Some(enemy) => serde_json::json!({ "enemy": enemy }),
            None => serde_json::json!({}),
        }
    }
}

/// Turns a roll into a beat, picking an antagonist from `region`'s pool for
/// hostile encounters. `rng` is only drawn from when a pool exists.
pub fn build_event_context(
    dice: DiceRoll,
    region: Option<&str>,
    registry: &AntagonistRegistry,
    rng: &mut dyn DeterministicRng,
) -> EventContext {
    let event_type = EventType::for_category(dice.category);

    let antagonist = if event_type == EventType::HostileEncounter {
        let pool = region.map_or(&[][..], |slug| registry.pool(slug));
        rng.pick_index(pool.len()).map(|i| pool[i].clone())
    } else {
        None
    };

    let subtype = antagonist.as_ref().map_or_else(
        || event_type.default_subtype().to_owned(),
        |enemy| format!("enemy_{}", enemy.id),
    );

    EventContext {
        dice,
        event_type,
        subtype,
        antagonist,
        narrative_instruction: event_type.narrative_instruction().to_owned(),
        image_instruction: event_type.image_instruction().to_owned(),
    }
}
