//! The assembled context both generation strategies work from.

use loreweave_core::model::{Character, Faction, Profession, Region, Scene};
use loreweave_rules::domain::events::EventContext;

use super::text::truncate_chars;

/// An earlier scene, cut down for prompt context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneExcerpt {
    /// Sequence number of the scene.
    pub scene_number: i32,
    /// Leading characters of its narrative.
    pub text: String,
}

impl SceneExcerpt {
    /// Excerpts of `scenes` in ascending sequence order, each cut to
    /// `max_chars`.
    #[must_use]
    pub fn oldest_first(scenes: &[Scene], max_chars: usize) -> Vec<Self> {
        let mut excerpts: Vec<Self> = scenes
            .iter()
            .map(|s| Self {
                scene_number: s.scene_number,
                text: truncate_chars(&s.narrative, max_chars).to_owned(),
            })
            .collect();
        excerpts.sort_by_key(|e| e.scene_number);
        excerpts
    }
}

/// Everything known about the scene before any text is generated.
#[derive(Debug, Clone)]
pub struct SceneBrief {
    /// The user's action, verbatim.
    pub action: String,
    /// Acting character.
    pub character: Character,
    /// Primary faction of the character, when set and known.
    pub faction: Option<Faction>,
    /// Current region of the character, when set and known.
    pub region: Option<Region>,
    /// Profession of the character, when set and known.
    pub profession: Option<Profession>,
    /// The rolled beat.
    pub event: EventContext,
    /// Prior scenes, oldest first.
    pub prior: Vec<SceneExcerpt>,
}
