//! Persisted data model shared by every bounded context.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Lifecycle status of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    /// Accepting contributions.
    Active,
    /// Read-only.
    Archived,
}

impl StoryStatus {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for StoryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => Err(DomainError::Infrastructure(format!(
                "unknown story status: {other}"
            ))),
        }
    }
}

/// The shared narrative owned by one tenant (a guild/community).
#[derive(Debug, Clone, Serialize)]
pub struct Story {
    /// Story identifier.
    pub id: Uuid,
    /// Tenant key the story belongs to.
    pub guild_id: String,
    /// Display title.
    pub title: String,
    /// Lifecycle status.
    pub status: StoryStatus,
    /// Number of persisted scenes.
    pub scene_count: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

/// A participant's character. One per (story, user).
#[derive(Debug, Clone, Serialize)]
pub struct Character {
    /// Character identifier.
    pub id: Uuid,
    /// Owning story.
    pub story_id: Uuid,
    /// Submitting user.
    pub user_id: String,
    /// User display name at registration time.
    pub user_name: String,
    /// Character display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Gender/archetype tag, mapped to visual tags for image prompts.
    pub archetype: Option<String>,
    /// Profession reference.
    pub profession_slug: Option<String>,
    /// Primary faction reference.
    pub faction_slug: Option<String>,
    /// Current region reference.
    pub region_slug: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload for a character registration.
#[derive(Debug, Clone)]
pub struct CharacterDraft {
    /// Owning story.
    pub story_id: Uuid,
    /// Submitting user.
    pub user_id: String,
    /// User display name.
    pub user_name: String,
    /// Character display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Gender/archetype tag.
    pub archetype: Option<String>,
    /// Profession reference.
    pub profession_slug: Option<String>,
    /// Primary faction reference.
    pub faction_slug: Option<String>,
    /// Current region reference.
    pub region_slug: Option<String>,
}

/// One accepted turn. Immutable once written.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    /// Scene identifier.
    pub id: Uuid,
    /// Owning story.
    pub story_id: Uuid,
    /// One-based, contiguous position within the story.
    pub scene_number: i32,
    /// Authoring character; `None` for a system-authored prologue.
    pub character_id: Option<Uuid>,
    /// Submitting user.
    pub user_id: String,
    /// Raw user action.
    pub action: String,
    /// Generated prose.
    pub narrative: String,
    /// Hosted illustration, if image generation succeeded.
    pub image_url: Option<String>,
    /// Region/location tag.
    pub location: Option<String>,
    /// Scene numbers fed to generation as context.
    pub context_used: Vec<i32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A scene about to be appended. The store assigns the sequence number.
#[derive(Debug, Clone)]
pub struct NewScene {
    /// Owning story.
    pub story_id: Uuid,
    /// Authoring character.
    pub character_id: Option<Uuid>,
    /// Submitting user.
    pub user_id: String,
    /// Raw user action.
    pub action: String,
    /// Generated prose.
    pub narrative: String,
    /// Hosted illustration.
    pub image_url: Option<String>,
    /// Region/location tag.
    pub location: Option<String>,
    /// Scene numbers used as context.
    pub context_used: Vec<i32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Five-tier classification of a narrative die roll, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceCategory {
    /// 1–5.
    CriticalBad,
    /// 6–10.
    Bad,
    /// 11–15.
    Neutral,
    /// 16–19.
    Good,
    /// 20.
    CriticalGood,
}

impl DiceCategory {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CriticalBad => "critical_bad",
            Self::Bad => "bad",
            Self::Neutral => "neutral",
            Self::Good => "good",
            Self::CriticalGood => "critical_good",
        }
    }

    /// `critical_bad` or `bad`.
    #[must_use]
    pub fn is_negative(self) -> bool {
        matches!(self, Self::CriticalBad | Self::Bad)
    }

    /// `good` or `critical_good`.
    #[must_use]
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Good | Self::CriticalGood)
    }
}

impl fmt::Display for DiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiceCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical_bad" => Ok(Self::CriticalBad),
            "bad" => Ok(Self::Bad),
            "neutral" => Ok(Self::Neutral),
            "good" => Ok(Self::Good),
            "critical_good" => Ok(Self::CriticalGood),
            other => Err(DomainError::Infrastructure(format!(
                "unknown dice category: {other}"
            ))),
        }
    }
}

/// One rolled story beat. Written once per generation attempt.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    /// Event identifier.
    pub id: Uuid,
    /// Owning story.
    pub story_id: Uuid,
    /// Scene the event ended up in, if linked later.
    pub scene_id: Option<Uuid>,
    /// Rolling user.
    pub user_id: String,
    /// Region tag at roll time.
    pub region_slug: Option<String>,
    /// Faction tag at roll time.
    pub faction_slug: Option<String>,
    /// Final (clamped) die value.
    pub dice_roll: i32,
    /// Category of `dice_roll`.
    pub dice_category: DiceCategory,
    /// Event type, e.g. `hostile_encounter`.
    pub event_type: String,
    /// Event subtype, e.g. `enemy_centinela_lumen`.
    pub event_subtype: String,
    /// Free-form payload (antagonist descriptor).
    pub payload: serde_json::Value,
    /// Resolution text, when resolved.
    pub outcome: Option<String>,
    /// Resolution time, when resolved.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Roll time.
    pub created_at: DateTime<Utc>,
}

/// Full compiled text of a story at a scene version.
#[derive(Debug, Clone, Serialize)]
pub struct Manuscript {
    /// Owning story.
    pub story_id: Uuid,
    /// Scene number the snapshot was taken at.
    pub version: i32,
    /// Compiled text.
    pub content: String,
    /// Snapshot time.
    pub created_at: DateTime<Utc>,
}

/// Condensed narrative at a scene version.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Owning story.
    pub story_id: Uuid,
    /// Scene number the summary was produced at.
    pub version: i32,
    /// Condensed text.
    pub summary: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Holder record of a story's synthesis lock.
#[derive(Debug, Clone, Serialize)]
pub struct LockHolder {
    /// Locked story.
    pub story_id: Uuid,
    /// Holder identity for diagnostics.
    pub locked_by: String,
    /// Acquisition time.
    pub locked_at: DateTime<Utc>,
}

/// Static region reference row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Stable key.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Atmosphere directive for narrative prompts.
    pub atmosphere: String,
    /// Visual style directive for image prompts.
    pub visual_style: String,
}

/// Static faction reference row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    /// Stable key.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Motto.
    pub motto: String,
    /// Description.
    pub description: String,
    /// Flavor directive for narrative prompts.
    pub prompt_base: String,
}

/// Static profession reference row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profession {
    /// Stable key.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Clothing/equipment descriptors for image prompts.
    pub visual_descriptor: String,
}
