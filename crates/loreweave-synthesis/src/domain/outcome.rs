//! Caller-facing outcomes.

use loreweave_core::model::DiceCategory;
use serde::Serialize;
use uuid::Uuid;

/// A scene that was accepted and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedScene {
    /// Persisted scene id.
    pub scene_id: Uuid,
    /// Sequence number assigned to the scene.
    pub scene_number: i32,
    /// Generated prose.
    pub narrative: String,
    /// Hosted illustration, if any.
    pub image_url: Option<String>,
    /// Prompt used for the illustration.
    pub image_prompt: String,
    /// Beat rolled for the scene.
    pub event_type: String,
    /// Final die value.
    pub dice_roll: i32,
    /// Category of the roll.
    pub dice_category: DiceCategory,
}

/// Result of submitting a contribution.
///
/// Only hard failures (narration, persistence, budget) are errors; every
/// variant here is an ordinary outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContributionOutcome {
    /// The scene was written.
    Accepted(AcceptedScene),
    /// The action contradicts the story.
    Rejected {
        /// Itemised reasons.
        reasons: Vec<String>,
    },
    /// Another contribution to the same story is in progress; retry later.
    Locked,
    /// The submission itself is malformed.
    InvalidInput {
        /// What is wrong with it.
        reason: String,
    },
}

impl ContributionOutcome {
    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted(_) => "accepted",
            Self::Rejected { .. } => "rejected",
            Self::Locked => "locked",
            Self::InvalidInput { .. } => "invalid_input",
        }
    }
}
