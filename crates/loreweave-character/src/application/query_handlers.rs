//! Query handlers for the Story membership context.

use loreweave_core::error::DomainError;
use loreweave_core::model::{Character, Manuscript, Scene, Story, Summary};
use loreweave_core::repository::{
    CharacterRepository, ManuscriptRepository, SceneRepository, StoryRepository,
};
use serde::Serialize;

/// Number of scenes shown in the story context.
pub const CONTEXT_SCENES: usize = 5;

/// Read-only view of a tenant's story.
#[derive(Debug, Serialize)]
pub struct StoryContextView {
    /// The story row.
    pub story: Story,
    /// The most recent scenes, oldest first.
    pub recent_scenes: Vec<Scene>,
    /// Latest manuscript version.
    pub manuscript: Option<Manuscript>,
    /// Latest summary.
    pub summary: Option<Summary>,
}

/// Retrieves the story context of a tenant.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the tenant has no story yet.
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_story_context(
    guild_id: &str,
    stories: &dyn StoryRepository,
    scenes: &dyn SceneRepository,
    manuscripts: &dyn ManuscriptRepository,
) -> Result<StoryContextView, DomainError> {
    let story = stories
        .find_by_guild(guild_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("story for guild {guild_id}")))?;

    let mut recent_scenes = scenes.recent(story.id, CONTEXT_SCENES).await?;
    recent_scenes.reverse();
    let manuscript = manuscripts.latest_manuscript(story.id).await?;
    let summary = manuscripts.latest_summary(story.id).await?;

    Ok(StoryContextView {
        story,
        recent_scenes,
        manuscript,
        summary,
    })
}

/// Retrieves the character a user registered in the tenant's story.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if either the story or the character is
/// missing.
pub async fn get_character(
    guild_id: &str,
    user_id: &str,
    stories: &dyn StoryRepository,
    characters: &dyn CharacterRepository,
) -> Result<Character, DomainError> {
    let story = stories
        .find_by_guild(guild_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("story for guild {guild_id}")))?;
    characters
        .find_for_user(story.id, user_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("character for user {user_id}")))
}
