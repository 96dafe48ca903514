//! Command handlers for the Story membership context.
//!
//! Stories are created lazily per tenant; characters are upserted on
//! (story, user) after their reference slugs have been checked.

use loreweave_core::clock::Clock;
use loreweave_core::command::Command;
use loreweave_core::error::DomainError;
use loreweave_core::model::{Character, CharacterDraft, Story};
use loreweave_core::repository::{CharacterRepository, ReferenceRepository, StoryRepository};
use tracing::{info, instrument};

use crate::domain::commands::RegisterCharacter;
use crate::domain::rules::{
    MAX_ARCHETYPE_CHARS, MAX_DESCRIPTION_CHARS, MAX_NAME_CHARS, bounded, optional,
};

/// Returns the tenant's story, creating it on first use.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank tenant key and
/// `DomainError::Infrastructure` if the store fails.
pub async fn handle_open_story(
    guild_id: &str,
    clock: &dyn Clock,
    stories: &dyn StoryRepository,
) -> Result<Story, DomainError> {
    let guild_id = guild_id.trim();
    if guild_id.is_empty() {
        return Err(DomainError::Validation("guild_id must not be empty".into()));
    }
    stories.get_or_create(guild_id, clock.now()).await
}

/// Handles the `RegisterCharacter` command: checks input bounds, resolves
/// every given reference slug, then upserts the character into the tenant's
/// story.
///
/// # Errors
///
/// Returns `DomainError::Validation` when a field is out of bounds or a slug
/// names no reference row, and `DomainError::Infrastructure` if the store
/// fails.
#[instrument(skip_all, fields(
    command_type = command.command_type(),
    correlation_id = %command.correlation_id(),
    guild_id = %command.guild_id,
    user_id = %command.user_id,
))]
pub async fn handle_register_character(
    command: &RegisterCharacter,
    clock: &dyn Clock,
    stories: &dyn StoryRepository,
    characters: &dyn CharacterRepository,
    references: &dyn ReferenceRepository,
) -> Result<Character, DomainError> {
    let name = bounded("name", &command.name, MAX_NAME_CHARS)?;
    let description = bounded("description", &command.description, MAX_DESCRIPTION_CHARS)?;
    let archetype = optional(command.archetype.as_deref());
    if let Some(archetype) = &archetype {
        bounded("archetype", archetype, MAX_ARCHETYPE_CHARS)?;
    }
    if command.user_id.trim().is_empty() {
        return Err(DomainError::Validation("user_id must not be empty".into()));
    }

    let profession_slug = optional(command.profession_slug.as_deref());
    let faction_slug = optional(command.faction_slug.as_deref());
    let region_slug = optional(command.region_slug.as_deref());

    if let Some(slug) = &profession_slug
        && references.profession(slug).await?.is_none()
    {
        return Err(unknown("profession", slug));
    }
    if let Some(slug) = &faction_slug
        && references.faction(slug).await?.is_none()
    {
        return Err(unknown("faction", slug));
    }
    if let Some(slug) = &region_slug
        && references.region(slug).await?.is_none()
    {
        return Err(unknown("region", slug));
    }

    let story = handle_open_story(&command.guild_id, clock, stories).await?;
    let user_name = optional(Some(&command.user_name)).unwrap_or_else(|| command.user_id.clone());

    let character = characters
        .upsert(
            CharacterDraft {
                story_id: story.id,
                user_id: command.user_id.clone(),
                user_name,
                name: name.to_owned(),
                description: description.to_owned(),
                archetype,
                profession_slug,
                faction_slug,
                region_slug,
            },
            clock.now(),
        )
        .await?;

    info!(
        story_id = %story.id,
        character_id = %character.id,
        "character registered"
    );
    Ok(character)
}

fn unknown(kind: &str, slug: &str) -> DomainError {
    DomainError::Validation(format!("unknown {kind}: {slug}"))
}
