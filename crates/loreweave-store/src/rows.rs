//! Row decoding shared by the repositories.

use loreweave_core::error::DomainError;
use loreweave_core::model::{
    Character, Faction, LockHolder, Manuscript, Profession, Region, Scene, Story, StoryStatus,
    Summary,
};
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::error::db_error;

pub(crate) const STORY_COLUMNS: &str =
    "id, guild_id, title, status, scene_count, created_at, updated_at";

pub(crate) const CHARACTER_COLUMNS: &str = "id, story_id, user_id, user_name, name, description, \
     archetype, profession_slug, faction_slug, region_slug, created_at, updated_at";

pub(crate) const SCENE_COLUMNS: &str = "id, story_id, scene_number, character_id, user_id, \
     action, narrative, image_url, location, context_used, created_at";

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| db_error(&format!("decode {column}"), &e))
}

pub(crate) fn story(row: &PgRow) -> Result<Story, DomainError> {
    let status: String = get(row, "status")?;
    Ok(Story {
        id: get(row, "id")?,
        guild_id: get(row, "guild_id")?,
        title: get(row, "title")?,
        status: status.parse::<StoryStatus>()?,
        scene_count: get(row, "scene_count")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub(crate) fn character(row: &PgRow) -> Result<Character, DomainError> {
    Ok(Character {
        id: get(row, "id")?,
        story_id: get(row, "story_id")?,
        user_id: get(row, "user_id")?,
        user_name: get(row, "user_name")?,
        name: get(row, "name")?,
        description: get(row, "description")?,
        archetype: get(row, "archetype")?,
        profession_slug: get(row, "profession_slug")?,
        faction_slug: get(row, "faction_slug")?,
        region_slug: get(row, "region_slug")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub(crate) fn scene(row: &PgRow) -> Result<Scene, DomainError> {
    Ok(Scene {
        id: get(row, "id")?,
        story_id: get(row, "story_id")?,
        scene_number: get(row, "scene_number")?,
        character_id: get(row, "character_id")?,
        user_id: get(row, "user_id")?,
        action: get(row, "action")?,
        narrative: get(row, "narrative")?,
        image_url: get(row, "image_url")?,
        location: get(row, "location")?,
        context_used: get(row, "context_used")?,
        created_at: get(row, "created_at")?,
    })
}

pub(crate) fn manuscript(row: &PgRow) -> Result<Manuscript, DomainError> {
    Ok(Manuscript {
        story_id: get(row, "story_id")?,
        version: get(row, "version")?,
        content: get(row, "content")?,
        created_at: get(row, "created_at")?,
    })
}

pub(crate) fn summary(row: &PgRow) -> Result<Summary, DomainError> {
    Ok(Summary {
        story_id: get(row, "story_id")?,
        version: get(row, "version")?,
        summary: get(row, "summary")?,
        created_at: get(row, "created_at")?,
    })
}

pub(crate) fn lock_holder(row: &PgRow) -> Result<LockHolder, DomainError> {
    Ok(LockHolder {
        story_id: get(row, "story_id")?,
        locked_by: get(row, "locked_by")?,
        locked_at: get(row, "locked_at")?,
    })
}

pub(crate) fn region(row: &PgRow) -> Result<Region, DomainError> {
    Ok(Region {
        slug: get(row, "slug")?,
        name: get(row, "name")?,
        atmosphere: get(row, "atmosphere")?,
        visual_style: get(row, "visual_style")?,
    })
}

pub(crate) fn faction(row: &PgRow) -> Result<Faction, DomainError> {
    Ok(Faction {
        slug: get(row, "slug")?,
        name: get(row, "name")?,
        motto: get(row, "motto")?,
        description: get(row, "description")?,
        prompt_base: get(row, "prompt_base")?,
    })
}

pub(crate) fn profession(row: &PgRow) -> Result<Profession, DomainError> {
    Ok(Profession {
        slug: get(row, "slug")?,
        name: get(row, "name")?,
        description: get(row, "description")?,
        visual_descriptor: get(row, "visual_descriptor")?,
    })
}
