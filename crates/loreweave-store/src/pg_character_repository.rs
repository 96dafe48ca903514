//! `PostgreSQL` implementation of the `CharacterRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use loreweave_core::error::DomainError;
use loreweave_core::model::{Character, CharacterDraft};
use loreweave_core::repository::CharacterRepository;

use crate::error::map_db;
use crate::rows::{self, CHARACTER_COLUMNS};

/// PostgreSQL-backed character repository.
#[derive(Debug, Clone)]
pub struct PgCharacterRepository {
    pool: PgPool,
}

impl PgCharacterRepository {
    /// Creates a new `PgCharacterRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CharacterRepository for PgCharacterRepository {
    async fn upsert(
        &self,
        draft: CharacterDraft,
        now: DateTime<Utc>,
    ) -> Result<Character, DomainError> {
        let sql = format!(
            "INSERT INTO characters (id, story_id, user_id, user_name, name, description, \
                 archetype, profession_slug, faction_slug, region_slug, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11) \
             ON CONFLICT (story_id, user_id) DO UPDATE SET \
                 user_name = EXCLUDED.user_name, \
                 name = EXCLUDED.name, \
                 description = EXCLUDED.description, \
                 archetype = EXCLUDED.archetype, \
                 profession_slug = EXCLUDED.profession_slug, \
                 faction_slug = EXCLUDED.faction_slug, \
                 region_slug = EXCLUDED.region_slug, \
                 updated_at = EXCLUDED.updated_at \
             RETURNING {CHARACTER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::now_v7())
            .bind(draft.story_id)
            .bind(&draft.user_id)
            .bind(&draft.user_name)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(&draft.archetype)
            .bind(&draft.profession_slug)
            .bind(&draft.faction_slug)
            .bind(&draft.region_slug)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db("upsert character"))?;
        rows::character(&row)
    }

    async fn find_for_user(
        &self,
        story_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Character>, DomainError> {
        let sql = format!(
            "SELECT {CHARACTER_COLUMNS} FROM characters WHERE story_id = $1 AND user_id = $2"
        );
        let row = sqlx::query(&sql)
            .bind(story_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db("find character"))?;
        row.as_ref().map(rows::character).transpose()
    }
}
