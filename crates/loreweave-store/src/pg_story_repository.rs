//! `PostgreSQL` implementation of the `StoryRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use loreweave_core::error::DomainError;
use loreweave_core::model::Story;
use loreweave_core::repository::StoryRepository;

use crate::error::map_db;
use crate::rows::{self, STORY_COLUMNS};

/// PostgreSQL-backed story repository.
#[derive(Debug, Clone)]
pub struct PgStoryRepository {
    pool: PgPool,
}

impl PgStoryRepository {
    /// Creates a new `PgStoryRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoryRepository for PgStoryRepository {
    async fn get_or_create(
        &self,
        guild_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Story, DomainError> {
        sqlx::query(
            "INSERT INTO stories (id, guild_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $3) ON CONFLICT (guild_id) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(guild_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db("create story"))?;

        let sql = format!("SELECT {STORY_COLUMNS} FROM stories WHERE guild_id = $1");
        let row = sqlx::query(&sql)
            .bind(guild_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db("load story"))?;
        rows::story(&row)
    }

    async fn find_by_guild(&self, guild_id: &str) -> Result<Option<Story>, DomainError> {
        let sql = format!("SELECT {STORY_COLUMNS} FROM stories WHERE guild_id = $1");
        let row = sqlx::query(&sql)
            .bind(guild_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db("find story"))?;
        row.as_ref().map(rows::story).transpose()
    }
}
