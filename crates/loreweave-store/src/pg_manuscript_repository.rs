//! `PostgreSQL` implementation of the `ManuscriptRepository` trait.
//!
//! Both tables are keyed by `(story_id, version)`; saving an existing version
//! is a no-op reported as `false`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use loreweave_core::error::DomainError;
use loreweave_core::model::{Manuscript, Summary};
use loreweave_core::repository::ManuscriptRepository;

use crate::error::map_db;
use crate::rows;

/// PostgreSQL-backed manuscript and summary repository.
#[derive(Debug, Clone)]
pub struct PgManuscriptRepository {
    pool: PgPool,
}

impl PgManuscriptRepository {
    /// Creates a new `PgManuscriptRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ManuscriptRepository for PgManuscriptRepository {
    async fn save_manuscript(&self, manuscript: Manuscript) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "INSERT INTO manuscripts (story_id, version, content, created_at) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (story_id, version) DO NOTHING",
        )
        .bind(manuscript.story_id)
        .bind(manuscript.version)
        .bind(&manuscript.content)
        .bind(manuscript.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db("save manuscript"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn save_summary(&self, summary: Summary) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "INSERT INTO summaries (story_id, version, summary, created_at) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (story_id, version) DO NOTHING",
        )
        .bind(summary.story_id)
        .bind(summary.version)
        .bind(&summary.summary)
        .bind(summary.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db("save summary"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn latest_manuscript(&self, story_id: Uuid) -> Result<Option<Manuscript>, DomainError> {
        let row = sqlx::query(
            "SELECT story_id, version, content, created_at FROM manuscripts \
             WHERE story_id = $1 ORDER BY version DESC LIMIT 1",
        )
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db("load latest manuscript"))?;
        row.as_ref().map(rows::manuscript).transpose()
    }

    async fn latest_summary(&self, story_id: Uuid) -> Result<Option<Summary>, DomainError> {
        let row = sqlx::query(
            "SELECT story_id, version, summary, created_at FROM summaries \
             WHERE story_id = $1 ORDER BY version DESC LIMIT 1",
        )
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db("load latest summary"))?;
        row.as_ref().map(rows::summary).transpose()
    }
}
