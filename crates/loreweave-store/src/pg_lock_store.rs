//! `PostgreSQL` implementation of the `LockStore` trait.
//!
//! The lock is a row in `synthesis_locks`. Acquisition is a single
//! conditional insert, so exactly one concurrent caller sees its row
//! returned.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use loreweave_core::error::DomainError;
use loreweave_core::model::LockHolder;
use loreweave_core::repository::LockStore;

use crate::error::map_db;
use crate::rows;

/// PostgreSQL-backed synthesis lock store.
#[derive(Debug, Clone)]
pub struct PgLockStore {
    pool: PgPool,
}

impl PgLockStore {
    /// Creates a new `PgLockStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LockStore for PgLockStore {
    async fn try_insert(
        &self,
        story_id: Uuid,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let inserted = sqlx::query(
            "INSERT INTO synthesis_locks (story_id, locked_by, locked_at) VALUES ($1, $2, $3) \
             ON CONFLICT (story_id) DO NOTHING RETURNING story_id",
        )
        .bind(story_id)
        .bind(holder)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db("acquire synthesis lock"))?;
        Ok(inserted.is_some())
    }

    async fn delete(&self, story_id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM synthesis_locks WHERE story_id = $1")
            .bind(story_id)
            .execute(&self.pool)
            .await
            .map_err(map_db("release synthesis lock"))?;
        Ok(())
    }

    async fn holder(&self, story_id: Uuid) -> Result<Option<LockHolder>, DomainError> {
        let row = sqlx::query(
            "SELECT story_id, locked_by, locked_at FROM synthesis_locks WHERE story_id = $1",
        )
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db("load lock holder"))?;
        row.as_ref().map(rows::lock_holder).transpose()
    }
}
