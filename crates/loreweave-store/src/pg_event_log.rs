//! `PostgreSQL` implementation of the `EventLog` trait.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use loreweave_core::error::DomainError;
use loreweave_core::model::{DiceCategory, EventRecord};
use loreweave_core::repository::EventLog;

use crate::error::map_db;

/// PostgreSQL-backed event log.
#[derive(Debug, Clone)]
pub struct PgEventLog {
    pool: PgPool,
}

impl PgEventLog {
    /// Creates a new `PgEventLog`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventLog for PgEventLog {
    async fn recent_categories(
        &self,
        story_id: Uuid,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<DiceCategory>, DomainError> {
        let limit = i64::try_from(limit)
            .map_err(|_| DomainError::Validation("limit exceeds i64 range".into()))?;
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT dice_category FROM events WHERE story_id = $1 AND user_id = $2 \
             ORDER BY created_at DESC, id DESC LIMIT $3",
        )
        .bind(story_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db("load recent categories"))?;
        rows.into_iter().map(|(category,)| category.parse()).collect()
    }

    async fn record(&self, event: EventRecord) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO events (id, story_id, scene_id, user_id, region_slug, faction_slug, \
                 dice_roll, dice_category, event_type, event_subtype, payload, outcome, \
                 resolved_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(event.id)
        .bind(event.story_id)
        .bind(event.scene_id)
        .bind(&event.user_id)
        .bind(&event.region_slug)
        .bind(&event.faction_slug)
        .bind(event.dice_roll)
        .bind(event.dice_category.as_str())
        .bind(&event.event_type)
        .bind(&event.event_subtype)
        .bind(&event.payload)
        .bind(&event.outcome)
        .bind(event.resolved_at)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db("record event"))?;
        Ok(())
    }
}
