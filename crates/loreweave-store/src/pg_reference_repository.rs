//! `PostgreSQL` implementation of the `ReferenceRepository` trait.

use async_trait::async_trait;
use sqlx::PgPool;

use loreweave_core::error::DomainError;
use loreweave_core::model::{Faction, Profession, Region};
use loreweave_core::repository::ReferenceRepository;

use crate::error::map_db;
use crate::rows;

/// PostgreSQL-backed reference tables.
#[derive(Debug, Clone)]
pub struct PgReferenceRepository {
    pool: PgPool,
}

impl PgReferenceRepository {
    /// Creates a new `PgReferenceRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceRepository for PgReferenceRepository {
    async fn region(&self, slug: &str) -> Result<Option<Region>, DomainError> {
        let row = sqlx::query(
            "SELECT slug, name, atmosphere, visual_style FROM regions WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db("load region"))?;
        row.as_ref().map(rows::region).transpose()
    }

    async fn faction(&self, slug: &str) -> Result<Option<Faction>, DomainError> {
        let row = sqlx::query(
            "SELECT slug, name, motto, description, prompt_base FROM factions WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db("load faction"))?;
        row.as_ref().map(rows::faction).transpose()
    }

    async fn profession(&self, slug: &str) -> Result<Option<Profession>, DomainError> {
        let row = sqlx::query(
            "SELECT slug, name, description, visual_descriptor FROM professions WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db("load profession"))?;
        row.as_ref().map(rows::profession).transpose()
    }
}
