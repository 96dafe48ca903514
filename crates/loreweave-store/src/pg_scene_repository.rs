//! `PostgreSQL` implementation of the `SceneRepository` trait.
//!
//! `append` numbers scenes inside one transaction: the story row is locked
//! `FOR UPDATE`, the next number is `MAX(scene_number) + 1`, the scene is
//! inserted and `stories.scene_count` is bumped. The unique constraint on
//! `(story_id, scene_number)` turns any remaining race into a `Conflict`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use loreweave_core::error::DomainError;
use loreweave_core::model::{NewScene, Scene};
use loreweave_core::repository::SceneRepository;

use crate::error::map_db;
use crate::rows::{self, SCENE_COLUMNS};

/// PostgreSQL-backed scene repository.
#[derive(Debug, Clone)]
pub struct PgSceneRepository {
    pool: PgPool,
}

impl PgSceneRepository {
    /// Creates a new `PgSceneRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SceneRepository for PgSceneRepository {
    async fn recent(&self, story_id: Uuid, limit: usize) -> Result<Vec<Scene>, DomainError> {
        let limit = i64::try_from(limit)
            .map_err(|_| DomainError::Validation("limit exceeds i64 range".into()))?;
        let sql = format!(
            "SELECT {SCENE_COLUMNS} FROM scenes WHERE story_id = $1 \
             ORDER BY scene_number DESC LIMIT $2"
        );
        let found = sqlx::query(&sql)
            .bind(story_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db("load recent scenes"))?;
        found.iter().map(rows::scene).collect()
    }

    async fn all_in_order(&self, story_id: Uuid) -> Result<Vec<Scene>, DomainError> {
        let sql =
            format!("SELECT {SCENE_COLUMNS} FROM scenes WHERE story_id = $1 ORDER BY scene_number");
        let found = sqlx::query(&sql)
            .bind(story_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db("load scenes"))?;
        found.iter().map(rows::scene).collect()
    }

    async fn append(&self, scene: NewScene) -> Result<Scene, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_db("begin append"))?;

        let locked = sqlx::query("SELECT id FROM stories WHERE id = $1 FOR UPDATE")
            .bind(scene.story_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db("lock story row"))?;
        if locked.is_none() {
            return Err(DomainError::NotFound(format!("story {}", scene.story_id)));
        }

        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(scene_number), 0) + 1 FROM scenes WHERE story_id = $1",
        )
        .bind(scene.story_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db("next scene number"))?;

        let sql = format!(
            "INSERT INTO scenes (id, story_id, scene_number, character_id, user_id, action, \
                 narrative, image_url, location, context_used, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {SCENE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::now_v7())
            .bind(scene.story_id)
            .bind(next)
            .bind(scene.character_id)
            .bind(&scene.user_id)
            .bind(&scene.action)
            .bind(&scene.narrative)
            .bind(&scene.image_url)
            .bind(&scene.location)
            .bind(&scene.context_used)
            .bind(scene.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db("insert scene"))?;

        sqlx::query(
            "UPDATE stories SET scene_count = scene_count + 1, updated_at = $2 WHERE id = $1",
        )
        .bind(scene.story_id)
        .bind(scene.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db("bump scene count"))?;

        tx.commit().await.map_err(map_db("commit append"))?;

        debug!(story_id = %scene.story_id, scene_number = next, "scene appended");
        rows::scene(&row)
    }
}
