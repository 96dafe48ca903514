//! Database schema.
//!
//! The SQL lives in the workspace `migrations/` directory and is embedded at
//! compile time.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use loreweave_core::error::DomainError;

/// Embedded migrations from `migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Name of the unique constraint guarding scene sequence numbers.
pub const SCENE_NUMBER_CONSTRAINT: &str = "scenes_story_scene_number_unique";

/// Applies every pending migration.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("migration failed: {e}")))?;
    info!("database migrations applied");
    Ok(())
}
