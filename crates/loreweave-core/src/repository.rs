//! Persistence contracts.
//!
//! One trait per table family. The PostgreSQL implementations live in
//! `loreweave-store`; `loreweave-test-support` provides an in-memory one.
//! Implementations must give read-after-write consistency within a story.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;
use crate::model::{
    Character, CharacterDraft, DiceCategory, EventRecord, Faction, LockHolder, Manuscript,
    NewScene, Profession, Region, Scene, Story, Summary,
};

/// Stories keyed by tenant.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Returns the tenant's story, creating an active one on first use.
    async fn get_or_create(&self, guild_id: &str, now: DateTime<Utc>)
    -> Result<Story, DomainError>;

    /// Looks up the tenant's story without creating it.
    async fn find_by_guild(&self, guild_id: &str) -> Result<Option<Story>, DomainError>;
}

/// Characters, unique per (story, user).
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Inserts the character or updates the existing one for the same
    /// (story, user) pair.
    async fn upsert(
        &self,
        draft: CharacterDraft,
        now: DateTime<Utc>,
    ) -> Result<Character, DomainError>;

    /// Finds the character a user registered in a story.
    async fn find_for_user(
        &self,
        story_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Character>, DomainError>;
}

/// Append-only scenes.
#[async_trait]
pub trait SceneRepository: Send + Sync {
    /// The `limit` most recent scenes, newest first.
    async fn recent(&self, story_id: Uuid, limit: usize) -> Result<Vec<Scene>, DomainError>;

    /// Every scene of the story in ascending sequence order.
    async fn all_in_order(&self, story_id: Uuid) -> Result<Vec<Scene>, DomainError>;

    /// Assigns the next sequence number, inserts the scene and bumps the
    /// story's scene counter as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` when another writer claimed the same
    /// sequence number first.
    async fn append(&self, scene: NewScene) -> Result<Scene, DomainError>;
}

/// Append-only event log, also the streak history source.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// The `limit` most recent dice categories for a (story, user) pair,
    /// newest first.
    async fn recent_categories(
        &self,
        story_id: Uuid,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<DiceCategory>, DomainError>;

    /// Appends one event row.
    async fn record(&self, event: EventRecord) -> Result<(), DomainError>;
}

/// Versioned manuscripts and summaries.
#[async_trait]
pub trait ManuscriptRepository: Send + Sync {
    /// Stores a manuscript version. Returns `false` when the version already
    /// existed (the insert is a no-op).
    async fn save_manuscript(&self, manuscript: Manuscript) -> Result<bool, DomainError>;

    /// Stores a summary version. Returns `false` when it already existed.
    async fn save_summary(&self, summary: Summary) -> Result<bool, DomainError>;

    /// Highest manuscript version of a story.
    async fn latest_manuscript(&self, story_id: Uuid) -> Result<Option<Manuscript>, DomainError>;

    /// Highest summary version of a story.
    async fn latest_summary(&self, story_id: Uuid) -> Result<Option<Summary>, DomainError>;
}

/// Read-only reference tables.
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Region by slug.
    async fn region(&self, slug: &str) -> Result<Option<Region>, DomainError>;

    /// Faction by slug.
    async fn faction(&self, slug: &str) -> Result<Option<Faction>, DomainError>;

    /// Profession by slug.
    async fn profession(&self, slug: &str) -> Result<Option<Profession>, DomainError>;
}

/// Backing store of the per-story synthesis lock.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Conditionally inserts the lock row. Returns `true` only when this call
    /// created the row.
    async fn try_insert(
        &self,
        story_id: Uuid,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Deletes the lock row unconditionally.
    async fn delete(&self, story_id: Uuid) -> Result<(), DomainError>;

    /// Current holder, for diagnostics.
    async fn holder(&self, story_id: Uuid) -> Result<Option<LockHolder>, DomainError>;
}
