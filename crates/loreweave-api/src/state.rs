//! Shared application state.

use std::sync::{Arc, Mutex};

use loreweave_core::clock::Clock;
use loreweave_core::repository::{
    CharacterRepository, EventLog, LockStore, ManuscriptRepository, ReferenceRepository,
    SceneRepository, StoryRepository,
};
use loreweave_core::rng::DeterministicRng;
use loreweave_store::pg_character_repository::PgCharacterRepository;
use loreweave_store::pg_event_log::PgEventLog;
use loreweave_store::pg_lock_store::PgLockStore;
use loreweave_store::pg_manuscript_repository::PgManuscriptRepository;
use loreweave_store::pg_reference_repository::PgReferenceRepository;
use loreweave_store::pg_scene_repository::PgSceneRepository;
use loreweave_store::pg_story_repository::PgStoryRepository;
use loreweave_synthesis::application::pipeline::{SynthesisContext, SynthesisPipeline};
use sqlx::PgPool;

/// Every persistence collaborator the handlers use.
#[derive(Clone)]
pub struct Repositories {
    pub stories: Arc<dyn StoryRepository>,
    pub characters: Arc<dyn CharacterRepository>,
    pub scenes: Arc<dyn SceneRepository>,
    pub events: Arc<dyn EventLog>,
    pub manuscripts: Arc<dyn ManuscriptRepository>,
    pub references: Arc<dyn ReferenceRepository>,
    pub locks: Arc<dyn LockStore>,
}

impl Repositories {
    /// PostgreSQL repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            stories: Arc::new(PgStoryRepository::new(pool.clone())),
            characters: Arc::new(PgCharacterRepository::new(pool.clone())),
            scenes: Arc::new(PgSceneRepository::new(pool.clone())),
            events: Arc::new(PgEventLog::new(pool.clone())),
            manuscripts: Arc::new(PgManuscriptRepository::new(pool.clone())),
            references: Arc::new(PgReferenceRepository::new(pool.clone())),
            locks: Arc::new(PgLockStore::new(pool.clone())),
        }
    }

    /// One store serving every contract.
    pub fn shared<S>(store: &Arc<S>) -> Self
    where
        S: StoryRepository
            + CharacterRepository
            + SceneRepository
            + EventLog
            + ManuscriptRepository
            + ReferenceRepository
            + LockStore
            + 'static,
    {
        Self {
            stories: store.clone(),
            characters: store.clone(),
            scenes: store.clone(),
            events: store.clone(),
            manuscripts: store.clone(),
            references: store.clone(),
            locks: store.clone(),
        }
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence.
    pub repositories: Repositories,
    /// The contribution pipeline.
    pub pipeline: Arc<SynthesisPipeline>,
    /// Injectable clock for deterministic timestamps.
    pub clock: Arc<dyn Clock>,
    /// Injectable RNG for dice rolls.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        repositories: Repositories,
        pipeline: Arc<SynthesisPipeline>,
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    ) -> Self {
        Self {
            repositories,
            pipeline,
            clock,
            rng,
        }
    }

    /// Borrows the collaborators the pipeline needs for one submission.
    #[must_use]
    pub fn synthesis_context(&self) -> SynthesisContext<'_> {
        SynthesisContext {
            characters: &*self.repositories.characters,
            scenes: &*self.repositories.scenes,
            events: &*self.repositories.events,
            manuscripts: &*self.repositories.manuscripts,
            references: &*self.repositories.references,
            rng: &*self.rng,
            clock: &*self.clock,
        }
    }
}
