//! In-memory store implementing every repository trait and the lock store.
//!
//! All state sits behind a single mutex, so each trait call is atomic the
//! same way a single SQL statement or transaction is in PostgreSQL.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loreweave_core::error::DomainError;
use loreweave_core::model::{
    Character, CharacterDraft, DiceCategory, EventRecord, Faction, LockHolder, Manuscript,
    NewScene, Profession, Region, Scene, Story, StoryStatus, Summary,
};
use loreweave_core::repository::{
    CharacterRepository, EventLog, LockStore, ManuscriptRepository, ReferenceRepository,
    SceneRepository, StoryRepository,
};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    stories: Vec<Story>,
    characters: Vec<Character>,
    scenes: Vec<Scene>,
    events: Vec<EventRecord>,
    manuscripts: Vec<Manuscript>,
    summaries: Vec<Summary>,
    locks: HashMap<Uuid, LockHolder>,
    regions: Vec<Region>,
    factions: Vec<Faction>,
    professions: Vec<Profession>,
}

/// An in-memory implementation of all persistence contracts.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_appends: AtomicBool,
}

impl InMemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a region reference row.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_region(self, region: Region) -> Self {
        self.state.lock().unwrap().regions.push(region);
        self
    }

    /// Adds a faction reference row.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_faction(self, faction: Faction) -> Self {
        self.state.lock().unwrap().factions.push(faction);
        self
    }

    /// Adds a profession reference row.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_profession(self, profession: Profession) -> Self {
        self.state.lock().unwrap().professions.push(profession);
        self
    }

    /// Makes every subsequent `SceneRepository::append` fail with an
    /// infrastructure error.
    pub fn fail_scene_appends(&self) {
        self.fail_appends.store(true, Ordering::SeqCst);
    }

    /// Seeds a scene directly, bypassing sequence assignment.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert_scene(&self, scene: Scene) {
        self.state.lock().unwrap().scenes.push(scene);
    }

    /// Seeds an event row directly.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert_event(&self, event: EventRecord) {
        self.state.lock().unwrap().events.push(event);
    }

    /// Scenes of a story in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn scenes(&self, story_id: Uuid) -> Vec<Scene> {
        self.state
            .lock()
            .unwrap()
            .scenes
            .iter()
            .filter(|s| s.story_id == story_id)
            .cloned()
            .collect()
    }

    /// All recorded events in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn events(&self) -> Vec<EventRecord> {
        self.state.lock().unwrap().events.clone()
    }

    /// Manuscript versions of a story in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn manuscripts(&self, story_id: Uuid) -> Vec<Manuscript> {
        self.state
            .lock()
            .unwrap()
            .manuscripts
            .iter()
            .filter(|m| m.story_id == story_id)
            .cloned()
            .collect()
    }

    /// Summary versions of a story in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn summaries(&self, story_id: Uuid) -> Vec<Summary> {
        self.state
            .lock()
            .unwrap()
            .summaries
            .iter()
            .filter(|s| s.story_id == story_id)
            .cloned()
            .collect()
    }

    /// Whether a lock row exists for the story.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn is_locked(&self, story_id: Uuid) -> bool {
        self.state.lock().unwrap().locks.contains_key(&story_id)
    }

    /// Stored story by id.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn story(&self, story_id: Uuid) -> Option<Story> {
        self.state
            .lock()
            .unwrap()
            .stories
            .iter()
            .find(|s| s.id == story_id)
            .cloned()
    }

    fn state(&self) -> Result<std::sync::MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("store mutex poisoned: {e}")))
    }
}

#[async_trait]
impl StoryRepository for InMemoryStore {
    async fn get_or_create(
        &self,
        guild_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Story, DomainError> {
        let mut state = self.state()?;
        if let Some(story) = state.stories.iter().find(|s| s.guild_id == guild_id) {
            return Ok(story.clone());
        }
        let story = Story {
            id: Uuid::new_v4(),
            guild_id: guild_id.to_owned(),
            title: "Collaborative Story".to_owned(),
            status: StoryStatus::Active,
            scene_count: 0,
            created_at: now,
            updated_at: now,
        };
        state.stories.push(story.clone());
        Ok(story)
    }

    async fn find_by_guild(&self, guild_id: &str) -> Result<Option<Story>, DomainError> {
        Ok(self
            .state()?
            .stories
            .iter()
            .find(|s| s.guild_id == guild_id)
            .cloned())
    }
}

#[async_trait]
impl CharacterRepository for InMemoryStore {
    async fn upsert(
        &self,
        draft: CharacterDraft,
        now: DateTime<Utc>,
    ) -> Result<Character, DomainError> {
        let mut state = self.state()?;
        if let Some(existing) = state
            .characters
            .iter_mut()
            .find(|c| c.story_id == draft.story_id && c.user_id == draft.user_id)
        {
            existing.user_name = draft.user_name;
            existing.name = draft.name;
            existing.description = draft.description;
            existing.archetype = draft.archetype;
            existing.profession_slug = draft.profession_slug;
            existing.faction_slug = draft.faction_slug;
            existing.region_slug = draft.region_slug;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let character = Character {
            id: Uuid::new_v4(),
            story_id: draft.story_id,
            user_id: draft.user_id,
            user_name: draft.user_name,
            name: draft.name,
            description: draft.description,
            archetype: draft.archetype,
            profession_slug: draft.profession_slug,
            faction_slug: draft.faction_slug,
            region_slug: draft.region_slug,
            created_at: now,
            updated_at: now,
        };
        state.characters.push(character.clone());
        Ok(character)
    }

    async fn find_for_user(
        &self,
        story_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Character>, DomainError> {
        Ok(self
            .state()?
            .characters
            .iter()
            .find(|c| c.story_id == story_id && c.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl SceneRepository for InMemoryStore {
    async fn recent(&self, story_id: Uuid, limit: usize) -> Result<Vec<Scene>, DomainError> {
        let mut scenes: Vec<Scene> = self
            .state()?
            .scenes
            .iter()
            .filter(|s| s.story_id == story_id)
            .cloned()
            .collect();
        scenes.sort_by(|a, b| b.scene_number.cmp(&a.scene_number));
        scenes.truncate(limit);
        Ok(scenes)
    }

    async fn all_in_order(&self, story_id: Uuid) -> Result<Vec<Scene>, DomainError> {
        let mut scenes: Vec<Scene> = self
            .state()?
            .scenes
            .iter()
            .filter(|s| s.story_id == story_id)
            .cloned()
            .collect();
        scenes.sort_by_key(|s| s.scene_number);
        Ok(scenes)
    }

    async fn append(&self, scene: NewScene) -> Result<Scene, DomainError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(DomainError::Infrastructure("connection refused".into()));
        }
        let mut state = self.state()?;
        let next = state
            .scenes
            .iter()
            .filter(|s| s.story_id == scene.story_id)
            .map(|s| s.scene_number)
            .max()
            .unwrap_or(0)
            + 1;
        let stored = Scene {
            id: Uuid::new_v4(),
            story_id: scene.story_id,
            scene_number: next,
            character_id: scene.character_id,
            user_id: scene.user_id,
            action: scene.action,
            narrative: scene.narrative,
            image_url: scene.image_url,
            location: scene.location,
            context_used: scene.context_used,
            created_at: scene.created_at,
        };
        state.scenes.push(stored.clone());
        if let Some(story) = state.stories.iter_mut().find(|s| s.id == scene.story_id) {
            story.scene_count += 1;
            story.updated_at = scene.created_at;
        }
        Ok(stored)
    }
}

#[async_trait]
impl EventLog for InMemoryStore {
    async fn recent_categories(
        &self,
        story_id: Uuid,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<DiceCategory>, DomainError> {
        // Insertion order doubles as creation order.
        Ok(self
            .state()?
            .events
            .iter()
            .rev()
            .filter(|e| e.story_id == story_id && e.user_id == user_id)
            .take(limit)
            .map(|e| e.dice_category)
            .collect())
    }

    async fn record(&self, event: EventRecord) -> Result<(), DomainError> {
        self.state()?.events.push(event);
        Ok(())
    }
}

#[async_trait]
impl ManuscriptRepository for InMemoryStore {
    async fn save_manuscript(&self, manuscript: Manuscript) -> Result<bool, DomainError> {
        let mut state = self.state()?;
        if state
            .manuscripts
            .iter()
            .any(|m| m.story_id == manuscript.story_id && m.version == manuscript.version)
        {
            return Ok(false);
        }
        state.manuscripts.push(manuscript);
        Ok(true)
    }

    async fn save_summary(&self, summary: Summary) -> Result<bool, DomainError> {
        let mut state = self.state()?;
        if state
            .summaries
            .iter()
            .any(|s| s.story_id == summary.story_id && s.version == summary.version)
        {
            return Ok(false);
        }
        state.summaries.push(summary);
        Ok(true)
    }

    async fn latest_manuscript(&self, story_id: Uuid) -> Result<Option<Manuscript>, DomainError> {
        Ok(self
            .state()?
            .manuscripts
            .iter()
            .filter(|m| m.story_id == story_id)
            .max_by_key(|m| m.version)
            .cloned())
    }

    async fn latest_summary(&self, story_id: Uuid) -> Result<Option<Summary>, DomainError> {
        Ok(self
            .state()?
            .summaries
            .iter()
            .filter(|s| s.story_id == story_id)
            .max_by_key(|s| s.version)
            .cloned())
    }
}

#[async_trait]
impl ReferenceRepository for InMemoryStore {
    async fn region(&self, slug: &str) -> Result<Option<Region>, DomainError> {
        Ok(self
            .state()?
            .regions
            .iter()
            .find(|r| r.slug == slug)
            .cloned())
    }

    async fn faction(&self, slug: &str) -> Result<Option<Faction>, DomainError> {
        Ok(self
            .state()?
            .factions
            .iter()
            .find(|f| f.slug == slug)
            .cloned())
    }

    async fn profession(&self, slug: &str) -> Result<Option<Profession>, DomainError> {
        Ok(self
            .state()?
            .professions
            .iter()
            .find(|p| p.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl LockStore for InMemoryStore {
    async fn try_insert(
        &self,
        story_id: Uuid,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut state = self.state()?;
        if state.locks.contains_key(&story_id) {
            return Ok(false);
        }
        state.locks.insert(
            story_id,
            LockHolder {
                story_id,
                locked_by: holder.to_owned(),
                locked_at: now,
            },
        );
        Ok(true)
    }

    async fn delete(&self, story_id: Uuid) -> Result<(), DomainError> {
        self.state()?.locks.remove(&story_id);
        Ok(())
    }

    async fn holder(&self, story_id: Uuid) -> Result<Option<LockHolder>, DomainError> {
        Ok(self.state()?.locks.get(&story_id).cloned())
    }
}
