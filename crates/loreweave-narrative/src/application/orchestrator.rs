//! Scene orchestrator.
//!
//! One call turns an accepted action into prose, an image prompt and, when
//! the image collaborators cooperate, a hosted illustration. Narration
//! failures are fatal; anything that goes wrong on the image side degrades
//! to a text-only scene.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use loreweave_core::clock::{Clock, elapsed_ms};
use loreweave_core::error::DomainError;
use loreweave_core::model::{Character, Scene};
use loreweave_core::repository::{EventLog, ReferenceRepository};
use loreweave_core::rng::DeterministicRng;
use loreweave_core::service::{ImageGeneration, ImageHandle, ImageHosting, ServiceError};
use loreweave_rules::application::event_engine::{EventEngine, RollRequest};
use loreweave_rules::domain::events::EventContext;
use tracing::{info, instrument, warn};

use super::strategies::{ImagePromptStrategy, NarrativeStrategy};
use crate::domain::brief::{SceneBrief, SceneExcerpt};
use crate::domain::keywords::keyword_prompt;
use crate::domain::text::first_paragraphs;

/// Tunables of the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Per-scene excerpt length in the narrative context.
    pub excerpt_chars: usize,
    /// Paragraphs kept from the generated prose.
    pub max_paragraphs: usize,
    /// Character budget of the image prompt.
    pub image_prompt_max_chars: usize,
    /// Wall-clock budget of generation plus upload, retries included.
    pub image_step_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            excerpt_chars: 160,
            max_paragraphs: 3,
            image_prompt_max_chars: 200,
            image_step_timeout: Duration::from_secs(150),
        }
    }
}

/// Per-call collaborators.
#[derive(Clone, Copy)]
pub struct GenerationContext<'a> {
    /// Story being extended.
    pub story_id: uuid::Uuid,
    /// Shared RNG; locked only around synchronous draws.
    pub rng: &'a Mutex<dyn DeterministicRng + Send>,
    /// Time source for the event row.
    pub clock: &'a dyn Clock,
    /// Event history and log.
    pub events: &'a dyn EventLog,
    /// Faction, region and profession lookups.
    pub references: &'a dyn ReferenceRepository,
}

/// What the orchestrator produced. Callers persist it.
#[derive(Debug, Clone)]
pub struct GeneratedScene {
    /// Post-processed prose, never empty.
    pub narrative: String,
    /// Prompt sent to the image collaborator, never empty.
    pub image_prompt: String,
    /// Hosted illustration, if the image step succeeded.
    pub image_url: Option<String>,
    /// The beat rolled for this scene.
    pub event: EventContext,
    /// Location tag: the character's region, else the image prompt.
    pub location: String,
}

/// Composes the event engine, the two strategies and the image
/// collaborators.
pub struct SceneOrchestrator {
    events: EventEngine,
    narrative: Arc<dyn NarrativeStrategy>,
    image_prompt: Arc<dyn ImagePromptStrategy>,
    images: Arc<dyn ImageGeneration>,
    hosting: Option<Arc<dyn ImageHosting>>,
    config: OrchestratorConfig,
}

impl SceneOrchestrator {
    /// Creates an orchestrator with the standard event engine and default
    /// tunables.
    #[must_use]
    pub fn new(
        narrative: Arc<dyn NarrativeStrategy>,
        image_prompt: Arc<dyn ImagePromptStrategy>,
        images: Arc<dyn ImageGeneration>,
        hosting: Option<Arc<dyn ImageHosting>>,
    ) -> Self {
        Self {
            events: EventEngine::default(),
            narrative,
            image_prompt,
            images,
            hosting,
            config: OrchestratorConfig::default(),
        }
    }

    /// Replaces the event engine.
    #[must_use]
    pub fn with_event_engine(mut self, events: EventEngine) -> Self {
        self.events = events;
        self
    }

    /// Replaces the tunables.
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// The tunables in use.
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Generates the next scene for `character` performing `action`.
    ///
    /// `recent_scenes` may be in any order; they are presented oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Upstream` or `DomainError::Timeout` when
    /// narration fails, and `DomainError::Infrastructure` when a lookup or
    /// the event insert fails. Image failures never surface here.
    #[instrument(skip_all, fields(story_id = %ctx.story_id, character = %character.name))]
    pub async fn generate(
        &self,
        action: &str,
        character: &Character,
        recent_scenes: &[Scene],
        ctx: GenerationContext<'_>,
    ) -> Result<GeneratedScene, DomainError> {
        let brief = self
            .brief(action, character, recent_scenes, ctx)
            .await?;

        let (narrative, image_prompt) = if self.image_prompt.needs_narrative() {
            let narrative = self.narrate(&brief).await?;
            let prompt = self.design(&brief, Some(&narrative)).await;
            (narrative, prompt)
        } else {
            let (narrative, prompt) =
                tokio::join!(self.narrate(&brief), self.design(&brief, None));
            (narrative?, prompt)
        };

        let image_url = self.illustrate(&image_prompt).await;
        let location = character
            .region_slug
            .clone()
            .unwrap_or_else(|| image_prompt.clone());

        Ok(GeneratedScene {
            narrative,
            image_prompt,
            image_url,
            event: brief.event,
            location,
        })
    }

    async fn brief(
        &self,
        action: &str,
        character: &Character,
        recent_scenes: &[Scene],
        ctx: GenerationContext<'_>,
    ) -> Result<SceneBrief, DomainError> {
        let faction = match character.faction_slug.as_deref() {
            Some(slug) => ctx.references.faction(slug).await?,
            None => None,
        };
        let region = match character.region_slug.as_deref() {
            Some(slug) => ctx.references.region(slug).await?,
            None => None,
        };
        let profession = match character.profession_slug.as_deref() {
            Some(slug) => ctx.references.profession(slug).await?,
            None => None,
        };

        let started = Instant::now();
        let request = RollRequest {
            story_id: ctx.story_id,
            user_id: &character.user_id,
            region_slug: character.region_slug.as_deref(),
            faction_slug: character.faction_slug.as_deref(),
        };
        let event = self
            .events
            .roll_event(&request, ctx.rng, ctx.clock, ctx.events)
            .await?;
        info!(
            stage = "event_roll",
            success = true,
            duration_ms = elapsed_ms(started),
            event_type = event.event_type.as_str(),
            "stage complete"
        );

        Ok(SceneBrief {
            action: action.to_owned(),
            character: character.clone(),
            faction,
            region,
            profession,
            event,
            prior: SceneExcerpt::oldest_first(recent_scenes, self.config.excerpt_chars),
        })
    }

    async fn narrate(&self, brief: &SceneBrief) -> Result<String, DomainError> {
        let started = Instant::now();
        let result = self
            .narrative
            .narrate(brief)
            .await
            .map(|raw| first_paragraphs(&raw, self.config.max_paragraphs))
            .and_then(|text| {
                if text.is_empty() {
                    Err(ServiceError::EmptyResponse("narrative".to_owned()))
                } else {
                    Ok(text)
                }
            });
        match result {
            Ok(text) => {
                info!(
                    stage = "narrative",
                    success = true,
                    duration_ms = elapsed_ms(started),
                    "stage complete"
                );
                Ok(text)
            }
            Err(e) => {
                warn!(
                    stage = "narrative",
                    success = false,
                    duration_ms = elapsed_ms(started),
                    error = %e,
                    "stage failed"
                );
                Err(DomainError::upstream("text", &e))
            }
        }
    }

    /// Never fails: an unusable design falls back to the keyword table.
    async fn design(&self, brief: &SceneBrief, narrative: Option<&str>) -> String {
        let started = Instant::now();
        let max = self.config.image_prompt_max_chars;
        match self.image_prompt.design(brief, narrative, max).await {
            Ok(prompt) if !prompt.trim().is_empty() && prompt.chars().count() <= max => {
                info!(
                    stage = "image_prompt",
                    success = true,
                    duration_ms = elapsed_ms(started),
                    "stage complete"
                );
                prompt
            }
            Ok(_) => {
                warn!(
                    stage = "image_prompt",
                    success = false,
                    "strategy returned an unusable prompt, using keywords"
                );
                keyword_prompt(brief, max)
            }
            Err(e) => {
                warn!(
                    stage = "image_prompt",
                    success = false,
                    duration_ms = elapsed_ms(started),
                    error = %e,
                    "strategy failed, using keywords"
                );
                keyword_prompt(brief, max)
            }
        }
    }

    async fn illustrate(&self, prompt: &str) -> Option<String> {
        let started = Instant::now();
        match tokio::time::timeout(self.config.image_step_timeout, self.render(prompt)).await {
            Ok(Ok(url)) => {
                info!(
                    stage = "image",
                    success = url.is_some(),
                    duration_ms = elapsed_ms(started),
                    "stage complete"
                );
                url
            }
            Ok(Err(e)) => {
                warn!(
                    stage = "image",
                    success = false,
                    duration_ms = elapsed_ms(started),
                    error = %e,
                    "image step failed, continuing without image"
                );
                None
            }
            Err(_) => {
                warn!(
                    stage = "image",
                    success = false,
                    duration_ms = elapsed_ms(started),
                    "image step timed out, continuing without image"
                );
                None
            }
        }
    }

    async fn render(&self, prompt: &str) -> Result<Option<String>, ServiceError> {
        let handle = self.images.generate(prompt).await?;
        match (&self.hosting, handle) {
            (Some(host), handle) => host.upload(&handle).await.map(Some),
            (None, ImageHandle::Url(url)) => Ok(Some(url)),
            (None, ImageHandle::DataUrl(_)) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use loreweave_core::model::{Faction, Region};
    use loreweave_test_support::{
        FailingImageService, FixedClock, InMemoryStore, RecordingImageHost, ScriptedTextService,
        SequenceRng, StaticImageService,
    };
    use uuid::Uuid;

    use super::*;
    use crate::application::strategies::{LlmImagePromptStrategy, LlmNarrativeStrategy};
    use crate::domain::config::NarratorConfig;
    use crate::domain::prompts::{IMAGE_DESIGNER_HEADER, NARRATOR_HEADER};

    const THREE_PLUS_ONE: &str = "First.\n\nSecond.\n\nThird.\n\nFourth.";

    fn character(region: Option<&str>) -> Character {
        Character {
            id: Uuid::new_v4(),
            story_id: Uuid::nil(),
            user_id: "u-1".to_owned(),
            user_name: "user".to_owned(),
            name: "Aria".to_owned(),
            description: "A scout with a silver compass.".to_owned(),
            archetype: Some("female".to_owned()),
            profession_slug: None,
            faction_slug: Some("axis_prime".to_owned()),
            region_slug: region.map(str::to_owned),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_region(Region {
                slug: "neoterra".to_owned(),
                name: "Neoterra".to_owned(),
                atmosphere: "sterile neon calm".to_owned(),
                visual_style: "white towers, neon blue".to_owned(),
            })
            .with_faction(Faction {
                slug: "axis_prime".to_owned(),
                name: "Axis Prime".to_owned(),
                motto: "Order is light".to_owned(),
                description: "Rulers of the lit city.".to_owned(),
                prompt_base: "Cold, exact, luminous.".to_owned(),
            })
    }

    fn orchestrator(
        text: Arc<ScriptedTextService>,
        images: Arc<dyn ImageGeneration>,
        hosting: Option<Arc<dyn ImageHosting>>,
    ) -> SceneOrchestrator {
        SceneOrchestrator::new(
            Arc::new(LlmNarrativeStrategy::new(text.clone(), NarratorConfig::default())),
            Arc::new(LlmImagePromptStrategy::from_brief(text)),
            images,
            hosting,
        )
    }

    fn ctx<'a>(
        store: &'a InMemoryStore,
        rng: &'a Mutex<SequenceRng>,
        clock: &'a FixedClock,
    ) -> GenerationContext<'a> {
        GenerationContext {
            story_id: Uuid::nil(),
            rng,
            clock,
            events: store,
            references: store,
        }
    }

    #[tokio::test]
    async fn test_generate_composes_narrative_prompt_and_hosted_image() {
        // Arrange
        let store = store();
        let text = Arc::new(
            ScriptedTextService::replying("unused")
                .when_contains(NARRATOR_HEADER, THREE_PLUS_ONE)
                .when_contains(IMAGE_DESIGNER_HEADER, "young woman, neon tavern"),
        );
        let host = Arc::new(RecordingImageHost::new());
        let orchestrator = orchestrator(
            text.clone(),
            Arc::new(StaticImageService::new(ImageHandle::DataUrl(
                "data:image/png;base64,AAAA".to_owned(),
            ))),
            Some(host.clone()),
        );
        let rng = Mutex::new(SequenceRng::new(vec![12]));
        let clock = FixedClock::standard();

        // Act
        let scene = orchestrator
            .generate("enters the tavern", &character(Some("neoterra")), &[], ctx(&store, &rng, &clock))
            .await
            .unwrap();

        // Assert
        assert_eq!(scene.narrative, "First.\n\nSecond.\n\nThird.");
        assert_eq!(scene.image_prompt, "young woman, neon tavern");
        assert_eq!(scene.image_url.as_deref(), Some("https://cdn.test/scenes/1.png"));
        assert_eq!(scene.location, "neoterra");
        assert_eq!(host.uploads().len(), 1);
        assert_eq!(store.events().len(), 1);

        let narrator_prompt = text
            .prompts()
            .into_iter()
            .find(|p| p.starts_with(NARRATOR_HEADER))
            .unwrap();
        assert!(narrator_prompt.contains("Cold, exact, luminous."));
        assert!(narrator_prompt.contains("sterile neon calm"));
    }

    #[tokio::test]
    async fn test_event_is_rolled_once_and_feeds_both_prompts() {
        let store = store();
        let text = Arc::new(ScriptedTextService::replying("tavern"));
        let orchestrator = orchestrator(
            text.clone(),
            Arc::new(FailingImageService::new(ServiceError::Server { status: 500 })),
            None,
        );
        // d20 = 1 → hostile encounter, antagonist index 0
        let rng = Mutex::new(SequenceRng::new(vec![1, 0]));
        let clock = FixedClock::standard();

        let scene = orchestrator
            .generate("waits", &character(Some("neoterra")), &[], ctx(&store, &rng, &clock))
            .await
            .unwrap();

        assert_eq!(store.events().len(), 1);
        assert_eq!(scene.event.subtype, "enemy_centinela_lumen");
        for prompt in text.prompts() {
            assert!(prompt.contains("Lumen Sentinel") || prompt.contains("white synthetic skin"));
        }
    }

    #[tokio::test]
    async fn test_image_generation_failure_degrades_to_text_only() {
        let store = store();
        let text = Arc::new(ScriptedTextService::replying("Prose."));
        let images = Arc::new(FailingImageService::new(ServiceError::Server { status: 500 }));
        let host = Arc::new(RecordingImageHost::new());
        let orchestrator = orchestrator(text, images.clone(), Some(host.clone()));
        let rng = Mutex::new(SequenceRng::new(vec![12]));
        let clock = FixedClock::standard();

        let scene = orchestrator
            .generate("waits", &character(None), &[], ctx(&store, &rng, &clock))
            .await
            .unwrap();

        assert_eq!(scene.narrative, "Prose.");
        assert!(scene.image_url.is_none());
        assert_eq!(images.calls(), 1);
        assert!(host.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_degrades_to_text_only() {
        let store = store();
        let text = Arc::new(ScriptedTextService::replying("Prose."));
        let orchestrator = orchestrator(
            text,
            Arc::new(StaticImageService::new(ImageHandle::Url("https://img/1.png".to_owned()))),
            Some(Arc::new(RecordingImageHost::failing())),
        );
        let rng = Mutex::new(SequenceRng::new(vec![12]));
        let clock = FixedClock::standard();

        let scene = orchestrator
            .generate("waits", &character(None), &[], ctx(&store, &rng, &clock))
            .await
            .unwrap();

        assert!(scene.image_url.is_none());
    }

    #[tokio::test]
    async fn test_without_hosting_remote_urls_pass_through_and_data_urls_drop() {
        let store = store();
        let clock = FixedClock::standard();

        let remote = orchestrator(
            Arc::new(ScriptedTextService::replying("Prose.")),
            Arc::new(StaticImageService::new(ImageHandle::Url("https://img/1.png".to_owned()))),
            None,
        );
        let rng = Mutex::new(SequenceRng::new(vec![12]));
        let scene = remote
            .generate("waits", &character(None), &[], ctx(&store, &rng, &clock))
            .await
            .unwrap();
        assert_eq!(scene.image_url.as_deref(), Some("https://img/1.png"));

        let inline = orchestrator(
            Arc::new(ScriptedTextService::replying("Prose.")),
            Arc::new(StaticImageService::new(ImageHandle::DataUrl("data:image/png;base64,AA".to_owned()))),
            None,
        );
        let rng = Mutex::new(SequenceRng::new(vec![12]));
        let scene = inline
            .generate("waits", &character(None), &[], ctx(&store, &rng, &clock))
            .await
            .unwrap();
        assert!(scene.image_url.is_none());
    }

    #[tokio::test]
    async fn test_narrative_failure_is_fatal() {
        let store = store();
        let text = Arc::new(
            ScriptedTextService::replying("tavern")
                .when_contains_fail(NARRATOR_HEADER, ServiceError::Server { status: 502 }),
        );
        let images = Arc::new(StaticImageService::new(ImageHandle::Url("https://img/1.png".to_owned())));
        let orchestrator = orchestrator(text, images.clone(), None);
        let rng = Mutex::new(SequenceRng::new(vec![12]));
        let clock = FixedClock::standard();

        let result = orchestrator
            .generate("waits", &character(None), &[], ctx(&store, &rng, &clock))
            .await;

        assert!(matches!(result, Err(DomainError::Upstream { service: "text", .. })));
        assert_eq!(images.calls(), 0);
        // the event row is written regardless
        assert_eq!(store.events().len(), 1);
    }

    #[tokio::test]
    async fn test_image_prompt_failure_falls_back_to_keywords() {
        let store = store();
        let text = Arc::new(
            ScriptedTextService::replying("Prose.")
                .when_contains_fail(IMAGE_DESIGNER_HEADER, ServiceError::RateLimited),
        );
        let orchestrator = orchestrator(
            text,
            Arc::new(FailingImageService::new(ServiceError::Server { status: 500 })),
            None,
        );
        let rng = Mutex::new(SequenceRng::new(vec![12]));
        let clock = FixedClock::standard();

        let scene = orchestrator
            .generate("enters the tavern", &character(None), &[], ctx(&store, &rng, &clock))
            .await
            .unwrap();

        assert!(scene.image_prompt.starts_with("young woman"));
        assert!(scene.image_prompt.contains("dim tavern interior"));
        assert_eq!(scene.location, scene.image_prompt);
    }

    #[tokio::test(start_paused = true)]
    async fn test_narration_and_brief_only_image_prompt_run_concurrently() {
        let store = store();
        let text = Arc::new(
            ScriptedTextService::replying("Prose.").with_delay(Duration::from_millis(100)),
        );
        let orchestrator = orchestrator(
            text.clone(),
            Arc::new(FailingImageService::new(ServiceError::Server { status: 500 })),
            None,
        );
        let rng = Mutex::new(SequenceRng::new(vec![12]));
        let clock = FixedClock::standard();
        let started = tokio::time::Instant::now();

        orchestrator
            .generate("waits", &character(None), &[], ctx(&store, &rng, &clock))
            .await
            .unwrap();

        assert_eq!(text.prompts().len(), 2);
        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_image_step_is_abandoned_after_its_budget() {
        struct SlowImages;

        #[async_trait::async_trait]
        impl ImageGeneration for SlowImages {
            async fn generate(&self, _prompt: &str) -> Result<ImageHandle, ServiceError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ImageHandle::Url("https://late".to_owned()))
            }
        }

        let store = store();
        let orchestrator = orchestrator(
            Arc::new(ScriptedTextService::replying("Prose.")),
            Arc::new(SlowImages),
            None,
        )
        .with_config(OrchestratorConfig {
            image_step_timeout: Duration::from_secs(5),
            ..OrchestratorConfig::default()
        });
        let rng = Mutex::new(SequenceRng::new(vec![12]));
        let clock = FixedClock::standard();

        let scene = orchestrator
            .generate("waits", &character(None), &[], ctx(&store, &rng, &clock))
            .await
            .unwrap();

        assert_eq!(scene.narrative, "Prose.");
        assert!(scene.image_url.is_none());
    }

    #[tokio::test]
    async fn test_prior_scenes_are_excerpted_oldest_first() {
        let store = store();
        let text = Arc::new(ScriptedTextService::replying("Prose."));
        let orchestrator = orchestrator(
            text.clone(),
            Arc::new(FailingImageService::new(ServiceError::Server { status: 500 })),
            None,
        );
        let rng = Mutex::new(SequenceRng::new(vec![12]));
        let clock = FixedClock::standard();
        let recent: Vec<Scene> = [3, 2]
            .into_iter()
            .map(|n| Scene {
                id: Uuid::new_v4(),
                story_id: Uuid::nil(),
                scene_number: n,
                character_id: None,
                user_id: "u-2".to_owned(),
                action: "a".to_owned(),
                narrative: format!("{n}").repeat(300),
                image_url: None,
                location: None,
                context_used: vec![],
                created_at: Utc::now(),
            })
            .collect();

        orchestrator
            .generate("waits", &character(None), &recent, ctx(&store, &rng, &clock))
            .await
            .unwrap();

        let narrator_prompt = text
            .prompts()
            .into_iter()
            .find(|p| p.starts_with(NARRATOR_HEADER))
            .unwrap();
        let two = narrator_prompt.find(&format!("#2: {}\n", "2".repeat(160))).unwrap();
        let three = narrator_prompt.find(&format!("#3: {}\n", "3".repeat(160))).unwrap();
        assert!(two < three);
    }
}
