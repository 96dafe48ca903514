//! Shared harness for pipeline scenario tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::Utc;
use loreweave_core::clock::Clock;
use loreweave_core::error::DomainError;
use loreweave_core::model::{CharacterDraft, Story};
use loreweave_core::repository::{CharacterRepository, StoryRepository};
use loreweave_core::rng::SystemRng;
use loreweave_core::service::{ImageGeneration, ImageHandle, TextCompletion};
use loreweave_narrative::application::manuscript::ManuscriptCompiler;
use loreweave_narrative::application::orchestrator::SceneOrchestrator;
use loreweave_narrative::application::strategies::{LlmImagePromptStrategy, LlmNarrativeStrategy};
use loreweave_narrative::application::validator::ContributionValidator;
use loreweave_narrative::domain::config::{Language, NarratorConfig};
use loreweave_narrative::domain::prompts::{
    IMAGE_DESIGNER_HEADER, NARRATOR_HEADER, SUMMARY_HEADER, VALIDATION_HEADER,
};
use loreweave_synthesis::application::lock::SynthesisLock;
use loreweave_synthesis::application::pipeline::{SynthesisConfig, SynthesisContext, SynthesisPipeline};
use loreweave_synthesis::domain::commands::SubmitContribution;
use loreweave_synthesis::domain::outcome::ContributionOutcome;
use loreweave_test_support::{FixedClock, InMemoryStore, ScriptedTextService, StaticImageService};
use uuid::Uuid;

pub const TWO_PARAGRAPHS: &str =
    "Aria pushes the tavern door open; smoke and lute music spill out.\n\n\
     The barkeep leans in and whispers of lights seen over the drowned quarter.";

/// A text service answering every prompt kind sensibly.
pub fn happy_text() -> ScriptedTextService {
    ScriptedTextService::replying("unexpected prompt")
        .when_contains(VALIDATION_HEADER, "VALID")
        .when_contains(NARRATOR_HEADER, TWO_PARAGRAPHS)
        .when_contains(IMAGE_DESIGNER_HEADER, "young woman in a smoky tavern, candlelight")
        .when_contains(SUMMARY_HEADER, "So far, Aria has followed rumors.")
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub pipeline: SynthesisPipeline,
    pub rng: Mutex<SystemRng>,
    pub clock: FixedClock,
    pub story: Story,
}

impl Harness {
    pub async fn new(text: Arc<dyn TextCompletion>, images: Arc<dyn ImageGeneration>) -> Self {
        Self::with_config(text, images, SynthesisConfig::default(), 50).await
    }

    pub async fn with_config(
        text: Arc<dyn TextCompletion>,
        images: Arc<dyn ImageGeneration>,
        config: SynthesisConfig,
        summary_interval: i32,
    ) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let narrator = NarratorConfig::default().with_language(Language::En);
        let validator = ContributionValidator::new(Arc::clone(&text), narrator.clone()).unwrap();
        let orchestrator = SceneOrchestrator::new(
            Arc::new(LlmNarrativeStrategy::new(Arc::clone(&text), narrator.clone())),
            Arc::new(LlmImagePromptStrategy::from_brief(Arc::clone(&text))),
            images,
            None,
        );
        let compiler =
            ManuscriptCompiler::new(text, narrator).with_summary_interval(summary_interval);
        let pipeline = SynthesisPipeline::new(
            validator,
            orchestrator,
            compiler,
            SynthesisLock::new(store.clone()),
        )
        .with_config(config);

        let clock = FixedClock::standard();
        let story = store.get_or_create("guild-1", clock.now()).await.unwrap();

        Self {
            store,
            pipeline,
            rng: Mutex::new(SystemRng::seeded(7)),
            clock,
            story,
        }
    }

    pub async fn register(&self, user_id: &str, name: &str) {
        self.store
            .upsert(
                CharacterDraft {
                    story_id: self.story.id,
                    user_id: user_id.to_owned(),
                    user_name: user_id.to_owned(),
                    name: name.to_owned(),
                    description: "A wanderer.".to_owned(),
                    archetype: Some("female".to_owned()),
                    profession_slug: None,
                    faction_slug: None,
                    region_slug: None,
                },
                Utc::now(),
            )
            .await
            .unwrap();
    }

    pub fn context(&self) -> SynthesisContext<'_> {
        SynthesisContext {
            characters: &*self.store,
            scenes: &*self.store,
            events: &*self.store,
            manuscripts: &*self.store,
            references: &*self.store,
            rng: &self.rng,
            clock: &self.clock,
        }
    }

    pub async fn submit(&self, user_id: &str, action: &str) -> Result<ContributionOutcome, DomainError> {
        self.submit_to(self.story.id, user_id, action).await
    }

    pub async fn submit_to(
        &self,
        story_id: Uuid,
        user_id: &str,
        action: &str,
    ) -> Result<ContributionOutcome, DomainError> {
        let command = SubmitContribution {
            correlation_id: Uuid::new_v4(),
            story_id,
            user_id: user_id.to_owned(),
            action: action.to_owned(),
        };
        self.pipeline.submit(&command, self.context()).await
    }
}

pub fn remote_image() -> Arc<StaticImageService> {
    Arc::new(StaticImageService::new(ImageHandle::Url(
        "https://img.test/scene.png".to_owned(),
    )))
}
