//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use loreweave_core::clock::Clock;
use loreweave_core::model::{Faction, Profession, Region};
use loreweave_core::rng::DeterministicRng;
use loreweave_core::service::{ImageHandle, TextCompletion};
use loreweave_narrative::application::manuscript::ManuscriptCompiler;
use loreweave_narrative::application::orchestrator::SceneOrchestrator;
use loreweave_narrative::application::strategies::{
    KeywordImagePromptStrategy, LlmNarrativeStrategy,
};
use loreweave_narrative::application::validator::ContributionValidator;
use loreweave_narrative::domain::config::{Language, NarratorConfig};
use loreweave_narrative::domain::prompts::{NARRATOR_HEADER, SUMMARY_HEADER, VALIDATION_HEADER};
use loreweave_synthesis::application::lock::SynthesisLock;
use loreweave_synthesis::application::pipeline::SynthesisPipeline;
use loreweave_test_support::{FixedClock, InMemoryStore, ScriptedTextService, SequenceRng, StaticImageService};
use tower::ServiceExt;

use loreweave_api::app;
use loreweave_api::state::{AppState, Repositories};

pub const NARRATIVE: &str = "Aria slips through the neon arcade, counting the drones overhead.\n\n\
     A stranger presses a warm data shard into her palm and vanishes.";

pub const IMAGE_URL: &str = "https://img.example/scene.webp";

/// Text service answering every prompt kind with a happy reply.
pub fn happy_text() -> ScriptedTextService {
    ScriptedTextService::replying("unexpected prompt")
        .when_contains(VALIDATION_HEADER, "VALID")
        .when_contains(NARRATOR_HEADER, NARRATIVE)
        .when_contains(SUMMARY_HEADER, "Aria has reached the arcade.")
}

/// Store seeded with one row of each reference table.
pub fn seeded_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_region(Region {
            slug: "neoterra".into(),
            name: "Neoterra".into(),
            atmosphere: "sterile neon".into(),
            visual_style: "white towers".into(),
        })
        .with_faction(Faction {
            slug: "axis_prime".into(),
            name: "Axis Prime".into(),
            motto: "Order".into(),
            description: "Technocrats".into(),
            prompt_base: "cold light".into(),
        })
        .with_profession(Profession {
            slug: "scout".into(),
            name: "Scout".into(),
            description: "Goes ahead".into(),
            visual_descriptor: "light armor".into(),
        })
}

/// A running app over an in-memory store. Keep the store to inspect state.
pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_text(Arc::new(happy_text()))
    }

    pub fn with_text(text: Arc<dyn TextCompletion>) -> Self {
        let store = Arc::new(seeded_store());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::standard());
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
            Arc::new(Mutex::new(SequenceRng::new(vec![12; 64])));
        let narrator = NarratorConfig::default().with_language(Language::En);

        let pipeline = SynthesisPipeline::new(
            ContributionValidator::new(Arc::clone(&text), narrator.clone()).unwrap(),
            SceneOrchestrator::new(
                Arc::new(LlmNarrativeStrategy::new(Arc::clone(&text), narrator.clone())),
                Arc::new(KeywordImagePromptStrategy),
                Arc::new(StaticImageService::new(ImageHandle::Url(IMAGE_URL.into()))),
                None,
            ),
            ManuscriptCompiler::new(text, narrator),
            SynthesisLock::new(store.clone()),
        );

        let state = AppState::new(
            Repositories::shared(&store),
            Arc::new(pipeline),
            clock,
            rng,
        );
        Self {
            store,
            router: app(state),
        }
    }
}

/// Registration body for `user_id` in `guild_id`.
pub fn registration(guild_id: &str, user_id: &str) -> serde_json::Value {
    serde_json::json!({
        "guild_id": guild_id,
        "user_id": user_id,
        "user_name": "aria_player",
        "name": "Aria",
        "description": "A scout with a borrowed visor.",
        "archetype": "female",
        "profession_slug": "scout",
        "faction_slug": "axis_prime",
        "region_slug": "neoterra"
    })
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
