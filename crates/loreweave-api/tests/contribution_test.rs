//! Integration tests for contribution submission.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use loreweave_core::repository::{LockStore, StoryRepository};
use loreweave_core::service::ServiceError;
use loreweave_narrative::domain::prompts::{NARRATOR_HEADER, VALIDATION_HEADER};
use loreweave_test_support::ScriptedTextService;

fn contribution(action: &str) -> serde_json::Value {
    serde_json::json!({ "guild_id": "guild-1", "user_id": "u-1", "action": action })
}

async fn register(app: &common::TestApp) {
    let (status, _) = common::post_json(
        app.router.clone(),
        "/api/v1/characters",
        &common::registration("guild-1", "u-1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_accepted_contribution_returns_the_scene() {
    // Arrange
    let app = common::TestApp::new();
    register(&app).await;

    // Act
    let (status, json) = common::post_json(
        app.router.clone(),
        "/api/v1/contributions",
        &contribution("walks into the arcade"),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "accepted");
    assert_eq!(json["scene_number"], 1);
    assert_eq!(json["image_url"], common::IMAGE_URL);
    assert_eq!(json["dice_roll"], 12);
    assert_eq!(json["dice_category"], "neutral");
    assert!(json["narrative"].as_str().unwrap().contains("neon arcade"));
    assert_eq!(app.store.events().len(), 1);
}

#[tokio::test]
async fn test_scene_numbers_grow_per_submission() {
    let app = common::TestApp::new();
    register(&app).await;

    for expected in 1..=3 {
        let (status, json) = common::post_json(
            app.router.clone(),
            "/api/v1/contributions",
            &contribution("keeps walking"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["scene_number"], expected);
    }
}

#[tokio::test]
async fn test_blank_action_is_invalid_input() {
    let app = common::TestApp::new();
    register(&app).await;

    let (status, json) =
        common::post_json(app.router, "/api/v1/contributions", &contribution("   ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "invalid_input");
    assert!(app.store.events().is_empty());
}

#[tokio::test]
async fn test_user_without_character_is_invalid_input() {
    let app = common::TestApp::new();

    let (status, json) =
        common::post_json(app.router, "/api/v1/contributions", &contribution("waves")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "invalid_input");
}

#[tokio::test]
async fn test_incoherent_action_is_rejected_with_reasons() {
    let text = ScriptedTextService::replying("unexpected prompt")
        .when_contains(VALIDATION_HEADER, "INVALID\n- The arcade burned down last scene.");
    let app = common::TestApp::with_text(Arc::new(text));
    register(&app).await;

    let (status, json) = common::post_json(
        app.router,
        "/api/v1/contributions",
        &contribution("walks into the arcade"),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["status"], "rejected");
    assert_eq!(json["reasons"][0], "The arcade burned down last scene.");
    assert!(app.store.events().is_empty());
}

#[tokio::test]
async fn test_busy_story_is_locked() {
    let app = common::TestApp::new();
    register(&app).await;
    let story = app.store.get_or_create("guild-1", Utc::now()).await.unwrap();
    assert!(app.store.try_insert(story.id, "someone-else", Utc::now()).await.unwrap());

    let (status, json) = common::post_json(
        app.router,
        "/api/v1/contributions",
        &contribution("walks into the arcade"),
    )
    .await;

    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(json["status"], "locked");
    assert!(app.store.scenes(story.id).is_empty());
}

#[tokio::test]
async fn test_narration_failure_is_502_and_releases_the_lock() {
    let text = ScriptedTextService::replying("unexpected prompt")
        .when_contains(VALIDATION_HEADER, "VALID")
        .when_contains_fail(NARRATOR_HEADER, ServiceError::Server { status: 503 });
    let app = common::TestApp::with_text(Arc::new(text));
    register(&app).await;

    let (status, json) = common::post_json(
        app.router,
        "/api/v1/contributions",
        &contribution("walks into the arcade"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "upstream_error");
    let story = app.store.get_or_create("guild-1", Utc::now()).await.unwrap();
    assert!(!app.store.is_locked(story.id));
    assert!(app.store.scenes(story.id).is_empty());
}
