//! Routes for character registration.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use loreweave_character::application::{command_handlers, query_handlers};
use loreweave_character::domain::commands::RegisterCharacter;
use loreweave_core::model::Character;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct RegisterCharacterRequest {
    pub guild_id: String,
    pub user_id: String,
    /// Falls back to `user_id` when absent.
    #[serde(default)]
    pub user_name: String,
    pub name: String,
    pub description: String,
    pub archetype: Option<String>,
    pub profession_slug: Option<String>,
    pub faction_slug: Option<String>,
    pub region_slug: Option<String>,
}

/// POST /
#[instrument(skip(state, request), fields(guild_id = %request.guild_id, user_id = %request.user_id))]
async fn register_character(
    State(state): State<AppState>,
    Json(request): Json<RegisterCharacterRequest>,
) -> Result<Json<Character>, ApiError> {
    let command = RegisterCharacter {
        correlation_id: Uuid::new_v4(),
        guild_id: request.guild_id,
        user_id: request.user_id,
        user_name: request.user_name,
        name: request.name,
        description: request.description,
        archetype: request.archetype,
        profession_slug: request.profession_slug,
        faction_slug: request.faction_slug,
        region_slug: request.region_slug,
    };

    info!(correlation_id = %command.correlation_id, "handling register_character command");

    let repos = &state.repositories;
    let character = command_handlers::handle_register_character(
        &command,
        state.clock.as_ref(),
        &*repos.stories,
        &*repos.characters,
        &*repos.references,
    )
    .await?;

    Ok(Json(character))
}

/// GET /{guild_id}/{user_id}
async fn get_character(
    State(state): State<AppState>,
    Path((guild_id, user_id)): Path<(String, String)>,
) -> Result<Json<Character>, ApiError> {
    let repos = &state.repositories;
    let character =
        query_handlers::get_character(&guild_id, &user_id, &*repos.stories, &*repos.characters)
            .await?;
    Ok(Json(character))
}

/// Returns the router for character registration.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_character))
        .route("/{guild_id}/{user_id}", get(get_character))
}
