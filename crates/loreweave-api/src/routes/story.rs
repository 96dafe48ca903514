//! Routes for reading a tenant's story.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use loreweave_character::application::query_handlers::{self, StoryContextView};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /{guild_id}/context
async fn story_context(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
) -> Result<Json<StoryContextView>, ApiError> {
    let repos = &state.repositories;
    let view = query_handlers::get_story_context(
        &guild_id,
        &*repos.stories,
        &*repos.scenes,
        &*repos.manuscripts,
    )
    .await?;
    Ok(Json(view))
}

/// Returns the router for story queries.
pub fn router() -> Router<AppState> {
    Router::new().route("/{guild_id}/context", get(story_context))
}
