//! Routes for submitting contributions.
//!
//! Every ordinary pipeline outcome is a JSON body tagged by `status`; the
//! HTTP status mirrors it so clients can branch without parsing.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use loreweave_character::application::command_handlers::handle_open_story;
use loreweave_synthesis::domain::commands::SubmitContribution;
use loreweave_synthesis::domain::outcome::ContributionOutcome;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct SubmitContributionRequest {
    /// Tenant whose story is extended.
    pub guild_id: String,
    /// Submitting user.
    pub user_id: String,
    /// Proposed action.
    pub action: String,
}

/// HTTP status for an outcome.
#[must_use]
pub fn status_for(outcome: &ContributionOutcome) -> StatusCode {
    match outcome {
        ContributionOutcome::Accepted(_) => StatusCode::OK,
        ContributionOutcome::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        ContributionOutcome::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ContributionOutcome::Locked => StatusCode::LOCKED,
    }
}

/// POST /
#[instrument(skip(state, request), fields(guild_id = %request.guild_id, user_id = %request.user_id))]
async fn submit_contribution(
    State(state): State<AppState>,
    Json(request): Json<SubmitContributionRequest>,
) -> Result<(StatusCode, Json<ContributionOutcome>), ApiError> {
    let story = handle_open_story(
        &request.guild_id,
        state.clock.as_ref(),
        &*state.repositories.stories,
    )
    .await?;

    let command = SubmitContribution {
        correlation_id: Uuid::new_v4(),
        story_id: story.id,
        user_id: request.user_id,
        action: request.action,
    };

    info!(correlation_id = %command.correlation_id, story_id = %story.id, "handling submit_contribution command");

    let outcome = state
        .pipeline
        .submit(&command, state.synthesis_context())
        .await?;

    Ok((status_for(&outcome), Json(outcome)))
}

/// Returns the router for contributions.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_contribution))
}
