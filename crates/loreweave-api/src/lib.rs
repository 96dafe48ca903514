//! Loreweave API — library half of the server binary.
//!
//! Exposes configuration, state, routes and the router builder so route
//! tests can drive the same app `main.rs` serves.

use axum::Router;

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

use crate::state::AppState;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/characters", routes::character::router())
        .nest("/api/v1/contributions", routes::contribution::router())
        .nest("/api/v1/stories", routes::story::router())
        .with_state(state)
}
