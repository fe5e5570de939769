//! # verdant-api
//!
//! HTTP API library for verdant: application state, authentication,
//! handlers, and the species profile reconciler service. The binary in
//! `main.rs` wires this router to a real database and live provider
//! backends; tests drive it with mocks.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, patch, post};
use axum::Router;

/// Build the API router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::health::health))
        .route("/api/v1/identify", post(handlers::identify::identify))
        .route(
            "/api/v1/identifications",
            get(handlers::identify::list_identifications),
        )
        .route("/api/v1/diagnose", post(handlers::diagnose::diagnose))
        .route(
            "/api/v1/plants",
            get(handlers::plants::list_plants).post(handlers::plants::create_plant),
        )
        .route(
            "/api/v1/plants/:id",
            get(handlers::plants::get_plant)
                .patch(handlers::plants::update_plant)
                .delete(handlers::plants::delete_plant),
        )
        .route(
            "/api/v1/plants/:id/journal",
            get(handlers::journal::list_journal).post(handlers::journal::create_journal_entry),
        )
        .route(
            "/api/v1/journal/:id",
            patch(handlers::journal::update_journal_entry)
                .delete(handlers::journal::delete_journal_entry),
        )
        .with_state(state)
}
