//! Health check handler.

use axum::extract::State;
use axum::Json;

use crate::{ApiError, AppState};

/// Liveness/readiness probe. Verifies database connectivity.
pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    sqlx::query("SELECT 1")
        .execute(&state.db.pool)
        .await
        .map_err(verdant_core::Error::from)?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
