//! Plant identification handler.
//!
//! Accepts a base64-encoded photo, runs the identification backend, then
//! reconciles the species care profile and records an audit row. Profile
//! reconciliation and auditing are best-effort: their failures are logged
//! and the identification still succeeds.

use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

use verdant_core::{
    AlternativeCandidate, CreateIdentificationRequest, IdentificationRepository, IdentifiedPlant,
    SpeciesRecord,
};

use crate::auth::AuthUser;
use crate::{ApiError, AppState};

const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Request body for identifying a plant photo.
#[derive(Debug, Deserialize)]
pub struct IdentifyRequest {
    /// Base64-encoded image bytes.
    pub image_data: String,
    /// MIME type of the image. Defaults to "image/jpeg".
    pub mime_type: Option<String>,
}

/// Response for one identification.
#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
    pub provider: String,
    pub plant: IdentifiedPlant,
    pub alternatives: Vec<AlternativeCandidate>,
    /// Species record with care profile, when one could be ensured.
    pub species: Option<SpeciesRecord>,
}

pub async fn identify(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<IdentifyRequest>,
) -> Result<Json<IdentifyResponse>, ApiError> {
    let image_bytes = base64::engine::general_purpose::STANDARD
        .decode(&req.image_data)
        .map_err(|e| ApiError::BadRequest(format!("Invalid base64 image data: {}", e)))?;

    if image_bytes.is_empty() {
        return Err(ApiError::BadRequest("Image data is empty".to_string()));
    }

    let mime_type = req.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE);
    let result = state.identifier.identify(&image_bytes, mime_type).await?;

    // Identification stands on its own; a missing profile can be filled in
    // on a later call.
    let species = match state.profiles.ensure_species_profile(&result).await {
        Ok(species) => species,
        Err(e) => {
            warn!(
                subsystem = "api",
                component = "identify",
                error = %e,
                "Profile reconciliation failed, returning identification without species"
            );
            None
        }
    };

    let audit = CreateIdentificationRequest {
        user_id: user.id,
        result: result.clone(),
        species_id: species.as_ref().map(|s| s.id),
    };
    if let Err(e) = state.db.identifications.insert(audit).await {
        warn!(
            subsystem = "api",
            component = "identify",
            user_id = %user.id,
            error = %e,
            "Failed to record identification audit row"
        );
    }

    Ok(Json(IdentifyResponse {
        provider: result.provider,
        plant: result.plant,
        alternatives: result.alternatives,
        species,
    }))
}

/// List the caller's identification history, newest first.
pub async fn list_identifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<verdant_core::PlantIdentification>>, ApiError> {
    let rows = state.db.identifications.list_for_user(user.id, 50).await?;
    Ok(Json(rows))
}
