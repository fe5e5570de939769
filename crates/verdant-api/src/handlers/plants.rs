//! Owned-plant CRUD handlers.
//!
//! Every route is authenticated and ownership-scoped: a plant that exists
//! but belongs to someone else yields 403, a missing plant 404.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use verdant_core::{CreatePlantRequest, Plant, PlantPatch, PlantRepository, SpeciesRepository};

use crate::auth::AuthUser;
use crate::handlers::double_option;
use crate::{ApiError, AppState};

const MAX_NICKNAME_CHARS: usize = 120;

/// Request body for saving a plant to the caller's collection.
#[derive(Debug, Deserialize)]
pub struct CreatePlantBody {
    pub species_id: Uuid,
    pub nickname: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update body. Null values clear the column; absent keys are
/// left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlantBody {
    #[serde(default, deserialize_with = "double_option")]
    pub nickname: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
}

/// Trim a nickname and enforce the length cap. A nickname that trims to
/// nothing is stored as absent.
fn validate_nickname(raw: &str) -> Result<Option<String>, ApiError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > MAX_NICKNAME_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Nickname must be at most {} characters",
            MAX_NICKNAME_CHARS
        )));
    }
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}

/// Fetch a plant and enforce that the caller owns it.
pub(crate) async fn load_owned_plant(
    state: &AppState,
    id: Uuid,
    user: &AuthUser,
) -> Result<Plant, ApiError> {
    let plant = state
        .db
        .plants
        .fetch(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Plant {} not found", id)))?;

    if plant.owner_id != user.id {
        return Err(ApiError::Forbidden(
            "Plant belongs to another user".to_string(),
        ));
    }
    Ok(plant)
}

pub async fn list_plants(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let plants = state.db.plants.list_for_owner(user.id).await?;
    Ok(Json(plants))
}

pub async fn create_plant(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreatePlantBody>,
) -> Result<impl IntoResponse, ApiError> {
    let nickname = match body.nickname.as_deref() {
        Some(raw) => validate_nickname(raw)?,
        None => None,
    };

    state
        .db
        .species
        .find_by_id(body.species_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Species {} not found", body.species_id))
        })?;

    let plant = state
        .db
        .plants
        .insert(CreatePlantRequest {
            owner_id: user.id,
            species_id: body.species_id,
            nickname,
            image_url: body.image_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(plant)))
}

pub async fn get_plant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    load_owned_plant(&state, id, &user).await?;

    let plant = state
        .db
        .plants
        .fetch_with_species(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Plant {} not found", id)))?;
    Ok(Json(plant))
}

pub async fn update_plant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePlantBody>,
) -> Result<impl IntoResponse, ApiError> {
    // Present-null clears the nickname; a trimmed-to-empty value does too.
    let nickname = match body.nickname {
        Some(Some(raw)) => Some(validate_nickname(&raw)?),
        Some(None) => Some(None),
        None => None,
    };

    load_owned_plant(&state, id, &user).await?;

    let patch = PlantPatch {
        nickname,
        image_url: body.image_url,
    };

    // An empty patch is a no-op, not an error.
    if patch.is_empty() {
        let plant = state
            .db
            .plants
            .fetch_with_species(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Plant {} not found", id)))?;
        return Ok(Json(plant));
    }

    let plant = state.db.plants.update(id, patch).await?;
    Ok(Json(plant))
}

pub async fn delete_plant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    load_owned_plant(&state, id, &user).await?;
    state.db.plants.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_body_distinguishes_null_from_absent() {
        let body: UpdatePlantBody = serde_json::from_str(r#"{"nickname": null}"#).unwrap();
        assert_eq!(body.nickname, Some(None));
        assert_eq!(body.image_url, None);

        let body: UpdatePlantBody =
            serde_json::from_str(r#"{"nickname": "Fernie"}"#).unwrap();
        assert_eq!(body.nickname, Some(Some("Fernie".to_string())));

        let body: UpdatePlantBody = serde_json::from_str("{}").unwrap();
        assert!(body.nickname.is_none() && body.image_url.is_none());
    }

    #[test]
    fn test_validate_nickname_trims_and_caps() {
        assert_eq!(
            validate_nickname("  Fernie  ").unwrap(),
            Some("Fernie".to_string())
        );
        assert_eq!(validate_nickname("   ").unwrap(), None);

        let at_cap = "x".repeat(MAX_NICKNAME_CHARS);
        assert_eq!(validate_nickname(&at_cap).unwrap(), Some(at_cap));

        let over_cap = "x".repeat(MAX_NICKNAME_CHARS + 1);
        assert!(matches!(
            validate_nickname(&over_cap),
            Err(ApiError::BadRequest(_))
        ));
    }
}
