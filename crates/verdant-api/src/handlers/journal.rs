//! Journal entry handlers.
//!
//! Entries hang off a plant; ownership is always checked through the plant.
//! Listing is cursor-paginated on `created_at`, newest first.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use verdant_core::{
    CreateJournalRequest, JournalEntry, JournalPatch, JournalRepository, ListJournalRequest,
};

use crate::auth::AuthUser;
use crate::handlers::double_option;
use crate::handlers::plants::load_owned_plant;
use crate::{ApiError, AppState};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_BODY_CHARS: usize = 5000;

/// Trim an entry body and enforce the non-empty/length rules.
fn validate_body(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(
            "Journal entry body must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_BODY_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Journal entry body must be at most {} characters",
            MAX_BODY_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

/// Query parameters for listing a plant's journal.
#[derive(Debug, Deserialize)]
pub struct ListJournalQuery {
    pub limit: Option<i64>,
    /// RFC 3339 cursor from a previous page's `next_cursor`.
    pub before: Option<DateTime<Utc>>,
}

/// One page of journal entries.
#[derive(Debug, Serialize)]
pub struct JournalPageResponse {
    pub entries: Vec<JournalEntry>,
    pub next_cursor: Option<DateTime<Utc>>,
}

/// Request body for creating a journal entry.
#[derive(Debug, Deserialize)]
pub struct CreateJournalBody {
    pub body: String,
    pub photo_url: Option<String>,
}

/// Partial update body for a journal entry.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateJournalBody {
    pub body: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub photo_url: Option<Option<String>>,
}

pub async fn list_journal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(plant_id): Path<Uuid>,
    Query(query): Query<ListJournalQuery>,
) -> Result<impl IntoResponse, ApiError> {
    load_owned_plant(&state, plant_id, &user).await?;

    let page = state
        .db
        .journal
        .list(ListJournalRequest {
            plant_id,
            limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            before: query.before,
        })
        .await?;

    Ok(Json(JournalPageResponse {
        entries: page.entries,
        next_cursor: page.next_cursor,
    }))
}

pub async fn create_journal_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(plant_id): Path<Uuid>,
    Json(body): Json<CreateJournalBody>,
) -> Result<impl IntoResponse, ApiError> {
    let entry_body = validate_body(&body.body)?;

    load_owned_plant(&state, plant_id, &user).await?;

    let entry = state
        .db
        .journal
        .insert(CreateJournalRequest {
            plant_id,
            body: entry_body,
            photo_url: body.photo_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Fetch an entry and enforce that the caller owns its plant.
async fn load_owned_entry(
    state: &AppState,
    id: Uuid,
    user: &AuthUser,
) -> Result<JournalEntry, ApiError> {
    let (entry, owner_id) = state
        .db
        .journal
        .fetch_with_owner(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Journal entry {} not found", id)))?;

    if owner_id != user.id {
        return Err(ApiError::Forbidden(
            "Journal entry belongs to another user".to_string(),
        ));
    }
    Ok(entry)
}

pub async fn update_journal_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateJournalBody>,
) -> Result<impl IntoResponse, ApiError> {
    let entry_body = match body.body.as_deref() {
        Some(raw) => Some(validate_body(raw)?),
        None => None,
    };

    let existing = load_owned_entry(&state, id, &user).await?;

    let patch = JournalPatch {
        body: entry_body,
        photo_url: body.photo_url,
    };

    if patch.is_empty() {
        return Ok(Json(existing));
    }

    let entry = state.db.journal.update(id, patch).await?;
    Ok(Json(entry))
}

pub async fn delete_journal_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    load_owned_entry(&state, id, &user).await?;
    state.db.journal.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_body_photo_url_null_vs_absent() {
        let body: UpdateJournalBody = serde_json::from_str(r#"{"photo_url": null}"#).unwrap();
        assert_eq!(body.photo_url, Some(None));

        let body: UpdateJournalBody = serde_json::from_str(r#"{"body": "Repotted."}"#).unwrap();
        assert!(body.photo_url.is_none());
        assert_eq!(body.body.as_deref(), Some("Repotted."));
    }

    #[test]
    fn test_validate_body_trims_and_rejects_empty() {
        assert_eq!(validate_body("  Repotted today.  ").unwrap(), "Repotted today.");
        assert!(matches!(validate_body(""), Err(ApiError::BadRequest(_))));
        assert!(matches!(validate_body("   "), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_validate_body_caps_length() {
        let at_cap = "x".repeat(MAX_BODY_CHARS);
        assert_eq!(validate_body(&at_cap).unwrap(), at_cap);

        let over_cap = "x".repeat(MAX_BODY_CHARS + 1);
        assert!(matches!(
            validate_body(&over_cap),
            Err(ApiError::BadRequest(_))
        ));
    }
}
