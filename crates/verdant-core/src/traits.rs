//! Core traits for verdant abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability. The Postgres
//! repositories live in verdant-db; the HTTP provider backends live in
//! verdant-inference.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// SPECIES REPOSITORY
// =============================================================================

/// Repository for species records keyed by scientific name.
///
/// `insert` does not return the created row; callers re-fetch by name to
/// obtain the store-assigned identity. Errors are never swallowed here.
#[async_trait]
pub trait SpeciesRepository: Send + Sync {
    /// Look up a species by exact scientific-name match.
    async fn find_by_scientific_name(&self, name: &str) -> Result<Option<SpeciesRecord>>;

    /// Fetch a species by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SpeciesRecord>>;

    /// Insert a bare species row. Conflict on `scientific_name` is a no-op.
    async fn insert(&self, species: NewSpecies) -> Result<()>;

    /// Apply a partial update to a species row.
    async fn update(&self, id: Uuid, patch: SpeciesPatch) -> Result<()>;
}

// =============================================================================
// IDENTIFICATION AUDIT REPOSITORY
// =============================================================================

/// Request for persisting one identify call.
#[derive(Debug, Clone)]
pub struct CreateIdentificationRequest {
    pub user_id: Uuid,
    pub result: IdentificationResult,
    pub species_id: Option<Uuid>,
}

/// Repository for per-call identification audit rows.
#[async_trait]
pub trait IdentificationRepository: Send + Sync {
    /// Insert an audit row and return it.
    async fn insert(&self, req: CreateIdentificationRequest) -> Result<PlantIdentification>;

    /// List a user's identification history, newest first.
    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<PlantIdentification>>;
}

// =============================================================================
// PLANT REPOSITORY
// =============================================================================

/// Request for saving an owned plant.
#[derive(Debug, Clone)]
pub struct CreatePlantRequest {
    pub owner_id: Uuid,
    pub species_id: Uuid,
    pub nickname: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update for an owned plant. Present-null clears the column.
#[derive(Debug, Clone, Default)]
pub struct PlantPatch {
    pub nickname: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
}

impl PlantPatch {
    /// Whether the patch carries no changes.
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.image_url.is_none()
    }
}

/// Repository for user-owned plants.
#[async_trait]
pub trait PlantRepository: Send + Sync {
    /// Insert a plant and return it with the species summary embedded.
    async fn insert(&self, req: CreatePlantRequest) -> Result<PlantWithSpecies>;

    /// Fetch a plant row regardless of owner (handlers enforce ownership).
    async fn fetch(&self, id: Uuid) -> Result<Option<Plant>>;

    /// Fetch a plant with its species summary.
    async fn fetch_with_species(&self, id: Uuid) -> Result<Option<PlantWithSpecies>>;

    /// List all plants owned by a user, newest first.
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<PlantWithSpecies>>;

    /// Apply a partial update and return the updated plant.
    async fn update(&self, id: Uuid, patch: PlantPatch) -> Result<PlantWithSpecies>;

    /// Delete a plant (journal entries cascade).
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// JOURNAL REPOSITORY
// =============================================================================

/// Request for listing a plant's journal entries with cursor pagination.
#[derive(Debug, Clone)]
pub struct ListJournalRequest {
    pub plant_id: Uuid,
    /// Clamped to 1..=50 by the repository.
    pub limit: i64,
    /// Exclusive upper bound on `created_at` (cursor from a prior page).
    pub before: Option<DateTime<Utc>>,
}

/// One page of journal entries, newest first.
#[derive(Debug, Clone)]
pub struct JournalPage {
    pub entries: Vec<JournalEntry>,
    /// Cursor for the next page; `None` when this page is the last.
    pub next_cursor: Option<DateTime<Utc>>,
}

/// Request for creating a journal entry.
#[derive(Debug, Clone)]
pub struct CreateJournalRequest {
    pub plant_id: Uuid,
    pub body: String,
    pub photo_url: Option<String>,
}

/// Partial update for a journal entry.
#[derive(Debug, Clone, Default)]
pub struct JournalPatch {
    pub body: Option<String>,
    pub photo_url: Option<Option<String>>,
}

impl JournalPatch {
    pub fn is_empty(&self) -> bool {
        self.body.is_none() && self.photo_url.is_none()
    }
}

/// Repository for plant journal entries.
#[async_trait]
pub trait JournalRepository: Send + Sync {
    /// List entries newest-first with a `before` timestamp cursor.
    async fn list(&self, req: ListJournalRequest) -> Result<JournalPage>;

    /// Insert an entry and return it.
    async fn insert(&self, req: CreateJournalRequest) -> Result<JournalEntry>;

    /// Fetch an entry together with the owning plant's owner id.
    async fn fetch_with_owner(&self, id: Uuid) -> Result<Option<(JournalEntry, Uuid)>>;

    /// Apply a partial update and return the updated entry.
    async fn update(&self, id: Uuid, patch: JournalPatch) -> Result<JournalEntry>;

    /// Delete an entry.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// PROVIDER BACKENDS
// =============================================================================

/// Backend that turns an image into a structured identification result.
#[async_trait]
pub trait IdentificationBackend: Send + Sync {
    /// Identify the plant in the given image bytes.
    async fn identify(&self, image_data: &[u8], mime_type: &str) -> Result<IdentificationResult>;

    /// Provider tag recorded on audit rows (e.g. "plantnet").
    fn provider(&self) -> &str;
}

/// Backend that turns taxonomic descriptors into a structured care profile.
#[async_trait]
pub trait CareProfileBackend: Send + Sync {
    /// Generate a care profile for the described plant.
    async fn generate(&self, request: &CareProfileRequest) -> Result<CareProfile>;

    /// Source tag persisted as `profile_source` (e.g. "openai").
    fn source_tag(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_patch_is_empty() {
        assert!(PlantPatch::default().is_empty());
        assert!(!PlantPatch {
            nickname: Some(Some("Fernie".to_string())),
            ..Default::default()
        }
        .is_empty());
        // Present-null counts as a change.
        assert!(!PlantPatch {
            image_url: Some(None),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_journal_patch_is_empty() {
        assert!(JournalPatch::default().is_empty());
        assert!(!JournalPatch {
            body: Some("Repotted today.".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
