//! Core data models for verdant.
//!
//! These types are shared across all verdant crates and represent the
//! core domain entities: species care knowledge, identification results,
//! owned plants, and journal entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// =============================================================================
// SPECIES TYPES
// =============================================================================

/// Care difficulty rating produced by the profile generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CareDifficulty {
    Easy,
    Moderate,
    Challenging,
}

impl CareDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            CareDifficulty::Easy => "Easy",
            CareDifficulty::Moderate => "Moderate",
            CareDifficulty::Challenging => "Challenging",
        }
    }
}

impl std::fmt::Display for CareDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable per-species entity holding identity and care-profile data.
///
/// The legacy field pairs (`water_needs`/`watering`, `light_needs`/`sunlight`,
/// `temperature`/`temperature_range`, `soil`/`soil_type`) are both written on
/// every profile generation; older display surfaces read the legacy names.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpeciesRecord {
    pub id: Uuid,
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
    pub family: Option<String>,
    pub origin: Option<String>,
    pub about: Option<String>,

    // Legacy care fields (display compatibility)
    pub water_needs: Option<String>,
    pub light_needs: Option<String>,
    pub soil: Option<String>,
    pub humidity: Option<String>,
    pub temperature: Option<String>,

    // Structured care fields
    pub care_summary: Option<String>,
    pub care_difficulty: Option<String>,
    pub watering: Option<String>,
    pub sunlight: Option<String>,
    pub temperature_range: Option<String>,
    pub temperature_notes: Option<String>,
    pub soil_type: Option<String>,
    pub soil_ph_min: Option<f64>,
    pub soil_ph_max: Option<f64>,
    pub soil_mix: Option<Vec<String>>,
    pub care_tips: Option<Vec<String>>,

    // Provenance
    pub profile_generated_at: Option<DateTime<Utc>>,
    pub profile_source: Option<String>,
}

/// Request to insert a bare species row (care fields null).
#[derive(Debug, Clone)]
pub struct NewSpecies {
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub family: Option<String>,
}

/// Typed partial update for a species row.
///
/// Only `Some` fields are written. Fields that must be settable to SQL NULL
/// use `Option<Option<...>>` so present-null is distinguished from absent.
#[derive(Debug, Clone, Default)]
pub struct SpeciesPatch {
    pub care_summary: Option<String>,
    pub care_difficulty: Option<CareDifficulty>,
    pub watering: Option<String>,
    pub water_needs: Option<String>,
    pub sunlight: Option<String>,
    pub light_needs: Option<String>,
    pub temperature_range: Option<String>,
    pub temperature_notes: Option<String>,
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub soil_type: Option<String>,
    pub soil: Option<Option<String>>,
    pub soil_ph_min: Option<Option<f64>>,
    pub soil_ph_max: Option<Option<f64>>,
    pub soil_mix: Option<Option<Vec<String>>>,
    pub care_tips: Option<Option<Vec<String>>>,
    pub profile_generated_at: Option<DateTime<Utc>>,
    pub profile_source: Option<String>,
}

/// Compact species view embedded in plant responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpeciesSummary {
    pub id: Uuid,
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
}

// =============================================================================
// IDENTIFICATION TYPES
// =============================================================================

/// Top identification candidate descriptors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifiedPlant {
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub confidence: Option<f64>,
    pub notes: Option<String>,
}

/// Lower-ranked identification candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeCandidate {
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
    pub confidence: Option<f64>,
}

/// Structured result of one identification call.
///
/// Ephemeral: produced by the identification backend and consumed read-only
/// by the profile reconciler; the identify handler persists an audit row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentificationResult {
    pub provider: String,
    pub plant: IdentifiedPlant,
    pub alternatives: Vec<AlternativeCandidate>,
    /// Raw provider payload, kept verbatim for auditing.
    pub raw: JsonValue,
}

/// Persisted audit row for one identify call.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlantIdentification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub provider_confidence: Option<f64>,
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub notes: Option<String>,
    pub alternatives: JsonValue,
    pub provider_payload: JsonValue,
    pub species_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// CARE PROFILE TYPES (generator output)
// =============================================================================

/// Headline/description pair used by several care aspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareAspect {
    pub headline: String,
    pub description: String,
}

/// Temperature guidance. `range_f` is a display string such as
/// "65-85°F (18-29°C)".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureGuidance {
    pub range_f: String,
    pub description: String,
}

/// Numeric pH range, both ends nullable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Soil guidance: substrate type, pH range, and mix ingredients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilGuidance {
    #[serde(rename = "type")]
    pub soil_type: String,
    #[serde(rename = "phRange")]
    pub ph_range: PhRange,
    pub mix: Vec<String>,
}

/// Structured care profile as returned by the generation backend.
///
/// Exists only for the duration of one reconciliation call; the reconciler
/// sanitizes it and merges it into the species row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareProfile {
    pub summary: String,
    pub difficulty: CareDifficulty,
    pub watering: CareAspect,
    pub sunlight: CareAspect,
    pub temperature: TemperatureGuidance,
    pub humidity: CareAspect,
    pub soil: SoilGuidance,
    pub tips: Vec<String>,
}

/// Taxonomic descriptors sent to the profile generator.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareProfileRequest {
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
}

impl CareProfileRequest {
    /// Build a generator request from the freshest identification descriptors.
    pub fn from_identification(result: &IdentificationResult) -> Self {
        Self {
            common_name: result.plant.common_name.clone(),
            scientific_name: result.plant.scientific_name.clone(),
            family: result.plant.family.clone(),
            genus: result.plant.genus.clone(),
        }
    }
}

// =============================================================================
// PLANT TYPES
// =============================================================================

/// An owned plant: a species instance tracked by one user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Plant {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub species_id: Uuid,
    pub nickname: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Plant with its species summary embedded, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantWithSpecies {
    pub id: Uuid,
    pub nickname: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub species: SpeciesSummary,
}

// =============================================================================
// JOURNAL TYPES
// =============================================================================

/// One free-text/photo journal entry attached to a plant.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub body: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
