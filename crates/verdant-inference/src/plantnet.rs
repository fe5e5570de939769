//! Pl@ntNet identification backend.
//!
//! Posts an image as multipart form data to the Pl@ntNet identify endpoint
//! and maps the ranked candidate list into an [`IdentificationResult`]: the
//! top candidate becomes the identified plant, candidates 2..=5 become the
//! alternatives, and the raw payload is kept verbatim for auditing.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use verdant_core::{
    AlternativeCandidate, Error, IdentificationBackend, IdentificationResult, IdentifiedPlant,
    Result,
};

/// Default Pl@ntNet API endpoint.
pub const DEFAULT_PLANTNET_URL: &str = "https://my-api.plantnet.org";

/// Default Pl@ntNet project (floras) to identify against.
pub const DEFAULT_PLANTNET_PROJECT: &str = "all";

/// Default timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Provider tag recorded on audit rows.
pub const PROVIDER_TAG: &str = "plantnet";

/// Configuration for the Pl@ntNet backend.
#[derive(Debug, Clone)]
pub struct PlantNetConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (required for live calls).
    pub api_key: Option<String>,
    /// Project/flora to identify against ("all", "k-world-flora", ...).
    pub project: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for PlantNetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PLANTNET_URL.to_string(),
            api_key: None,
            project: DEFAULT_PLANTNET_PROJECT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PlantNetConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("PLANTNET_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PLANTNET_URL.to_string()),
            api_key: std::env::var("PLANTNET_API_KEY").ok(),
            project: std::env::var("PLANTNET_PROJECT")
                .unwrap_or_else(|_| DEFAULT_PLANTNET_PROJECT.to_string()),
            timeout_seconds: std::env::var("PLANTNET_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// Wire shapes of the Pl@ntNet response.

#[derive(Debug, Deserialize)]
struct PlantnetResponse {
    #[serde(default)]
    results: Vec<PlantnetCandidate>,
}

#[derive(Debug, Deserialize)]
struct PlantnetCandidate {
    score: Option<f64>,
    species: PlantnetSpecies,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlantnetSpecies {
    scientific_name_without_author: Option<String>,
    genus: Option<PlantnetTaxon>,
    family: Option<PlantnetTaxon>,
    #[serde(default)]
    common_names: Vec<String>,
    bibliography: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlantnetTaxon {
    scientific_name_without_author: Option<String>,
}

fn to_alternative(candidate: &PlantnetCandidate) -> AlternativeCandidate {
    AlternativeCandidate {
        common_name: candidate.species.common_names.first().cloned(),
        scientific_name: candidate
            .species
            .scientific_name_without_author
            .clone()
            .or_else(|| {
                candidate
                    .species
                    .genus
                    .as_ref()
                    .and_then(|g| g.scientific_name_without_author.clone())
            }),
        confidence: candidate.score,
    }
}

fn to_identification(payload: serde_json::Value) -> Result<IdentificationResult> {
    let response: PlantnetResponse = serde_json::from_value(payload.clone())
        .map_err(|e| Error::Identification(format!("Failed to parse response: {}", e)))?;

    let top = response.results.first();
    let plant = match top {
        Some(candidate) => IdentifiedPlant {
            common_name: candidate.species.common_names.first().cloned(),
            scientific_name: candidate.species.scientific_name_without_author.clone(),
            family: candidate
                .species
                .family
                .as_ref()
                .and_then(|f| f.scientific_name_without_author.clone()),
            genus: candidate
                .species
                .genus
                .as_ref()
                .and_then(|g| g.scientific_name_without_author.clone()),
            confidence: candidate.score,
            notes: candidate.species.bibliography.clone(),
        },
        None => IdentifiedPlant {
            common_name: None,
            scientific_name: None,
            family: None,
            genus: None,
            confidence: None,
            notes: None,
        },
    };

    let alternatives = response
        .results
        .iter()
        .skip(1)
        .take(4)
        .map(to_alternative)
        .collect();

    Ok(IdentificationResult {
        provider: PROVIDER_TAG.to_string(),
        plant,
        alternatives,
        raw: payload,
    })
}

/// Pl@ntNet identification backend.
pub struct PlantNetBackend {
    client: Client,
    config: PlantNetConfig,
}

impl PlantNetBackend {
    /// Create a new Pl@ntNet backend with the given configuration.
    pub fn new(config: PlantNetConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Identification(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "plantnet",
            project = %config.project,
            "Initializing Pl@ntNet backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(PlantNetConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &PlantNetConfig {
        &self.config
    }
}

#[async_trait]
impl IdentificationBackend for PlantNetBackend {
    async fn identify(&self, image_data: &[u8], mime_type: &str) -> Result<IdentificationResult> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("PLANTNET_API_KEY is not set".to_string()))?;

        debug!(
            subsystem = "inference",
            component = "plantnet",
            op = "identify",
            image_bytes = image_data.len(),
            "Submitting image for identification"
        );

        let image_part = Part::bytes(image_data.to_vec())
            .file_name("upload.jpg")
            .mime_str(mime_type)
            .map_err(|e| Error::InvalidInput(format!("Invalid image MIME type: {}", e)))?;

        let form = Form::new().part("images", image_part).text("organs", "leaf");

        let url = format!(
            "{}/v2/identify/{}?api-key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.project,
            api_key
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Identification(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Identification(format!(
                "PlantNet returned {}: {}",
                status, body
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Identification(format!("Failed to read response: {}", e)))?;

        let result = to_identification(payload)?;

        debug!(
            subsystem = "inference",
            component = "plantnet",
            op = "identify",
            scientific_name = result.plant.scientific_name.as_deref().unwrap_or(""),
            alternatives = result.alternatives.len(),
            "Identification complete"
        );

        Ok(result)
    }

    fn provider(&self) -> &str {
        PROVIDER_TAG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> serde_json::Value {
        json!({
            "results": [
                {
                    "score": 0.91,
                    "species": {
                        "scientificNameWithoutAuthor": "Epipremnum aureum",
                        "genus": {"scientificNameWithoutAuthor": "Epipremnum"},
                        "family": {"scientificNameWithoutAuthor": "Araceae"},
                        "commonNames": ["Pothos", "Devil's ivy"],
                        "bibliography": "Linden & André"
                    }
                },
                {
                    "score": 0.05,
                    "species": {
                        "scientificNameWithoutAuthor": "Epipremnum pinnatum",
                        "genus": {"scientificNameWithoutAuthor": "Epipremnum"},
                        "family": {"scientificNameWithoutAuthor": "Araceae"},
                        "commonNames": ["Centipede tongavine"]
                    }
                },
                {
                    "score": 0.01,
                    "species": {
                        "genus": {"scientificNameWithoutAuthor": "Scindapsus"},
                        "commonNames": []
                    }
                }
            ]
        })
    }

    #[test]
    fn test_default_config() {
        let config = PlantNetConfig::default();
        assert_eq!(config.base_url, DEFAULT_PLANTNET_URL);
        assert_eq!(config.project, DEFAULT_PLANTNET_PROJECT);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_to_identification_maps_top_candidate() {
        let result = to_identification(sample_payload()).unwrap();
        assert_eq!(result.provider, "plantnet");
        assert_eq!(result.plant.common_name.as_deref(), Some("Pothos"));
        assert_eq!(
            result.plant.scientific_name.as_deref(),
            Some("Epipremnum aureum")
        );
        assert_eq!(result.plant.family.as_deref(), Some("Araceae"));
        assert_eq!(result.plant.genus.as_deref(), Some("Epipremnum"));
        assert_eq!(result.plant.confidence, Some(0.91));
        assert_eq!(result.plant.notes.as_deref(), Some("Linden & André"));
    }

    #[test]
    fn test_to_identification_maps_alternatives() {
        let result = to_identification(sample_payload()).unwrap();
        assert_eq!(result.alternatives.len(), 2);
        assert_eq!(
            result.alternatives[0].scientific_name.as_deref(),
            Some("Epipremnum pinnatum")
        );
        // Falls back to the genus name when the species name is missing.
        assert_eq!(
            result.alternatives[1].scientific_name.as_deref(),
            Some("Scindapsus")
        );
        assert!(result.alternatives[1].common_name.is_none());
    }

    #[test]
    fn test_to_identification_keeps_raw_payload() {
        let payload = sample_payload();
        let result = to_identification(payload.clone()).unwrap();
        assert_eq!(result.raw, payload);
    }

    #[test]
    fn test_to_identification_empty_results() {
        let result = to_identification(json!({"results": []})).unwrap();
        assert!(result.plant.scientific_name.is_none());
        assert!(result.alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_identify_without_api_key_is_config_error() {
        let backend = PlantNetBackend::new(PlantNetConfig::default()).unwrap();
        let err = backend.identify(&[0u8; 4], "image/jpeg").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
