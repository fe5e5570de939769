//! Mock backends for deterministic testing.
//!
//! Provide fixed identification results and care profiles, record every
//! call for assertion, and can be configured to fail. Enabled for this
//! crate's own tests and for consumers via the `mock` feature.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use verdant_core::{
    AlternativeCandidate, CareAspect, CareProfile, CareProfileBackend, CareProfileRequest,
    CareDifficulty, Error, IdentificationBackend, IdentificationResult, IdentifiedPlant, PhRange,
    Result, SoilGuidance, TemperatureGuidance,
};

/// Build a complete, valid care profile for tests.
pub fn sample_care_profile() -> CareProfile {
    CareProfile {
        summary: "A forgiving trailing vine that tolerates neglect.".to_string(),
        difficulty: CareDifficulty::Easy,
        watering: CareAspect {
            headline: "Every 1-2 weeks".to_string(),
            description: "Water when the top inch of soil is dry.".to_string(),
        },
        sunlight: CareAspect {
            headline: "Bright indirect".to_string(),
            description: "Tolerates low light; avoid harsh direct sun.".to_string(),
        },
        temperature: TemperatureGuidance {
            range_f: "65-85°F (18-29°C)".to_string(),
            description: "Keep above 55°F; avoid cold drafts.".to_string(),
        },
        humidity: CareAspect {
            headline: "Average".to_string(),
            description: "Ordinary room humidity is fine.".to_string(),
        },
        soil: SoilGuidance {
            soil_type: "Well-draining potting mix".to_string(),
            ph_range: PhRange {
                min: Some(6.1),
                max: Some(6.8),
            },
            mix: vec!["potting soil".to_string(), "perlite".to_string()],
        },
        tips: vec![
            "Trim leggy vines to encourage fullness.".to_string(),
            "Wipe leaves monthly to keep pores clear.".to_string(),
        ],
    }
}

/// Build an identification result for tests.
pub fn sample_identification(scientific_name: Option<&str>) -> IdentificationResult {
    IdentificationResult {
        provider: "plantnet".to_string(),
        plant: IdentifiedPlant {
            common_name: Some("Pothos".to_string()),
            scientific_name: scientific_name.map(String::from),
            family: Some("Araceae".to_string()),
            genus: Some("Epipremnum".to_string()),
            confidence: Some(0.91),
            notes: None,
        },
        alternatives: vec![AlternativeCandidate {
            common_name: Some("Centipede tongavine".to_string()),
            scientific_name: Some("Epipremnum pinnatum".to_string()),
            confidence: Some(0.05),
        }],
        raw: serde_json::json!({"results": []}),
    }
}

/// Mock care-profile backend with call logging.
#[derive(Clone)]
pub struct MockCareProfileBackend {
    profile: Arc<CareProfile>,
    fail_with: Arc<Option<String>>,
    calls: Arc<Mutex<Vec<CareProfileRequest>>>,
}

impl Default for MockCareProfileBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCareProfileBackend {
    /// Create a mock returning [`sample_care_profile`].
    pub fn new() -> Self {
        Self {
            profile: Arc::new(sample_care_profile()),
            fail_with: Arc::new(None),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Return the given profile from every call.
    pub fn with_profile(mut self, profile: CareProfile) -> Self {
        self.profile = Arc::new(profile);
        self
    }

    /// Fail every call with a generation error carrying this message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Arc::new(Some(message.into()));
        self
    }

    /// Number of generate calls observed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All logged generate requests.
    pub fn calls(&self) -> Vec<CareProfileRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CareProfileBackend for MockCareProfileBackend {
    async fn generate(&self, request: &CareProfileRequest) -> Result<CareProfile> {
        self.calls.lock().unwrap().push(request.clone());
        if let Some(message) = self.fail_with.as_ref() {
            return Err(Error::Generation(message.clone()));
        }
        Ok((*self.profile).clone())
    }

    fn source_tag(&self) -> &str {
        "openai"
    }
}

/// Mock identification backend with call logging.
#[derive(Clone)]
pub struct MockIdentificationBackend {
    result: Arc<IdentificationResult>,
    fail_with: Arc<Option<String>>,
    calls: Arc<Mutex<usize>>,
}

impl Default for MockIdentificationBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIdentificationBackend {
    /// Create a mock returning [`sample_identification`] for Pothos.
    pub fn new() -> Self {
        Self {
            result: Arc::new(sample_identification(Some("Epipremnum aureum"))),
            fail_with: Arc::new(None),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Return the given result from every call.
    pub fn with_result(mut self, result: IdentificationResult) -> Self {
        self.result = Arc::new(result);
        self
    }

    /// Fail every call with an identification error carrying this message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Arc::new(Some(message.into()));
        self
    }

    /// Number of identify calls observed.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl IdentificationBackend for MockIdentificationBackend {
    async fn identify(&self, _image_data: &[u8], _mime_type: &str) -> Result<IdentificationResult> {
        *self.calls.lock().unwrap() += 1;
        if let Some(message) = self.fail_with.as_ref() {
            return Err(Error::Identification(message.clone()));
        }
        Ok((*self.result).clone())
    }

    fn provider(&self) -> &str {
        "plantnet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_care_backend_counts_calls() {
        let backend = MockCareProfileBackend::new();
        assert_eq!(backend.call_count(), 0);

        let profile = backend
            .generate(&CareProfileRequest::default())
            .await
            .unwrap();
        assert_eq!(profile.difficulty, CareDifficulty::Easy);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_care_backend_failure() {
        let backend = MockCareProfileBackend::new().with_failure("boom");
        let err = backend
            .generate(&CareProfileRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_identification_backend() {
        let backend = MockIdentificationBackend::new();
        let result = backend.identify(&[1, 2, 3], "image/jpeg").await.unwrap();
        assert_eq!(
            result.plant.scientific_name.as_deref(),
            Some("Epipremnum aureum")
        );
        assert_eq!(backend.call_count(), 1);
    }
}
