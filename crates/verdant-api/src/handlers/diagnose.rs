//! Plant health diagnosis handler.
//!
//! Diagnosis currently runs against a canned mock model while a real
//! vision-based diagnosis provider is evaluated. The endpoint shape is
//! stable so clients can integrate against it today.

use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::{ApiError, AppState};

const DIAGNOSIS_PROVIDER: &str = "mock";

/// Request body for diagnosing a plant photo.
#[derive(Debug, Deserialize)]
pub struct DiagnoseRequest {
    /// Base64-encoded image bytes.
    pub image_data: String,
    /// Free-text description of observed symptoms.
    pub notes: Option<String>,
}

/// One suspected condition with model confidence.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisCondition {
    pub name: String,
    pub confidence: f64,
    pub description: String,
    pub recommendations: Vec<String>,
}

/// Response for one diagnosis.
#[derive(Debug, Serialize)]
pub struct DiagnoseResponse {
    pub provider: String,
    pub healthy: bool,
    pub conditions: Vec<DiagnosisCondition>,
}

fn mock_diagnosis() -> DiagnoseResponse {
    DiagnoseResponse {
        provider: DIAGNOSIS_PROVIDER.to_string(),
        healthy: false,
        conditions: vec![
            DiagnosisCondition {
                name: "Overwatering".to_string(),
                confidence: 0.67,
                description: "Yellowing lower leaves and soft stems suggest the roots are \
                              sitting in wet soil."
                    .to_string(),
                recommendations: vec![
                    "Let the top two inches of soil dry out before watering again.".to_string(),
                    "Check that the pot drains freely.".to_string(),
                ],
            },
            DiagnosisCondition {
                name: "Low Light Stress".to_string(),
                confidence: 0.52,
                description: "Pale new growth and stretching toward the window indicate \
                              insufficient light."
                    .to_string(),
                recommendations: vec![
                    "Move the plant closer to a bright window with indirect sun.".to_string(),
                ],
            },
        ],
    }
}

pub async fn diagnose(
    State(_state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<DiagnoseRequest>,
) -> Result<Json<DiagnoseResponse>, ApiError> {
    let image_bytes = base64::engine::general_purpose::STANDARD
        .decode(&req.image_data)
        .map_err(|e| ApiError::BadRequest(format!("Invalid base64 image data: {}", e)))?;

    if image_bytes.is_empty() {
        return Err(ApiError::BadRequest("Image data is empty".to_string()));
    }

    tracing::debug!(
        subsystem = "api",
        component = "diagnose",
        image_bytes = image_bytes.len(),
        has_notes = req.notes.is_some(),
        "Serving mock diagnosis"
    );

    Ok(Json(mock_diagnosis()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_diagnosis_shape() {
        let d = mock_diagnosis();
        assert_eq!(d.provider, "mock");
        assert_eq!(d.conditions.len(), 2);
        assert_eq!(d.conditions[0].name, "Overwatering");
        assert_eq!(d.conditions[0].confidence, 0.67);
        assert_eq!(d.conditions[1].name, "Low Light Stress");
        assert_eq!(d.conditions[1].confidence, 0.52);
    }
}
