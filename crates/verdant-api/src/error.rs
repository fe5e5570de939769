//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

/// API-level error with an HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
    Internal(verdant_core::Error),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    /// External provider failed (identification or generation).
    Upstream(String),
}

impl From<verdant_core::Error> for ApiError {
    fn from(err: verdant_core::Error) -> Self {
        match &err {
            verdant_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            verdant_core::Error::SpeciesNotFound(id) => {
                ApiError::NotFound(format!("Species not found: {}", id))
            }
            verdant_core::Error::PlantNotFound(id) => {
                ApiError::NotFound(format!("Plant not found: {}", id))
            }
            verdant_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            verdant_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            verdant_core::Error::Forbidden(msg) => ApiError::Forbidden(msg.clone()),
            verdant_core::Error::Identification(msg) | verdant_core::Error::Generation(msg) => {
                ApiError::Upstream(msg.clone())
            }
            _ => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let err: ApiError = verdant_core::Error::InvalidInput("empty body".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_identification_maps_to_upstream() {
        let err: ApiError = verdant_core::Error::Identification("503".to_string()).into();
        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[test]
    fn test_config_maps_to_internal() {
        let err: ApiError = verdant_core::Error::Config("missing key".to_string()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
