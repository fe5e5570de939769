//! OpenAI care-profile generation backend.
//!
//! Calls the chat completions endpoint with a strict JSON-schema response
//! format so the model can only answer with a [`CareProfile`]-shaped object.
//! The schema's example tokens are occasionally echoed back literally by the
//! model; the reconciler scrubs those before persisting.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use verdant_core::{CareProfile, CareProfileBackend, CareProfileRequest, Error, Result};

/// Default OpenAI API endpoint.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default care-profile generation model.
pub const DEFAULT_CARE_MODEL: &str = "gpt-4o-mini";

/// Default timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Source tag persisted as `profile_source` on generated rows.
pub const SOURCE_TAG: &str = "openai";

const SYSTEM_PROMPT: &str = "\
You are a plant-care coach creating concise, accurate care guidance for houseplants.
Write in a friendly, encouraging tone aimed at new plant owners.
Only respond with JSON that matches the provided schema.
When you are uncertain, make the safest, most common recommendation and note the caution.
Use Fahrenheit for temperature ranges and include Celsius conversions in parentheses.
Keep bullet/tip entries short (under 18 words). Avoid duplicate advice.";

/// Configuration for the OpenAI care-profile backend.
#[derive(Debug, Clone)]
pub struct OpenAICareConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (required for live calls).
    pub api_key: Option<String>,
    /// Model to use for care-profile generation.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAICareConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            model: DEFAULT_CARE_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OpenAICareConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string()),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            model: std::env::var("OPENAI_PLANT_MODEL")
                .unwrap_or_else(|_| DEFAULT_CARE_MODEL.to_string()),
            timeout_seconds: std::env::var("OPENAI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Strict JSON schema constraining the model's response to a care profile.
pub fn care_profile_json_schema() -> serde_json::Value {
    let aspect = json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["headline", "description"],
        "properties": {
            "headline": {"type": "string", "minLength": 1},
            "description": {"type": "string", "minLength": 1}
        }
    });

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "summary", "difficulty", "watering", "sunlight",
            "temperature", "humidity", "soil", "tips"
        ],
        "properties": {
            "summary": {"type": "string", "minLength": 1},
            "difficulty": {
                "type": "string",
                "enum": ["Easy", "Moderate", "Challenging"]
            },
            "watering": aspect,
            "sunlight": aspect,
            "temperature": {
                "type": "object",
                "additionalProperties": false,
                "required": ["rangeF", "description"],
                "properties": {
                    "rangeF": {"type": "string", "minLength": 1},
                    "description": {"type": "string", "minLength": 1}
                }
            },
            "humidity": aspect,
            "soil": {
                "type": "object",
                "additionalProperties": false,
                "required": ["type", "phRange", "mix"],
                "properties": {
                    "type": {"type": "string", "minLength": 1},
                    "phRange": {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["min", "max"],
                        "properties": {
                            "min": {"type": ["number", "null"]},
                            "max": {"type": ["number", "null"]}
                        }
                    },
                    "mix": {
                        "type": "array",
                        "items": {"type": "string", "minLength": 1},
                        "maxItems": 6
                    }
                }
            },
            "tips": {
                "type": "array",
                "items": {"type": "string", "minLength": 1},
                "maxItems": 6
            }
        }
    })
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorBody {
    message: String,
}

/// OpenAI care-profile generation backend.
pub struct OpenAICareBackend {
    client: Client,
    config: OpenAICareConfig,
}

impl OpenAICareBackend {
    /// Create a new OpenAI care backend with the given configuration.
    pub fn new(config: OpenAICareConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Generation(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            model = %config.model,
            "Initializing OpenAI care backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAICareConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAICareConfig {
        &self.config
    }

    fn user_prompt(request: &CareProfileRequest) -> Result<String> {
        let descriptor = serde_json::to_string_pretty(request)?;
        Ok(format!(
            "Generate a structured care profile for the following plant.\n\
             Return JSON only. When necessary, infer details from similar, \
             well-known houseplants.\n\nPlant input:\n{}",
            descriptor
        ))
    }
}

#[async_trait]
impl CareProfileBackend for OpenAICareBackend {
    async fn generate(&self, request: &CareProfileRequest) -> Result<CareProfile> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))?;

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "generate",
            model = %self.config.model,
            scientific_name = request.scientific_name.as_deref().unwrap_or(""),
            "Generating care profile"
        );

        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::user_prompt(request)?,
                },
            ],
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "PlantCareProfile",
                    "schema": care_profile_json_schema(),
                    "strict": true
                }
            }),
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<OpenAIErrorResponse>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Generation(format!(
                "OpenAI returned {}: {}",
                status, message
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::Generation("OpenAI did not return any content".to_string()))?;

        let profile: CareProfile = serde_json::from_str(content).map_err(|e| {
            Error::Generation(format!("Response did not match care-profile schema: {}", e))
        })?;

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "generate",
            difficulty = %profile.difficulty,
            tips = profile.tips.len(),
            "Care profile generated"
        );

        Ok(profile)
    }

    fn source_tag(&self) -> &str {
        SOURCE_TAG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenAICareConfig::default();
        assert_eq!(config.base_url, DEFAULT_OPENAI_URL);
        assert_eq!(config.model, DEFAULT_CARE_MODEL);
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_schema_requires_all_profile_fields() {
        let schema = care_profile_json_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        for field in [
            "summary",
            "difficulty",
            "watering",
            "sunlight",
            "temperature",
            "humidity",
            "soil",
            "tips",
        ] {
            assert!(required.contains(&field), "missing required {}", field);
        }
        assert_eq!(schema["additionalProperties"], serde_json::json!(false));
    }

    #[test]
    fn test_schema_constrains_difficulty_enum() {
        let schema = care_profile_json_schema();
        assert_eq!(
            schema["properties"]["difficulty"]["enum"],
            serde_json::json!(["Easy", "Moderate", "Challenging"])
        );
    }

    #[test]
    fn test_user_prompt_embeds_descriptors() {
        let request = CareProfileRequest {
            common_name: Some("Pothos".to_string()),
            scientific_name: Some("Epipremnum aureum".to_string()),
            family: Some("Araceae".to_string()),
            genus: Some("Epipremnum".to_string()),
        };
        let prompt = OpenAICareBackend::user_prompt(&request).unwrap();
        assert!(prompt.contains("Epipremnum aureum"));
        assert!(prompt.contains("Return JSON only"));
    }

    #[test]
    fn test_source_tag() {
        let backend = OpenAICareBackend::new(OpenAICareConfig::default()).unwrap();
        assert_eq!(backend.source_tag(), "openai");
    }

    #[tokio::test]
    async fn test_generate_without_api_key_is_config_error() {
        let backend = OpenAICareBackend::new(OpenAICareConfig::default()).unwrap();
        let err = backend
            .generate(&CareProfileRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
