//! Server configuration from environment variables.

use verdant_core::{Error, Result};
use verdant_db::PoolConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
/// Uploads are base64-encoded JSON; 15 MB covers phone camera photos.
const DEFAULT_BODY_LIMIT_BYTES: usize = 15 * 1024 * 1024;

/// Top-level server configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Base URL of the external auth provider (Supabase-compatible).
    pub auth_base_url: String,
    pub allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,
    pub pool: PoolConfig,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// `DATABASE_URL` and `AUTH_BASE_URL` are required; everything else has
    /// a default. `ALLOWED_ORIGINS` is a comma-separated list.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| Error::Config("DATABASE_URL is not set".to_string()))?;
        let auth_base_url = std::env::var("AUTH_BASE_URL")
            .map_err(|_| Error::Config("AUTH_BASE_URL is not set".to_string()))?;

        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let allowed_origins =
            parse_origins(&std::env::var("ALLOWED_ORIGINS").unwrap_or_default());

        let body_limit_bytes = std::env::var("BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BODY_LIMIT_BYTES);

        Ok(Self {
            host,
            port,
            database_url,
            auth_base_url,
            allowed_origins,
            body_limit_bytes,
            pool: PoolConfig::default(),
        })
    }
}

/// Split a comma-separated origin list, dropping empty segments.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert!(parse_origins("").is_empty());
        assert_eq!(
            parse_origins("http://localhost:5173, https://verdant.app,"),
            vec!["http://localhost:5173", "https://verdant.app"]
        );
    }
}
