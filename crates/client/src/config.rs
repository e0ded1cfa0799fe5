//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BEE_API_BASE_URL` - Backend API root (default: `http://localhost:8000/api`)
//! - `BEE_TOKEN_PATH` - File for persisted credentials (default: `.bee-commerce/tokens.json`)
//! - `BEE_REFRESH_PERIOD_SECS` - Proactive token renewal period (default: 240)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_TOKEN_PATH: &str = ".bee-commerce/tokens.json";
const DEFAULT_REFRESH_PERIOD_SECS: u64 = 240;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API root, e.g. `http://localhost:8000/api`.
    pub api_base_url: Url,
    /// Path of the JSON file holding persisted credentials.
    pub token_path: PathBuf,
    /// Period of the proactive refresh timer.
    pub refresh_period: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_env_or_default("BEE_API_BASE_URL", DEFAULT_BASE_URL)
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("BEE_API_BASE_URL".to_string(), e.to_string()))?;
        let token_path = PathBuf::from(get_env_or_default("BEE_TOKEN_PATH", DEFAULT_TOKEN_PATH));
        let refresh_period = match std::env::var("BEE_REFRESH_PERIOD_SECS") {
            Ok(value) => Duration::from_secs(value.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("BEE_REFRESH_PERIOD_SECS".to_string(), e.to_string())
            })?),
            Err(_) => Duration::from_secs(DEFAULT_REFRESH_PERIOD_SECS),
        };

        Ok(Self {
            api_base_url,
            token_path,
            refresh_period,
        })
    }

    /// Configuration pointing at an arbitrary base URL with defaults for the
    /// rest. Mostly useful for tests against a local mock backend.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: base_url
                .parse::<Url>()
                .map_err(|e| ConfigError::InvalidEnvVar("base_url".to_string(), e.to_string()))?,
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            refresh_period: Duration::from_secs(DEFAULT_REFRESH_PERIOD_SECS),
        })
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
