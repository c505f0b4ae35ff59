//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `COMANDA_API_BASE_URL` - Base URL of the backend REST API
//!   (default: `http://localhost:8080`)
//! - `COMANDA_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `COMANDA_SESSION_DIR` - Directory holding the persisted session
//!   (default: `$HOME/.comanda`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const SESSION_DIR_NAME: &str = ".comanda";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Dashboard application configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the backend REST API
    pub api_base_url: Url,
    /// Timeout applied to every request
    pub timeout: Duration,
    /// Directory holding the persisted session entries
    pub session_dir: PathBuf,
}

impl DashboardConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_env_or_default("COMANDA_API_BASE_URL", DEFAULT_API_BASE_URL)
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("COMANDA_API_BASE_URL".to_string(), e.to_string())
            })?;

        let timeout_secs = match std::env::var("COMANDA_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("COMANDA_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let session_dir = std::env::var("COMANDA_SESSION_DIR")
            .map_or_else(|_| default_session_dir(), PathBuf::from);

        Ok(Self {
            api_base_url,
            timeout: Duration::from_secs(timeout_secs),
            session_dir,
        })
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Session directory under the user's home, falling back to the working
/// directory when `HOME` is unset.
fn default_session_dir() -> PathBuf {
    std::env::var("HOME").map_or_else(
        |_| PathBuf::from(SESSION_DIR_NAME),
        |home| PathBuf::from(home).join(SESSION_DIR_NAME),
    )
}
