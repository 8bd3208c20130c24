//! Application configuration structs
//!
//! Loads configuration from environment variables, with documented defaults
//! for local development.

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub gateway: GatewayConfig,
    pub session: SessionConfig,
}

/// REST API origin
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
}

/// WebSocket gateway origin
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
}

/// Session client tuning (reconnection behaviour)
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_cap_delay_ms")]
    pub cap_delay_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            cap_delay_ms: default_cap_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            gateway: GatewayConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

// Default value functions
fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:8000".to_string()
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_cap_delay_ms() -> u64 {
    10_000
}

fn default_max_attempts() -> u32 {
    5
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// All variables are optional; documented defaults target a local
    /// backend on port 8000.
    ///
    /// # Errors
    /// Returns an error if a numeric variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            api: ApiConfig {
                base_url: env::var("API_BASE_URL").unwrap_or_else(|_| default_api_base_url()),
            },
            gateway: GatewayConfig {
                ws_url: env::var("WS_BASE_URL").unwrap_or_else(|_| default_ws_url()),
            },
            session: SessionConfig {
                base_delay_ms: parse_var("SESSION_BASE_DELAY_MS", default_base_delay_ms)?,
                cap_delay_ms: parse_var("SESSION_CAP_DELAY_MS", default_cap_delay_ms)?,
                max_attempts: parse_var("SESSION_MAX_ATTEMPTS", default_max_attempts)?,
            },
        })
    }
}

/// Parse a numeric environment variable, falling back to a default when unset
fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    default: fn() -> T,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
