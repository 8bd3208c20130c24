//! Configuration structs

mod app_config;

pub use app_config::{ApiConfig, AppConfig, ConfigError, GatewayConfig, SessionConfig};
