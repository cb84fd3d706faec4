//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:4173"];

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// The API key may be absent: the server still starts, and every news request
/// answers with a configuration error until a key is provided.
#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub allowed_origins: Vec<String>,
    pub upstream_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("log_level", &self.log_level)
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "<redacted>"))
            .field("news_api_url", &self.news_api_url)
            .field("allowed_origins", &self.allowed_origins)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let host = lookup("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let host = host
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_HOST".to_string(), e.to_string()))?;
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), e.to_string()))?,
            None => DEFAULT_PORT,
        };
        let bind_address = SocketAddr::new(host, port);

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Upstream Settings ---
        let news_api_key = lookup("NEWS_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let news_api_url = lookup("NEWS_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_NEWS_API_URL.to_string());
        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| {
                ConfigError::InvalidValue("UPSTREAM_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => Duration::from_secs(10),
        };

        // --- CORS Allow-list ---
        let mut allowed_origins: Vec<String> = match lookup("ALLOWED_ORIGINS") {
            Some(raw) => split_list(&raw),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };
        if let Some(frontend) = lookup("FRONTEND_URL").filter(|url| !url.trim().is_empty()) {
            let frontend = frontend.trim().to_string();
            if !allowed_origins.contains(&frontend) {
                allowed_origins.push(frontend);
            }
        }
        // Credentialed CORS cannot answer with a wildcard origin.
        if allowed_origins.iter().any(|origin| origin == "*") {
            return Err(ConfigError::InvalidValue(
                "ALLOWED_ORIGINS".to_string(),
                "'*' cannot be used; list the front-end origins explicitly".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            log_level,
            news_api_key,
            news_api_url,
            allowed_origins,
            upstream_timeout,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
