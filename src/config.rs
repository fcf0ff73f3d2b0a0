//! Configuration Module
//!
//! Environment-level settings for the API client.

use std::time::Duration;

use tracing::debug;

use crate::navigation::{RedirectMode, LOGIN_PATH};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Versioned prefix every backend path lives under
pub const API_PREFIX: [&str; 2] = ["api", "v1"];

pub const API_URL_VAR: &str = "CONNECT_API_URL";
pub const REDIRECT_MODE_VAR: &str = "CONNECT_REDIRECT_MODE";
pub const TIMEOUT_VAR: &str = "CONNECT_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://connect.example.com`
    pub api_origin: String,
    /// How the client redirects after an authorization failure
    pub redirect_mode: RedirectMode,
    pub login_path: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Defaults for local development
    pub fn new(api_origin: impl Into<String>) -> Self {
        Self {
            api_origin: api_origin.into(),
            redirect_mode: RedirectMode::default(),
            login_path: LOGIN_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset or blank values fall back
    /// to the defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_origin = get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        reqwest::Url::parse(&api_origin)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", api_origin, e)))?;

        let mut config = Self::new(api_origin);

        if let Some(mode) = get(REDIRECT_MODE_VAR) {
            config.redirect_mode = mode.parse().map_err(ConfigError::InvalidRedirectMode)?;
        }

        if let Some(secs) = get(TIMEOUT_VAR) {
            let secs = secs
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidTimeout(format!("{}: {}", secs, e)))?;
            config.timeout = Duration::from_secs(secs);
        }

        debug!(
            "Client config: origin={}, redirect_mode={}, timeout={:?}",
            config.api_origin, config.redirect_mode, config.timeout
        );
        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn default_user_agent() -> String {
    let host = whoami::fallible::hostname().unwrap_or_else(|_| "unknown-host".to_string());
    format!("connect-dashboard/{} ({})", env!("CARGO_PKG_VERSION"), host)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid redirect mode: {0}")]
    InvalidRedirectMode(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}
