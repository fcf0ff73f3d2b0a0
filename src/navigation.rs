//! Navigation Module
//!
//! The redirect primitive shared by the API client and the route guard. The
//! hosting application decides how a navigation is carried out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Path of the login view
pub const LOGIN_PATH: &str = "/login";

/// How a redirect is performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedirectMode {
    /// Full reload of the target view, dropping all in-memory view state
    #[default]
    Reload,
    /// Client-side navigation inside the running application
    InApp,
}

impl fmt::Display for RedirectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectMode::Reload => f.write_str("reload"),
            RedirectMode::InApp => f.write_str("in-app"),
        }
    }
}

impl FromStr for RedirectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reload" | "hard" => Ok(RedirectMode::Reload),
            "in-app" | "inapp" | "soft" => Ok(RedirectMode::InApp),
            other => Err(format!("unknown redirect mode: {}", other)),
        }
    }
}

/// Receives navigation requests emitted by the core
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, mode: RedirectMode);
}

impl<F> Navigator for F
where
    F: Fn(&str, RedirectMode) + Send + Sync,
{
    fn navigate(&self, path: &str, mode: RedirectMode) {
        self(path, mode)
    }
}

/// Navigator that only logs, for headless hosts
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str, mode: RedirectMode) {
        tracing::info!("Navigating to {} ({})", path, mode);
    }
}
