//! Client-wide settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::transport::{DEFAULT_TIMEOUT_SECS, USER_AGENT};

/// Settings shared by every profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// The name of the default profile to use.
    pub default_profile: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header override.
    pub user_agent: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl Settings {
    /// The request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The User-Agent to send.
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(USER_AGENT)
    }
}
