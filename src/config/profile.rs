//! Jira profile configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// How a profile authenticates against its Jira instance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Basic Auth: email + API token (Cloud) or username + password (Server).
    #[default]
    Basic,
    /// Personal access token sent as a bearer token (Server/Data Center).
    Bearer,
    /// Cookie session acquired with username + password (Server).
    Session,
}

/// A Jira profile configuration.
///
/// Profiles store connection details for a Jira instance.
/// Secrets are stored separately in the OS keychain for security.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty and unique across all profiles.
    pub name: String,

    /// The Jira instance URL.
    ///
    /// Should be a valid HTTPS URL (e.g., "https://company.atlassian.net").
    pub url: String,

    /// The login: an email address on Cloud, a username on Server.
    ///
    /// Not used by bearer authentication.
    #[serde(alias = "email", default)]
    pub username: String,

    /// The authentication scheme.
    #[serde(default)]
    pub auth: AuthMethod,
}

impl Profile {
    /// Create a new profile using basic authentication.
    pub fn new(name: String, url: String, username: String) -> Self {
        Self {
            name,
            url,
            username,
            auth: AuthMethod::Basic,
        }
    }

    /// Set the authentication scheme.
    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    /// Whether the URL points at Jira Cloud.
    pub fn is_cloud(&self) -> bool {
        self.url
            .trim_end_matches('/')
            .ends_with(".atlassian.net")
    }

    /// Validate this profile.
    ///
    /// Checks that:
    /// - The name is non-empty and has no whitespace
    /// - The URL is non-empty and uses http(s)
    /// - A username is present unless bearer auth is used
    /// - Cloud profiles use an email address as username
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.url.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL cannot be empty",
                self.name
            )));
        }

        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL must start with http:// or https://",
                self.name
            )));
        }

        if self.auth == AuthMethod::Bearer {
            return Ok(());
        }

        if self.username.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': username cannot be empty",
                self.name
            )));
        }

        if self.is_cloud() && !self.username.contains('@') {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': Jira Cloud expects an email address, got '{}'",
                self.name, self.username
            )));
        }

        Ok(())
    }
}
