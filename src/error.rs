//! Crate-level error type.
//!
//! [`ApiError`] covers everything a [`JiraClient`](crate::JiraClient) call can
//! fail with. Code that also goes through configuration (for example
//! [`JiraClient::from_profile`](crate::JiraClient::from_profile)) returns this
//! aggregate instead.

use thiserror::Error;

use crate::api::error::{ApiError, ErrorKind};
use crate::config::ConfigError;

/// Any error the crate can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// IO errors (file system, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get a user-friendly message for display.
    ///
    /// Server-reported messages are kept as-is since they are usually the
    /// most specific explanation available.
    pub fn user_message(&self) -> String {
        match self {
            Error::Config(ConfigError::NoConfigDir) => {
                "Could not find configuration directory. Please check your system settings."
                    .to_string()
            }
            Error::Config(ConfigError::ParseError(_)) => {
                "Configuration file is invalid. Please check the file format.".to_string()
            }
            Error::Config(ConfigError::ProfileNotFound(name)) => {
                format!("Profile '{}' not found.", name)
            }
            Error::Config(e) => e.to_string(),
            Error::Api(ApiError::Keyring(_)) => {
                "Could not access secure storage. Please store the profile's token again."
                    .to_string()
            }
            Error::Api(e) if e.is_unauthorized() => format!(
                "Authentication failed. Please check your credentials. ({})",
                e
            ),
            Error::Api(e) => match e.kind() {
                ErrorKind::Transport => format!(
                    "Could not reach Jira. Please check your URL and network. ({})",
                    e
                ),
                _ => e.to_string(),
            },
            Error::Io(_) => "A file operation failed. Please check file permissions.".to_string(),
        }
    }

    /// The API error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            Error::Config(ConfigError::ProfileNotFound(_)) => {
                Some("Add the profile to config.toml or pick an existing one.")
            }
            Error::Api(ApiError::Keyring(_)) => {
                Some("Store the secret again with jira_rest::api::auth::store_token.")
            }
            Error::Api(e) if e.is_unauthorized() => {
                Some("Check your API token at https://id.atlassian.com/manage-profile/security/api-tokens")
            }
            _ => None,
        }
    }
}

/// Result type for crate-level operations.
pub type Result<T> = std::result::Result<T, Error>;
