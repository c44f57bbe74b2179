//! Configuration management.
//!
//! Profiles and settings live in a TOML file, by default
//! `<config_dir>/jira-rest/config.toml`:
//!
//! ```toml
//! [settings]
//! default_profile = "work"
//! timeout_secs = 30
//!
//! [[profiles]]
//! name = "work"
//! url = "https://company.atlassian.net"
//! username = "user@company.com"
//! auth = "basic"
//! ```
//!
//! Secrets are never written here; they live in the OS keyring under the
//! profile name.

mod profile;
mod settings;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use profile::{AuthMethod, Profile};
pub use settings::Settings;

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform configuration directory could not be determined.
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// The configuration directory could not be created.
    #[error("Failed to create configuration directory: {0}")]
    CreateDirError(#[source] std::io::Error),

    /// The configuration file could not be read.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[source] std::io::Error),

    /// The configuration file could not be written.
    #[error("Failed to write configuration file: {0}")]
    WriteError(#[source] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A value failed validation.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// No profile with the requested name exists.
    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The whole configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Client-wide settings.
    #[serde(default)]
    pub settings: Settings,
    /// Configured Jira instances.
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Config {
    /// The default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("jira-rest").join("config.toml"))
    }

    /// Load from the default path, or defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate a configuration file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        debug!(path = %path.display(), profiles = config.profiles.len(), "Loaded configuration");
        Ok(config)
    }

    /// Validate and write the configuration, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(ConfigError::WriteError)
    }

    /// Validate every profile, name uniqueness and the default profile.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !names.insert(profile.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }

        if let Some(default) = &self.settings.default_profile {
            if !names.contains(default.as_str()) {
                return Err(ConfigError::ProfileNotFound(default.clone()));
            }
        }

        Ok(())
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    /// The default profile: the configured one, else the only one.
    pub fn default_profile(&self) -> Result<&Profile> {
        match (&self.settings.default_profile, self.profiles.as_slice()) {
            (Some(name), _) => self.profile(name),
            (None, [only]) => Ok(only),
            (None, _) => Err(ConfigError::ValidationError(
                "no default profile configured".to_string(),
            )),
        }
    }
}
