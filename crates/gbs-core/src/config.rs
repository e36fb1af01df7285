//! Configuration for git-branch-status
//!
//! A single [`Config`] value is built once at startup (optional TOML file,
//! then command-line overrides) and shared by reference with every component
//! that needs it.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{BranchStatusError, Result};

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Repository path (never read from the config file)
    #[serde(skip)]
    pub path: PathBuf,

    /// Fetch `origin` at the start of every refresh tick
    pub fetch_origin: bool,

    /// Credential-store item used when a fetch needs authentication
    pub keychain_item: Option<String>,

    /// Seconds between refresh ticks
    pub update_interval_secs: u64,

    /// Milliseconds between input/resize polls
    pub poll_interval_ms: u64,

    /// Move `origin/<head>` directly after HEAD in the listing
    pub promote_upstream: bool,
}

fn default_update_interval_secs() -> u64 {
    10
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            fetch_origin: false,
            keychain_item: None,
            update_interval_secs: default_update_interval_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            promote_upstream: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            BranchStatusError::Config(format!(
                "Failed to read config file {}: {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            BranchStatusError::Config(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `config_path` when given, otherwise use defaults
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject values that would stall the session loops
    pub fn validate(&self) -> Result<()> {
        if self.update_interval_secs == 0 {
            return Err(BranchStatusError::Config(
                "update_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(BranchStatusError::Config(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Keychain item, treating an empty name as unset
    pub fn keychain_item(&self) -> Option<&str> {
        self.keychain_item.as_deref().filter(|s| !s.is_empty())
    }
}
