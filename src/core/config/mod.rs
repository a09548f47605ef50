//! Configuration types and management for feeder-rs.
//!
//! Every section has serde defaults, so a partial YAML file only needs to name the
//! values it overrides.

pub mod validation;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{FeederError, Result};

pub use validation::{
    validate_file_name, validate_non_empty, validate_non_empty_entries, validate_positive_u64,
};

/// Fallback file name used when a dump target turns out to be a directory.
pub const DEFAULT_DUMP_FILE_NAME: &str = "mtg_feeder.dump";

/// Main configuration for the feeder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeederConfig {
    /// Item list import settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Dump settings
    #[serde(default)]
    pub dump: DumpConfig,

    /// Fetch helper settings
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl FeederConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            FeederError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            FeederError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        self.import.validate()?;
        self.dump.validate()?;
        self.fetch.validate()?;
        Ok(())
    }
}

/// Item list import configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Separator between an item and its quantity
    #[serde(default = "ImportConfig::default_separator")]
    pub separator: String,

    /// File extensions selected when importing a directory (case-insensitive)
    #[serde(default = "ImportConfig::default_extensions")]
    pub extensions: Vec<String>,

    /// Read directory entries in file name order instead of file system order
    #[serde(default)]
    pub sort_entries: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            separator: Self::default_separator(),
            extensions: Self::default_extensions(),
            sort_entries: false,
        }
    }
}

impl ImportConfig {
    fn default_separator() -> String {
        ";".to_string()
    }

    fn default_extensions() -> Vec<String> {
        vec!["txt".to_string(), "tsv".to_string()]
    }

    /// Validate import configuration
    pub fn validate(&self) -> Result<()> {
        validate_non_empty(&self.separator, "import.separator")?;
        validate_non_empty_entries(&self.extensions, "import.extensions")?;
        Ok(())
    }
}

/// Dump configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpConfig {
    /// File created inside a directory given as dump target
    #[serde(default = "DumpConfig::default_fallback_file_name")]
    pub fallback_file_name: String,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            fallback_file_name: Self::default_fallback_file_name(),
        }
    }
}

impl DumpConfig {
    fn default_fallback_file_name() -> String {
        DEFAULT_DUMP_FILE_NAME.to_string()
    }

    /// Validate dump configuration
    pub fn validate(&self) -> Result<()> {
        validate_file_name(&self.fallback_file_name, "dump.fallback_file_name")
    }
}

/// Fetch helper configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds; no timeout when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// User agent sent with every request
    #[serde(default = "FetchConfig::default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: Self::default_user_agent(),
        }
    }
}

impl FetchConfig {
    fn default_user_agent() -> String {
        concat!("feeder/", env!("CARGO_PKG_VERSION")).to_string()
    }

    /// Configured timeout as a duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Validate fetch configuration
    pub fn validate(&self) -> Result<()> {
        validate_positive_u64(self.timeout_secs, "fetch.timeout_secs")?;
        validate_non_empty(&self.user_agent, "fetch.user_agent")?;
        Ok(())
    }
}
