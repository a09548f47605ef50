//! Configuration Layer Management
//!
//! Layers are applied in order: built-in defaults, then the configuration file
//! (explicit `--config`, else `.feeder.yml`/`.feeder.yaml` in the working
//! directory), then command line overrides.

use std::path::{Path, PathBuf};

use feeder_rs::core::config::{FeederConfig, FetchConfig, ImportConfig};

use crate::cli::args::{FetchArgs, ImportArgs};

/// Configuration files picked up without `--config`.
const IMPLICIT_CONFIG_FILES: [&str; 2] = [".feeder.yml", ".feeder.yaml"];

/// Trait for merging configuration layers
pub trait ConfigMerge<T> {
    /// Merge another configuration into this one, with the other taking priority
    fn merge_with(&mut self, other: T);
}

/// Convert CLI arguments to partial configuration overrides
pub trait FromCliArgs<T> {
    /// Create a partial configuration from CLI arguments
    fn from_cli_args(args: &T) -> Self;
}

/// Import settings given on the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportOverrides {
    pub separator: Option<String>,
    pub extensions: Option<Vec<String>>,
    pub sort_entries: Option<bool>,
}

impl FromCliArgs<ImportArgs> for ImportOverrides {
    fn from_cli_args(args: &ImportArgs) -> Self {
        Self {
            separator: args.separator.as_deref().map(unescape_separator),
            extensions: (!args.extensions.is_empty()).then(|| args.extensions.clone()),
            sort_entries: args.sort.then_some(true),
        }
    }
}

impl ConfigMerge<ImportOverrides> for ImportConfig {
    fn merge_with(&mut self, other: ImportOverrides) {
        if let Some(separator) = other.separator {
            self.separator = separator;
        }
        if let Some(extensions) = other.extensions {
            self.extensions = extensions;
        }
        if let Some(sort_entries) = other.sort_entries {
            self.sort_entries = sort_entries;
        }
    }
}

/// Fetch settings given on the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchOverrides {
    pub timeout_secs: Option<u64>,
}

impl FromCliArgs<FetchArgs> for FetchOverrides {
    fn from_cli_args(args: &FetchArgs) -> Self {
        Self {
            timeout_secs: args.timeout,
        }
    }
}

impl ConfigMerge<FetchOverrides> for FetchConfig {
    fn merge_with(&mut self, other: FetchOverrides) {
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }
}

/// Turn the escapes a shell makes awkward to type (`\t`, `\\`) into characters.
pub fn unescape_separator(raw: &str) -> String {
    let mut separator = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            separator.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => separator.push('\t'),
            Some('\\') => separator.push('\\'),
            Some(other) => {
                separator.push('\\');
                separator.push(other);
            }
            None => separator.push('\\'),
        }
    }
    separator
}

/// Locate the configuration file to use, if any.
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        IMPLICIT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    })
}

/// Load and validate the configuration file layer.
pub fn load_configuration(explicit: Option<&Path>) -> anyhow::Result<FeederConfig> {
    let config = match find_config_file(explicit) {
        Some(path) => FeederConfig::from_yaml_file(&path).map_err(|e| {
            anyhow::anyhow!(
                "Failed to load configuration from {}: {}",
                path.display(),
                e
            )
        })?,
        None => FeederConfig::default(),
    };

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

/// Apply import overrides on top of the loaded configuration.
pub fn build_import_config(
    mut config: FeederConfig,
    args: &ImportArgs,
) -> anyhow::Result<FeederConfig> {
    config
        .import
        .merge_with(ImportOverrides::from_cli_args(args));
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid import options: {}", e))?;
    Ok(config)
}

/// Apply fetch overrides on top of the loaded configuration.
pub fn build_fetch_config(
    mut config: FeederConfig,
    args: &FetchArgs,
) -> anyhow::Result<FeederConfig> {
    config.fetch.merge_with(FetchOverrides::from_cli_args(args));
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid fetch options: {}", e))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::OutputFormat;
    use tempfile::TempDir;

    fn import_args() -> ImportArgs {
        ImportArgs {
            paths: vec![PathBuf::from("decks")],
            separator: None,
            extensions: Vec::new(),
            sort: false,
            dump: None,
            format: OutputFormat::Plain,
            quiet: false,
            strict: false,
        }
    }

    #[test]
    fn test_unescape_separator() {
        assert_eq!(unescape_separator("\\t"), "\t");
        assert_eq!(unescape_separator(";"), ";");
        assert_eq!(unescape_separator("\\\\"), "\\");
        assert_eq!(unescape_separator("a\\b"), "a\\b");
        assert_eq!(unescape_separator("x\\"), "x\\");
    }

    #[test]
    fn test_import_overrides_replace_only_given_values() {
        let mut args = import_args();
        args.separator = Some("\\t".to_string());
        args.sort = true;

        let config = build_import_config(FeederConfig::default(), &args).unwrap();

        assert_eq!(config.import.separator, "\t");
        assert!(config.import.sort_entries);
        assert_eq!(config.import.extensions, ImportConfig::default().extensions);
    }

    #[test]
    fn test_empty_separator_override_is_rejected() {
        let mut args = import_args();
        args.separator = Some(String::new());

        assert!(build_import_config(FeederConfig::default(), &args).is_err());
    }

    #[test]
    fn test_fetch_timeout_override() {
        let args = FetchArgs {
            url: "http://localhost/".to_string(),
            expect: None,
            timeout: Some(5),
        };

        let config = build_fetch_config(FeederConfig::default(), &args).unwrap();
        assert_eq!(config.fetch.timeout_secs, Some(5));
    }

    #[test]
    fn test_explicit_config_file_is_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.yml");
        std::fs::write(&path, "import:\n  separator: \"|\"\n  sort_entries: true\n").unwrap();

        let config = load_configuration(Some(&path)).unwrap();
        assert_eq!(config.import.separator, "|");
        assert!(config.import.sort_entries);
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yml");
        std::fs::write(&path, "dump:\n  fallback_file_name: \"a/b\"\n").unwrap();

        assert!(load_configuration(Some(&path)).is_err());
    }
}
