//! Error types for the feeder-rs library.
//!
//! Almost every public operation in this crate is fail-soft: failures are turned
//! into diagnostics at the component boundary and never reach the caller. The
//! types here carry those failures between internal helpers (via `?`) up to that
//! boundary, and carry the few errors that are allowed to propagate (configuration
//! loading and caller misuse of the fetch helper).

use std::io;

use thiserror::Error;

/// Main result type for feeder operations.
pub type Result<T> = std::result::Result<T, FeederError>;

/// Error type for all feeder operations.
#[derive(Error, Debug)]
pub enum FeederError {
    /// I/O related errors (configuration file access)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data format being handled
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// HTTP transport and status errors
    #[error("HTTP error: {message}")]
    Http {
        /// Error description
        message: String,
        /// Request URL, when known
        url: Option<String>,
        /// Underlying transport error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Caller misuse: a required argument was absent
    #[error("Precondition violated: {message}")]
    Precondition {
        /// Error description
        message: String,
    },
}

impl FeederError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Whether this error signals caller misuse rather than an environmental failure.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }
}

impl From<serde_yaml::Error> for FeederError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<reqwest::Error> for FeederError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http {
            message: err.to_string(),
            url: err.url().map(ToString::to_string),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_error() {
        let err = FeederError::precondition("absent request");
        assert!(err.is_precondition());
        assert!(!FeederError::config_field("empty", "import.separator").is_precondition());
    }

    #[test]
    fn test_io_error_creation() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access denied");
        let err = FeederError::io("Failed to read config file: feeder.yml", io_err);

        if let FeederError::Io { message, source } = &err {
            assert_eq!(message, "Failed to read config file: feeder.yml");
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        } else {
            panic!("Expected Io error");
        }
        assert!(err.to_string().starts_with("I/O error:"));
    }

    #[test]
    fn test_config_field_error() {
        let err = FeederError::config_field("must not be empty", "import.separator");

        if let FeederError::Config { message, field } = err {
            assert_eq!(message, "must not be empty");
            assert_eq!(field, Some("import.separator".to_string()));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<i32>("invalid: yaml: content").unwrap_err();
        let err: FeederError = yaml_err.into();

        if let FeederError::Serialization { data_type, .. } = err {
            assert_eq!(data_type, Some("YAML".to_string()));
        } else {
            panic!("Expected Serialization error");
        }
    }

    #[test]
    fn test_error_display_formatting() {
        let err = FeederError::precondition("can't send a request to an absent URL");
        let display = format!("{}", err);
        assert!(display.contains("Precondition violated"));
        assert!(display.contains("absent URL"));
    }
}
