//! Validation helper functions for configuration types.

use crate::core::errors::{FeederError, Result};

/// Validate that a string value is not empty.
pub fn validate_non_empty(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(FeederError::config_field(
            format!("{} must not be empty", field),
            field,
        ));
    }
    Ok(())
}

/// Validate that a list is not empty and contains no empty entries.
pub fn validate_non_empty_entries(values: &[String], field: &str) -> Result<()> {
    if values.is_empty() {
        return Err(FeederError::config_field(
            format!("{} must contain at least one entry", field),
            field,
        ));
    }
    if let Some(index) = values.iter().position(String::is_empty) {
        return Err(FeederError::config_field(
            format!("{} entry {} must not be empty", field, index),
            field,
        ));
    }
    Ok(())
}

/// Validate that a value is a bare file name (no directory components).
pub fn validate_file_name(value: &str, field: &str) -> Result<()> {
    validate_non_empty(value, field)?;
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(FeederError::config_field(
            format!("{} must be a plain file name, got '{}'", field, value),
            field,
        ));
    }
    Ok(())
}

/// Validate that an optional u64 value, when present, is greater than zero.
pub fn validate_positive_u64(value: Option<u64>, field: &str) -> Result<()> {
    if value == Some(0) {
        return Err(FeederError::config_field(
            format!("{} must be greater than 0", field),
            field,
        ));
    }
    Ok(())
}
