//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist
    #[error("Config file not found: {}\n\nHint: Create a flash.config.json file or drop --config", .0.display())]
    NotFound(PathBuf),

    /// The project root is missing or not a directory
    #[error("Project root is not a directory: {}", .0.display())]
    RootNotFound(PathBuf),

    /// A field failed extraction or validation
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(
        field: impl Into<String>,
        value: impl ToString,
        hint: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            hint: hint.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_message_carries_hint() {
        let err = ConfigError::invalid("port", 0, "Pick a port between 1 and 65535");
        let msg = err.to_string();
        assert!(msg.contains("Invalid value for 'port': 0"));
        assert!(msg.contains("Hint: Pick a port"));
    }

    #[test]
    fn not_found_mentions_path() {
        let err = ConfigError::NotFound(PathBuf::from("custom.json"));
        assert!(err.to_string().contains("custom.json"));
    }
}
