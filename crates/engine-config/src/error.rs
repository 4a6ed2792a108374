use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating paging settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A duration string matched no known style or could not be parsed.
    #[error("'{value}' is not a valid duration: {reason}")]
    InvalidDuration { value: String, reason: String },

    /// A setting has a value outside its allowed range.
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// The settings file could not be read.
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for the expected shape.
    #[error("Failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid_value(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
