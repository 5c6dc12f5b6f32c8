//! Configuration error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    ParseFailed { path: String, message: String },

    #[error("invalid config value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    #[must_use]
    pub fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ReadFailed { .. } => "config.read_failed",
            Self::ParseFailed { .. } => "config.parse_failed",
            Self::InvalidValue { .. } => "config.invalid_value",
        };
        Some(code)
    }
}
