//! Error types for ec-core

use thiserror::Error;

/// Core error type for Echelon
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config {path}: {source}")]
    ConfigParseError {
        path: String,
        source: serde_yaml::Error,
    },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Version token does not follow `YYYY-MM-DD-HH-MM-xxxxx`
    #[error("[E004] Invalid migration version '{value}': expected YYYY-MM-DD-HH-MM-xxxxx")]
    InvalidVersion { value: String },

    /// E005: Migration name contains characters outside `[a-z0-9_]`
    #[error("[E005] Invalid migration name '{value}': only letters, digits and '_' are allowed")]
    InvalidMigrationName { value: String },

    /// E006: IO error with file path context
    #[error("[E006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
