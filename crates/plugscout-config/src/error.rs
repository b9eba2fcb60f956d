//! Configuration errors.

use std::io;

use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("cannot read config {path}: {source}")]
    ReadError {
        /// Path to the config file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("invalid TOML in {path}: {source}")]
    ParseError {
        /// Path to the config file that failed to parse.
        path: String,
        /// Underlying TOML parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("invalid {field}: {message}")]
    ValidationError {
        /// Field that failed validation.
        field: String,
        /// Validation failure description.
        message: String,
    },

    /// Could not determine home directory.
    #[error("home directory is unknown; pass --config or set HOME")]
    NoHomeDir,

    /// No Go workspace was configured or derivable.
    #[error("no Go workspace: set paths.gopath or GOPATH")]
    NoGopath,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
