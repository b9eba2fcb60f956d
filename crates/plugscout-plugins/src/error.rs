//! Plugin discovery error types.

use std::path::PathBuf;

use crate::plugin::PluginKind;

/// Errors from plugin discovery.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A file or directory could not be opened or read.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The source file is not syntactically valid Go.
    #[error("syntax error in {} at {line}:{column}", path.display())]
    Syntax {
        /// Source file path.
        path: PathBuf,
        /// 1-based line of the first error node.
        line: usize,
        /// 1-based column of the first error node.
        column: usize,
    },

    /// The directive declaration is missing or has an unexpected shape.
    #[error("parsing error: {message}")]
    Shape {
        /// What was expected and what was found.
        message: String,
    },

    /// A directive literal could not be decoded as a quoted string.
    #[error("cannot unquote {literal}: {message}")]
    Unquote {
        /// Raw literal text as written in the source.
        literal: String,
        /// Decode failure reason.
        message: String,
    },

    /// The directive manifest could not be read or is invalid.
    #[error("manifest error in {}: {message}", path.display())]
    Manifest {
        /// Path to the manifest file.
        path: PathBuf,
        /// Parse or validation message.
        message: String,
    },

    /// The tree-sitter grammar could not be loaded.
    #[error("failed to load Go grammar: {0}")]
    Language(String),

    /// A plugin was constructed with an empty field.
    #[error("invalid plugin: {0}")]
    InvalidPlugin(String),

    /// No fetcher is registered for the requested kind.
    #[error("unknown plugin kind: {0}")]
    UnknownKind(String),

    /// A fetcher returned a plugin tagged with a different kind.
    #[error("fetcher for {expected} produced a {actual} plugin")]
    KindMismatch {
        /// Kind the fetcher is registered under.
        expected: PluginKind,
        /// Kind found on the emitted plugin.
        actual: PluginKind,
    },

    /// A fetcher for this kind is already registered.
    #[error("fetcher already registered for kind: {0}")]
    AlreadyRegistered(PluginKind),
}

impl PluginError {
    /// Wrap an I/O error with the path it concerns.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a shape error.
    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }
}

/// Result type for plugin discovery.
pub type PluginResult<T> = Result<T, PluginError>;
