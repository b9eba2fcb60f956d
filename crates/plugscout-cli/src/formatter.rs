//! Output format selection.

use clap::ValueEnum;

/// How commands print their results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Colored tables for terminals.
    #[default]
    Pretty,
    /// JSON on stdout.
    Json,
}
