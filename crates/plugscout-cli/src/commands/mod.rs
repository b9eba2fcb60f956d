//! Subcommand implementations.

pub(crate) mod config;
pub(crate) mod deps;
pub(crate) mod kinds;
pub(crate) mod list;
