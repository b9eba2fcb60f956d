//! Plugin discovery and dependency fetching for a Caddy build tree.
//!
//! Plugins are found in two places of a Go workspace:
//!
//! - [`DirectiveScanner`]: `http` directives listed in the framework's Go
//!   source, each paired with a one-word package comment
//! - [`ProviderScanner`]: `dns` providers, one per subdirectory of the
//!   provider collection
//!
//! [`ManifestScanner`] reads the same `http` plugins from an explicit TOML
//! manifest instead of source comments. All scanners implement
//! [`PluginFetcher`] and are collected per [`PluginKind`] in a
//! [`FetcherRegistry`].
//!
//! [`DependencyFetcher`] fetches the framework and clones the provider
//! collection, running both concurrently and reporting every failure.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod deps;
pub mod directives;
pub mod error;
pub mod fetcher;
pub mod manifest;
pub mod plugin;
pub mod providers;
pub mod registry;

pub use deps::{
    CommandError, CommandRunner, CommandSpec, DependencyError, DependencyFetcher,
    DependencySettings, PrerequisiteState, ProcessRunner,
};
pub use directives::{DirectiveScanner, scan_directives};
pub use error::{PluginError, PluginResult};
pub use fetcher::{FnFetcher, PluginFetcher};
pub use manifest::{DirectiveManifest, ManifestEntry, ManifestScanner};
pub use plugin::{Plugin, PluginKind};
pub use providers::ProviderScanner;
pub use registry::{DirectiveSource, DiscoverySettings, FetcherRegistry, FetcherRegistryBuilder};
