//! The plugin fetcher contract.

use std::fmt;

use crate::error::PluginResult;
use crate::plugin::{Plugin, PluginKind};

/// A discovery strategy producing plugins of one kind.
///
/// Implementations are stateless between calls: every call rescans its
/// source and returns fresh values.
pub trait PluginFetcher: Send + Sync {
    /// Kind of every plugin this fetcher emits.
    fn kind(&self) -> PluginKind;

    /// Discover plugins, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns the first error met while scanning; partial results are
    /// discarded.
    fn fetch_plugins(&self) -> PluginResult<Vec<Plugin>>;

    /// Short human-readable description of the scanned source.
    fn describe(&self) -> String {
        self.kind().to_string()
    }
}

impl fmt::Debug for dyn PluginFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginFetcher")
            .field("kind", &self.kind())
            .field("source", &self.describe())
            .finish()
    }
}

/// Adapts a closure into a [`PluginFetcher`].
pub struct FnFetcher<F> {
    kind: PluginKind,
    label: String,
    fetch: F,
}

impl<F> FnFetcher<F>
where
    F: Fn() -> PluginResult<Vec<Plugin>> + Send + Sync,
{
    /// Wrap `fetch` as a fetcher for `kind`.
    pub fn new(kind: PluginKind, label: impl Into<String>, fetch: F) -> Self {
        Self {
            kind,
            label: label.into(),
            fetch,
        }
    }
}

impl<F> PluginFetcher for FnFetcher<F>
where
    F: Fn() -> PluginResult<Vec<Plugin>> + Send + Sync,
{
    fn kind(&self) -> PluginKind {
        self.kind
    }

    fn fetch_plugins(&self) -> PluginResult<Vec<Plugin>> {
        (self.fetch)()
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
