//! Fetcher registry.
//!
//! Maps each [`PluginKind`] to the fetcher that discovers it. The registry
//! is assembled once through [`FetcherRegistryBuilder`] and read-only
//! afterwards.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::directives::{DEFAULT_DECLARATION, DirectiveScanner};
use crate::error::{PluginError, PluginResult};
use crate::fetcher::PluginFetcher;
use crate::manifest::ManifestScanner;
use crate::plugin::{Plugin, PluginKind};
use crate::providers::{DEFAULT_PACKAGE_ROOT, ProviderScanner};

/// Where `http` directives are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveSource {
    /// Comment-annotated declaration in a Go source file.
    GoSource {
        /// Go source file.
        path: PathBuf,
        /// Top-level declaration holding the directive list.
        declaration: String,
    },
    /// Versioned TOML manifest.
    Manifest {
        /// Manifest file.
        path: PathBuf,
    },
}

/// Inputs of the standard registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySettings {
    /// Source of `http` plugins.
    pub directives: DirectiveSource,
    /// Directory holding one subdirectory per DNS provider.
    pub providers_dir: PathBuf,
    /// Import path of the provider directory.
    pub providers_package: String,
}

impl DiscoverySettings {
    /// Conventional layout under a Go source root (`$GOPATH/src`).
    #[must_use]
    pub fn for_source_root(source_root: impl Into<PathBuf>) -> Self {
        let source_root = source_root.into();
        Self {
            directives: DirectiveSource::GoSource {
                path: source_root.join("github.com/mholt/caddy/caddyhttp/httpserver/plugin.go"),
                declaration: DEFAULT_DECLARATION.to_string(),
            },
            providers_dir: source_root.join(DEFAULT_PACKAGE_ROOT),
            providers_package: DEFAULT_PACKAGE_ROOT.to_string(),
        }
    }
}

/// Immutable mapping from kind to fetcher.
#[derive(Debug, Default)]
pub struct FetcherRegistry {
    fetchers: BTreeMap<PluginKind, Box<dyn PluginFetcher>>,
}

impl FetcherRegistry {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> FetcherRegistryBuilder {
        FetcherRegistryBuilder::default()
    }

    /// Registry with one fetcher per kind, configured from `settings`.
    #[must_use]
    pub fn standard(settings: &DiscoverySettings) -> Self {
        let http: Box<dyn PluginFetcher> = match &settings.directives {
            DirectiveSource::GoSource { path, declaration } => {
                Box::new(DirectiveScanner::new(path).with_declaration(declaration.as_str()))
            },
            DirectiveSource::Manifest { path } => Box::new(ManifestScanner::new(path)),
        };
        let dns: Box<dyn PluginFetcher> = Box::new(ProviderScanner::new(
            &settings.providers_dir,
            settings.providers_package.as_str(),
        ));

        let mut fetchers = BTreeMap::new();
        fetchers.insert(PluginKind::Http, http);
        fetchers.insert(PluginKind::Dns, dns);
        debug!(kinds = fetchers.len(), "Built standard fetcher registry");
        Self { fetchers }
    }

    /// Fetcher registered for `kind`.
    #[must_use]
    pub fn get(&self, kind: PluginKind) -> Option<&dyn PluginFetcher> {
        self.fetchers.get(&kind).map(|fetcher| &**fetcher)
    }

    /// Registered kinds in stable order.
    #[must_use]
    pub fn kinds(&self) -> Vec<PluginKind> {
        self.fetchers.keys().copied().collect()
    }

    /// Number of registered fetchers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fetchers.len()
    }

    /// Whether no fetcher is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }

    /// Run the fetcher for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownKind`] if nothing is registered for
    /// `kind`, [`PluginError::KindMismatch`] if the fetcher emits a plugin of
    /// another kind, and any error of the fetcher itself.
    pub fn fetch_plugins(&self, kind: PluginKind) -> PluginResult<Vec<Plugin>> {
        let fetcher = self
            .get(kind)
            .ok_or_else(|| PluginError::UnknownKind(kind.to_string()))?;
        let plugins = fetcher.fetch_plugins()?;
        if let Some(stray) = plugins.iter().find(|p| p.kind() != kind) {
            return Err(PluginError::KindMismatch {
                expected: kind,
                actual: stray.kind(),
            });
        }
        info!(kind = %kind, count = plugins.len(), "Fetched plugins");
        Ok(plugins)
    }
}

/// Builder for [`FetcherRegistry`].
#[derive(Debug, Default)]
pub struct FetcherRegistryBuilder {
    fetchers: BTreeMap<PluginKind, Box<dyn PluginFetcher>>,
}

impl FetcherRegistryBuilder {
    /// Register a fetcher under its own kind.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::AlreadyRegistered`] if the kind is taken.
    pub fn register(mut self, fetcher: Box<dyn PluginFetcher>) -> PluginResult<Self> {
        let kind = fetcher.kind();
        if self.fetchers.contains_key(&kind) {
            return Err(PluginError::AlreadyRegistered(kind));
        }
        self.fetchers.insert(kind, fetcher);
        Ok(self)
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> FetcherRegistry {
        FetcherRegistry {
            fetchers: self.fetchers,
        }
    }
}
