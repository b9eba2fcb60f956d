//! Explicit directive manifest.
//!
//! An alternative to the comment convention of the framework source: each
//! directive plugin is listed with its package in a versioned TOML file.
//!
//! ```toml
//! version = 1
//!
//! [[directive]]
//! name = "realip"
//! package = "github.com/captncraig/caddy-realip"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PluginError, PluginResult};
use crate::fetcher::PluginFetcher;
use crate::plugin::{Plugin, PluginKind};

/// Manifest format version understood by this crate.
pub const MANIFEST_VERSION: u32 = 1;

/// Parsed directive manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveManifest {
    /// Format version; must equal [`MANIFEST_VERSION`].
    pub version: u32,
    /// Listed directives, in file order.
    #[serde(default, rename = "directive")]
    pub directives: Vec<ManifestEntry>,
}

/// One `[[directive]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Directive name.
    pub name: String,
    /// Package implementing the directive.
    pub package: String,
}

impl DirectiveManifest {
    /// Parse and validate manifest text. `path` is used in errors only.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Manifest`] on invalid TOML, an unsupported
    /// version, or an entry with an empty field.
    pub fn parse(path: &Path, content: &str) -> PluginResult<Self> {
        let manifest: Self = toml::from_str(content).map_err(|e| PluginError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if manifest.version != MANIFEST_VERSION {
            return Err(PluginError::Manifest {
                path: path.to_path_buf(),
                message: format!(
                    "unsupported version {} (expected {MANIFEST_VERSION})",
                    manifest.version
                ),
            });
        }
        for (index, entry) in manifest.directives.iter().enumerate() {
            if entry.name.trim().is_empty() || entry.package.trim().is_empty() {
                return Err(PluginError::Manifest {
                    path: path.to_path_buf(),
                    message: format!(
                        "directive #{} has an empty name or package",
                        index.saturating_add(1)
                    ),
                });
            }
        }
        Ok(manifest)
    }

    /// Convert entries into `http` plugins.
    ///
    /// # Errors
    ///
    /// Propagates [`PluginError::InvalidPlugin`] from plugin construction.
    pub fn plugins(&self) -> PluginResult<Vec<Plugin>> {
        self.directives
            .iter()
            .map(|entry| Plugin::new(entry.name.trim(), entry.package.trim(), PluginKind::Http))
            .collect()
    }
}

/// Reads directive plugins from a manifest file.
#[derive(Debug, Clone)]
pub struct ManifestScanner {
    path: PathBuf,
}

impl ManifestScanner {
    /// Scanner for the manifest at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Manifest file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the manifest and return its plugins.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] if the file cannot be read, and
    /// [`PluginError::Manifest`] if its content is invalid.
    pub fn scan(&self) -> PluginResult<Vec<Plugin>> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| PluginError::io(&self.path, e))?;
        let manifest = DirectiveManifest::parse(&self.path, &content)?;
        let plugins = manifest.plugins()?;
        debug!(
            path = %self.path.display(),
            count = plugins.len(),
            "Loaded directive manifest"
        );
        Ok(plugins)
    }
}

impl PluginFetcher for ManifestScanner {
    fn kind(&self) -> PluginKind {
        PluginKind::Http
    }

    fn fetch_plugins(&self) -> PluginResult<Vec<Plugin>> {
        self.scan()
    }

    fn describe(&self) -> String {
        format!("{} (manifest)", self.path.display())
    }
}
