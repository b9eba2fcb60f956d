//! DNS provider discovery from a directory tree.
//!
//! Every immediate subdirectory of the provider root is one provider. The
//! plugin's package is the provider package root joined with the directory
//! name as an import path.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PluginError, PluginResult};
use crate::fetcher::PluginFetcher;
use crate::plugin::{Plugin, PluginKind};

/// Import path of the provider collection.
pub const DEFAULT_PACKAGE_ROOT: &str = "github.com/caddyserver/dnsproviders";

/// Lists provider directories under a root.
#[derive(Debug, Clone)]
pub struct ProviderScanner {
    root: PathBuf,
    package_root: String,
}

impl ProviderScanner {
    /// Scanner for `root`, whose subdirectories live under `package_root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, package_root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            package_root: package_root.into(),
        }
    }

    /// Directory being scanned.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Import path prefix for discovered providers.
    #[must_use]
    pub fn package_root(&self) -> &str {
        &self.package_root
    }

    /// List providers in directory enumeration order.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] if the root or one of its entries cannot
    /// be read. Nothing is returned on failure.
    pub fn scan(&self) -> PluginResult<Vec<Plugin>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| PluginError::io(&self.root, e))?;

        let mut plugins = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PluginError::io(&self.root, e))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                warn!(
                    entry = %entry.path().display(),
                    "Skipping provider directory with non-UTF-8 name"
                );
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            // Entry file type does not follow symlinks.
            let file_type = entry
                .file_type()
                .map_err(|e| PluginError::io(entry.path(), e))?;
            if !file_type.is_dir() {
                continue;
            }
            let package = join_package(&self.package_root, name);
            plugins.push(Plugin::new(name, package, PluginKind::Dns)?);
        }

        debug!(
            root = %self.root.display(),
            count = plugins.len(),
            "Scanned provider directories"
        );
        Ok(plugins)
    }
}

impl PluginFetcher for ProviderScanner {
    fn kind(&self) -> PluginKind {
        PluginKind::Dns
    }

    fn fetch_plugins(&self) -> PluginResult<Vec<Plugin>> {
        self.scan()
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Join import path segments with `/`, dropping redundant separators.
#[must_use]
pub fn join_package(root: &str, name: &str) -> String {
    let root = root.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    match (root.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => root.to_string(),
        _ => format!("{root}/{name}"),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn sorted(mut plugins: Vec<Plugin>) -> Vec<Plugin> {
        plugins.sort();
        plugins
    }

    #[test]
    fn lists_visible_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("aws")).unwrap();
        fs::create_dir(dir.path().join("cloudflare")).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("README"), "providers\n").unwrap();

        let scanner = ProviderScanner::new(dir.path(), DEFAULT_PACKAGE_ROOT);
        let plugins = sorted(scanner.scan().unwrap());
        assert_eq!(
            plugins,
            vec![
                Plugin::new(
                    "aws",
                    "github.com/caddyserver/dnsproviders/aws",
                    PluginKind::Dns
                )
                .unwrap(),
                Plugin::new(
                    "cloudflare",
                    "github.com/caddyserver/dnsproviders/cloudflare",
                    PluginKind::Dns
                )
                .unwrap(),
            ]
        );
    }

    #[test]
    fn empty_root_gives_no_plugins() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = ProviderScanner::new(dir.path(), DEFAULT_PACKAGE_ROOT);
        assert!(scanner.scan().unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = ProviderScanner::new(dir.path().join("absent"), DEFAULT_PACKAGE_ROOT);
        assert!(matches!(scanner.scan().unwrap_err(), PluginError::Io { .. }));
    }

    #[test]
    fn root_that_is_a_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("dnsproviders");
        fs::write(&file, "").unwrap();
        let scanner = ProviderScanner::new(&file, DEFAULT_PACKAGE_ROOT);
        assert!(matches!(scanner.scan().unwrap_err(), PluginError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("route53")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("route53"), dir.path().join("alias")).unwrap();

        let scanner = ProviderScanner::new(dir.path(), DEFAULT_PACKAGE_ROOT);
        let names: Vec<String> = scanner
            .scan()
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["route53"]);
    }

    #[test]
    fn scanning_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("digitalocean")).unwrap();
        fs::create_dir(dir.path().join("gandi")).unwrap();
        let scanner = ProviderScanner::new(dir.path(), DEFAULT_PACKAGE_ROOT);
        assert_eq!(
            sorted(scanner.fetch_plugins().unwrap()),
            sorted(scanner.fetch_plugins().unwrap())
        );
    }

    #[test]
    fn package_join_uses_forward_slashes() {
        assert_eq!(join_package("github.com/a/b", "c"), "github.com/a/b/c");
        assert_eq!(join_package("github.com/a/b/", "c"), "github.com/a/b/c");
        assert_eq!(join_package("", "c"), "c");
    }
}
