//! Configuration types for plugscout.
//!
//! Every struct implements [`Default`] matching `defaults.toml`, so a bare
//! `[section]` header in TOML produces a working configuration. Domain types
//! are not referenced here; the CLI converts at its boundary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Go workspace location.
    pub paths: PathsSection,
    /// Directive (`http`) discovery.
    pub http: HttpSection,
    /// Provider (`dns`) discovery.
    pub dns: DnsSection,
    /// Dependency fetching.
    pub fetch: FetchSection,
    /// Logging level and format.
    pub logging: LoggingSection,
}

impl Config {
    /// The Go workspace, if one is configured.
    #[must_use]
    pub fn gopath(&self) -> Option<&Path> {
        self.paths.gopath.as_deref()
    }

    /// `<gopath>/src`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoGopath`] if no workspace is set.
    pub fn source_root(&self) -> ConfigResult<PathBuf> {
        self.gopath()
            .map(|gopath| gopath.join("src"))
            .ok_or(ConfigError::NoGopath)
    }

    /// Go source file holding the directive declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoGopath`] if no workspace is set.
    pub fn directive_file_path(&self) -> ConfigResult<PathBuf> {
        Ok(self.source_root()?.join(&self.http.directive_file))
    }

    /// Directory holding one subdirectory per DNS provider.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoGopath`] if no workspace is set.
    pub fn providers_dir(&self) -> ConfigResult<PathBuf> {
        Ok(self.source_root()?.join(&self.dns.providers_package))
    }
}

// ---------------------------------------------------------------------------
// PathsSection
// ---------------------------------------------------------------------------

/// Filesystem locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Go workspace root. Unset means `$GOPATH`, then `$HOME/go`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gopath: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// HttpSection
// ---------------------------------------------------------------------------

/// Where directive plugins are declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveSourceKind {
    /// Comment-annotated declaration in the framework's Go source.
    #[default]
    Go,
    /// Versioned TOML manifest.
    Manifest,
}

/// Directive discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Source kind.
    pub source: DirectiveSourceKind,
    /// Directive file relative to `<gopath>/src`.
    pub directive_file: String,
    /// Name of the declaration holding the directive list.
    pub declaration: String,
    /// Manifest path, required when `source = "manifest"`. Relative paths
    /// resolve against the current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            source: DirectiveSourceKind::Go,
            directive_file: "github.com/mholt/caddy/caddyhttp/httpserver/plugin.go".to_owned(),
            declaration: "directives".to_owned(),
            manifest: None,
        }
    }
}

// ---------------------------------------------------------------------------
// DnsSection
// ---------------------------------------------------------------------------

/// Provider discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsSection {
    /// Import path of the provider collection, also its location under
    /// `<gopath>/src`.
    pub providers_package: String,
}

impl Default for DnsSection {
    fn default() -> Self {
        Self {
            providers_package: "github.com/caddyserver/dnsproviders".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// FetchSection
// ---------------------------------------------------------------------------

/// Dependency fetch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSection {
    /// Framework import path passed to `go get`.
    pub framework_package: String,
    /// Clone URL of the provider collection.
    pub providers_repository: String,
    /// Go toolchain program.
    pub go_program: String,
    /// Git program.
    pub git_program: String,
    /// Per-command limit in seconds; `0` waits forever.
    pub timeout_secs: u64,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            framework_package: "github.com/mholt/caddy".to_owned(),
            providers_repository: "https://github.com/caddyserver/dnsproviders".to_owned(),
            go_program: "go".to_owned(),
            git_program: "git".to_owned(),
            timeout_secs: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["plugscout_plugins=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_follow_gopath() {
        let mut config = Config::default();
        assert!(matches!(config.source_root(), Err(ConfigError::NoGopath)));

        config.paths.gopath = Some(PathBuf::from("/home/gopher/go"));
        assert_eq!(
            config.directive_file_path().unwrap(),
            PathBuf::from("/home/gopher/go/src/github.com/mholt/caddy/caddyhttp/httpserver/plugin.go")
        );
        assert_eq!(
            config.providers_dir().unwrap(),
            PathBuf::from("/home/gopher/go/src/github.com/caddyserver/dnsproviders")
        );
    }

    #[test]
    fn bare_sections_use_defaults() {
        let config: Config = toml::from_str("[http]\n[fetch]\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn source_kind_is_lowercase() {
        let config: Config =
            toml::from_str("[http]\nsource = \"manifest\"\nmanifest = \"d.toml\"\n").unwrap();
        assert_eq!(config.http.source, DirectiveSourceKind::Manifest);
        assert_eq!(config.http.manifest, Some(PathBuf::from("d.toml")));
    }
}
