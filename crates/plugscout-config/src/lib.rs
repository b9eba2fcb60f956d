#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for plugscout.
//!
//! # Usage
//!
//! ```rust,no_run
//! use plugscout_config::Config;
//!
//! # fn main() -> Result<(), plugscout_config::ConfigError> {
//! let resolved = Config::load(Some(std::path::Path::new(".")))?;
//! println!("Go workspace: {:?}", resolved.config.gopath());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Workspace** (`{cwd}/.plugscout/config.toml`)
//! 2. **User** (`~/.plugscout/config.toml`)
//! 3. **Environment variables** (`GOPATH`, `PLUGSCOUT_LOG`), fallback only
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! `paths.gopath` left unset by all of these becomes `$HOME/go`.
//!
//! This crate does not depend on `plugscout-plugins`; the CLI converts
//! sections into discovery and fetch settings at its boundary.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging with source tracking.
pub mod merge;
/// Resolved configuration display.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use merge::{ConfigLayer, FieldSources};
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(workspace_root: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, None)
    }

    /// Load configuration with an explicit home directory.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load_with_home(
        workspace_root: Option<&std::path::Path>,
        home_dir: &std::path::Path,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, Some(home_dir))
    }

    /// Load defaults plus a single file (no user or workspace layers).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<ResolvedConfig> {
        loader::load_file(path, None)
    }
}
