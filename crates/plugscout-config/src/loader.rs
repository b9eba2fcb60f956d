//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `~/.plugscout/config.toml` (user)
//! 3. Merge `{workspace}/.plugscout/config.toml` (workspace)
//! 4. Apply env var fallbacks for fields no file set
//! 5. Derive `paths.gopath` from the home directory if still unset
//! 6. Deserialize merged tree → `Config`
//! 7. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars, derive_gopath};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: usize = 1_048_576;

/// Directory name of per-user and per-workspace configuration.
const CONFIG_DIR: &str = ".plugscout";

/// Load the configuration with layered file precedence.
///
/// `workspace_root` is usually the current directory; `None` skips the
/// workspace layer. `home_override` replaces the user's home directory for
/// both the user layer and the `$HOME/go` fallback.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, or if the
/// final merged configuration fails validation.
pub fn load(
    workspace_root: Option<&Path>,
    home_override: Option<&Path>,
) -> ConfigResult<ResolvedConfig> {
    let home_dir = match home_override {
        Some(h) => h.to_path_buf(),
        None => home_directory()?,
    };

    let mut layers = vec![(ConfigLayer::User, user_config_path(&home_dir))];
    if let Some(ws_root) = workspace_root {
        layers.push((ConfigLayer::Workspace, ws_root.join(CONFIG_DIR).join("config.toml")));
    }
    resolve(&layers, &home_dir, &collect_env_vars())
}

/// Load defaults plus one explicit file (no user or workspace layers).
///
/// Env fallbacks and the `$HOME/go` default still apply.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is missing, malformed, or the
/// result fails validation.
pub fn load_file(path: &Path, home_override: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let home_dir = match home_override {
        Some(h) => h.to_path_buf(),
        None => home_directory()?,
    };
    if try_load_file(path)?.is_none() {
        return Err(ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    }
    resolve(
        &[(ConfigLayer::File, path.to_path_buf())],
        &home_dir,
        &collect_env_vars(),
    )
}

/// `~/.plugscout/config.toml` for a home directory.
#[must_use]
pub fn user_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(CONFIG_DIR).join("config.toml")
}

fn resolve(
    layers: &[(ConfigLayer, PathBuf)],
    home_dir: &Path,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Parse embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut field_sources = FieldSources::new();
    record_leaves(&merged, "", ConfigLayer::Defaults, &mut field_sources);
    let mut loaded_files = Vec::new();

    // 2-3. File layers in precedence order.
    for (layer, path) in layers {
        if let Some(overlay) = try_load_file(path)? {
            deep_merge_tracking(&mut merged, &overlay, "", *layer, &mut field_sources);
            loaded_files.push(path.display().to_string());
            info!(path = %path.display(), layer = %layer, "loaded config");
        }
    }

    // 4. Env fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 5. $HOME/go.
    if derive_gopath(&mut merged, &mut field_sources, home_dir) {
        debug!(home = %home_dir.display(), "using $HOME/go as Go workspace");
    }

    // 6. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 7. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    // Checked after reading to avoid a stat/read race.
    if content.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(Some(value))
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::types::DirectiveSourceKind;

    fn write_config(dir: &Path, content: &str) {
        fs::create_dir_all(dir.join(CONFIG_DIR)).unwrap();
        fs::write(dir.join(CONFIG_DIR).join("config.toml"), content).unwrap();
    }

    #[test]
    fn defaults_deserialize_to_default_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn defaults_only_derive_gopath_from_home() {
        let home = tempfile::tempdir().unwrap();
        let resolved = resolve(&[], home.path(), &HashMap::new()).unwrap();
        assert_eq!(resolved.config.gopath(), Some(home.path().join("go").as_path()));
        assert_eq!(
            resolved.field_sources.get("paths.gopath"),
            Some(&ConfigLayer::Derived)
        );
        assert!(resolved.loaded_files.is_empty());
    }

    #[test]
    fn workspace_overrides_user() {
        let home = tempfile::tempdir().unwrap();
        let workspace = tempfile::tempdir().unwrap();
        write_config(
            home.path(),
            "[fetch]\ngit_program = \"/usr/local/bin/git\"\ngo_program = \"go1.10\"\n",
        );
        write_config(workspace.path(), "[fetch]\ngo_program = \"go1.11\"\n");

        let layers = vec![
            (ConfigLayer::User, user_config_path(home.path())),
            (
                ConfigLayer::Workspace,
                workspace.path().join(CONFIG_DIR).join("config.toml"),
            ),
        ];
        let resolved = resolve(&layers, home.path(), &HashMap::new()).unwrap();

        assert_eq!(resolved.config.fetch.go_program, "go1.11");
        assert_eq!(resolved.config.fetch.git_program, "/usr/local/bin/git");
        assert_eq!(resolved.loaded_files.len(), 2);
        assert_eq!(
            resolved.field_sources.get("fetch.go_program"),
            Some(&ConfigLayer::Workspace)
        );
    }

    #[test]
    fn env_gopath_fills_unset_field() {
        let home = tempfile::tempdir().unwrap();
        let mut env = HashMap::new();
        env.insert("GOPATH".to_owned(), "/opt/go".to_owned());

        let resolved = resolve(&[], home.path(), &env).unwrap();
        assert_eq!(resolved.config.gopath(), Some(Path::new("/opt/go")));
    }

    #[test]
    fn file_gopath_beats_env() {
        let home = tempfile::tempdir().unwrap();
        write_config(home.path(), "[paths]\ngopath = \"/srv/go\"\n");
        let mut env = HashMap::new();
        env.insert("GOPATH".to_owned(), "/opt/go".to_owned());

        let layers = vec![(ConfigLayer::User, user_config_path(home.path()))];
        let resolved = resolve(&layers, home.path(), &env).unwrap();
        assert_eq!(resolved.config.gopath(), Some(Path::new("/srv/go")));
    }

    #[test]
    fn invalid_merged_config_fails_validation() {
        let home = tempfile::tempdir().unwrap();
        write_config(home.path(), "[http]\nsource = \"manifest\"\n");
        let layers = vec![(ConfigLayer::User, user_config_path(home.path()))];
        assert!(matches!(
            resolve(&layers, home.path(), &HashMap::new()),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn load_file_uses_single_file() {
        let home = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.toml");
        fs::write(
            &path,
            "[http]\nsource = \"manifest\"\nmanifest = \"directives.toml\"\n",
        )
        .unwrap();

        let resolved = load_file(&path, Some(home.path())).unwrap();
        assert_eq!(resolved.config.http.source, DirectiveSourceKind::Manifest);
        assert_eq!(resolved.loaded_files, vec![path.display().to_string()]);
    }

    #[test]
    fn load_file_missing_is_read_error() {
        let home = tempfile::tempdir().unwrap();
        let result = load_file(Path::new("/nonexistent/config.toml"), Some(home.path()));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[http\n").unwrap();
        assert!(matches!(
            try_load_file(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn oversized_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("huge.toml");
        let data = "x = \"".to_owned() + &"a".repeat(1_100_000) + "\"";
        fs::write(&file_path, data).unwrap();

        let result = try_load_file(&file_path);
        assert!(
            matches!(result, Err(ConfigError::ValidationError { .. })),
            "Expected ValidationError for oversized config, got: {result:?}"
        );
    }
}
