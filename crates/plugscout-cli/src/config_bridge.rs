//! Conversion from `plugscout_config::Config` to domain settings.

use std::time::Duration;

use plugscout_config::{Config, ConfigError, ConfigResult, DirectiveSourceKind};
use plugscout_plugins::{DependencySettings, DirectiveSource, DiscoverySettings};
use plugscout_telemetry::{LogConfig, LogFormat};

/// Logging setup for the `[logging]` section.
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg.logging.format.parse().unwrap_or(LogFormat::Compact);
    let mut log = LogConfig::new(cfg.logging.level.to_lowercase()).with_format(format);
    for directive in &cfg.logging.directives {
        log = log.with_directive(directive.as_str());
    }
    log
}

/// Discovery inputs for the fetcher registry.
pub(crate) fn to_discovery_settings(cfg: &Config) -> ConfigResult<DiscoverySettings> {
    let directives = match cfg.http.source {
        DirectiveSourceKind::Go => DirectiveSource::GoSource {
            path: cfg.directive_file_path()?,
            declaration: cfg.http.declaration.clone(),
        },
        DirectiveSourceKind::Manifest => DirectiveSource::Manifest {
            path: cfg
                .http
                .manifest
                .clone()
                .ok_or_else(|| ConfigError::ValidationError {
                    field: "http.manifest".to_owned(),
                    message: "required when http.source = \"manifest\"".to_owned(),
                })?,
        },
    };
    Ok(DiscoverySettings {
        directives,
        providers_dir: cfg.providers_dir()?,
        providers_package: cfg.dns.providers_package.clone(),
    })
}

/// Inputs of the dependency fetcher.
pub(crate) fn to_dependency_settings(cfg: &Config) -> ConfigResult<DependencySettings> {
    let gopath = cfg.gopath().ok_or(ConfigError::NoGopath)?;
    Ok(DependencySettings {
        gopath: gopath.to_path_buf(),
        framework_package: cfg.fetch.framework_package.clone(),
        providers_repository: cfg.fetch.providers_repository.clone(),
        providers_dir: cfg.providers_dir()?,
        go_program: cfg.fetch.go_program.clone(),
        git_program: cfg.fetch.git_program.clone(),
    })
}

/// Per-command timeout; `0` waits forever.
pub(crate) fn command_timeout(cfg: &Config) -> Option<Duration> {
    (cfg.fetch.timeout_secs > 0).then(|| Duration::from_secs(cfg.fetch.timeout_secs))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;

    fn config_with_gopath() -> Config {
        let mut cfg = Config::default();
        cfg.paths.gopath = Some(PathBuf::from("/home/gopher/go"));
        cfg
    }

    #[test]
    fn discovery_uses_go_source_by_default() {
        let settings = to_discovery_settings(&config_with_gopath()).unwrap();
        match settings.directives {
            DirectiveSource::GoSource { path, declaration } => {
                assert_eq!(
                    path,
                    Path::new(
                        "/home/gopher/go/src/github.com/mholt/caddy/caddyhttp/httpserver/plugin.go"
                    )
                );
                assert_eq!(declaration, "directives");
            },
            other => panic!("unexpected source {other:?}"),
        }
        assert_eq!(
            settings.providers_dir,
            Path::new("/home/gopher/go/src/github.com/caddyserver/dnsproviders")
        );
        assert_eq!(
            settings.providers_package,
            "github.com/caddyserver/dnsproviders"
        );
    }

    #[test]
    fn discovery_uses_manifest_when_selected() {
        let mut cfg = config_with_gopath();
        cfg.http.source = DirectiveSourceKind::Manifest;
        cfg.http.manifest = Some(PathBuf::from("directives.toml"));

        let settings = to_discovery_settings(&cfg).unwrap();
        assert_eq!(
            settings.directives,
            DirectiveSource::Manifest {
                path: PathBuf::from("directives.toml")
            }
        );
    }

    #[test]
    fn missing_gopath_is_reported() {
        let cfg = Config::default();
        assert!(matches!(
            to_discovery_settings(&cfg),
            Err(ConfigError::NoGopath)
        ));
        assert!(matches!(
            to_dependency_settings(&cfg),
            Err(ConfigError::NoGopath)
        ));
    }

    #[test]
    fn dependency_settings_follow_fetch_section() {
        let mut cfg = config_with_gopath();
        cfg.fetch.git_program = "/usr/local/bin/git".to_owned();
        let settings = to_dependency_settings(&cfg).unwrap();
        assert_eq!(settings.gopath, Path::new("/home/gopher/go"));
        assert_eq!(settings.git_program, "/usr/local/bin/git");
        assert_eq!(settings.framework_package, "github.com/mholt/caddy");
        assert_eq!(
            settings.providers_dir,
            Path::new("/home/gopher/go/src/github.com/caddyserver/dnsproviders")
        );
    }

    #[test]
    fn zero_timeout_waits_forever() {
        let mut cfg = Config::default();
        assert_eq!(command_timeout(&cfg), None);
        cfg.fetch.timeout_secs = 30;
        assert_eq!(command_timeout(&cfg), Some(Duration::from_secs(30)));
    }

    #[test]
    fn log_config_follows_logging_section() {
        let mut cfg = Config::default();
        cfg.logging.level = "DEBUG".to_owned();
        cfg.logging.format = "json".to_owned();
        cfg.logging.directives = vec!["plugscout_plugins=trace".to_owned()];

        let log = to_log_config(&cfg);
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.directives, vec!["plugscout_plugins=trace"]);
    }
}
