//! Post-merge configuration validation.

use std::path::Component;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, DirectiveSourceKind};

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_http(config)?;
    validate_dns(config)?;
    validate_fetch(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_http(config: &Config) -> ConfigResult<()> {
    let http = &config.http;

    match http.source {
        DirectiveSourceKind::Go => {
            check_relative("http.directive_file", &http.directive_file)?;
            if !is_go_identifier(&http.declaration) {
                return Err(invalid(
                    "http.declaration",
                    format!("'{}' is not a Go identifier", http.declaration),
                ));
            }
        },
        DirectiveSourceKind::Manifest => {
            if http.manifest.as_ref().is_none_or(|p| p.as_os_str().is_empty()) {
                return Err(invalid(
                    "http.manifest",
                    "a manifest path is required when http.source = \"manifest\"",
                ));
            }
        },
    }
    Ok(())
}

fn validate_dns(config: &Config) -> ConfigResult<()> {
    check_relative("dns.providers_package", &config.dns.providers_package)
}

fn validate_fetch(config: &Config) -> ConfigResult<()> {
    let fetch = &config.fetch;
    for (field, value) in [
        ("fetch.framework_package", &fetch.framework_package),
        ("fetch.providers_repository", &fetch.providers_repository),
        ("fetch.go_program", &fetch.go_program),
        ("fetch.git_program", &fetch.git_program),
    ] {
        if value.trim().is_empty() {
            return Err(invalid(field, "must not be empty"));
        }
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;
    if !matches!(
        logging.level.to_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(invalid(
            "logging.level",
            format!(
                "unknown level '{}'; expected one of: trace, debug, info, warn, error",
                logging.level
            ),
        ));
    }
    if !matches!(
        logging.format.to_lowercase().as_str(),
        "pretty" | "compact" | "json" | "full"
    ) {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown format '{}'; expected one of: pretty, compact, json, full",
                logging.format
            ),
        ));
    }
    Ok(())
}

/// Must be a non-empty path below `<gopath>/src`.
fn check_relative(field: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    let escapes = std::path::Path::new(value)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(invalid(
            field,
            format!("'{value}' must be a relative path inside the Go source root"),
        ));
    }
    Ok(())
}

fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}
