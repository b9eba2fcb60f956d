//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only fill fields that no
//! config file set.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::path::Path;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

/// How a variable's value becomes a field value.
#[derive(Clone, Copy)]
enum Conversion {
    /// Used verbatim.
    Verbatim,
    /// A path list; the first non-empty entry is used.
    FirstPath,
}

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    conversion: Conversion,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "GOPATH",
        field_path: "paths.gopath",
        conversion: Conversion::FirstPath,
    },
    EnvMapping {
        var_name: "PLUGSCOUT_LOG",
        field_path: "logging.level",
        conversion: Conversion::Verbatim,
    },
];

/// Snapshot of the relevant environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    ENV_MAPPINGS
        .iter()
        .filter_map(|m| {
            std::env::var(m.var_name)
                .ok()
                .map(|v| (m.var_name.to_owned(), v))
        })
        .collect()
}

/// Apply environment fallbacks to fields not set by any config file.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults)
        {
            continue;
        }
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };
        let Some(value) = convert(raw, mapping.conversion) else {
            continue;
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        set_field(merged, mapping.field_path, toml::Value::String(value));
        sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
        count = count.saturating_add(1);
    }

    count
}

fn convert(raw: &str, conversion: Conversion) -> Option<String> {
    match conversion {
        Conversion::Verbatim => Some(raw.trim().to_owned()).filter(|v| !v.is_empty()),
        Conversion::FirstPath => std::env::split_paths(raw)
            .find(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().into_owned()),
    }
}

/// Set `$HOME/go` as the workspace when nothing else did.
///
/// Returns whether the value was derived.
pub fn derive_gopath(merged: &mut toml::Value, sources: &mut FieldSources, home: &Path) -> bool {
    if sources.contains_key("paths.gopath") {
        return false;
    }
    let gopath = home.join("go").to_string_lossy().into_owned();
    set_field(merged, "paths.gopath", toml::Value::String(gopath));
    sources.insert("paths.gopath".to_owned(), ConfigLayer::Derived);
    true
}

/// Set a dotted field in the TOML tree, creating intermediate tables.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), value);
    }
}
