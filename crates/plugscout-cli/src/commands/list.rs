//! `plugscout list`: run fetchers and print the plugin catalog.

use std::fmt::Write as _;

use anyhow::Context;
use plugscout_plugins::{FetcherRegistry, Plugin, PluginKind};

use crate::formatter::OutputFormat;
use crate::theme::Theme;

/// Fetched plugins, grouped by kind.
type Catalog = Vec<(PluginKind, Vec<Plugin>)>;

pub(crate) fn list_plugins(
    registry: &FetcherRegistry,
    kind: Option<PluginKind>,
    sort: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let catalog = collect(registry, kind, sort)?;
    match format {
        OutputFormat::Json => println!("{}", render_json(&catalog)?),
        OutputFormat::Pretty => print!("{}", render_pretty(&catalog)),
    }
    Ok(())
}

fn collect(
    registry: &FetcherRegistry,
    kind: Option<PluginKind>,
    sort: bool,
) -> anyhow::Result<Catalog> {
    let kinds = kind.map_or_else(|| registry.kinds(), |kind| vec![kind]);
    let mut catalog = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let mut plugins = registry
            .fetch_plugins(kind)
            .with_context(|| format!("failed to list {kind} plugins"))?;
        if sort {
            plugins.sort_by(|a, b| {
                a.name()
                    .cmp(b.name())
                    .then_with(|| a.package().cmp(b.package()))
            });
        }
        catalog.push((kind, plugins));
    }
    Ok(catalog)
}

fn render_json(catalog: &Catalog) -> serde_json::Result<String> {
    let plugins: Vec<&Plugin> = catalog.iter().flat_map(|(_, plugins)| plugins).collect();
    serde_json::to_string_pretty(&plugins)
}

fn render_pretty(catalog: &Catalog) -> String {
    let mut out = String::new();
    for (kind, plugins) in catalog {
        let _ = writeln!(out, "{}", Theme::header(&format!("{kind} plugins")));
        if plugins.is_empty() {
            let _ = writeln!(out, "{}\n", Theme::info("None found"));
            continue;
        }
        let _ = writeln!(out, "  {:<20} PACKAGE", "NAME");
        let _ = writeln!(out, "{}", Theme::separator());
        for plugin in plugins {
            let _ = writeln!(out, "  {:<20} {}", plugin.name(), plugin.package());
        }
        let _ = writeln!(
            out,
            "\n{}\n",
            Theme::dimmed(&format!("{} plugin(s)", plugins.len()))
        );
    }
    out
}
