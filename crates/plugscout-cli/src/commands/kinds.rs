//! `plugscout kinds`: registered plugin kinds and where each reads from.

use plugscout_plugins::{FetcherRegistry, PluginKind};
use serde::Serialize;

use crate::formatter::OutputFormat;
use crate::theme::Theme;

#[derive(Debug, Serialize)]
struct KindInfo {
    kind: PluginKind,
    source: String,
}

pub(crate) fn list_kinds(registry: &FetcherRegistry, format: OutputFormat) -> anyhow::Result<()> {
    let kinds = describe(registry);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&kinds)?),
        OutputFormat::Pretty => {
            println!("{}", Theme::header("Plugin kinds"));
            println!("{}", Theme::separator());
            for info in &kinds {
                // Pad before coloring; escape codes break width formatting.
                let tag = format!("{:<6}", info.kind.as_str());
                println!("  {} {}", Theme::kind(info.kind, &tag), info.source);
            }
        },
    }
    Ok(())
}

fn describe(registry: &FetcherRegistry) -> Vec<KindInfo> {
    registry
        .kinds()
        .into_iter()
        .filter_map(|kind| {
            registry.get(kind).map(|fetcher| KindInfo {
                kind,
                source: fetcher.describe(),
            })
        })
        .collect()
}
