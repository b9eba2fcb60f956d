//! `plugscout config`: show the resolved configuration.

use plugscout_config::{ResolvedConfig, ShowFormat};

use crate::formatter::OutputFormat;

pub(crate) fn show_config(resolved: &ResolvedConfig, format: OutputFormat) -> anyhow::Result<()> {
    let show_format = match format {
        OutputFormat::Pretty => ShowFormat::Toml,
        OutputFormat::Json => ShowFormat::Json,
    };
    let output = resolved
        .show(show_format)
        .map_err(|_| anyhow::anyhow!("failed to render configuration"))?;
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}
