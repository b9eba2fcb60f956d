//! plugscout - plugin discovery for Caddy builds.
//!
//! Lists the `http` directives and `dns` providers found in a Go workspace and
//! fetches the sources they are discovered from.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use plugscout_config::{Config, ResolvedConfig};
use plugscout_plugins::{DependencyFetcher, FetcherRegistry, PluginKind, ProcessRunner};
use plugscout_telemetry::{LogConfig, LogFormat, RunContext, setup_logging};
use tracing::Instrument;

mod commands;
mod config_bridge;
mod formatter;
mod theme;

use formatter::OutputFormat;

/// plugscout - discover Caddy plugins in a Go workspace
#[derive(Parser)]
#[command(name = "plugscout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Use this config file instead of the user and workspace files
    #[arg(long, global = true, env = "PLUGSCOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered plugins
    List {
        /// Only list plugins of this kind
        #[arg(value_enum)]
        kind: Option<KindArg>,

        /// Sort plugins by name
        #[arg(long)]
        sort: bool,
    },

    /// Fetch the framework and the DNS provider collection
    Deps,

    /// Show registered plugin kinds and their sources
    Kinds,

    /// Show the resolved configuration with source annotations
    Config,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Deps => "deps",
            Self::Kinds => "kinds",
            Self::Config => "config",
        }
    }
}

/// Plugin kind accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    /// HTTP directives
    Http,
    /// DNS providers
    Dns,
}

impl From<KindArg> for PluginKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Http => Self::Http,
            KindArg::Dns => Self::Dns,
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<ResolvedConfig> {
    match path {
        Some(path) => Config::load_file(path)
            .with_context(|| format!("failed to load config file {}", path.display())),
        None => {
            let workspace_root = std::env::current_dir().ok();
            Config::load(workspace_root.as_deref()).context("failed to load configuration")
        },
    }
}

fn log_config(resolved: Option<&ResolvedConfig>, verbose: bool) -> LogConfig {
    let mut log = match resolved {
        Some(resolved) => config_bridge::to_log_config(&resolved.config),
        None => LogConfig::new("warn").with_format(LogFormat::Compact),
    };
    if verbose {
        "debug".clone_into(&mut log.level);
    }
    log
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(cli.config.as_deref());
    if let Err(e) = setup_logging(&log_config(loaded.as_ref().ok(), cli.verbose)) {
        eprintln!("Failed to initialize logging: {e}");
    }
    let resolved = loaded?;

    let mut run = RunContext::new(cli.command.name()).enter();
    let span = run.span().clone();
    let result = dispatch(cli.command, cli.format, &resolved)
        .instrument(span)
        .await;
    if result.is_err() {
        run.fail();
    }
    result
}

async fn dispatch(command: Commands, format: OutputFormat, resolved: &ResolvedConfig) -> Result<()> {
    let config = &resolved.config;
    match command {
        Commands::List { kind, sort } => {
            let settings = config_bridge::to_discovery_settings(config)?;
            let registry = FetcherRegistry::standard(&settings);
            commands::list::list_plugins(&registry, kind.map(PluginKind::from), sort, format)
        },
        Commands::Deps => {
            let settings = config_bridge::to_dependency_settings(config)?;
            let runner =
                ProcessRunner::new().with_timeout(config_bridge::command_timeout(config));
            let fetcher = DependencyFetcher::new(settings, Arc::new(runner));
            commands::deps::fetch_dependencies(&fetcher, format).await
        },
        Commands::Kinds => {
            let settings = config_bridge::to_discovery_settings(config)?;
            commands::kinds::list_kinds(&FetcherRegistry::standard(&settings), format)
        },
        Commands::Config => commands::config::show_config(resolved, format),
    }
}
