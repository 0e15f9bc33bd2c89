//! CLI entry point for importing WireGuard tunnels.
//!
//! Imports wg-quick `.conf` files and zip archives of them into a JSON tunnel
//! store, showing at most one alert per import.
//!
//! # Usage
//!
//! ```bash
//! wg-import [OPTIONS] <COMMAND>
//!
//! # Import files and archives
//! wg-import import office.conf home.conf bundle.zip
//!
//! # Print the import report as JSON
//! wg-import import --format json bundle.zip
//!
//! # Show what is in the store
//! wg-import --store ~/.config/wg-import/tunnels.json list
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod store;

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wgi_core::{AlertText, Config, ImportOutcome, SourceId};
use wgi_importer::{AlertPresenter, ImportReport, TunnelImporter};

use crate::store::JsonFileStore;

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Import WireGuard tunnel configurations from files and zip archives.
#[derive(Parser)]
#[command(name = "wg-import", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Tunnel store file (overrides `store.path` from the config file).
    #[arg(short, long, global = true, env = "WG_IMPORT_STORE")]
    store: Option<Utf8PathBuf>,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "WG_IMPORT_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Import tunnel files and zip archives into the store.
    Import {
        /// Files to import. `.zip` files are expanded, anything else is read
        /// as a single tunnel.
        #[arg(required = true)]
        paths: Vec<Utf8PathBuf>,

        /// Output format for the import summary.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the tunnels in the store.
    List,
}

/// Summary output format.
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text.
    Text,
    /// JSON import report.
    Json,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `warn` level by default so alerts
/// are not buried in log lines.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "warn" };
        EnvFilter::new(level)
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Loads the configuration file if one was given and applies CLI overrides.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config {}: {}", path, e))?,
        None => Config::default(),
    };

    if let Some(store) = &cli.store {
        config.store.path.clone_from(store);
    }

    Ok(config)
}

fn open_store(config: &Config) -> color_eyre::Result<JsonFileStore> {
    JsonFileStore::open(&config.store.path)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to open tunnel store: {:#}", e))
}

// =============================================================================
// ALERT PRESENTATION
// =============================================================================

/// Shows alerts on stderr as `TITLE: MESSAGE`.
struct TerminalPresenter;

impl AlertPresenter for TerminalPresenter {
    fn show_alert(&self, alert: &AlertText) {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        let _ = writeln!(handle, "{alert}");
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Imports `paths` into the store and prints a summary.
async fn run_import(
    config: &Config,
    paths: &[Utf8PathBuf],
    format: OutputFormat,
) -> color_eyre::Result<()> {
    let store = open_store(config)?;
    let importer = TunnelImporter::new(config.import.clone())
        .map_err(|e| color_eyre::eyre::eyre!("Invalid import settings: {}", e))?;

    let sources: Vec<SourceId> = paths.iter().cloned().map(SourceId::from).collect();
    let report = importer.import(&sources, &store, &TerminalPresenter).await;

    if report.number_successful > 0 {
        store
            .save()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to save tunnel store: {:#}", e))?;
    }

    info!(
        store = %config.store.path,
        added = report.number_successful,
        "Import complete"
    );

    match format {
        OutputFormat::Text => print_summary(&report)?,
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{json}")?;
        }
    }

    Ok(())
}

/// Prints every tunnel in the store.
fn run_list(config: &Config) -> color_eyre::Result<()> {
    let store = open_store(config)?;
    let tunnels = store.tunnels();

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if tunnels.is_empty() {
        writeln!(handle, "No tunnels in {}", config.store.path)?;
        return Ok(());
    }

    for tunnel in &tunnels {
        let addresses: Vec<String> = tunnel
            .interface
            .addresses
            .iter()
            .map(ToString::to_string)
            .collect();
        writeln!(
            handle,
            "{:<24} {:<32} {} peer(s)",
            tunnel.name,
            addresses.join(", "),
            tunnel.peers.len()
        )?;
    }

    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_summary(report: &ImportReport) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(
        handle,
        "Imported {} of {} tunnels",
        report.number_successful, report.parsed_count
    )?;
    writeln!(
        handle,
        "  Sources:  {} ({} plain, {} archive)",
        report.stats.sources,
        report.stats.plain(),
        report.stats.archives
    )?;
    writeln!(handle, "  Failures: {}", report.stats.source_failures)?;
    if let ImportOutcome::Alert(alert) = &report.outcome {
        writeln!(handle, "  Alert:    {}", alert.title)?;
    }

    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.no_color);

    let config = build_config(&cli)?;

    match &cli.command {
        Commands::Import { paths, format } => run_import(&config, paths, *format).await,
        Commands::List => run_list(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_command() {
        let cli = Cli::try_parse_from([
            "wg-import",
            "--store",
            "/tmp/t.json",
            "import",
            "--format",
            "json",
            "a.conf",
            "b.zip",
        ])
        .unwrap();
        assert_eq!(cli.store.as_deref(), Some(camino::Utf8Path::new("/tmp/t.json")));
        match cli.command {
            Commands::Import { paths, format } => {
                assert_eq!(paths.len(), 2);
                assert!(matches!(format, OutputFormat::Json));
            }
            Commands::List => panic!("expected import"),
        }
    }

    #[test]
    fn test_import_requires_paths() {
        assert!(Cli::try_parse_from(["wg-import", "import"]).is_err());
    }

    #[test]
    fn test_store_override() {
        let cli = Cli::try_parse_from(["wg-import", "list", "--store", "x.json"]).unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.store.path, "x.json");
    }
}
