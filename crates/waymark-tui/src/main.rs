//! `waymark`: terminal map viewer with address search and driving directions.
//!
//! Type an address to get debounced place suggestions, pick one to center
//! the map on it, and ask for a driving route from your location. Lookups
//! go to the Google Maps Platform web services.
//!
//! Logs are written to a file (default `/tmp/waymark.log`) so they never
//! corrupt the terminal UI.

mod action;
mod app;
mod component;
mod event;
mod screens;
mod service_bridge;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use secrecy::SecretString;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use waymark_config::Config;
use waymark_core::{GoogleMaps, MapsService, SearchConfig};

use crate::action::Action;
use crate::app::App;
use crate::screens::map::MapScreen;

/// Terminal map viewer with address search and driving directions.
#[derive(Parser, Debug)]
#[command(name = "waymark", version, about)]
struct Cli {
    /// Google Maps API key (overrides env, keyring and config file)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store the resolved API key in the system keyring
    #[arg(long)]
    save_key: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/waymark.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. Nothing may go to stdout/stderr while the TUI is
/// up. Hold the returned guard until exit so buffered lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "waymark_tui={level},waymark_core={level},waymark_api={level}"
        ))
    });

    let dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let file = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("waymark.log"));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve the key and build the maps service. The error is the reason
/// shown on the map placeholder.
fn build_service(
    cli: &Cli,
    cfg: &Config,
    search: &SearchConfig,
) -> Result<MapsService<GoogleMaps>, String> {
    let flag = cli.api_key.clone().map(SecretString::from);
    let key = waymark_config::resolve_api_key(cfg, flag).map_err(|e| e.to_string())?;

    if cli.save_key {
        match waymark_config::store_api_key(&key) {
            Ok(()) => info!("API key stored in keyring"),
            Err(e) => warn!(error = %e, "could not store API key"),
        }
    }

    let service_config =
        waymark_config::to_service_config(cfg, key).map_err(|e| e.to_string())?;
    let provider = GoogleMaps::new(&service_config).map_err(|e| e.to_string())?;
    Ok(MapsService::new(provider, search))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first, so a panic during startup still restores the terminal.
    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let cfg = match &cli.config {
        Some(path) => waymark_config::load_config_from(path)?,
        None => waymark_config::load_config()?,
    };

    if cli.write_config {
        match &cli.config {
            Some(path) => waymark_config::save_config_to(&cfg, path)?,
            None => waymark_config::save_config(&cfg)?,
        }
        info!("configuration written");
        return Ok(());
    }

    let map_config = waymark_config::to_map_config(&cfg)?;
    let search_config = waymark_config::to_search_config(&cfg);

    let (service, startup) = match build_service(&cli, &cfg, &search_config) {
        Ok(service) => (Some(service), Action::ProviderReady),
        Err(reason) => {
            warn!(%reason, "starting without a maps provider");
            (None, Action::ProviderUnavailable(reason))
        }
    };
    info!(ready = service.is_some(), "starting waymark");

    let screen = MapScreen::new(map_config, search_config.debounce, service);
    App::new(screen, startup).run().await
}
