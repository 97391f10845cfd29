//! `termlink`: retro personnel terminal with a live "Last Entries" panel.
//!
//! Built on [ratatui](https://ratatui.rs). After the login gate, the
//! terminal screen hosts the Last Entries panel, kept current by
//! `termlink-core`'s [`EntryRefreshController`](termlink_core::EntryRefreshController)
//! while the panel is visible.
//!
//! Logs are written to a file (default `/tmp/termlink.log`) to avoid
//! corrupting the terminal UI. A background data bridge task forwards
//! refresh status into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod renderer;
mod screen;
mod screens;
mod session;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::session::SessionSettings;

/// Retro personnel terminal with a live Last Entries panel.
#[derive(Parser, Debug)]
#[command(name = "termlink", version, about)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short = 'c', long, env = "TERMLINK_CONFIG")]
    config: Option<PathBuf>,

    /// JSON record export to poll (overrides the config file)
    #[arg(short = 'r', long)]
    records: Option<PathBuf>,

    /// Operator name shown on the login gate
    #[arg(short = 'o', long)]
    operator: Option<String>,

    /// Log file path (defaults to /tmp/termlink.log)
    #[arg(long, default_value = "/tmp/termlink.log")]
    log_file: PathBuf,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Logging to stdout/stderr would corrupt the
/// TUI output. The returned guard must be held for the lifetime of the
/// application so logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "termlink_tui={log_level},termlink_core={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("termlink.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Merge the config file with CLI overrides.
fn build_settings(cli: &Cli) -> Result<SessionSettings> {
    let cfg = match &cli.config {
        Some(path) => termlink_config::load_config_from(path)
            .wrap_err_with(|| format!("loading {}", path.display()))?,
        None => termlink_config::load_config().wrap_err("loading config")?,
    };

    let policy = cfg
        .refresh
        .to_refresh_config()
        .wrap_err("invalid [refresh] settings")?;

    Ok(SessionSettings {
        operator: cli
            .operator
            .clone()
            .unwrap_or(cfg.terminal.operator),
        title: cfg.terminal.title,
        records: cli.records.clone().or(cfg.records.path),
        policy,
    })
}

/// Write the default config to `--config` or the platform path.
fn init_config(cli: &Cli) -> Result<()> {
    let cfg = termlink_config::Config::default();
    let path = match &cli.config {
        Some(path) => {
            termlink_config::save_config_to(&cfg, path)?;
            path.clone()
        }
        None => {
            termlink_config::save_config(&cfg)?;
            termlink_config::config_path()
        }
    };
    println!("wrote {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        return init_config(&cli);
    }

    // Hooks go in before the terminal is entered
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let settings = build_settings(&cli)?;
    info!(
        operator = %settings.operator,
        records = %settings
            .records
            .as_deref()
            .map_or_else(|| "(demo)".into(), |p| p.display().to_string()),
        "starting termlink"
    );

    let mut app = App::new(settings);
    app.run().await?;

    Ok(())
}
