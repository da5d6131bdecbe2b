#![forbid(unsafe_code)]

mod config;
mod constants;
mod gui;
mod persistence;
mod projects;
mod table;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use config::AppConfig;
use gui::Dashboard;
use persistence::FileStore;
use projects::filter::{Role, Viewer};
use projects::ProjectRepository;

/// Project dashboard with a configurable table
#[derive(Parser)]
#[command(name = "project-board")]
#[command(version)]
struct Cli {
    /// Project data file (JSON array of projects)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Identifier the table layout is stored under
    #[arg(long)]
    table_id: Option<String>,

    /// User id rows are filtered by when not an admin
    #[arg(long)]
    user: Option<String>,

    /// admin or user
    #[arg(long)]
    role: Option<String>,

    /// trace, debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,

    /// Forget the stored table layout before starting
    #[arg(long)]
    reset_layout: bool,
}

fn parse_log_level(level: &str) -> TraceLevel {
    match level.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    config.apply_env_overrides();

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| config.log_level.clone());

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_log_level(&log_level))
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    if let Some(data) = cli.data {
        config.data_file = Some(data);
    }
    if let Some(table_id) = cli.table_id.filter(|id| !id.trim().is_empty()) {
        config.table_id = table_id;
    }
    if let Some(user) = cli.user {
        config.user_id = user;
    }
    if let Some(role) = cli.role {
        config.role = role;
    }
    info!(config = ?config, path = %AppConfig::path().display(), "Configuration loaded");

    let mut store = FileStore::open(AppConfig::preferences_path());
    if cli.reset_layout {
        table::prefs::clear(&mut store, &config.table_id)?;
    }

    let repo = ProjectRepository::load(&config.data_path())?;

    let viewer = Viewer::new(config.user_id.clone(), Role::parse(&config.role));
    if viewer.role != Role::Admin && viewer.user_id.is_empty() {
        warn!("No user id configured for a non-admin viewer, the board will be empty");
    }

    gui::run_gui(
        &config,
        Dashboard {
            store,
            repo,
            viewer,
            table_id: config.table_id.clone(),
            save_delay: config.save_delay(),
        },
    )
}
