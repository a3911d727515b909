mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use settings::Settings;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let settings = Settings::parse();
    init_logging(&settings)?;

    tracing::info!("Starting flat-rate-tracker {}", flat_rate_tracker::VERSION);
    run_ui_mode(&settings)
}

fn init_logging(settings: &Settings) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log_file)
        .with_context(|| format!("Failed to open log file {}", settings.log_file.display()))?;

    let filter = EnvFilter::try_new(&settings.log_level)
        .with_context(|| format!("Invalid log level `{}`", settings.log_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(settings: &Settings) -> Result<()> {
    use flat_rate_tracker::{ui, EntryStore, SqliteSlot};

    let slot = SqliteSlot::open(&settings.db)
        .with_context(|| format!("Failed to open database {}", settings.db.display()))?;
    let store = EntryStore::load(slot);

    let mut app = ui::App::new(store, settings.export_dir.clone());
    ui::run_ui(&mut app)?;

    tracing::info!("UI closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_settings: &Settings) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}
