use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod auth;
mod chat;
mod config;
mod gemini;
mod handler;
mod metrics;
mod navigation;
mod tui;
mod ui;
mod viewer;
mod workout;

use app::App;
use config::Config;
use gemini::GeminiClient;
use tui::EventHandler;
use workout::PlanGenerator;

#[derive(Parser)]
#[command(name = "gymer")]
#[command(version)]
#[command(about = "Terminal fitness coach with biometric-aware workout plans")]
struct Cli {
    /// Config file (defaults to <config dir>/gymer/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file (defaults to <config dir>/gymer/gymer.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Write a default config file and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::get_config_path()?,
    };

    if cli.write_config {
        Config::new().save_to(&config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to read config {}", config_path.display()))?;

    let log_path = match cli.log_file {
        Some(path) => path,
        None => Config::get_log_path()?,
    };
    init_logging(&log_path)?;
    info!(config = %config_path.display(), model = config.model(), "starting gymer");

    let generator: Arc<dyn PlanGenerator> =
        Arc::new(GeminiClient::new(&config.api_key(), config.model()));
    let mut app = App::new(&config, generator);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(config.frame_interval());

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    if let Err(e) = &result {
        error!("exited with error: {:#}", e);
    }
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event);
        app.poll_background();
    }
    Ok(())
}

/// Logs go to a file so they never tear the alternate screen
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
