mod app;

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};

use fishwatch_core::{
    config::{self, AppConfig},
    FishingSession, LogFollower, SpotJournal,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(locale = %config.locale, "configuration loaded");

    let journal = SpotJournal::load(&config.journal_path)
        .with_context(|| format!("failed to load {}", config.journal_path.display()))?
        .unwrap_or_default();
    let session = FishingSession::new(config.locale, config.history_limit).with_journal(journal);

    let mut app = app::FishwatchApp::new(session, config.journal_path.clone());

    if let Some(log_path) = config.log_path.clone() {
        let follower = LogFollower::new(
            log_path.clone(),
            config.read_from_start,
            config.poll_interval(),
        );
        let (source_tx, source_rx) = mpsc::channel(256);
        tokio::spawn(async move {
            if let Err(err) = follower.run(source_tx).await {
                tracing::error!("Chat log follower error: {err}");
            }
        });
        app.attach_source(log_path.display().to_string(), source_rx);
    }

    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("fishwatch.log");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal belongs to the UI, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
