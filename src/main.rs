//! FlagQuest - console entry point.

#![warn(missing_docs)]

mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use flag_quest::{
    AppConfig, CountryCatalog, FactProvider, GameOrchestrator, GameRules, GameSession,
    HighScoreRepository, HighScoreStore, MemoryHighScoreStore, fact_service_from_config,
    run_console,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

/// Database path that selects process-local storage.
const IN_MEMORY: &str = ":memory:";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    initialize_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            db_path,
            offline,
        } => run_play(&config, db_path, offline).await,
        Command::HighScore { config, db_path } => show_high_score(&config, db_path),
    }
}

/// Logs go to stderr so they never interleave with the game on stdout.
fn initialize_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,flag_quest=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[instrument(skip(config_path), fields(config_path = %config_path.display()))]
fn load_config(config_path: &Path, db_path: Option<String>) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_default(config_path)?;
    if let Some(db_path) = db_path {
        info!(db_path = %db_path, "Overriding database path");
        config.set_db_path(db_path);
    }
    Ok(config)
}

#[instrument(skip(config))]
fn open_store(config: &AppConfig) -> Result<Arc<dyn HighScoreStore>> {
    if config.db_path() == IN_MEMORY {
        info!("High score kept in memory for this run");
        return Ok(Arc::new(MemoryHighScoreStore::new()));
    }
    Ok(Arc::new(HighScoreRepository::open(config.db_path().clone())?))
}

/// Plays console sessions until the player quits.
#[instrument(skip(config_path), fields(config_path = %config_path.display()))]
async fn run_play(config_path: &Path, db_path: Option<String>, offline: bool) -> Result<()> {
    let mut config = load_config(config_path, db_path)?;
    if offline {
        config.set_fact_provider(FactProvider::Offline);
    }

    let catalog = CountryCatalog::builtin()?;
    let store = open_store(&config)?;
    let facts = fact_service_from_config(&config);

    let session = GameSession::new(GameRules::default(), catalog, store);
    let (handle, task) = GameOrchestrator::spawn(session, facts);

    info!("Starting console session");
    run_console(handle).await?;
    task.await?;

    Ok(())
}

/// Prints the stored high score.
#[instrument(skip(config_path), fields(config_path = %config_path.display()))]
fn show_high_score(config_path: &Path, db_path: Option<String>) -> Result<()> {
    let config = load_config(config_path, db_path)?;
    if config.db_path() == IN_MEMORY {
        println!("No high score: in-memory storage does not outlive a run.");
        return Ok(());
    }

    let repo = HighScoreRepository::open(config.db_path().clone())?;
    match repo.record()? {
        Some(record) => println!(
            "Personal best: {} (set {})",
            record.score(),
            record.updated_at().format("%Y-%m-%d %H:%M UTC")
        ),
        None => println!("No high score yet."),
    }

    Ok(())
}
