#![allow(clippy::result_large_err)]

use clap::Parser;
use clubhouse::{
    cli::{self, Cli},
    config::{self, AppConfig, database},
    core::{DatabaseStore, KeyValueStore, MemoryStore, RosterStore},
    errors::Result,
};
use dotenvy::dotenv;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let cli = Cli::parse();

    // 4. Open the store and run the command
    if cli.ephemeral {
        info!("Using in-memory store for this run");
        run(cli, MemoryStore::new(), &app_config).await
    } else {
        ensure_sqlite_dir(&app_config.database_url)?;
        let db = database::create_connection(&app_config.database_url)
            .await
            .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
        database::create_tables(&db).await?;
        info!("Database initialized successfully.");
        run(cli, DatabaseStore::new(db), &app_config).await
    }
}

async fn run<S: KeyValueStore>(cli: Cli, backend: S, app_config: &AppConfig) -> Result<()> {
    let store = RosterStore::new(backend).with_policy(app_config.empty_write_policy);

    let seeded = store
        .seed_missing(&app_config.seed)
        .await
        .inspect_err(|e| error!("Failed to seed initial data: {}", e))?;
    if !seeded.is_empty() {
        info!(collections = seeded.len(), "Initial data seeded");
    }

    cli::execute(cli.command, store, app_config).await
}

/// Creates the parent directory of a file-backed `SQLite` URL.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or_default();
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
