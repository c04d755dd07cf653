//! Directory Sync Server
//!
//! Subscribes to directory user-change notifications and keeps an audit log
//! of every push the provider delivers.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use dirsync_core::directory::GoogleDirectoryClient;
use dirsync_core::framework::DatabaseProcessor;
use dirsync_core::intake::NotificationIntake;
use dirsync_core::lifecycle::LifecycleCoordinator;
use dirsync_core::registry::ChannelRegistry;
use dirsync_core::storage::{ChannelStore, MemoryStore, NotificationStore};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Directory Sync - directory change subscription and notification log
#[derive(Parser, Debug)]
#[command(name = "dirsync-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./dirsync-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Keep channels and notifications in memory instead of PostgreSQL
    #[arg(long, default_value = "false", conflicts_with = "migrate")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting dirsync-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let (shared_config, directory_config) = loaded_config.into_shared();
    tracing::debug!(directory = ?directory_config, "Directory provider configuration");

    // Pick the storage backend
    let db_pool = if args.in_memory {
        tracing::warn!("Using in-memory storage, nothing survives a restart");
        None
    } else {
        Some(connect_database(args.migrate).await?)
    };

    let (channels, notifications): (Arc<dyn ChannelStore>, Arc<dyn NotificationStore>) =
        match &db_pool {
            Some(pool) => {
                let processor = Arc::new(DatabaseProcessor { pool: pool.clone() });
                let channels: Arc<dyn ChannelStore> = processor.clone();
                let notifications: Arc<dyn NotificationStore> = processor;
                (channels, notifications)
            }
            None => {
                let store = Arc::new(MemoryStore::new());
                let channels: Arc<dyn ChannelStore> = store.clone();
                let notifications: Arc<dyn NotificationStore> = store;
                (channels, notifications)
            }
        };

    // Wire up the core components
    let directory = GoogleDirectoryClient::new(directory_config).map_err(|e| {
        tracing::error!("Failed to build directory client: {}", e);
        e
    })?;
    let registry = ChannelRegistry::new(channels);
    let coordinator = LifecycleCoordinator::new(Arc::new(directory), registry.clone());
    let intake = NotificationIntake::new(notifications, registry);

    // Create application state
    let state = AppState::new(shared_config, coordinator, intake);

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Signal the config reload handler to stop
    shutdown_notify.notify_one();

    // Close database connections gracefully
    if let Some(pool) = db_pool {
        tracing::info!("Closing database connections...");
        pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Connect to PostgreSQL and optionally run migrations.
async fn connect_database(migrate: bool) -> anyhow::Result<PgPool> {
    // Get database URL from environment
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    if migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    Ok(db_pool)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
