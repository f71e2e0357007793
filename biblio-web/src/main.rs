//! biblio-web - Translator catalog service
//!
//! Serves the public book catalog and the admin editing API. Runs on a
//! SQLite database when one is configured, otherwise on a flat JSON file.
//!
//! Subcommands:
//! - `serve` (default): run the HTTP server
//! - `import <file>`: load a JSON array of books into the configured store

use std::path::PathBuf;

use anyhow::{Context, Result};
use biblio_common::auth::SessionStore;
use biblio_common::config::{Config, ConfigOverrides};
use biblio_common::store::import_json;
use biblio_web::{build_router, open_store, AppState};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for biblio-web
#[derive(Parser, Debug)]
#[command(name = "biblio-web")]
#[command(about = "Public catalog and admin API for a translator's bibliography")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, global = true, env = "BIBLIO_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, global = true, env = "BIBLIO_BIND")]
    bind: Option<String>,

    /// SQLite database path (JSON file fallback when unset)
    #[arg(long, global = true, env = "BIBLIO_DATABASE")]
    database: Option<PathBuf>,

    /// JSON catalog file used as fallback storage
    #[arg(long, global = true, env = "BIBLIO_LIVRES_FILE")]
    livres_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Import a JSON array of books into the configured store
    Import {
        /// Source file
        file: PathBuf,
    },
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            bind: self.bind.clone(),
            database: self.database.clone(),
            livres_file: self.livres_file.clone(),
            ..ConfigOverrides::default()
        }
        .with_env()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biblio_web=info,biblio_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any slow startup step
    info!(
        "Starting biblio-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = Config::load(args.overrides());
    let store = open_store(&config).await;

    match args.command.unwrap_or(Command::Serve) {
        Command::Import { file } => {
            let summary = import_json(store.as_ref(), &file)
                .await
                .with_context(|| format!("Failed to import {}", file.display()))?;

            info!("✓ {} records imported", summary.inserted);
            if summary.skipped > 0 {
                warn!("{} records without a title skipped", summary.skipped);
            }
            if summary.failed > 0 {
                warn!("{} records could not be imported", summary.failed);
            }
            Ok(())
        }
        Command::Serve => serve(config, store).await,
    }
}

async fn serve(
    config: Config,
    store: std::sync::Arc<dyn biblio_common::CatalogStore>,
) -> Result<()> {
    if config.admin_password.is_none() {
        warn!("ADMIN_PASSWORD not set: admin login disabled");
    }

    let sessions = SessionStore::with_ttl_hours(config.session_ttl_hours);
    let state = AppState::new(store, sessions, config.admin_password.clone());
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("biblio-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
