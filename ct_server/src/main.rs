//! Club tournament server.
//!
//! Serves the tournament API over HTTP, backed by PostgreSQL or, with
//! `--in-memory`, by a process-local repository.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Error};
use club_tournament::db::{Database, InMemoryTournamentRepository, PgTournamentRepository};
use club_tournament::tournament::TournamentManager;
use ct_server::api::{self, AppState};
use ct_server::config::{ServerConfig, StorageMode};
use ct_server::{logging, metrics};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run the club tournament server

USAGE:
  ct_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/club_tournaments]

FLAGS:
  --in-memory              Keep tournaments in memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                        Server bind address (e.g., 0.0.0.0:8080)
  METRICS_BIND                       Prometheus scrape address (disabled when unset)
  DATABASE_URL                       PostgreSQL connection string
  DB_STATEMENT_TIMEOUT               Per-query timeout in seconds
  TOURNAMENT_MAX_CONFLICT_RETRIES    Retries after a concurrent update
  RUST_LOG                           Log filter
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        in_memory: pargs.contains("--in-memory"),
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.in_memory)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics exposed at http://{}/metrics", addr);
    }

    let state = match config.storage {
        StorageMode::InMemory => {
            info!("Using in-memory tournament storage");
            let repo = Arc::new(InMemoryTournamentRepository::new());
            AppState::in_memory(TournamentManager::new(repo, config.manager.clone()))
        }
        StorageMode::Postgres => {
            info!("Connecting to database");
            let db = Database::new(&config.database)
                .await
                .context("Failed to connect to database")?;
            db.ensure_schema()
                .await
                .context("Failed to create tournament schema")?;
            info!("Database connected successfully");

            let repo = Arc::new(PgTournamentRepository::new(
                db.pool().clone(),
                Duration::from_secs(config.database.statement_timeout_secs),
            ));
            AppState::new(TournamentManager::new(repo, config.manager.clone()), db)
        }
    };

    let database = state.database.clone();
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
