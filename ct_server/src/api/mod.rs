//! HTTP API for the tournament server.
//!
//! # Modules
//!
//! - [`tournaments`]: Tournament, roster, bracket and match endpoints
//! - [`middleware`]: Request metrics
//! - [`request_id`]: Request id propagation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                                                - Health check
//! GET  /api/v1/tournaments                                    - List tournaments
//! POST /api/v1/tournaments                                    - Create tournament
//! GET  /api/v1/tournaments/{id}                               - Tournament with matches
//! POST /api/v1/tournaments/{id}/participants                  - Register a team
//! PUT  /api/v1/tournaments/{id}/participants/{pid}/status     - Confirm or reject
//! POST /api/v1/tournaments/{id}/bracket                       - Generate bracket
//! POST /api/v1/tournaments/{id}/matches/{number}/start        - Start match
//! POST /api/v1/tournaments/{id}/matches/{number}/result       - Report result
//! GET  /api/v1/tournaments/{id}/stats                         - Progress snapshot
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ct_server::api::{create_router, AppState};
//! use club_tournament::db::InMemoryTournamentRepository;
//! use club_tournament::tournament::{ManagerConfig, TournamentManager};
//! use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let manager = TournamentManager::new(
//!     Arc::new(InMemoryTournamentRepository::new()),
//!     ManagerConfig::default(),
//! );
//! let app = create_router(AppState::in_memory(manager));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod middleware;
pub mod request_id;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use club_tournament::db::Database;
use club_tournament::tournament::TournamentManager;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; both fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<TournamentManager>,
    /// Connection pool probed by the health check, `None` in memory mode
    pub database: Option<Database>,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn new(manager: TournamentManager, database: Database) -> Self {
        Self {
            manager: Arc::new(manager),
            database: Some(database),
        }
    }

    /// State without a database connection
    pub fn in_memory(manager: TournamentManager) -> Self {
        Self {
            manager: Arc::new(manager),
            database: None,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let root_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(middleware::track_requests))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route("/tournaments/{id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{id}/participants",
            post(tournaments::register_participant),
        )
        .route(
            "/tournaments/{id}/participants/{participant_id}/status",
            put(tournaments::set_participant_status),
        )
        .route(
            "/tournaments/{id}/bracket",
            post(tournaments::generate_bracket),
        )
        .route(
            "/tournaments/{id}/matches/{match_number}/start",
            post(tournaments::start_match),
        )
        .route(
            "/tournaments/{id}/matches/{match_number}/result",
            post(tournaments::report_result),
        )
        .route("/tournaments/{id}/stats", get(tournaments::get_stats))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage is reachable, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","storage":"postgres","database":true,"timestamp":"2026-10-19T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (storage, db_healthy) = match &state.database {
        Some(db) => ("postgres", db.health_check().await.is_ok()),
        None => ("memory", true),
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage,
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
