//! # HTTP/JSON Gateway
//!
//! Maps the `MatchConsensusApi` surface onto axum routes.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | `/matches` | propose |
//! | GET | `/matches?filter=sent\|received\|all` | list |
//! | GET | `/matches/:id` | get match |
//! | POST | `/matches/:id/respond` | respond |
//! | POST | `/matches/:id/complete` | complete |
//! | POST | `/matches/:id/outcome` | report |
//! | GET | `/matches/:id/outcome` | get outcome |
//! | POST | `/outcomes/:id/verify` | verify |
//! | GET | `/teams/:id/statistics` | team statistics |
//! | GET | `/health` | liveness |
//! | GET | `/metrics` | Prometheus exposition |
//!
//! Everything except `/health` and `/metrics` requires a bearer token.

pub mod auth;
pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use match_consensus::{IdentityProvider, MatchConsensusApi};
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::container::GatewayConfig;

pub use auth::Caller;
pub use error::{ApiError, ErrorBody};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Core service.
    pub api: Arc<dyn MatchConsensusApi>,
    /// Bearer-token resolution.
    pub identity: Arc<dyn IdentityProvider>,
}

/// Build the gateway router.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    Router::new()
        .route(
            "/matches",
            post(handlers::propose_match).get(handlers::list_matches),
        )
        .route("/matches/:id", get(handlers::get_match))
        .route("/matches/:id/respond", post(handlers::respond_to_match))
        .route("/matches/:id/complete", post(handlers::complete_match))
        .route(
            "/matches/:id/outcome",
            post(handlers::report_outcome).get(handlers::get_outcome),
        )
        .route("/outcomes/:id/verify", post(handlers::verify_outcome))
        .route("/teams/:id/statistics", get(handlers::team_statistics))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
