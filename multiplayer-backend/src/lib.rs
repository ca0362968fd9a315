pub mod access;
pub mod cache_entry;
pub mod config;
pub mod error;
pub mod helpers;
pub mod messages;
mod routes;
pub mod service;
mod validation;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use access::{DEFAULT_CACHE_TTL, ModeAccess};
pub use service::{MultiplayerService, SERVICE_NAME};

pub struct AppState {
    pub service: MultiplayerService,
}

/// Limits applied to both listeners
#[derive(Debug, Clone, Copy)]
pub struct TransportLimits {
    /// Largest accepted request body in bytes
    pub request_body_limit: usize,
    /// Requests still running after this are answered with 408
    pub request_timeout: Duration,
}

impl Default for TransportLimits {
    fn default() -> Self {
        Self {
            request_body_limit: 64 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

fn procedure(method: &str) -> String {
    format!("/{SERVICE_NAME}/{method}")
}

fn with_transport_layers(router: Router, limits: TransportLimits) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            limits.request_timeout,
        ))
        .layer(RequestBodyLimitLayer::new(limits.request_body_limit))
        .layer(TraceLayer::new_for_http())
}

/// Router exposing every remote procedure as `POST /<service>/<Method>`.
pub fn create_rpc_app(service: MultiplayerService, limits: TransportLimits) -> Router {
    let state = Arc::new(AppState { service });

    let router = Router::new()
        .route(&procedure("GetModeUsage"), post(routes::get_mode_usage))
        .route(&procedure("JoinMode"), post(routes::join_mode))
        .route(&procedure("LeaveMode"), post(routes::leave_mode))
        .route(&procedure("GetModeDetails"), post(routes::get_mode_details))
        .route(
            &procedure("GetActiveUsersByAreaCode"),
            post(routes::get_active_users_by_area_code),
        )
        .route(&procedure("GetGameModeStats"), post(routes::get_game_mode_stats))
        .route(&procedure("GetPlayers"), post(routes::get_players))
        .route(&procedure("UpdateGameState"), post(routes::update_game_state))
        .route(
            &procedure("GetTotalActiveUsers"),
            post(routes::get_total_active_users),
        )
        .with_state(state);

    with_transport_layers(router, limits)
}

/// Public HTTP facade: liveness and the total-active-users aggregate.
pub fn create_http_app(service: MultiplayerService, limits: TransportLimits) -> Router {
    let state = Arc::new(AppState { service });

    let router = Router::new()
        .route("/", get(routes::root))
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/total-active-users", get(routes::total_active_users))
        .with_state(state);

    with_transport_layers(router, limits)
}
