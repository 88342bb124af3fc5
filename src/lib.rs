pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::services::{game_service::GameService, registry_service::SessionRegistry};
use crate::utils::clock::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppState {
    pub game_service: GameService,
    pub registry: SessionRegistry,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Build the state over an explicit clock so tests can drive time.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            game_service: GameService::new(clock.clone()),
            registry: SessionRegistry::new(clock),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Full application router: health, authenticated admin surface, and the
/// open play surface, each behind its own rate limiter.
pub fn app(state: AppState) -> Router {
    let config = crate::config::get_config();

    let admin_api = Router::new()
        .route(
            "/admin/games",
            get(routes::admin::list_games).post(routes::admin::create_game),
        )
        .route("/admin/game/:game_id/mutate", post(routes::admin::mutate_session))
        .route(
            "/admin/session/:session_id/status",
            get(routes::admin::session_status),
        )
        .route(
            "/admin/session/:session_id/results",
            get(routes::admin::session_results),
        )
        .route(
            "/admin/session/:session_id/summary",
            get(routes::admin::session_summary),
        )
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.admin_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let play_api = Router::new()
        .route("/play/join/:session_id", post(routes::play::join))
        .route("/play/:player_id/status", get(routes::play::status))
        .route("/play/:player_id/question", get(routes::play::current_question))
        .route("/play/:player_id/answer", put(routes::play::submit_answer))
        .route("/play/:player_id/results", get(routes::play::results))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.play_rps),
            middleware::rate_limit::rps_middleware,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(admin_api)
        .merge(play_api)
        .with_state(state)
}
