use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness endpoint for the session hosts' load balancer. Deliberately does
/// not touch the registry: a wedged session must not fail the whole process
/// out of rotation.
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}
