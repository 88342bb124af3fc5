use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::play_dto::{
    JoinRequest, JoinResponse, PlayQuestionResponse, PlayStatusResponse, SubmitAnswerRequest,
};
use crate::error::Error;
use crate::services::results_service::ResultsService;
use crate::AppState;

#[axum::debug_handler]
pub async fn join(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<JoinRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let player_id = state.registry.join(session_id, &req.name)?;
    Ok(Json(JoinResponse { player_id }).into_response())
}

#[axum::debug_handler]
pub async fn status(
    State(state): State<AppState>,
    Path(player_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let engine = state.registry.resolve_by_player(player_id)?;
    let status = engine.status(player_id)?;
    Ok(Json(PlayStatusResponse {
        position: status.position,
        active: status.active,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn current_question(
    State(state): State<AppState>,
    Path(player_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let engine = state.registry.resolve_by_player(player_id)?;
    let (question, question_started_at) = engine.current_question(player_id)?;
    Ok(Json(PlayQuestionResponse {
        question,
        question_started_at,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(player_id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let engine = state.registry.resolve_by_player(player_id)?;
    engine.submit_answer(player_id, &req.answer_indices)?;
    Ok(Json(json!({ "saved": true })).into_response())
}

/// A player's own answer history. Held back until the session ends so
/// correctness never leaks mid-game.
#[axum::debug_handler]
pub async fn results(
    State(state): State<AppState>,
    Path(player_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let engine = state.registry.resolve_by_player(player_id)?;
    let cells = engine.with_state(|session| {
        if session.active {
            return Err(Error::BadRequest("Session is still ongoing".into()));
        }
        ResultsService::player_results(session, player_id)
    })?;
    Ok(Json(cells).into_response())
}
