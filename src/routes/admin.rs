use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{
    AdminSessionStatus, CreateGameRequest, GameSummary, ListGamesResponse, MutateRequest,
    MutationType, SessionResultsResponse, SessionStatusResponse, SessionSummaryResponse,
    SummaryQuery,
};
use crate::middleware::auth::Claims;
use crate::services::results_service::ResultsService;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_game(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateGameRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let game = state
        .game_service
        .create_game(&claims.sub, &req.name, req.questions)?;
    tracing::info!(game_id = %game.id, owner = %game.owner, "game created");
    Ok(Json(GameSummary {
        id: game.id,
        name: game.name,
        owner: game.owner,
        question_count: game.questions.len(),
        active: None,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn list_games(State(state): State<AppState>) -> crate::error::Result<Response> {
    let games = state
        .game_service
        .list_games()
        .into_iter()
        .map(|game| GameSummary {
            active: state.registry.active_session_for_game(game.id),
            id: game.id,
            name: game.name,
            owner: game.owner,
            question_count: game.questions.len(),
        })
        .collect();
    Ok(Json(ListGamesResponse { games }).into_response())
}

/// Single admin control endpoint, switched on `mutationType` the way the
/// session page drives it: start a fresh session, open the next question,
/// or end the run.
#[axum::debug_handler]
pub async fn mutate_session(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(req): Json<MutateRequest>,
) -> crate::error::Result<Response> {
    match req.mutation_type {
        MutationType::Start => {
            let snapshot = state.game_service.snapshot(game_id)?;
            let session_id = state.registry.start(snapshot)?;
            Ok(Json(json!({ "data": { "sessionId": session_id } })).into_response())
        }
        MutationType::Advance => {
            let engine = state.registry.resolve_by_game(game_id)?;
            let position = engine.advance()?;
            Ok(Json(json!({ "data": { "position": position } })).into_response())
        }
        MutationType::End => {
            let engine = state.registry.resolve_by_game(game_id)?;
            engine.end()?;
            Ok(Json(json!({ "data": { "ended": true } })).into_response())
        }
    }
}

#[axum::debug_handler]
pub async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let engine = state.registry.resolve_by_session(session_id)?;
    let results = engine.with_state(|session| AdminSessionStatus {
        active: session.active,
        position: session.position,
        players: session.players.iter().map(|p| p.name.clone()).collect(),
        questions: session.snapshot.questions.clone(),
        question_started_at: session.question_started_at,
    });
    Ok(Json(SessionStatusResponse { results }).into_response())
}

#[axum::debug_handler]
pub async fn session_results(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let engine = state.registry.resolve_by_session(session_id)?;
    let results = engine.with_state(ResultsService::player_rows);
    Ok(Json(SessionResultsResponse { results }).into_response())
}

#[axum::debug_handler]
pub async fn session_summary(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<SummaryQuery>,
) -> crate::error::Result<Response> {
    let limit = query
        .limit
        .unwrap_or(crate::config::get_config().leaderboard_limit);
    let engine = state.registry.resolve_by_session(session_id)?;
    let summary = engine.with_state(|session| SessionSummaryResponse {
        leaderboard: ResultsService::leaderboard(session, limit),
        correct_rate: ResultsService::per_question_correct_rate(session),
        average_response_seconds: ResultsService::per_question_average_response_seconds(session),
    });
    Ok(Json(summary).into_response())
}
