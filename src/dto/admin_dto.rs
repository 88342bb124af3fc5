use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::Question;
use crate::services::results_service::{LeaderboardEntry, PlayerResultRow};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGameRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: Uuid,
    pub name: String,
    pub owner: String,
    pub question_count: usize,
    /// Session id of the game's active session, if one is running.
    pub active: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListGamesResponse {
    pub games: Vec<GameSummary>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationType {
    Start,
    Advance,
    End,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MutateRequest {
    #[serde(rename = "mutationType")]
    pub mutation_type: MutationType,
}

/// Admin view of a running session. Unlike the player contract this keeps
/// the un-redacted questions: the host needs points and correct flags.
#[derive(Debug, Clone, Serialize)]
pub struct AdminSessionStatus {
    pub active: bool,
    pub position: i64,
    pub players: Vec<String>,
    pub questions: Vec<Question>,
    #[serde(rename = "questionStartedAt")]
    pub question_started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusResponse {
    pub results: AdminSessionStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResultsResponse {
    pub results: Vec<PlayerResultRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummaryResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
    #[serde(rename = "correctRate")]
    pub correct_rate: Vec<f64>,
    #[serde(rename = "averageResponseSeconds")]
    pub average_response_seconds: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryQuery {
    pub limit: Option<usize>,
}
