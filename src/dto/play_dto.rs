use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::PublicQuestion;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JoinRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    #[serde(rename = "playerId")]
    pub player_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayStatusResponse {
    pub position: i64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayQuestionResponse {
    pub question: PublicQuestion,
    #[serde(rename = "questionStartedAt")]
    pub question_started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    // Questions carry at most 6 options; anything past that is a malformed
    // client, rejected before the engine sees it.
    #[validate(length(max = 6))]
    #[serde(rename = "answerIndices")]
    pub answer_indices: Vec<usize>,
}
