use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: i32,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default = "default_points")]
    pub points: i32,
    /// Answer window in seconds, counted from the moment the question opens.
    pub duration_seconds: i32,
    pub options: Vec<AnswerOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Single,
    Multiple,
    Judgement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl Question {
    /// Indices of the options flagged correct, in option order.
    pub fn correct_indices(&self) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.correct)
            .map(|(i, _)| i)
            .collect()
    }

    /// Authoring-time shape check. Correct-option cardinality is enforced
    /// here once so scoring never has to re-derive it.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::BadRequest("Question text must not be empty".into()));
        }
        if self.points <= 0 {
            return Err(Error::BadRequest("Question points must be positive".into()));
        }
        if self.duration_seconds <= 0 {
            return Err(Error::BadRequest(
                "Question duration must be positive".into(),
            ));
        }
        if !(2..=6).contains(&self.options.len()) {
            return Err(Error::BadRequest(
                "Question must have between two and six options".into(),
            ));
        }
        let correct_count = self.options.iter().filter(|o| o.correct).count();
        match self.question_type {
            QuestionType::Single => {
                if correct_count != 1 {
                    return Err(Error::BadRequest(
                        "Single choice question must have exactly one correct option".into(),
                    ));
                }
            }
            QuestionType::Judgement => {
                if self.options.len() != 2 || correct_count != 1 {
                    return Err(Error::BadRequest(
                        "Judgement question must have two options with exactly one correct".into(),
                    ));
                }
            }
            QuestionType::Multiple => {
                if !(2..=6).contains(&correct_count) {
                    return Err(Error::BadRequest(
                        "Multiple choice question must have between 2 and 6 correct options".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// The question as players may see it: correctness flags stripped.
    pub fn redacted(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id,
            question_type: self.question_type,
            text: self.text.clone(),
            points: self.points,
            duration_seconds: self.duration_seconds,
            options: self.options.iter().map(|o| o.text.clone()).collect(),
            media: self.media.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i32,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub points: i32,
    pub duration_seconds: i32,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
}

/// Immutable copy of a game's question list, taken once when a session
/// starts. Authoring edits made afterwards never reach a running session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: uuid::Uuid,
    pub questions: Vec<Question>,
}

impl GameSnapshot {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}
