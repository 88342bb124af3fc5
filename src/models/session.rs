use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::{GameSnapshot, Question};

/// Position value meaning "lobby": the session has started but no question
/// has been opened yet. Players may only join while the session sits here.
pub const LOBBY_POSITION: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

/// One answer per (player, question). A resubmission within the question
/// window replaces the whole record; `correct` is derived at write time
/// against the snapshot's correct-option set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Selected option indices, kept sorted and deduplicated.
    pub selected: Vec<usize>,
    pub question_started_at: DateTime<Utc>,
    pub answered_at: DateTime<Utc>,
    pub correct: bool,
}

/// Authoritative state of one running session. Owned exclusively by its
/// `SessionEngine`; every read and write happens under the engine's lock.
#[derive(Debug)]
pub struct SessionState {
    pub session_id: Uuid,
    pub snapshot: GameSnapshot,
    /// Players in join order. Join order is the final leaderboard tie-break,
    /// so it must stay stable.
    pub players: Vec<Player>,
    /// -1 = lobby, 0..N-1 = index of the open question.
    pub position: i64,
    /// False once the admin ends the session; the state is read-only after.
    pub active: bool,
    /// Set atomically with every `position` advance.
    pub question_started_at: Option<DateTime<Utc>>,
    /// player id -> question index -> latest answer.
    pub answers: HashMap<Uuid, BTreeMap<usize, AnswerRecord>>,
}

impl SessionState {
    pub fn new(session_id: Uuid, snapshot: GameSnapshot) -> Self {
        Self {
            session_id,
            snapshot,
            players: Vec::new(),
            position: LOBBY_POSITION,
            active: true,
            question_started_at: None,
            answers: HashMap::new(),
        }
    }

    pub fn in_lobby(&self) -> bool {
        self.position == LOBBY_POSITION
    }

    pub fn last_question_index(&self) -> i64 {
        self.snapshot.question_count() as i64 - 1
    }

    pub fn player(&self, player_id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.in_lobby() {
            return None;
        }
        self.snapshot.questions.get(self.position as usize)
    }

    pub fn answer_for(&self, player_id: Uuid, question_index: usize) -> Option<&AnswerRecord> {
        self.answers.get(&player_id)?.get(&question_index)
    }
}
