use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::question::{GameSnapshot, PublicQuestion};
use crate::models::session::{AnswerRecord, Player, SessionState};
use crate::services::scoring_service::ScoringService;
use crate::utils::clock::Clock;

/// What a polling player (or the admin page) sees of a session. Committed
/// atomically with the transition that produced it: a new position is never
/// observable with a stale start timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub position: i64,
    pub active: bool,
}

/// Orchestrates every operation against one session's state. All public
/// methods take the single state lock for one short, non-blocking critical
/// section, which is what makes the operations linearizable.
pub struct SessionEngine {
    session_id: Uuid,
    game_id: Uuid,
    state: Mutex<SessionState>,
    clock: Arc<dyn Clock>,
}

impl SessionEngine {
    pub fn new(snapshot: GameSnapshot, clock: Arc<dyn Clock>) -> Self {
        let session_id = Uuid::new_v4();
        let game_id = snapshot.game_id;
        Self {
            session_id,
            game_id,
            state: Mutex::new(SessionState::new(session_id, snapshot)),
            clock,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn game_id(&self) -> Uuid {
        self.game_id
    }

    /// Open the next question. Rejected once the last question is open so
    /// the admin UI can tell "show results" apart from "advance again".
    pub fn advance(&self) -> Result<i64> {
        let mut state = self.lock_state();
        if !state.active {
            return Err(Error::NotActive);
        }
        if state.position >= state.last_question_index() {
            return Err(Error::AlreadyFinished);
        }
        state.position += 1;
        state.question_started_at = Some(self.clock.now());
        tracing::info!(
            session_id = %self.session_id,
            position = state.position,
            "advanced to next question"
        );
        Ok(state.position)
    }

    /// Terminal transition, reachable from any non-terminal state including
    /// mid-question. Position and answers are kept for aggregation.
    pub fn end(&self) -> Result<()> {
        let mut state = self.lock_state();
        if !state.active {
            return Err(Error::NotActive);
        }
        state.active = false;
        tracing::info!(session_id = %self.session_id, "session ended");
        Ok(())
    }

    /// Admit a player. The join window is lobby-only: latecomers are turned
    /// away once the first question has opened.
    pub fn join(&self, display_name: &str) -> Result<Uuid> {
        let name = display_name.trim();
        if name.is_empty() {
            return Err(Error::BadRequest("Display name must not be empty".into()));
        }
        let mut state = self.lock_state();
        if !state.active {
            return Err(Error::NotActive);
        }
        if !state.in_lobby() {
            return Err(Error::NotJoinable);
        }
        let player = Player {
            id: Uuid::new_v4(),
            name: name.to_string(),
            joined_at: self.clock.now(),
        };
        let player_id = player.id;
        state.players.push(player);
        tracing::info!(session_id = %self.session_id, %player_id, "player joined");
        Ok(player_id)
    }

    pub fn status(&self, player_id: Uuid) -> Result<SessionStatus> {
        let state = self.lock_state();
        if state.player(player_id).is_none() {
            return Err(Error::PlayerUnknown);
        }
        Ok(SessionStatus {
            position: state.position,
            active: state.active,
        })
    }

    /// The open question with correctness stripped, plus the authoritative
    /// moment it opened (the client countdown is advisory only).
    pub fn current_question(&self, player_id: Uuid) -> Result<(PublicQuestion, DateTime<Utc>)> {
        let state = self.lock_state();
        if state.player(player_id).is_none() {
            return Err(Error::PlayerUnknown);
        }
        let question = state.current_question().ok_or(Error::NoCurrentQuestion)?;
        let started_at = state
            .question_started_at
            .ok_or(Error::NoCurrentQuestion)?;
        Ok((question.redacted(), started_at))
    }

    /// Record an answer for the open question. Last write wins while the
    /// window is open; a late submission is dropped without touching any
    /// previously recorded answer.
    pub fn submit_answer(&self, player_id: Uuid, selected: &[usize]) -> Result<()> {
        let mut state = self.lock_state();
        if !state.active {
            return Err(Error::NotActive);
        }
        if state.player(player_id).is_none() {
            return Err(Error::PlayerUnknown);
        }
        let question = state.current_question().ok_or(Error::NoCurrentQuestion)?;
        let question_started_at = state
            .question_started_at
            .ok_or(Error::NoCurrentQuestion)?;

        if selected.iter().any(|&i| i >= question.options.len()) {
            return Err(Error::BadRequest("Option index out of range".into()));
        }

        let now = self.clock.now();
        let deadline =
            question_started_at + Duration::seconds(question.duration_seconds as i64);
        if now > deadline {
            tracing::warn!(
                session_id = %self.session_id,
                %player_id,
                position = state.position,
                "rejected answer past the deadline"
            );
            return Err(Error::DeadlineExceeded);
        }

        let correct = ScoringService::is_correct(question, selected);
        let mut indices: Vec<usize> = selected.to_vec();
        indices.sort_unstable();
        indices.dedup();
        let record = AnswerRecord {
            selected: indices,
            question_started_at,
            answered_at: now,
            correct,
        };
        let position = state.position as usize;
        state
            .answers
            .entry(player_id)
            .or_default()
            .insert(position, record);
        Ok(())
    }

    /// Run a read-only closure against the state under the lock. Used by the
    /// results aggregator so its reads see a committed snapshot.
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let state = self.lock_state();
        f(&state)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state mutex poisoned")
    }
}
