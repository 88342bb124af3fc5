use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::session::SessionState;
use crate::services::scoring_service::ScoringService;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeaderboardEntry {
    #[serde(rename = "playerName")]
    pub player_name: String,
    #[serde(rename = "baseScore")]
    pub base_score: i64,
    #[serde(rename = "advancedScore")]
    pub advanced_score: f64,
}

/// One player's answer to one question, in the shape the results pages
/// consume. `None` cells mean the player never answered that question.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerCell {
    pub correct: bool,
    #[serde(rename = "answeredAt")]
    pub answered_at: DateTime<Utc>,
    #[serde(rename = "questionStartedAt")]
    pub question_started_at: DateTime<Utc>,
    #[serde(rename = "questionPoints")]
    pub question_points: i32,
    #[serde(rename = "questionTimeLimit")]
    pub question_time_limit: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerResultRow {
    pub name: String,
    pub answers: Vec<Option<AnswerCell>>,
}

/// Pure derivations over a session's state. Callers run these through
/// `SessionEngine::with_state` so every read sees a committed snapshot.
pub struct ResultsService;

impl ResultsService {
    /// Base score descending, ties by advanced score descending, then join
    /// order. The sort is stable over the join-ordered player list, so the
    /// output is identical across repeated calls.
    pub fn leaderboard(state: &SessionState, limit: usize) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = state
            .players
            .iter()
            .map(|player| {
                let mut base = 0i64;
                let mut advanced = 0f64;
                for (index, question) in state.snapshot.questions.iter().enumerate() {
                    if let Some(record) = state.answer_for(player.id, index) {
                        base += ScoringService::base_score(question, record.correct);
                        advanced += ScoringService::advanced_score(
                            question,
                            record.correct,
                            record.question_started_at,
                            record.answered_at,
                        );
                    }
                }
                LeaderboardEntry {
                    player_name: player.name.clone(),
                    base_score: base,
                    advanced_score: advanced,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.base_score
                .cmp(&a.base_score)
                .then(b.advanced_score.total_cmp(&a.advanced_score))
        });
        entries.truncate(limit);
        entries
    }

    /// Fraction of joined players who answered each question correctly.
    /// Players who never answered count against the rate.
    pub fn per_question_correct_rate(state: &SessionState) -> Vec<f64> {
        let total = state.players.len();
        (0..state.snapshot.question_count())
            .map(|index| {
                if total == 0 {
                    return 0.0;
                }
                let correct = state
                    .players
                    .iter()
                    .filter(|p| {
                        state
                            .answer_for(p.id, index)
                            .map(|r| r.correct)
                            .unwrap_or(false)
                    })
                    .count();
                correct as f64 / total as f64
            })
            .collect()
    }

    /// Mean response time per question over the players who answered it.
    /// A question nobody answered yields `None`, never a deflated zero.
    pub fn per_question_average_response_seconds(state: &SessionState) -> Vec<Option<f64>> {
        (0..state.snapshot.question_count())
            .map(|index| {
                let times: Vec<f64> = state
                    .players
                    .iter()
                    .filter_map(|p| state.answer_for(p.id, index))
                    .map(|r| {
                        (r.answered_at - r.question_started_at).num_milliseconds() as f64 / 1000.0
                    })
                    .collect();
                if times.is_empty() {
                    None
                } else {
                    Some(times.iter().sum::<f64>() / times.len() as f64)
                }
            })
            .collect()
    }

    /// Per-player answer grid for the admin results page, one row per player
    /// in join order, one cell per question.
    pub fn player_rows(state: &SessionState) -> Vec<PlayerResultRow> {
        state
            .players
            .iter()
            .map(|player| PlayerResultRow {
                name: player.name.clone(),
                answers: Self::answer_cells(state, player.id),
            })
            .collect()
    }

    /// One player's own answer history, for the post-game results screen.
    pub fn player_results(state: &SessionState, player_id: Uuid) -> Result<Vec<Option<AnswerCell>>> {
        if state.player(player_id).is_none() {
            return Err(Error::PlayerUnknown);
        }
        Ok(Self::answer_cells(state, player_id))
    }

    fn answer_cells(state: &SessionState, player_id: Uuid) -> Vec<Option<AnswerCell>> {
        state
            .snapshot
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                state.answer_for(player_id, index).map(|record| AnswerCell {
                    correct: record.correct,
                    answered_at: record.answered_at,
                    question_started_at: record.question_started_at,
                    question_points: question.points,
                    question_time_limit: question.duration_seconds,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{AnswerOption, GameSnapshot, Question, QuestionType};
    use crate::services::session_service::SessionEngine;
    use crate::utils::clock::ManualClock;
    use chrono::Duration;
    use std::sync::Arc;

    fn scenario_snapshot() -> GameSnapshot {
        GameSnapshot {
            game_id: Uuid::new_v4(),
            questions: vec![
                Question {
                    id: 1,
                    question_type: QuestionType::Single,
                    text: "q0".into(),
                    points: 10,
                    duration_seconds: 30,
                    options: vec![
                        AnswerOption { text: "right".into(), correct: true },
                        AnswerOption { text: "wrong".into(), correct: false },
                    ],
                    media: None,
                },
                Question {
                    id: 2,
                    question_type: QuestionType::Multiple,
                    text: "q1".into(),
                    points: 20,
                    duration_seconds: 20,
                    options: vec![
                        AnswerOption { text: "a".into(), correct: true },
                        AnswerOption { text: "b".into(), correct: true },
                        AnswerOption { text: "c".into(), correct: false },
                    ],
                    media: None,
                },
            ],
        }
    }

    /// The reference scenario: A answers Q0 correctly at 5s, B answers it
    /// wrong at 10s, nobody answers Q1.
    fn played_out_engine() -> SessionEngine {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let engine = SessionEngine::new(scenario_snapshot(), clock.clone());
        let a = engine.join("A").unwrap();
        let b = engine.join("B").unwrap();
        engine.advance().unwrap();
        clock.advance(Duration::seconds(5));
        engine.submit_answer(a, &[0]).unwrap();
        clock.advance(Duration::seconds(5));
        engine.submit_answer(b, &[1]).unwrap();
        engine.advance().unwrap();
        engine.end().unwrap();
        engine
    }

    #[test]
    fn leaderboard_matches_reference_scenario() {
        let engine = played_out_engine();
        engine.with_state(|state| {
            let board = ResultsService::leaderboard(state, 5);
            assert_eq!(board.len(), 2);
            assert_eq!(board[0].player_name, "A");
            assert_eq!(board[0].base_score, 10);
            assert_eq!(board[0].advanced_score, 250.0);
            assert_eq!(board[1].player_name, "B");
            assert_eq!(board[1].base_score, 0);
            assert_eq!(board[1].advanced_score, 0.0);
        });
    }

    #[test]
    fn correct_rate_counts_silent_players_in_the_denominator() {
        let engine = played_out_engine();
        engine.with_state(|state| {
            assert_eq!(
                ResultsService::per_question_correct_rate(state),
                vec![0.5, 0.0]
            );
        });
    }

    #[test]
    fn average_response_excludes_missing_answers() {
        let engine = played_out_engine();
        engine.with_state(|state| {
            let avgs = ResultsService::per_question_average_response_seconds(state);
            assert_eq!(avgs[0], Some(7.5));
            assert_eq!(avgs[1], None);
        });
    }

    #[test]
    fn leaderboard_truncates_to_limit() {
        let engine = played_out_engine();
        engine.with_state(|state| {
            assert_eq!(ResultsService::leaderboard(state, 1).len(), 1);
        });
    }

    #[test]
    fn leaderboard_ties_break_on_advanced_score_then_join_order() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let engine = SessionEngine::new(scenario_snapshot(), clock.clone());
        let a = engine.join("A").unwrap();
        let b = engine.join("B").unwrap();
        let c = engine.join("C").unwrap();
        engine.advance().unwrap();
        // All three correct; B fastest, A and C at the same instant.
        clock.advance(Duration::seconds(2));
        engine.submit_answer(b, &[0]).unwrap();
        clock.advance(Duration::seconds(3));
        engine.submit_answer(a, &[0]).unwrap();
        engine.submit_answer(c, &[0]).unwrap();
        engine.end().unwrap();

        engine.with_state(|state| {
            let first = ResultsService::leaderboard(state, 5);
            let names: Vec<_> = first.iter().map(|e| e.player_name.as_str()).collect();
            assert_eq!(names, vec!["B", "A", "C"]);
            // Deterministic across repeated calls on unchanged state.
            assert_eq!(ResultsService::leaderboard(state, 5), first);
        });
    }

    #[test]
    fn player_rows_align_cells_with_question_indices() {
        let engine = played_out_engine();
        engine.with_state(|state| {
            let rows = ResultsService::player_rows(state);
            assert_eq!(rows.len(), 2);
            let a_row = &rows[0];
            assert_eq!(a_row.name, "A");
            assert_eq!(a_row.answers.len(), 2);
            let cell = a_row.answers[0].as_ref().unwrap();
            assert!(cell.correct);
            assert_eq!(cell.question_points, 10);
            assert_eq!(cell.question_time_limit, 30);
            assert!(a_row.answers[1].is_none());
        });
    }

    #[test]
    fn player_results_rejects_unknown_ids() {
        let engine = played_out_engine();
        engine.with_state(|state| {
            assert!(ResultsService::player_results(state, Uuid::new_v4()).is_err());
        });
    }

    #[test]
    fn empty_session_rates_are_zero() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let engine = SessionEngine::new(scenario_snapshot(), clock);
        engine.with_state(|state| {
            assert_eq!(
                ResultsService::per_question_correct_rate(state),
                vec![0.0, 0.0]
            );
            assert_eq!(
                ResultsService::per_question_average_response_seconds(state),
                vec![None, None]
            );
        });
    }
}
