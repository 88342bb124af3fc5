use std::sync::Arc;
use std::thread;

use chrono::Utc;
use uuid::Uuid;

use quizhost_backend::error::Error;
use quizhost_backend::models::question::{AnswerOption, GameSnapshot, Question, QuestionType};
use quizhost_backend::services::results_service::ResultsService;
use quizhost_backend::services::session_service::SessionEngine;
use quizhost_backend::utils::clock::ManualClock;

fn snapshot(question_count: i32) -> GameSnapshot {
    GameSnapshot {
        game_id: Uuid::new_v4(),
        questions: (0..question_count)
            .map(|i| Question {
                id: i,
                question_type: QuestionType::Single,
                text: format!("q{}", i),
                points: 10,
                duration_seconds: 60,
                options: vec![
                    AnswerOption { text: "right".into(), correct: true },
                    AnswerOption { text: "wrong".into(), correct: false },
                ],
                media: None,
            })
            .collect(),
    }
}

/// One admin advancing while many players hammer answers: no submission may
/// land on a question other than the one open at its commit instant, and
/// every stored record must be internally consistent.
#[test]
fn concurrent_players_and_admin_never_break_invariants() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine = Arc::new(SessionEngine::new(snapshot(8), clock));

    let players: Vec<Uuid> = (0..16)
        .map(|i| engine.join(&format!("player-{}", i)).unwrap())
        .collect();

    let admin = {
        let engine = engine.clone();
        thread::spawn(move || {
            for _ in 0..8 {
                engine.advance().unwrap();
                thread::yield_now();
            }
            engine.end().unwrap();
        })
    };

    let workers: Vec<_> = players
        .iter()
        .map(|&player| {
            let engine = engine.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    match engine.submit_answer(player, &[0]) {
                        Ok(())
                        | Err(Error::NoCurrentQuestion)
                        | Err(Error::NotActive)
                        | Err(Error::DeadlineExceeded) => {}
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
            })
        })
        .collect();

    admin.join().unwrap();
    for worker in workers {
        worker.join().unwrap();
    }

    engine.with_state(|state| {
        assert!(!state.active);
        assert_eq!(state.position, 7);
        for records in state.answers.values() {
            for (&index, record) in records {
                // Records only ever reference real questions.
                assert!(index < state.snapshot.question_count());
                // A record's timestamps are ordered and from the same window.
                assert!(record.answered_at >= record.question_started_at);
                // Answers to correct option are marked correct.
                assert!(record.correct);
            }
        }
    });
}

/// Status polls taken while the admin advances must always see a position
/// paired with the timestamp committed alongside it.
#[test]
fn status_never_observes_a_half_advanced_session() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine = Arc::new(SessionEngine::new(snapshot(32), clock.clone()));
    let observer = engine.join("observer").unwrap();

    let admin = {
        let engine = engine.clone();
        let clock = clock.clone();
        thread::spawn(move || {
            for _ in 0..32 {
                clock.advance(chrono::Duration::seconds(1));
                engine.advance().unwrap();
            }
        })
    };

    let poller = {
        let engine = engine.clone();
        thread::spawn(move || {
            let mut last_position = -1;
            for _ in 0..2000 {
                let status = engine.status(observer).unwrap();
                // Position never runs backwards under concurrent advances.
                assert!(status.position >= last_position);
                last_position = status.position;
                engine.with_state(|state| {
                    // A non-lobby position always has its start timestamp.
                    if state.position >= 0 {
                        assert!(state.question_started_at.is_some());
                    }
                });
            }
        })
    };

    admin.join().unwrap();
    poller.join().unwrap();

    engine.with_state(|state| {
        assert_eq!(state.position, 31);
        let rates = ResultsService::per_question_correct_rate(state);
        assert_eq!(rates.len(), 32);
    });
}
