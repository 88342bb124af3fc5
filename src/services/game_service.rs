use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::game::Game;
use crate::models::question::{GameSnapshot, Question};
use crate::utils::clock::Clock;

/// Minimal in-memory authoring store. The session engine treats it as a
/// read-only collaborator: `snapshot` copies the question list once at
/// start time, after which authoring edits cannot reach a running session.
#[derive(Clone)]
pub struct GameService {
    games: Arc<RwLock<HashMap<Uuid, Game>>>,
    clock: Arc<dyn Clock>,
}

impl GameService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            games: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    pub fn create_game(&self, owner: &str, name: &str, questions: Vec<Question>) -> Result<Game> {
        if name.trim().is_empty() {
            return Err(Error::BadRequest("Game name must not be empty".into()));
        }
        for question in &questions {
            question.validate()?;
        }
        let game = Game {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            owner: owner.to_string(),
            questions,
            created_at: self.clock.now(),
        };
        self.write().insert(game.id, game.clone());
        Ok(game)
    }

    pub fn get_game(&self, game_id: Uuid) -> Result<Game> {
        self.read()
            .get(&game_id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Unknown game id".into()))
    }

    /// Games sorted by creation time so listings are stable.
    pub fn list_games(&self) -> Vec<Game> {
        let mut games: Vec<Game> = self.read().values().cloned().collect();
        games.sort_by_key(|g| (g.created_at, g.id));
        games
    }

    pub fn snapshot(&self, game_id: Uuid) -> Result<GameSnapshot> {
        let game = self.get_game(game_id)?;
        Ok(GameSnapshot {
            game_id: game.id,
            questions: game.questions,
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, Game>> {
        self.games.read().expect("game store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Game>> {
        self.games.write().expect("game store lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{AnswerOption, QuestionType};
    use crate::utils::clock::SystemClock;

    fn service() -> GameService {
        GameService::new(Arc::new(SystemClock))
    }

    fn valid_question() -> Question {
        Question {
            id: 1,
            question_type: QuestionType::Single,
            text: "q".into(),
            points: 5,
            duration_seconds: 15,
            options: vec![
                AnswerOption { text: "a".into(), correct: true },
                AnswerOption { text: "b".into(), correct: false },
            ],
            media: None,
        }
    }

    #[test]
    fn create_and_fetch_round_trip() {
        let service = service();
        let game = service
            .create_game("admin@example.com", "Trivia Night", vec![valid_question()])
            .unwrap();
        assert_eq!(service.get_game(game.id).unwrap().name, "Trivia Night");
    }

    #[test]
    fn invalid_questions_are_rejected_at_authoring_time() {
        let service = service();
        let mut bad = valid_question();
        bad.options[1].correct = true;
        assert!(service
            .create_game("admin@example.com", "Broken", vec![bad])
            .is_err());
    }

    #[test]
    fn snapshot_is_a_copy() {
        let service = service();
        let game = service
            .create_game("admin@example.com", "Trivia", vec![valid_question()])
            .unwrap();
        let snapshot = service.snapshot(game.id).unwrap();
        assert_eq!(snapshot.game_id, game.id);
        assert_eq!(snapshot.question_count(), 1);
    }
}
