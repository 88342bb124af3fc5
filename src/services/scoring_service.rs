use chrono::{DateTime, Utc};

use crate::models::question::{Question, QuestionType};

/// Pure scoring rules. Correctness is all-or-nothing: partial credit on
/// multiple-choice questions is deliberately not a thing.
pub struct ScoringService;

impl ScoringService {
    /// True iff the submitted index set is exactly the question's correct
    /// set. For `single` and `judgement` that set has one element.
    pub fn is_correct(question: &Question, selected: &[usize]) -> bool {
        let mut submitted: Vec<usize> = selected.to_vec();
        submitted.sort_unstable();
        submitted.dedup();

        let correct = question.correct_indices();
        match question.question_type {
            QuestionType::Single | QuestionType::Judgement => {
                submitted.len() == 1 && submitted == correct
            }
            QuestionType::Multiple => !submitted.is_empty() && submitted == correct,
        }
    }

    pub fn base_score(question: &Question, correct: bool) -> i64 {
        if correct {
            question.points as i64
        } else {
            0
        }
    }

    /// Speed bonus: remaining seconds at submission time multiplied by the
    /// question's points. An answer landing exactly on the deadline is still
    /// correct-eligible but earns zero bonus.
    pub fn advanced_score(
        question: &Question,
        correct: bool,
        question_started_at: DateTime<Utc>,
        answered_at: DateTime<Utc>,
    ) -> f64 {
        if !correct {
            return 0.0;
        }
        let elapsed = (answered_at - question_started_at).num_milliseconds() as f64 / 1000.0;
        let time_remaining = (question.duration_seconds as f64 - elapsed).max(0.0);
        time_remaining * question.points as f64
    }
}
