//! Test Grader — positional grading of a multiple-choice submission.
//!
//! Question `i` is compared with answer `i`. Missing answers count as wrong,
//! surplus answers are ignored. A job without questions gets `NO_QUESTIONS_SCORE`.

use serde::{Deserialize, Serialize};

use crate::models::assessment::TestQuestionRow;
use crate::scoring::MAX_SCORE;

pub const NO_QUESTIONS_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestGrade {
    pub correct: usize,
    pub total: usize,
    pub score: f64,
}

/// Anything that carries a zero-based correct option index.
pub trait AnswerKey {
    fn correct_index(&self) -> i32;
}

impl AnswerKey for TestQuestionRow {
    fn correct_index(&self) -> i32 {
        self.correct_answer
    }
}

impl AnswerKey for i32 {
    fn correct_index(&self) -> i32 {
        *self
    }
}

pub fn grade<Q: AnswerKey>(questions: &[Q], answers: &[i32]) -> TestGrade {
    let total = questions.len();
    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(q, answer)| q.correct_index() == **answer)
        .count();

    let score = if total == 0 {
        NO_QUESTIONS_SCORE
    } else {
        correct as f64 / total as f64 * MAX_SCORE
    };

    TestGrade {
        correct,
        total,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_correct() {
        let g = grade(&[1, 0, 3], &[1, 0, 3]);
        assert_eq!(g.correct, 3);
        assert_eq!(g.score, 100.0);
    }

    #[test]
    fn test_partial_score_is_exact_ratio() {
        let g = grade(&[1, 0, 3], &[1, 2, 3]);
        assert_eq!(g.correct, 2);
        assert_eq!(g.total, 3);
        assert_eq!(g.score, 2.0 / 3.0 * 100.0);
    }

    #[test]
    fn test_short_answer_list_counts_missing_as_wrong() {
        let g = grade(&[2, 2, 2, 2], &[2]);
        assert_eq!(g.correct, 1);
        assert_eq!(g.score, 25.0);
    }

    #[test]
    fn test_surplus_answers_ignored() {
        let g = grade(&[0, 1], &[0, 1, 0, 1, 0]);
        assert_eq!(g.correct, 2);
        assert_eq!(g.total, 2);
        assert_eq!(g.score, 100.0);
    }

    #[test]
    fn test_no_questions_returns_default() {
        let g = grade::<i32>(&[], &[0, 1]);
        assert_eq!(g.total, 0);
        assert_eq!(g.score, NO_QUESTIONS_SCORE);
    }

    #[test]
    fn test_out_of_range_answer_is_just_wrong() {
        let g = grade(&[0], &[-1]);
        assert_eq!(g.correct, 0);
        assert_eq!(g.score, 0.0);
    }
}
