use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A multiple-choice question attached to one job. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestQuestionRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTestQuestion {
    pub job_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i32,
}

/// The candidate-facing view of a question: no answer key.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<String>,
}

impl From<TestQuestionRow> for PublicQuestion {
    fn from(row: TestQuestionRow) -> Self {
        Self {
            id: row.id,
            question: row.question,
            options: row.options,
        }
    }
}

/// Write-once grading record for an application.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResultRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub answers: Vec<i32>,
    pub correct: i32,
    pub total: i32,
    pub score: f64,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTestResult {
    pub application_id: Uuid,
    pub answers: Vec<i32>,
    pub correct: i32,
    pub total: i32,
    pub score: f64,
}
