use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Latest interview analysis for an application. Resubmission overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewResultRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub transcript: String,
    pub duration_seconds: i32,
    pub confidence_score: f64,
    pub clarity_score: f64,
    pub emotion_score: f64,
    pub overall_score: f64,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInterviewResult {
    pub application_id: Uuid,
    pub transcript: String,
    pub duration_seconds: i32,
    pub confidence_score: f64,
    pub clarity_score: f64,
    pub emotion_score: f64,
    pub overall_score: f64,
}
