//! Axum route handlers for jobs and their test questions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::interview_questions::interview_questions;
use crate::models::assessment::{NewTestQuestion, PublicQuestion, TestQuestionRow};
use crate::models::job::{JobRow, NewJob};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddQuestionRequest {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i32,
}

#[derive(Debug, Serialize)]
pub struct QuestionListResponse {
    pub job_id: Uuid,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Serialize)]
pub struct InterviewQuestionsResponse {
    pub job_id: Uuid,
    pub job_title: String,
    pub questions: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }

    let job = state
        .store
        .create_job(NewJob {
            title: title.to_string(),
            description: req.description,
            skills: req
                .skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
        .await?;

    tracing::info!("Created job {} ({} skills)", job.id, job.skills.len());
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobRow>>, AppError> {
    Ok(Json(state.store.list_jobs().await?))
}

/// GET /api/v1/jobs/:job_id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    Ok(Json(load_job(&state, job_id).await?))
}

/// POST /api/v1/jobs/:job_id/questions
///
/// Adds a multiple-choice question. `correct_answer` is a zero-based index
/// into `options`. Questions are graded in the order they were added.
pub async fn handle_add_question(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<AddQuestionRequest>,
) -> Result<(StatusCode, Json<TestQuestionRow>), AppError> {
    validate_question(&req)?;
    load_job(&state, job_id).await?;

    let question = state
        .store
        .add_question(NewTestQuestion {
            job_id,
            question: req.question.trim().to_string(),
            options: req.options,
            correct_answer: req.correct_answer,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// GET /api/v1/jobs/:job_id/questions
///
/// Candidate view of the test: answer keys are stripped.
pub async fn handle_list_questions(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<QuestionListResponse>, AppError> {
    load_job(&state, job_id).await?;
    let questions = state
        .store
        .questions_for_job(job_id)
        .await?
        .into_iter()
        .map(PublicQuestion::from)
        .collect();
    Ok(Json(QuestionListResponse { job_id, questions }))
}

/// GET /api/v1/jobs/:job_id/interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<InterviewQuestionsResponse>, AppError> {
    let job = load_job(&state, job_id).await?;
    let questions = interview_questions(&job.title, &job.skill_set());
    Ok(Json(InterviewQuestionsResponse {
        job_id,
        job_title: job.title,
        questions,
    }))
}

async fn load_job(state: &AppState, job_id: Uuid) -> Result<JobRow, AppError> {
    state
        .store
        .get_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

fn validate_question(req: &AddQuestionRequest) -> Result<(), AppError> {
    if req.question.trim().is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }
    if req.options.is_empty() {
        return Err(AppError::Validation("options cannot be empty".to_string()));
    }
    let in_range = usize::try_from(req.correct_answer)
        .map(|i| i < req.options.len())
        .unwrap_or(false);
    if !in_range {
        return Err(AppError::Validation(format!(
            "correct_answer must be between 0 and {}",
            req.options.len() - 1
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(options: &[&str], correct_answer: i32) -> AddQuestionRequest {
        AddQuestionRequest {
            question: "Which keyword declares an immutable binding?".into(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer,
        }
    }

    #[test]
    fn test_valid_question() {
        assert!(validate_question(&request(&["let", "var", "mut"], 0)).is_ok());
        assert!(validate_question(&request(&["let", "var", "mut"], 2)).is_ok());
    }

    #[test]
    fn test_answer_index_out_of_range() {
        assert!(validate_question(&request(&["let", "var"], 2)).is_err());
        assert!(validate_question(&request(&["let", "var"], -1)).is_err());
    }

    #[test]
    fn test_empty_options_or_question() {
        assert!(validate_question(&request(&[], 0)).is_err());
        let mut blank = request(&["a"], 0);
        blank.question = "   ".into();
        assert!(validate_question(&blank).is_err());
    }
}
