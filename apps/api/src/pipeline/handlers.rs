//! Axum route handlers for the screening pipeline: apply, test, interview,
//! rankings and stats.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::models::assessment::TestResultRow;
use crate::models::interview::InterviewResultRow;
use crate::pipeline::report::{build_rankings, RankingEntry};
use crate::pipeline::ApplyInput;
use crate::scoring::rank_engine::RankAssignment;
use crate::scoring::round2;
use crate::state::AppState;
use crate::store::ScreeningStats;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ApplicationView {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub resume_filename: Option<String>,
    pub matched_skills: Vec<String>,
    pub resume_score: f64,
    pub test_score: f64,
    pub interview_score: f64,
    pub final_score: f64,
    pub rank: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ApplicationRow> for ApplicationView {
    fn from(app: ApplicationRow) -> Self {
        Self {
            id: app.id,
            candidate_id: app.candidate_id,
            job_id: app.job_id,
            status: app.status,
            resume_filename: app.resume_filename,
            matched_skills: app.matched_skills,
            resume_score: round2(app.resume_score),
            test_score: round2(app.test_score),
            interview_score: round2(app.interview_score),
            final_score: round2(app.final_score),
            rank: app.rank,
            created_at: app.created_at,
            updated_at: app.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub application: ApplicationView,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestSubmitRequest {
    pub application_id: Uuid,
    pub candidate_id: Uuid,
    pub answers: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct TestSubmitResponse {
    pub application: ApplicationView,
    pub correct: usize,
    pub total: usize,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct InterviewSubmitRequest {
    pub application_id: Uuid,
    pub candidate_id: Uuid,
    pub transcript: String,
    #[serde(default)]
    pub duration_seconds: u32,
}

#[derive(Debug, Serialize)]
pub struct InterviewSubmitResponse {
    pub application: ApplicationView,
    pub word_count: usize,
    pub filler_count: usize,
    pub confidence_score: f64,
    pub clarity_score: f64,
    pub emotion_score: f64,
    pub interview_score: f64,
}

#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    pub job_id: Uuid,
    pub job_title: String,
    pub rankings: Vec<RankingEntry>,
}

#[derive(Debug, Serialize)]
pub struct RecomputeResponse {
    pub job_id: Uuid,
    pub ranks: Vec<RankAssignment>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/:job_id/apply
///
/// Multipart form with a `candidate_id` text field and a `resume` file.
/// Undecodable résumé bytes are dropped, never rejected.
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApplyResponse>), AppError> {
    let mut candidate_id: Option<Uuid> = None;
    let mut resume: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("candidate_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable candidate_id: {e}")))?;
                let parsed = raw
                    .trim()
                    .parse::<Uuid>()
                    .map_err(|_| AppError::Validation("candidate_id must be a UUID".to_string()))?;
                candidate_id = Some(parsed);
            }
            Some("resume") => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable resume upload: {e}")))?;
                resume = Some((filename, bytes));
            }
            _ => {}
        }
    }

    let candidate_id =
        candidate_id.ok_or_else(|| AppError::Validation("candidate_id is required".to_string()))?;
    let (resume_filename, resume_bytes) =
        resume.ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;

    let outcome = state
        .pipeline
        .apply(ApplyInput {
            job_id,
            candidate_id,
            resume_filename,
            resume_bytes: &resume_bytes,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            application: outcome.application.into(),
            missing_skills: outcome.resume.missing_skills,
        }),
    ))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ApplicationView>, AppError> {
    let application = state
        .store
        .get_application(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;
    Ok(Json(application.into()))
}

/// GET /api/v1/applications/:id/test
///
/// The stored, write-once grading record.
pub async fn handle_get_test_result(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<TestResultRow>, AppError> {
    require_application(&state, application_id).await?;
    let result = state
        .store
        .get_test_result(application_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No test submitted for application {application_id}"))
        })?;
    Ok(Json(result))
}

/// GET /api/v1/applications/:id/interview
///
/// The latest interview result; a retake replaces it.
pub async fn handle_get_interview_result(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<InterviewResultRow>, AppError> {
    require_application(&state, application_id).await?;
    let result = state
        .store
        .get_interview_result(application_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No interview submitted for application {application_id}"
            ))
        })?;
    Ok(Json(result))
}

/// GET /api/v1/candidates/:candidate_id/applications
pub async fn handle_candidate_applications(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    let applications = state
        .store
        .applications_for_candidate(candidate_id)
        .await?
        .into_iter()
        .map(ApplicationView::from)
        .collect();
    Ok(Json(applications))
}

/// POST /api/v1/tests/submit
///
/// Write-once: a second submission for the same application is a 409 and
/// leaves the first result in place.
pub async fn handle_submit_test(
    State(state): State<AppState>,
    Json(req): Json<TestSubmitRequest>,
) -> Result<Json<TestSubmitResponse>, AppError> {
    let outcome = state
        .pipeline
        .submit_test(req.application_id, req.candidate_id, req.answers)
        .await?;

    Ok(Json(TestSubmitResponse {
        application: outcome.application.into(),
        correct: outcome.grade.correct,
        total: outcome.grade.total,
        score: round2(outcome.grade.score),
    }))
}

/// POST /api/v1/interviews/submit
///
/// Completes the application and re-ranks its job. Resubmitting replaces the
/// previous interview.
pub async fn handle_submit_interview(
    State(state): State<AppState>,
    Json(req): Json<InterviewSubmitRequest>,
) -> Result<Json<InterviewSubmitResponse>, AppError> {
    let outcome = state
        .pipeline
        .submit_interview(
            req.application_id,
            req.candidate_id,
            &req.transcript,
            req.duration_seconds,
        )
        .await?;

    let analysis = outcome.analysis;
    Ok(Json(InterviewSubmitResponse {
        application: outcome.application.into(),
        word_count: analysis.word_count,
        filler_count: analysis.filler_count,
        confidence_score: round2(analysis.confidence),
        clarity_score: round2(analysis.clarity),
        emotion_score: round2(analysis.emotion),
        interview_score: round2(analysis.overall),
    }))
}

/// GET /api/v1/jobs/:job_id/rankings
pub async fn handle_rankings(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<RankingsResponse>, AppError> {
    let job = state
        .store
        .get_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    let applications = state.store.applications_for_job(job_id).await?;

    Ok(Json(RankingsResponse {
        job_id,
        job_title: job.title,
        rankings: build_rankings(applications),
    }))
}

/// POST /api/v1/jobs/:job_id/rankings/recompute
///
/// Also the recovery path when a submission stored its scores but the
/// follow-up re-rank failed.
pub async fn handle_recompute_rankings(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<RecomputeResponse>, AppError> {
    let ranks = state
        .pipeline
        .recompute_ranks(job_id)
        .await?
        .into_iter()
        .map(|r| RankAssignment {
            final_score: round2(r.final_score),
            ..r
        })
        .collect();
    Ok(Json(RecomputeResponse { job_id, ranks }))
}

/// GET /api/v1/stats
pub async fn handle_stats(State(state): State<AppState>) -> Result<Json<ScreeningStats>, AppError> {
    Ok(Json(state.store.stats().await?))
}

async fn require_application(state: &AppState, application_id: Uuid) -> Result<(), AppError> {
    state
        .store
        .get_application(application_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))
}
