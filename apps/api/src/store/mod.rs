//! Keyed record store behind the screening pipeline.
//!
//! `AppState` holds an `Arc<dyn ScreeningStore>`: `PgStore` when `DATABASE_URL`
//! is set, `MemoryStore` otherwise. Both backends enforce the two write-once
//! rules atomically (one application per candidate and job, one test result
//! per application) and rewrite a job's rank table in a single critical section.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, NewApplication};
use crate::models::assessment::{NewTestQuestion, NewTestResult, TestQuestionRow, TestResultRow};
use crate::models::interview::{InterviewResultRow, NewInterviewResult};
use crate::models::job::{JobRow, NewJob};
use crate::scoring::rank_engine::{RankAssignment, RankEngine};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct ScreeningStats {
    pub total_jobs: i64,
    pub total_candidates: i64,
    pub total_applications: i64,
    pub completed_applications: i64,
}

#[async_trait]
pub trait ScreeningStore: Send + Sync {
    async fn create_job(&self, job: NewJob) -> Result<JobRow, AppError>;
    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobRow>, AppError>;
    async fn list_jobs(&self) -> Result<Vec<JobRow>, AppError>;

    async fn add_question(&self, question: NewTestQuestion) -> Result<TestQuestionRow, AppError>;
    /// Questions for a job in creation order; grading is positional.
    async fn questions_for_job(&self, job_id: Uuid) -> Result<Vec<TestQuestionRow>, AppError>;

    async fn find_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<ApplicationRow>, AppError>;
    async fn get_application(&self, application_id: Uuid)
        -> Result<Option<ApplicationRow>, AppError>;
    async fn applications_for_job(&self, job_id: Uuid) -> Result<Vec<ApplicationRow>, AppError>;
    /// Every application a candidate has made, newest first.
    async fn applications_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<ApplicationRow>, AppError>;

    /// Fails with `AlreadyApplied` if the pair already exists.
    async fn insert_application(&self, application: NewApplication)
        -> Result<ApplicationRow, AppError>;

    /// Stores the write-once test result, sets `test_score` and advances the
    /// status to at least `test_done`. Fails with `DuplicateSubmission` if a
    /// result already exists, leaving it untouched.
    async fn record_test_result(&self, result: NewTestResult) -> Result<ApplicationRow, AppError>;
    async fn get_test_result(&self, application_id: Uuid)
        -> Result<Option<TestResultRow>, AppError>;

    /// Creates or overwrites the interview result, then sets `interview_score`,
    /// `final_score` and status `completed` on the application.
    async fn record_interview(
        &self,
        result: NewInterviewResult,
        final_score: f64,
    ) -> Result<ApplicationRow, AppError>;
    async fn get_interview_result(
        &self,
        application_id: Uuid,
    ) -> Result<Option<InterviewResultRow>, AppError>;

    async fn set_final_score(
        &self,
        application_id: Uuid,
        final_score: f64,
    ) -> Result<ApplicationRow, AppError>;

    /// Reads every completed application of the job, ranks them with `engine`
    /// and rewrites all their rank fields as one atomic step.
    async fn rerank_job(
        &self,
        job_id: Uuid,
        engine: &RankEngine,
    ) -> Result<Vec<RankAssignment>, AppError>;

    async fn stats(&self) -> Result<ScreeningStats, AppError>;
}
