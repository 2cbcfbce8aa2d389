use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus, NewApplication};
use crate::models::assessment::{NewTestQuestion, NewTestResult, TestQuestionRow, TestResultRow};
use crate::models::interview::{InterviewResultRow, NewInterviewResult};
use crate::models::job::{JobRow, NewJob};
use crate::scoring::rank_engine::{RankAssignment, RankCandidate, RankEngine};
use crate::store::{ScreeningStats, ScreeningStore};

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScreeningStore for PgStore {
    async fn create_job(&self, job: NewJob) -> Result<JobRow, AppError> {
        Ok(sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (id, title, description, skills)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.skills)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_jobs(&self) -> Result<Vec<JobRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn add_question(&self, question: NewTestQuestion) -> Result<TestQuestionRow, AppError> {
        Ok(sqlx::query_as::<_, TestQuestionRow>(
            r#"
            INSERT INTO test_questions (id, job_id, question, options, correct_answer)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(question.job_id)
        .bind(&question.question)
        .bind(&question.options)
        .bind(question.correct_answer)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn questions_for_job(&self, job_id: Uuid) -> Result<Vec<TestQuestionRow>, AppError> {
        Ok(sqlx::query_as::<_, TestQuestionRow>(
            "SELECT * FROM test_questions WHERE job_id = $1 ORDER BY created_at, id",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<ApplicationRow>, AppError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE candidate_id = $1 AND job_id = $2",
        )
        .bind(candidate_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<ApplicationRow>, AppError> {
        Ok(
            sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
                .bind(application_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn applications_for_job(&self, job_id: Uuid) -> Result<Vec<ApplicationRow>, AppError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE job_id = $1 ORDER BY created_at, id",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn applications_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<ApplicationRow>, AppError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE candidate_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<ApplicationRow, AppError> {
        // The (candidate_id, job_id) unique constraint settles concurrent duplicates.
        let inserted = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications
                (id, candidate_id, job_id, resume_filename, matched_skills, resume_score, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (candidate_id, job_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(application.candidate_id)
        .bind(application.job_id)
        .bind(&application.resume_filename)
        .bind(&application.matched_skills)
        .bind(application.resume_score)
        .bind(ApplicationStatus::Applied)
        .fetch_optional(&self.pool)
        .await?;

        inserted.ok_or(AppError::AlreadyApplied {
            candidate_id: application.candidate_id,
            job_id: application.job_id,
        })
    }

    async fn record_test_result(&self, result: NewTestResult) -> Result<ApplicationRow, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE id = $1 FOR UPDATE",
        )
        .bind(result.application_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Application {} not found", result.application_id))
        })?;

        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO test_results (id, application_id, answers, correct, total, score)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (application_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(result.application_id)
        .bind(&result.answers)
        .bind(result.correct)
        .bind(result.total)
        .bind(result.score)
        .fetch_optional(&mut *tx)
        .await?;

        if inserted.is_none() {
            // Dropping `tx` rolls back; the existing result stays as it was.
            return Err(AppError::DuplicateSubmission(result.application_id));
        }

        let updated = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications
            SET test_score = $2, status = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(result.application_id)
        .bind(result.score)
        .bind(current.status.advance_to(ApplicationStatus::TestDone))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn get_test_result(
        &self,
        application_id: Uuid,
    ) -> Result<Option<TestResultRow>, AppError> {
        Ok(sqlx::query_as::<_, TestResultRow>(
            "SELECT * FROM test_results WHERE application_id = $1",
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn record_interview(
        &self,
        result: NewInterviewResult,
        final_score: f64,
    ) -> Result<ApplicationRow, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications
            SET interview_score = $2, final_score = $3, status = $4, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(result.application_id)
        .bind(result.overall_score)
        .bind(final_score)
        .bind(ApplicationStatus::Completed)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Application {} not found", result.application_id))
        })?;

        // Interviews may be retaken: overwrite in place.
        sqlx::query(
            r#"
            INSERT INTO interview_results
                (id, application_id, transcript, duration_seconds,
                 confidence_score, clarity_score, emotion_score, overall_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (application_id) DO UPDATE SET
                transcript = EXCLUDED.transcript,
                duration_seconds = EXCLUDED.duration_seconds,
                confidence_score = EXCLUDED.confidence_score,
                clarity_score = EXCLUDED.clarity_score,
                emotion_score = EXCLUDED.emotion_score,
                overall_score = EXCLUDED.overall_score,
                submitted_at = now()
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(result.application_id)
        .bind(&result.transcript)
        .bind(result.duration_seconds)
        .bind(result.confidence_score)
        .bind(result.clarity_score)
        .bind(result.emotion_score)
        .bind(result.overall_score)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn get_interview_result(
        &self,
        application_id: Uuid,
    ) -> Result<Option<InterviewResultRow>, AppError> {
        Ok(sqlx::query_as::<_, InterviewResultRow>(
            "SELECT * FROM interview_results WHERE application_id = $1",
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_final_score(
        &self,
        application_id: Uuid,
        final_score: f64,
    ) -> Result<ApplicationRow, AppError> {
        sqlx::query_as::<_, ApplicationRow>(
            "UPDATE applications SET final_score = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(application_id)
        .bind(final_score)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))
    }

    async fn rerank_job(
        &self,
        job_id: Uuid,
        engine: &RankEngine,
    ) -> Result<Vec<RankAssignment>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Serializes recomputations for this job across every process sharing the database.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        let completed = sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE job_id = $1 AND status = $2 FOR UPDATE",
        )
        .bind(job_id)
        .bind(ApplicationStatus::Completed)
        .fetch_all(&mut *tx)
        .await?;

        let table = engine.rank(completed.iter().map(RankCandidate::from).collect());

        let ids: Vec<Uuid> = table.iter().map(|r| r.application_id).collect();
        let ranks: Vec<i32> = table.iter().map(|r| r.rank).collect();
        sqlx::query(
            r#"
            UPDATE applications AS a
            SET rank = r.rank
            FROM UNNEST($1::uuid[], $2::int4[]) AS r(id, rank)
            WHERE a.id = r.id
            "#,
        )
        .bind(&ids)
        .bind(&ranks)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Rewrote {} ranks for job {job_id}", table.len());
        Ok(table)
    }

    async fn stats(&self) -> Result<ScreeningStats, AppError> {
        Ok(sqlx::query_as::<_, ScreeningStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM jobs) AS total_jobs,
                (SELECT COUNT(DISTINCT candidate_id) FROM applications) AS total_candidates,
                (SELECT COUNT(*) FROM applications) AS total_applications,
                (SELECT COUNT(*) FROM applications WHERE status = 'completed') AS completed_applications
            "#,
        )
        .fetch_one(&self.pool)
        .await?)
    }
}
