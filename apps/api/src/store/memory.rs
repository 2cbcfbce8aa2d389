//! In-process store. Used when no `DATABASE_URL` is configured and by the
//! pipeline tests. A single mutex guards all tables, so every trait method is
//! atomic with respect to every other.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus, NewApplication};
use crate::models::assessment::{NewTestQuestion, NewTestResult, TestQuestionRow, TestResultRow};
use crate::models::interview::{InterviewResultRow, NewInterviewResult};
use crate::models::job::{JobRow, NewJob};
use crate::scoring::rank_engine::{RankAssignment, RankCandidate, RankEngine};
use crate::store::{ScreeningStats, ScreeningStore};

#[derive(Default)]
struct Tables {
    jobs: Vec<JobRow>,
    questions: Vec<TestQuestionRow>,
    applications: Vec<ApplicationRow>,
    test_results: Vec<TestResultRow>,
    interview_results: Vec<InterviewResultRow>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps, so creation order is always recoverable.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn application_mut(&mut self, application_id: Uuid) -> Result<&mut ApplicationRow, AppError> {
        self.applications
            .iter_mut()
            .find(|a| a.id == application_id)
            .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScreeningStore for MemoryStore {
    async fn create_job(&self, job: NewJob) -> Result<JobRow, AppError> {
        let mut t = self.tables.lock().await;
        let row = JobRow {
            id: Uuid::new_v4(),
            title: job.title,
            description: job.description,
            skills: job.skills,
            created_at: t.next_timestamp(),
        };
        t.jobs.push(row.clone());
        Ok(row)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobRow>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.jobs.iter().find(|j| j.id == job_id).cloned())
    }

    async fn list_jobs(&self) -> Result<Vec<JobRow>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.jobs.iter().rev().cloned().collect())
    }

    async fn add_question(&self, question: NewTestQuestion) -> Result<TestQuestionRow, AppError> {
        let mut t = self.tables.lock().await;
        let row = TestQuestionRow {
            id: Uuid::new_v4(),
            job_id: question.job_id,
            question: question.question,
            options: question.options,
            correct_answer: question.correct_answer,
            created_at: t.next_timestamp(),
        };
        t.questions.push(row.clone());
        Ok(row)
    }

    async fn questions_for_job(&self, job_id: Uuid) -> Result<Vec<TestQuestionRow>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.questions
            .iter()
            .filter(|q| q.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn find_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<ApplicationRow>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.applications
            .iter()
            .find(|a| a.candidate_id == candidate_id && a.job_id == job_id)
            .cloned())
    }

    async fn get_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<ApplicationRow>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.applications
            .iter()
            .find(|a| a.id == application_id)
            .cloned())
    }

    async fn applications_for_job(&self, job_id: Uuid) -> Result<Vec<ApplicationRow>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn applications_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<ApplicationRow>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.applications
            .iter()
            .rev()
            .filter(|a| a.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    async fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<ApplicationRow, AppError> {
        let mut t = self.tables.lock().await;
        let exists = t
            .applications
            .iter()
            .any(|a| a.candidate_id == application.candidate_id && a.job_id == application.job_id);
        if exists {
            return Err(AppError::AlreadyApplied {
                candidate_id: application.candidate_id,
                job_id: application.job_id,
            });
        }

        let now = t.next_timestamp();
        let row = ApplicationRow {
            id: Uuid::new_v4(),
            candidate_id: application.candidate_id,
            job_id: application.job_id,
            resume_filename: application.resume_filename,
            matched_skills: application.matched_skills,
            resume_score: application.resume_score,
            test_score: 0.0,
            interview_score: 0.0,
            final_score: 0.0,
            rank: 0,
            status: ApplicationStatus::Applied,
            created_at: now,
            updated_at: now,
        };
        t.applications.push(row.clone());
        Ok(row)
    }

    async fn record_test_result(&self, result: NewTestResult) -> Result<ApplicationRow, AppError> {
        let mut t = self.tables.lock().await;
        if t
            .test_results
            .iter()
            .any(|r| r.application_id == result.application_id)
        {
            return Err(AppError::DuplicateSubmission(result.application_id));
        }

        let now = t.next_timestamp();
        let app = t.application_mut(result.application_id)?;
        app.test_score = result.score;
        app.status = app.status.advance_to(ApplicationStatus::TestDone);
        app.updated_at = now;
        let updated = app.clone();

        t.test_results.push(TestResultRow {
            id: Uuid::new_v4(),
            application_id: result.application_id,
            answers: result.answers,
            correct: result.correct,
            total: result.total,
            score: result.score,
            submitted_at: now,
        });
        Ok(updated)
    }

    async fn get_test_result(
        &self,
        application_id: Uuid,
    ) -> Result<Option<TestResultRow>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.test_results
            .iter()
            .find(|r| r.application_id == application_id)
            .cloned())
    }

    async fn record_interview(
        &self,
        result: NewInterviewResult,
        final_score: f64,
    ) -> Result<ApplicationRow, AppError> {
        let mut t = self.tables.lock().await;
        let now = t.next_timestamp();

        let app = t.application_mut(result.application_id)?;
        app.interview_score = result.overall_score;
        app.final_score = final_score;
        app.status = app.status.advance_to(ApplicationStatus::Completed);
        app.updated_at = now;
        let updated = app.clone();

        let row = InterviewResultRow {
            id: Uuid::new_v4(),
            application_id: result.application_id,
            transcript: result.transcript,
            duration_seconds: result.duration_seconds,
            confidence_score: result.confidence_score,
            clarity_score: result.clarity_score,
            emotion_score: result.emotion_score,
            overall_score: result.overall_score,
            submitted_at: now,
        };
        match t
            .interview_results
            .iter_mut()
            .find(|r| r.application_id == row.application_id)
        {
            // Overwrite in place, keeping the original row id.
            Some(existing) => *existing = InterviewResultRow { id: existing.id, ..row },
            None => t.interview_results.push(row),
        }
        Ok(updated)
    }

    async fn get_interview_result(
        &self,
        application_id: Uuid,
    ) -> Result<Option<InterviewResultRow>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.interview_results
            .iter()
            .find(|r| r.application_id == application_id)
            .cloned())
    }

    async fn set_final_score(
        &self,
        application_id: Uuid,
        final_score: f64,
    ) -> Result<ApplicationRow, AppError> {
        let mut t = self.tables.lock().await;
        let now = t.next_timestamp();
        let app = t.application_mut(application_id)?;
        app.final_score = final_score;
        app.updated_at = now;
        Ok(app.clone())
    }

    async fn rerank_job(
        &self,
        job_id: Uuid,
        engine: &RankEngine,
    ) -> Result<Vec<RankAssignment>, AppError> {
        let mut t = self.tables.lock().await;
        let completed: Vec<RankCandidate> = t
            .applications
            .iter()
            .filter(|a| a.job_id == job_id && a.is_completed())
            .map(RankCandidate::from)
            .collect();

        let table = engine.rank(completed);
        for assignment in &table {
            if let Some(app) = t
                .applications
                .iter_mut()
                .find(|a| a.id == assignment.application_id)
            {
                app.rank = assignment.rank;
            }
        }
        Ok(table)
    }

    async fn stats(&self) -> Result<ScreeningStats, AppError> {
        let t = self.tables.lock().await;
        let candidates: HashSet<Uuid> = t.applications.iter().map(|a| a.candidate_id).collect();
        Ok(ScreeningStats {
            total_jobs: t.jobs.len() as i64,
            total_candidates: candidates.len() as i64,
            total_applications: t.applications.len() as i64,
            completed_applications: t.applications.iter().filter(|a| a.is_completed()).count()
                as i64,
        })
    }
}
