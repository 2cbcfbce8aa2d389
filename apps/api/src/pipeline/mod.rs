//! Screening pipeline: runs each scoring stage when its input arrives and
//! keeps every job's rank table current.
//!
//! apply → ResumeMatcher
//! submit_test → TestGrader
//! submit_interview → InterviewAnalyzer + aggregator, then `ApplicationCompleted`
//! ApplicationCompleted → RankEngine over the job's completed applications
//!
//! Test and interview submissions hold the job's lock from the moment they
//! read the application until the rank table has been rewritten.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, NewApplication};
use crate::models::assessment::NewTestResult;
use crate::models::interview::NewInterviewResult;
use crate::scoring::aggregator::{final_score, StageScores};
use crate::scoring::interview_analyzer::{InterviewAnalysis, InterviewAnalyzer};
use crate::scoring::random::RandomSource;
use crate::scoring::rank_engine::{RankAssignment, RankEngine};
use crate::scoring::resume_matcher::{decode_resume, ResumeMatch, ResumeMatcher};
use crate::scoring::test_grader::{grade, TestGrade};
use crate::store::ScreeningStore;

pub mod events;
pub mod handlers;
pub mod locks;
pub mod report;

use events::PipelineEvent;
use locks::JobLocks;

pub struct ApplyInput<'a> {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub resume_filename: Option<String>,
    pub resume_bytes: &'a [u8],
}

#[derive(Debug, Serialize)]
pub struct ApplyOutcome {
    pub application: ApplicationRow,
    pub resume: ResumeMatch,
}

#[derive(Debug, Serialize)]
pub struct TestOutcome {
    pub application: ApplicationRow,
    pub grade: TestGrade,
    /// Present when the application was already completed and the job was re-ranked.
    pub ranks: Option<Vec<RankAssignment>>,
}

#[derive(Debug, Serialize)]
pub struct InterviewOutcome {
    pub application: ApplicationRow,
    pub analysis: InterviewAnalysis,
    pub ranks: Vec<RankAssignment>,
}

pub struct ScreeningPipeline {
    store: Arc<dyn ScreeningStore>,
    resume_matcher: ResumeMatcher,
    interview_analyzer: InterviewAnalyzer,
    rank_engine: RankEngine,
    job_locks: JobLocks,
}

impl ScreeningPipeline {
    pub fn new(store: Arc<dyn ScreeningStore>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            store,
            resume_matcher: ResumeMatcher::new(random.clone()),
            interview_analyzer: InterviewAnalyzer::new(random),
            rank_engine: RankEngine,
            job_locks: JobLocks::new(),
        }
    }

    /// Scores a résumé and creates the application. A repeat application is
    /// rejected before any scoring happens.
    pub async fn apply(&self, input: ApplyInput<'_>) -> Result<ApplyOutcome, AppError> {
        let job = self
            .store
            .get_job(input.job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", input.job_id)))?;

        if self
            .store
            .find_application(input.candidate_id, input.job_id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyApplied {
                candidate_id: input.candidate_id,
                job_id: input.job_id,
            });
        }

        let resume_text = decode_resume(input.resume_bytes);
        let resume = self.resume_matcher.score(&job.skill_set(), &resume_text);

        let application = self
            .store
            .insert_application(NewApplication {
                candidate_id: input.candidate_id,
                job_id: input.job_id,
                resume_filename: input.resume_filename,
                matched_skills: resume.matched_skills.clone(),
                resume_score: resume.resume_score,
            })
            .await?;

        info!(
            "Application {} for job {}: resume score {:.2} ({}/{} skills)",
            application.id,
            job.id,
            resume.resume_score,
            resume.matched_skills.len(),
            job.skills.len()
        );

        Ok(ApplyOutcome {
            application,
            resume,
        })
    }

    /// Grades a test submission. Only the first submission per application is accepted.
    pub async fn submit_test(
        &self,
        application_id: Uuid,
        candidate_id: Uuid,
        answers: Vec<i32>,
    ) -> Result<TestOutcome, AppError> {
        let application = self.owned_application(application_id, candidate_id).await?;
        let _guard = self.job_locks.acquire(application.job_id).await;

        if self.store.get_test_result(application_id).await?.is_some() {
            return Err(AppError::DuplicateSubmission(application_id));
        }

        let questions = self.store.questions_for_job(application.job_id).await?;
        let grade = grade(&questions, &answers);

        let mut application = self
            .store
            .record_test_result(NewTestResult {
                application_id,
                answers,
                correct: grade.correct as i32,
                total: grade.total as i32,
                score: grade.score,
            })
            .await?;

        info!(
            "Application {application_id}: test score {:.2} ({}/{})",
            grade.score, grade.correct, grade.total
        );

        // A test arriving after the interview changes an already-ranked final score.
        let ranks = if application.is_completed() {
            let final_score = final_score(stage_scores(&application));
            application = self.store.set_final_score(application_id, final_score).await?;
            let table = self
                .handle_event(PipelineEvent::ApplicationCompleted {
                    job_id: application.job_id,
                    application_id,
                })
                .await?;
            apply_rank(&mut application, &table);
            Some(table)
        } else {
            None
        };

        Ok(TestOutcome {
            application,
            grade,
            ranks,
        })
    }

    /// Analyzes an interview, recomputes the final score and re-ranks the job.
    /// Resubmission overwrites the previous interview result.
    pub async fn submit_interview(
        &self,
        application_id: Uuid,
        candidate_id: Uuid,
        transcript: &str,
        duration_seconds: u32,
    ) -> Result<InterviewOutcome, AppError> {
        let stored_duration = i32::try_from(duration_seconds)
            .map_err(|_| AppError::Validation("duration_seconds is too large".to_string()))?;

        let job_id = self
            .owned_application(application_id, candidate_id)
            .await?
            .job_id;
        let _guard = self.job_locks.acquire(job_id).await;

        // Re-read under the lock so the stage scores are current.
        let application = self.owned_application(application_id, candidate_id).await?;

        let analysis = self.interview_analyzer.analyze(transcript, duration_seconds);
        let final_score = final_score(StageScores {
            interview: analysis.overall,
            ..stage_scores(&application)
        });

        let mut application = self
            .store
            .record_interview(
                NewInterviewResult {
                    application_id,
                    transcript: transcript.to_string(),
                    duration_seconds: stored_duration,
                    confidence_score: analysis.confidence,
                    clarity_score: analysis.clarity,
                    emotion_score: analysis.emotion,
                    overall_score: analysis.overall,
                },
                final_score,
            )
            .await?;

        info!(
            "Application {application_id}: interview {:.2}, final {:.2}",
            analysis.overall, final_score
        );

        let ranks = self
            .handle_event(PipelineEvent::ApplicationCompleted {
                job_id,
                application_id,
            })
            .await?;
        apply_rank(&mut application, &ranks);

        Ok(InterviewOutcome {
            application,
            analysis,
            ranks,
        })
    }

    /// Explicitly recomputes a job's rank table.
    pub async fn recompute_ranks(&self, job_id: Uuid) -> Result<Vec<RankAssignment>, AppError> {
        self.store
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

        let _guard = self.job_locks.acquire(job_id).await;
        self.handle_event(PipelineEvent::RankRefresh { job_id }).await
    }

    /// Caller must hold the job's lock.
    async fn handle_event(&self, event: PipelineEvent) -> Result<Vec<RankAssignment>, AppError> {
        let job_id = event.job_id();
        let table = self.store.rerank_job(job_id, &self.rank_engine).await?;
        debug!(?event, "Re-ranked {} completed applications", table.len());
        Ok(table)
    }

    async fn owned_application(
        &self,
        application_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<ApplicationRow, AppError> {
        let application = self
            .store
            .get_application(application_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;
        if application.candidate_id != candidate_id {
            return Err(AppError::Forbidden);
        }
        Ok(application)
    }
}

fn stage_scores(application: &ApplicationRow) -> StageScores {
    StageScores {
        resume: application.resume_score,
        test: application.test_score,
        interview: application.interview_score,
    }
}

fn apply_rank(application: &mut ApplicationRow, table: &[RankAssignment]) {
    if let Some(entry) = table.iter().find(|r| r.application_id == application.id) {
        application.rank = entry.rank;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;
    use crate::models::assessment::NewTestQuestion;
    use crate::models::job::{JobRow, NewJob};
    use crate::scoring::random::FixedSource;
    use crate::store::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        pipeline: Arc<ScreeningPipeline>,
    }

    /// Bonus and emotion both come from `draw`; 10 is clamped to 10 for the
    /// bonus range and to 55 for the emotion range.
    fn fixture(draw: u32) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Arc::new(ScreeningPipeline::new(
            store.clone(),
            Arc::new(FixedSource(draw)),
        ));
        Fixture { store, pipeline }
    }

    async fn job_with_questions(store: &MemoryStore, skills: &[&str], keys: &[i32]) -> JobRow {
        let job = store
            .create_job(NewJob {
                title: "Backend Engineer".into(),
                description: "Services in Rust".into(),
                skills: skills.iter().map(|s| s.to_string()).collect(),
            })
            .await
            .unwrap();
        for (i, key) in keys.iter().enumerate() {
            store
                .add_question(NewTestQuestion {
                    job_id: job.id,
                    question: format!("Question {i}"),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct_answer: *key,
                })
                .await
                .unwrap();
        }
        job
    }

    async fn apply(pipeline: &ScreeningPipeline, job_id: Uuid, resume: &str) -> ApplicationRow {
        pipeline
            .apply(ApplyInput {
                job_id,
                candidate_id: Uuid::new_v4(),
                resume_filename: Some("cv.txt".into()),
                resume_bytes: resume.as_bytes(),
            })
            .await
            .unwrap()
            .application
    }

    #[tokio::test]
    async fn test_apply_scores_resume() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &["Rust", "SQL"], &[]).await;
        let outcome = f
            .pipeline
            .apply(ApplyInput {
                job_id: job.id,
                candidate_id: Uuid::new_v4(),
                resume_filename: None,
                resume_bytes: b"rust and more rust",
            })
            .await
            .unwrap();
        assert_eq!(outcome.resume.matched_skills, vec!["Rust"]);
        assert_eq!(outcome.application.resume_score, 60.0);
        assert_eq!(outcome.application.status, ApplicationStatus::Applied);
        assert_eq!(outcome.application.rank, 0);
    }

    #[tokio::test]
    async fn test_duplicate_application_rejected() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &["Rust"], &[]).await;
        let candidate_id = Uuid::new_v4();
        let input = || ApplyInput {
            job_id: job.id,
            candidate_id,
            resume_filename: None,
            resume_bytes: b"rust",
        };
        f.pipeline.apply(input()).await.unwrap();
        let err = f.pipeline.apply(input()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyApplied { .. }));
        assert_eq!(f.store.stats().await.unwrap().total_applications, 1);
    }

    #[tokio::test]
    async fn test_apply_to_unknown_job() {
        let f = fixture(10);
        let err = f
            .pipeline
            .apply(ApplyInput {
                job_id: Uuid::new_v4(),
                candidate_id: Uuid::new_v4(),
                resume_filename: None,
                resume_bytes: b"",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_binary_resume_is_not_an_error() {
        let f = fixture(5);
        let job = job_with_questions(&f.store, &["rust"], &[]).await;
        let outcome = f
            .pipeline
            .apply(ApplyInput {
                job_id: job.id,
                candidate_id: Uuid::new_v4(),
                resume_filename: Some("cv.pdf".into()),
                resume_bytes: &[0xff, 0xd8, 0xff, 0xe0, 0x00],
            })
            .await
            .unwrap();
        assert!(outcome.resume.matched_skills.is_empty());
        assert_eq!(outcome.application.resume_score, 5.0);
    }

    #[tokio::test]
    async fn test_submission_is_write_once() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &["rust"], &[1, 2]).await;
        let app = apply(&f.pipeline, job.id, "rust").await;

        let first = f
            .pipeline
            .submit_test(app.id, app.candidate_id, vec![1, 0])
            .await
            .unwrap();
        assert_eq!(first.grade.score, 50.0);
        assert_eq!(first.application.status, ApplicationStatus::TestDone);

        let err = f
            .pipeline
            .submit_test(app.id, app.candidate_id, vec![1, 2])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateSubmission(_)));

        let stored = f.store.get_test_result(app.id).await.unwrap().unwrap();
        assert_eq!(stored.score, 50.0);
        assert_eq!(stored.answers, vec![1, 0]);
        let reloaded = f.store.get_application(app.id).await.unwrap().unwrap();
        assert_eq!(reloaded.test_score, 50.0);
    }

    #[tokio::test]
    async fn test_store_rejects_duplicate_even_without_precheck() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &[], &[]).await;
        let app = apply(&f.pipeline, job.id, "").await;
        let result = || NewTestResult {
            application_id: app.id,
            answers: vec![],
            correct: 0,
            total: 0,
            score: 70.0,
        };
        f.store.record_test_result(result()).await.unwrap();
        let err = f.store.record_test_result(result()).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateSubmission(_)));
    }

    #[tokio::test]
    async fn test_job_without_questions_scores_default() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &["rust"], &[]).await;
        let app = apply(&f.pipeline, job.id, "rust").await;
        let outcome = f
            .pipeline
            .submit_test(app.id, app.candidate_id, vec![3, 3])
            .await
            .unwrap();
        assert_eq!(outcome.grade.total, 0);
        assert_eq!(outcome.application.test_score, 70.0);
    }

    #[tokio::test]
    async fn test_other_candidate_cannot_submit() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &["rust"], &[0]).await;
        let app = apply(&f.pipeline, job.id, "rust").await;
        let err = f
            .pipeline
            .submit_test(app.id, Uuid::new_v4(), vec![0])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        let err = f
            .pipeline
            .submit_interview(app.id, Uuid::new_v4(), "hello", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_interview_completes_and_ranks() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &["rust"], &[0]).await;
        let app = apply(&f.pipeline, job.id, "rust").await;
        f.pipeline
            .submit_test(app.id, app.candidate_id, vec![0])
            .await
            .unwrap();

        let outcome = f
            .pipeline
            .submit_interview(app.id, app.candidate_id, "a b c d e", 60)
            .await
            .unwrap();

        // confidence 41, clarity 90, emotion 55 (clamped draw)
        let overall = 41.0 * 0.35 + 90.0 * 0.35 + 55.0 * 0.30;
        let expected_final = 100.0 * 0.30 + 100.0 * 0.35 + overall * 0.35;
        assert!((outcome.analysis.overall - overall).abs() < 1e-9);
        assert!((outcome.application.final_score - expected_final).abs() < 1e-9);
        assert_eq!(outcome.application.status, ApplicationStatus::Completed);
        assert_eq!(outcome.application.rank, 1);
        assert_eq!(outcome.ranks.len(), 1);

        let stored = f.store.get_interview_result(app.id).await.unwrap().unwrap();
        assert_eq!(stored.duration_seconds, 60);
    }

    #[tokio::test]
    async fn test_interview_without_test_counts_test_as_zero() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &["rust"], &[0]).await;
        let app = apply(&f.pipeline, job.id, "rust").await;
        let outcome = f
            .pipeline
            .submit_interview(app.id, app.candidate_id, "a b c d e", 60)
            .await
            .unwrap();
        let overall = outcome.analysis.overall;
        assert!((outcome.application.final_score - (100.0 * 0.30 + overall * 0.35)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_interview_resubmission_overwrites_and_reranks() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &[], &[]).await;
        let first = apply(&f.pipeline, job.id, "").await;
        let second = apply(&f.pipeline, job.id, "").await;

        let wordy = "word ".repeat(200);
        f.pipeline
            .submit_interview(first.id, first.candidate_id, &wordy, 60)
            .await
            .unwrap();
        f.pipeline
            .submit_interview(second.id, second.candidate_id, "um uh like", 60)
            .await
            .unwrap();

        let a = f.store.get_application(first.id).await.unwrap().unwrap();
        let b = f.store.get_application(second.id).await.unwrap().unwrap();
        assert_eq!((a.rank, b.rank), (1, 2));

        // The second candidate retakes with a much stronger transcript.
        let retake = "word ".repeat(400);
        let outcome = f
            .pipeline
            .submit_interview(second.id, second.candidate_id, &retake, 90)
            .await
            .unwrap();
        assert_eq!(outcome.application.rank, 1);

        let stored = f.store.get_interview_result(second.id).await.unwrap().unwrap();
        assert_eq!(stored.transcript, retake);
        assert_eq!(stored.duration_seconds, 90);

        let a = f.store.get_application(first.id).await.unwrap().unwrap();
        assert_eq!(a.rank, 2);
    }

    #[tokio::test]
    async fn test_late_test_updates_final_score_and_ranks() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &[], &[2]).await;
        let early = apply(&f.pipeline, job.id, "").await;
        let late = apply(&f.pipeline, job.id, "").await;

        f.pipeline
            .submit_test(early.id, early.candidate_id, vec![0])
            .await
            .unwrap();
        f.pipeline
            .submit_interview(early.id, early.candidate_id, "same words here", 10)
            .await
            .unwrap();
        f.pipeline
            .submit_interview(late.id, late.candidate_id, "same words here", 10)
            .await
            .unwrap();

        // Equal final scores: the earlier application wins the tie.
        let e = f.store.get_application(early.id).await.unwrap().unwrap();
        let l = f.store.get_application(late.id).await.unwrap().unwrap();
        assert_eq!(e.final_score, l.final_score);
        assert_eq!((e.rank, l.rank), (1, 2));

        let outcome = f
            .pipeline
            .submit_test(late.id, late.candidate_id, vec![2])
            .await
            .unwrap();
        assert_eq!(outcome.application.status, ApplicationStatus::Completed);
        assert!((outcome.application.final_score - (l.final_score + 35.0)).abs() < 1e-9);
        assert_eq!(outcome.application.rank, 1);
        assert!(outcome.ranks.is_some());

        let e = f.store.get_application(early.id).await.unwrap().unwrap();
        assert_eq!(e.rank, 2);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &[], &[]).await;
        for words in [10, 300, 120] {
            let app = apply(&f.pipeline, job.id, "").await;
            f.pipeline
                .submit_interview(app.id, app.candidate_id, &"w ".repeat(words), 30)
                .await
                .unwrap();
        }
        let first = f.pipeline.recompute_ranks(job.id).await.unwrap();
        let second = f.pipeline.recompute_ranks(job.id).await.unwrap();
        assert_eq!(first, second);
        let ranks: Vec<i32> = first.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_pending_applications_are_not_ranked() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &[], &[]).await;
        let done = apply(&f.pipeline, job.id, "").await;
        let pending = apply(&f.pipeline, job.id, "").await;
        f.pipeline
            .submit_interview(done.id, done.candidate_id, "hello", 5)
            .await
            .unwrap();
        let table = f.pipeline.recompute_ranks(job.id).await.unwrap();
        assert_eq!(table.len(), 1);
        let p = f.store.get_application(pending.id).await.unwrap().unwrap();
        assert_eq!(p.rank, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_test_submissions_store_exactly_one() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &[], &[0, 1, 2, 3]).await;
        let app = apply(&f.pipeline, job.id, "").await;

        let mut handles = Vec::new();
        for i in 0..16 {
            let pipeline = f.pipeline.clone();
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                // Each attempt answers a different number of questions correctly.
                let answers: Vec<i32> = (0..4).map(|q| if q < i % 5 { q } else { -1 }).collect();
                let result = pipeline
                    .submit_test(app.id, app.candidate_id, answers.clone())
                    .await;
                (answers, result)
            }));
        }

        let mut accepted = Vec::new();
        for h in handles {
            match h.await.unwrap() {
                (answers, Ok(outcome)) => accepted.push((answers, outcome)),
                (_, Err(AppError::DuplicateSubmission(id))) => assert_eq!(id, app.id),
                (_, Err(other)) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(accepted.len(), 1);
        let (answers, outcome) = accepted.remove(0);

        let stored = f.store.get_test_result(app.id).await.unwrap().unwrap();
        assert_eq!(stored.answers, answers);
        assert_eq!(stored.score, outcome.grade.score);

        let reloaded = f.store.get_application(app.id).await.unwrap().unwrap();
        assert_eq!(reloaded.test_score, outcome.grade.score);
        assert_eq!(reloaded.status, ApplicationStatus::TestDone);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_interviews_leave_consistent_ranks() {
        let f = fixture(10);
        let job = job_with_questions(&f.store, &[], &[]).await;
        let mut apps = Vec::new();
        for _ in 0..12 {
            apps.push(apply(&f.pipeline, job.id, "").await);
        }

        let mut handles = Vec::new();
        for (i, app) in apps.iter().cloned().enumerate() {
            let pipeline = f.pipeline.clone();
            handles.push(tokio::spawn(async move {
                let transcript = "w ".repeat(i * 20);
                pipeline
                    .submit_interview(app.id, app.candidate_id, &transcript, 30)
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let mut rows = f.store.applications_for_job(job.id).await.unwrap();
        rows.sort_by_key(|a| a.rank);
        let ranks: Vec<i32> = rows.iter().map(|a| a.rank).collect();
        assert_eq!(ranks, (1..=12).collect::<Vec<i32>>());
        for pair in rows.windows(2) {
            assert!(pair[0].final_score >= pair[1].final_score);
        }
    }
}
