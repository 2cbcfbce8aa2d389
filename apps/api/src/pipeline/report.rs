//! Recruiter-facing rankings report for one job.

use serde::Serialize;
use uuid::Uuid;

use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::scoring::rank_engine::LetterGrade;
use crate::scoring::round2;

#[derive(Debug, Clone, Serialize)]
pub struct RankingEntry {
    pub application_id: Uuid,
    pub candidate_id: Uuid,
    /// 0 until the application is completed.
    pub rank: i32,
    pub status: ApplicationStatus,
    pub resume_score: f64,
    pub test_score: f64,
    pub interview_score: f64,
    pub final_score: f64,
    /// Only graded once a final score exists.
    pub grade: Option<LetterGrade>,
    pub matched_skills: Vec<String>,
}

impl From<ApplicationRow> for RankingEntry {
    fn from(app: ApplicationRow) -> Self {
        let grade = app
            .is_completed()
            .then(|| LetterGrade::for_score(app.final_score));
        Self {
            application_id: app.id,
            candidate_id: app.candidate_id,
            rank: app.rank,
            status: app.status,
            resume_score: round2(app.resume_score),
            test_score: round2(app.test_score),
            interview_score: round2(app.interview_score),
            final_score: round2(app.final_score),
            grade,
            matched_skills: app.matched_skills,
        }
    }
}

/// Completed applications in rank order, followed by the ones still in
/// progress in the order they applied. A completed application whose re-rank
/// never ran still has rank 0; it goes after every ranked one until
/// `rankings/recompute` assigns it a place.
pub fn build_rankings(applications: Vec<ApplicationRow>) -> Vec<RankingEntry> {
    let (mut completed, mut pending): (Vec<_>, Vec<_>) =
        applications.into_iter().partition(|a| a.is_completed());

    completed.sort_by_key(|a| (a.rank == 0, a.rank, a.created_at, a.id));
    pending.sort_by_key(|a| (a.created_at, a.id));

    completed
        .into_iter()
        .chain(pending)
        .map(RankingEntry::from)
        .collect()
}
