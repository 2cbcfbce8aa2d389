//! Rank Engine — full recompute of a job's rank table.
//!
//! Completed applications are sorted by `final_score` descending and ranked
//! 1..=n by position. Equal scores are broken by application time (earlier
//! wins), then by application id, so the table never depends on the order
//! the store happened to return rows in.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::application::ApplicationRow;

#[derive(Debug, Clone, PartialEq)]
pub struct RankCandidate {
    pub application_id: Uuid,
    pub final_score: f64,
    pub applied_at: DateTime<Utc>,
}

impl From<&ApplicationRow> for RankCandidate {
    fn from(row: &ApplicationRow) -> Self {
        Self {
            application_id: row.id,
            final_score: row.final_score,
            applied_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankAssignment {
    pub application_id: Uuid,
    pub rank: i32,
    pub final_score: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RankEngine;

impl RankEngine {
    pub fn rank(&self, mut candidates: Vec<RankCandidate>) -> Vec<RankAssignment> {
        candidates.sort_by(compare_candidates);
        candidates
            .into_iter()
            .zip(1..)
            .map(|(c, rank)| RankAssignment {
                application_id: c.application_id,
                rank,
                final_score: c.final_score,
            })
            .collect()
    }
}

fn compare_candidates(a: &RankCandidate, b: &RankCandidate) -> Ordering {
    b.final_score
        .total_cmp(&a.final_score)
        .then_with(|| a.applied_at.cmp(&b.applied_at))
        .then_with(|| a.application_id.cmp(&b.application_id))
}

/// Letter grade shown next to a ranked candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
}

impl LetterGrade {
    pub fn for_score(final_score: f64) -> Self {
        if final_score >= 80.0 {
            LetterGrade::A
        } else if final_score >= 60.0 {
            LetterGrade::B
        } else if final_score >= 40.0 {
            LetterGrade::C
        } else {
            LetterGrade::D
        }
    }
}
