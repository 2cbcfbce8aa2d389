//! Resume Matcher — scores raw résumé text against a job's required skills.
//!
//! Algorithm:
//! 1. Lowercase the résumé text.
//! 2. A skill matches when its lowercase form is a substring of the résumé.
//! 3. base = matched / total × 100, or `NO_SKILLS_BASE_SCORE` when the job lists no skills.
//! 4. Add a presentation bonus drawn from `PRESENTATION_BONUS` and clamp to [0, 100].
//!
//! The bonus stands in for an unimplemented presentation-quality signal and
//! breaks ties between sparse matches.

use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::job::JobSkillSet;
use crate::scoring::random::RandomSource;
use crate::scoring::{clamp_score, MAX_SCORE};

/// Base score when the job defines no skills: nothing to penalize.
pub const NO_SKILLS_BASE_SCORE: f64 = 50.0;
pub const PRESENTATION_BONUS: RangeInclusive<u32> = 5..=20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeMatch {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub base_score: f64,
    pub bonus: f64,
    pub resume_score: f64,
}

pub struct ResumeMatcher {
    random: Arc<dyn RandomSource>,
}

impl ResumeMatcher {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    pub fn score(&self, skills: &JobSkillSet, resume_text: &str) -> ResumeMatch {
        let resume_lower = resume_text.to_lowercase();

        let (matched_skills, missing_skills): (Vec<String>, Vec<String>) = skills
            .skills()
            .iter()
            .cloned()
            .partition(|skill| resume_lower.contains(&skill.to_lowercase()));

        let base_score = if skills.is_empty() {
            NO_SKILLS_BASE_SCORE
        } else {
            matched_skills.len() as f64 / skills.len() as f64 * MAX_SCORE
        };

        let bonus = f64::from(self.random.draw(PRESENTATION_BONUS));

        ResumeMatch {
            matched_skills,
            missing_skills,
            base_score,
            bonus,
            resume_score: clamp_score(base_score + bonus),
        }
    }
}

/// Decodes uploaded résumé bytes as UTF-8, silently dropping undecodable
/// sequences. Binary uploads therefore degrade to little or no matchable text.
pub fn decode_resume(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}
