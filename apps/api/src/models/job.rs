use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Required skills, in the order the recruiter listed them.
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl JobRow {
    pub fn skill_set(&self) -> JobSkillSet {
        JobSkillSet::new(self.skills.clone())
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
}

/// Ordered, case-insensitive list of skills a résumé is matched against.
/// Blank entries are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSkillSet(Vec<String>);

impl JobSkillSet {
    pub fn new(skills: Vec<String>) -> Self {
        Self(
            skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    pub fn skills(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
