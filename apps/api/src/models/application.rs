use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, FromRow, Postgres, Type};
use uuid::Uuid;

/// Lifecycle of an application. Ordered: a status may only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    TestDone,
    Completed,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::TestDone => "test_done",
            ApplicationStatus::Completed => "completed",
        }
    }

    /// Returns the later of the two statuses, so a late-arriving stage never
    /// moves an application backwards.
    pub fn advance_to(self, next: ApplicationStatus) -> ApplicationStatus {
        self.max(next)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(ApplicationStatus::Applied),
            "test_done" => Ok(ApplicationStatus::TestDone),
            "completed" => Ok(ApplicationStatus::Completed),
            other => Err(format!("unknown application status '{other}'")),
        }
    }
}

// Stored as TEXT; encoded through its string form.
impl Type<Postgres> for ApplicationStatus {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for ApplicationStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <&str as Decode<Postgres>>::decode(value)?;
        raw.parse::<ApplicationStatus>().map_err(Into::into)
    }
}

impl Encode<'_, Postgres> for ApplicationStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
        <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub resume_filename: Option<String>,
    pub matched_skills: Vec<String>,
    pub resume_score: f64,
    pub test_score: f64,
    pub interview_score: f64,
    pub final_score: f64,
    pub rank: i32,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRow {
    pub fn is_completed(&self) -> bool {
        self.status == ApplicationStatus::Completed
    }
}

/// Values written when a candidate applies. Every later stage score starts at 0.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub resume_filename: Option<String>,
    pub matched_skills: Vec<String>,
    pub resume_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_never_regresses() {
        let s = ApplicationStatus::Completed;
        assert_eq!(s.advance_to(ApplicationStatus::TestDone), ApplicationStatus::Completed);
        assert_eq!(
            ApplicationStatus::Applied.advance_to(ApplicationStatus::TestDone),
            ApplicationStatus::TestDone
        );
    }

    #[test]
    fn test_status_parses_its_own_string_form() {
        for s in [
            ApplicationStatus::Applied,
            ApplicationStatus::TestDone,
            ApplicationStatus::Completed,
        ] {
            assert_eq!(s.as_str().parse::<ApplicationStatus>().unwrap(), s);
        }
        assert!("interview_completed".parse::<ApplicationStatus>().is_err());
    }
}
