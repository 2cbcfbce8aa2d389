use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden")]
    Forbidden,

    /// A second application for the same (candidate, job) pair.
    #[error("Candidate {candidate_id} already applied to job {job_id}")]
    AlreadyApplied {
        candidate_id: uuid::Uuid,
        job_id: uuid::Uuid,
    },

    /// A second test submission for an application. The stored result is untouched.
    #[error("Test already submitted for application {0}")]
    DuplicateSubmission(uuid::Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::AlreadyApplied { .. } => {
                (StatusCode::CONFLICT, "ALREADY_APPLIED", self.to_string())
            }
            AppError::DuplicateSubmission(_) => {
                (StatusCode::CONFLICT, "DUPLICATE_SUBMISSION", self.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_duplicate_submission_is_conflict() {
        let response = AppError::DuplicateSubmission(Uuid::new_v4()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_already_applied_is_conflict() {
        let response = AppError::AlreadyApplied {
            candidate_id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("Job x".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
