pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::pipeline::handlers as screening;
use crate::state::AppState;

/// Room for the multipart boundaries and the `candidate_id` field on top of
/// the résumé itself.
const MULTIPART_OVERHEAD_BYTES: usize = 16 * 1024;

pub fn build_router(state: AppState) -> Router {
    let apply_limit = state.config.max_resume_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs and their tests
        .route(
            "/api/v1/jobs",
            post(jobs::handle_create_job).get(jobs::handle_list_jobs),
        )
        .route("/api/v1/jobs/:job_id", get(jobs::handle_get_job))
        .route(
            "/api/v1/jobs/:job_id/questions",
            post(jobs::handle_add_question).get(jobs::handle_list_questions),
        )
        .route(
            "/api/v1/jobs/:job_id/interview-questions",
            get(jobs::handle_interview_questions),
        )
        // Screening pipeline
        .route(
            "/api/v1/jobs/:job_id/apply",
            post(screening::handle_apply).layer(DefaultBodyLimit::max(apply_limit)),
        )
        .route(
            "/api/v1/applications/:id",
            get(screening::handle_get_application),
        )
        .route(
            "/api/v1/applications/:id/test",
            get(screening::handle_get_test_result),
        )
        .route(
            "/api/v1/applications/:id/interview",
            get(screening::handle_get_interview_result),
        )
        .route(
            "/api/v1/candidates/:candidate_id/applications",
            get(screening::handle_candidate_applications),
        )
        .route("/api/v1/tests/submit", post(screening::handle_submit_test))
        .route(
            "/api/v1/interviews/submit",
            post(screening::handle_submit_interview),
        )
        // Rankings
        .route(
            "/api/v1/jobs/:job_id/rankings",
            get(screening::handle_rankings),
        )
        .route(
            "/api/v1/jobs/:job_id/rankings/recompute",
            post(screening::handle_recompute_rankings),
        )
        .route("/api/v1/stats", get(screening::handle_stats))
        .with_state(state)
}
