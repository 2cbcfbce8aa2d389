use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::ScreeningPipeline;
use crate::store::ScreeningStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn ScreeningStore>,
    /// Shares `store`; owns the scorers and the per-job locks.
    pub pipeline: Arc<ScreeningPipeline>,
    pub config: Config,
}
