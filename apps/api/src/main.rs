mod config;
mod db;
mod errors;
mod jobs;
mod models;
mod pipeline;
mod routes;
mod scoring;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::pipeline::ScreeningPipeline;
use crate::routes::build_router;
use crate::scoring::random::{RandomSource, SeededSource};
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore, ScreeningStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize storage: PostgreSQL when configured, in-memory otherwise
    let store: Arc<dyn ScreeningStore> = match &config.database_url {
        Some(url) => {
            let db = create_pool(url).await?;
            run_migrations(&db).await?;
            Arc::new(PgStore::new(db))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    // Initialize the random source for the résumé bonus and interview emotion
    let random: Arc<dyn RandomSource> = match config.scoring_seed {
        Some(seed) => {
            info!("Scoring randomness seeded with {seed}");
            Arc::new(SeededSource::from_seed(seed))
        }
        None => Arc::new(SeededSource::from_entropy()),
    };

    let pipeline = Arc::new(ScreeningPipeline::new(store.clone(), random));

    // Build app state
    let state = AppState {
        store,
        pipeline,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
