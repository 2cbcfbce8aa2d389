use anyhow::{Context, Result};

const DEFAULT_MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but unparseable.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent → in-memory store (nothing survives a restart).
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Fixes the résumé bonus and interview emotion draws for reproducible runs.
    pub scoring_seed: Option<u64>,
    pub max_resume_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            scoring_seed: lookup("SCORING_SEED")
                .map(|raw| raw.parse::<u64>())
                .transpose()
                .context("SCORING_SEED must be an unsigned 64-bit integer")?,
            max_resume_bytes: lookup("MAX_RESUME_BYTES")
                .map(|raw| raw.parse::<usize>())
                .transpose()
                .context("MAX_RESUME_BYTES must be a byte count")?
                .unwrap_or(DEFAULT_MAX_RESUME_BYTES),
        })
    }
}
