// Candidate scoring stages: résumé match, test grading, interview heuristics,
// weighted aggregation and per-job ranking.
// Every stage is a pure computation over in-memory values; persistence and
// locking live in `pipeline` and `store`.

pub mod aggregator;
pub mod interview_analyzer;
pub mod random;
pub mod rank_engine;
pub mod resume_matcher;
pub mod test_grader;

pub const MAX_SCORE: f64 = 100.0;

pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, MAX_SCORE)
}

/// Two-decimal rounding for presentation. Stored values keep full precision.
pub fn round2(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
