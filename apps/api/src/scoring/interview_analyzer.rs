//! Interview Analyzer — heuristic sub-scores from a transcript.
//!
//! - confidence = min(100, 40 + words / 5)
//! - clarity    = max(30, 90 - 5 × filler occurrences)
//! - emotion    = draw from `EMOTION_RANGE` (stand-in for a sentiment model)
//! - overall    = 0.35 × confidence + 0.35 × clarity + 0.30 × emotion
//!
//! Known limitation: `duration_seconds` is recorded but does not influence
//! any sub-score.

use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::scoring::random::RandomSource;
use crate::scoring::MAX_SCORE;

pub const FILLER_TERMS: &[&str] = &["um", "uh", "like", "you know", "basically", "actually"];
pub const EMOTION_RANGE: RangeInclusive<u32> = 55..=90;

const CONFIDENCE_BASELINE: f64 = 40.0;
const WORDS_PER_CONFIDENCE_POINT: f64 = 5.0;
const CLARITY_CEILING: f64 = 90.0;
const CLARITY_FLOOR: f64 = 30.0;
const FILLER_PENALTY: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterviewWeights {
    pub confidence: f64,
    pub clarity: f64,
    pub emotion: f64,
}

pub const INTERVIEW_WEIGHTS: InterviewWeights = InterviewWeights {
    confidence: 0.35,
    clarity: 0.35,
    emotion: 0.30,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewAnalysis {
    pub word_count: usize,
    pub filler_count: usize,
    pub duration_seconds: u32,
    pub confidence: f64,
    pub clarity: f64,
    /// Non-deterministic unless the analyzer was built with a fixed source.
    pub emotion: f64,
    pub overall: f64,
}

pub struct InterviewAnalyzer {
    random: Arc<dyn RandomSource>,
}

impl InterviewAnalyzer {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    pub fn analyze(&self, transcript: &str, duration_seconds: u32) -> InterviewAnalysis {
        let text = transcript.to_lowercase();
        let word_count = text.split_whitespace().count();
        let filler_count = count_fillers(&text);

        let confidence = confidence_score(word_count);
        let clarity = clarity_score(filler_count);
        let emotion = f64::from(self.random.draw(EMOTION_RANGE));

        let w = INTERVIEW_WEIGHTS;
        let overall = confidence * w.confidence + clarity * w.clarity + emotion * w.emotion;

        InterviewAnalysis {
            word_count,
            filler_count,
            duration_seconds,
            confidence,
            clarity,
            emotion,
            overall,
        }
    }
}

pub fn confidence_score(word_count: usize) -> f64 {
    (CONFIDENCE_BASELINE + word_count as f64 / WORDS_PER_CONFIDENCE_POINT).min(MAX_SCORE)
}

pub fn clarity_score(filler_count: usize) -> f64 {
    (CLARITY_CEILING - FILLER_PENALTY * filler_count as f64).max(CLARITY_FLOOR)
}

/// Substring occurrences of every filler term, summed. "like" inside
/// "likely" counts; that matches how the heuristic has always behaved.
fn count_fillers(lowercase_text: &str) -> usize {
    FILLER_TERMS
        .iter()
        .map(|term| lowercase_text.matches(term).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::random::FixedSource;

    fn analyzer(emotion: u32) -> InterviewAnalyzer {
        InterviewAnalyzer::new(Arc::new(FixedSource(emotion)))
    }

    #[test]
    fn test_five_plain_words() {
        let a = analyzer(70).analyze("a b c d e", 30);
        assert_eq!(a.word_count, 5);
        assert_eq!(a.confidence, 41.0);
        assert_eq!(a.clarity, 90.0);
    }

    #[test]
    fn test_three_ums() {
        let a = analyzer(70).analyze("um um um", 10);
        assert_eq!(a.filler_count, 3);
        assert_eq!(a.clarity, 75.0);
        assert!((a.confidence - 40.6).abs() < 1e-9);
    }

    #[test]
    fn test_empty_transcript_keeps_baseline() {
        let a = analyzer(70).analyze("", 0);
        assert_eq!(a.word_count, 0);
        assert_eq!(a.confidence, 40.0);
        assert_eq!(a.clarity, 90.0);
    }

    #[test]
    fn test_confidence_capped_at_100() {
        assert_eq!(confidence_score(300), 100.0);
        assert_eq!(confidence_score(1_000), 100.0);
        assert!(confidence_score(10) <= confidence_score(11));
    }

    #[test]
    fn test_clarity_floor() {
        assert_eq!(clarity_score(12), 30.0);
        assert_eq!(clarity_score(50), 30.0);
        assert_eq!(clarity_score(11), 35.0);
    }

    #[test]
    fn test_fillers_are_case_insensitive_and_multiword() {
        let a = analyzer(70).analyze("You KNOW, I basically Like it. Actually, uh...", 5);
        // you know, basically, like, actually, uh
        assert_eq!(a.filler_count, 5);
        assert_eq!(a.clarity, 65.0);
    }

    #[test]
    fn test_overall_uses_fixed_weights() {
        let a = analyzer(80).analyze("a b c d e", 30);
        let expected = 41.0 * 0.35 + 90.0 * 0.35 + 80.0 * 0.30;
        assert_eq!(a.emotion, 80.0);
        assert!((a.overall - expected).abs() < 1e-9);
    }

    #[test]
    fn test_duration_does_not_change_scores() {
        let short = analyzer(60).analyze("we shipped the migration on time", 5);
        let long = analyzer(60).analyze("we shipped the migration on time", 5_000);
        assert_eq!(short.overall, long.overall);
        assert_eq!(long.duration_seconds, 5_000);
    }

    #[test]
    fn test_interview_weights_sum_to_one() {
        let w = INTERVIEW_WEIGHTS;
        assert!((w.confidence + w.clarity + w.emotion - 1.0).abs() < 1e-9);
    }
}
