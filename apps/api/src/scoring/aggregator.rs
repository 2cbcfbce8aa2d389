use serde::{Deserialize, Serialize};

/// Stage weights for the final score. Fixed; they must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub resume: f64,
    pub test: f64,
    pub interview: f64,
}

pub const FINAL_WEIGHTS: ScoringWeights = ScoringWeights {
    resume: 0.30,
    test: 0.35,
    interview: 0.35,
};

#[cfg(test)]
impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.resume + self.test + self.interview
    }
}

/// The three stage scores feeding the final score. A stage that has not run yet is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageScores {
    pub resume: f64,
    pub test: f64,
    pub interview: f64,
}

/// final = 0.30*resume + 0.35*test + 0.35*interview
pub fn final_score(stages: StageScores) -> f64 {
    let w = FINAL_WEIGHTS;
    stages.resume * w.resume + stages.test * w.test + stages.interview * w.interview
}
