// Job postings, their multiple-choice tests and interview prompts.
// Scoring and ranking live in `pipeline`; this module only manages the inputs.

pub mod handlers;
pub mod interview_questions;
