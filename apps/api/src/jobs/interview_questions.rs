//! Fixed interview prompts, personalised with the job title and its first
//! two skills.

use crate::models::job::JobSkillSet;

const PRIMARY_SKILL_FALLBACK: &str = "your field";
const SECONDARY_SKILL_FALLBACK: &str = "this role";

pub fn interview_questions(title: &str, skills: &JobSkillSet) -> Vec<String> {
    let mut named = skills.skills().iter().map(String::as_str);
    let primary = named.next().unwrap_or(PRIMARY_SKILL_FALLBACK);
    let secondary = named.next().unwrap_or(SECONDARY_SKILL_FALLBACK);

    vec![
        format!("Tell me about yourself and your experience with {primary}."),
        format!("What projects have you worked on related to {secondary}?"),
        "What is your biggest professional achievement?".to_string(),
        "How do you handle tight deadlines and pressure?".to_string(),
        format!("Why do you want to work as a {}?", title.trim()),
    ]
}
