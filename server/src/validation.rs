use crate::models::tournament::Candidate;
use crate::services::controller::TournamentError;

const MIN_CANDIDATES: usize = 2;
const MAX_NAME_LEN: usize = 80;

pub const MSG_EMPTY_QUESTION: &str = "Please enter a test question";
pub const MSG_TOO_FEW_PROMPTS: &str = "Please enter at least 2 prompts";
pub const MSG_NOT_POWER_OF_TWO: &str =
    "Please enter a power of two number of prompts (2, 4, 8, 16, etc.)";

pub fn is_power_of_two(n: usize) -> bool {
    n > 0 && n & (n - 1) == 0
}

pub fn validate_question(question: &str) -> Result<String, TournamentError> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        Err(TournamentError::Validation(MSG_EMPTY_QUESTION))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Keeps candidates with non-empty content, trimmed, in their original order.
pub fn filter_candidates(candidates: &[Candidate]) -> Vec<Candidate> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.content.trim().is_empty())
        .map(|(position, c)| Candidate {
            id: c.id.clone(),
            name: normalize_name(&c.name, position + 1),
            content: c.content.trim().to_string(),
        })
        .collect()
}

pub fn normalize_name(name: &str, position: usize) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        format!("Prompt {}", position)
    } else {
        trimmed.chars().take(MAX_NAME_LEN).collect()
    }
}

/// Setup checks, in order: question, candidate count, power of two.
pub fn validate_start(
    question: &str,
    candidates: &[Candidate],
) -> Result<(String, Vec<Candidate>), TournamentError> {
    let question = validate_question(question)?;

    let valid = filter_candidates(candidates);
    if valid.len() < MIN_CANDIDATES {
        return Err(TournamentError::Validation(MSG_TOO_FEW_PROMPTS));
    }
    if !is_power_of_two(valid.len()) {
        return Err(TournamentError::Validation(MSG_NOT_POWER_OF_TWO));
    }

    Ok((question, valid))
}

pub fn validate_removal(draft_len: usize) -> Result<(), TournamentError> {
    if draft_len <= MIN_CANDIDATES {
        Err(TournamentError::Validation("A tournament needs at least 2 prompt slots"))
    } else {
        Ok(())
    }
}
