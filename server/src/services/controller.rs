//! Transitions of the setup / bracket / comparison state machine.
//!
//! Each transition takes the current run and returns the next one; a
//! rejected transition returns an error and the caller keeps the old run.

use tracing::debug;

use crate::models::tournament::{
    Candidate, CandidateCreate, CandidatePatch, Mode, TournamentRun,
};
use crate::services::bracket::{self, RoundOutcome};
use crate::validation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TournamentError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("Action not available in {0:?} mode")]
    WrongMode(Mode),
    #[error("Unknown match: {0}")]
    UnknownMatch(String),
    #[error("Unknown candidate: {0}")]
    UnknownCandidate(String),
    #[error("Match {0} is missing a candidate")]
    IncompleteMatch(String),
    #[error("Match {0} already has a winner")]
    AlreadyDecided(String),
    #[error("Winners cannot be picked while reviewing a match")]
    Reviewing,
}

fn require(run: &TournamentRun, mode: Mode) -> Result<(), TournamentError> {
    if run.mode == mode {
        Ok(())
    } else {
        Err(TournamentError::WrongMode(run.mode))
    }
}

pub fn set_question(run: &TournamentRun, question: &str) -> Result<TournamentRun, TournamentError> {
    require(run, Mode::Setup)?;
    let mut next = run.clone();
    next.draft.question = question.to_string();
    Ok(next)
}

/// Ids are numeric strings; a new slot always takes max + 1 so removals
/// never cause a collision.
fn next_candidate_id(candidates: &[Candidate]) -> usize {
    candidates
        .iter()
        .filter_map(|c| c.id.parse::<usize>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

pub fn add_candidate(run: &TournamentRun, req: CandidateCreate) -> Result<TournamentRun, TournamentError> {
    require(run, Mode::Setup)?;
    let mut next = run.clone();
    let mut candidate = Candidate::blank(next_candidate_id(&next.draft.candidates));
    if let Some(name) = req.name {
        candidate.name = name;
    }
    if let Some(content) = req.content {
        candidate.content = content;
    }
    next.draft.candidates.push(candidate);
    Ok(next)
}

pub fn update_candidate(
    run: &TournamentRun,
    candidate_id: &str,
    patch: CandidatePatch,
) -> Result<TournamentRun, TournamentError> {
    require(run, Mode::Setup)?;
    let mut next = run.clone();
    let candidate = next
        .draft
        .candidates
        .iter_mut()
        .find(|c| c.id == candidate_id)
        .ok_or_else(|| TournamentError::UnknownCandidate(candidate_id.to_string()))?;
    if let Some(name) = patch.name {
        candidate.name = name;
    }
    if let Some(content) = patch.content {
        candidate.content = content;
    }
    Ok(next)
}

pub fn remove_candidate(run: &TournamentRun, candidate_id: &str) -> Result<TournamentRun, TournamentError> {
    require(run, Mode::Setup)?;
    if !run.draft.candidates.iter().any(|c| c.id == candidate_id) {
        return Err(TournamentError::UnknownCandidate(candidate_id.to_string()));
    }
    validation::validate_removal(run.draft.candidates.len())?;
    let mut next = run.clone();
    next.draft.candidates.retain(|c| c.id != candidate_id);
    Ok(next)
}

pub fn start(run: &TournamentRun) -> Result<TournamentRun, TournamentError> {
    require(run, Mode::Setup)?;
    let (question, candidates) = validation::validate_start(&run.draft.question, &run.draft.candidates)?;

    let mut next = run.clone();
    next.matches = bracket::build_first_round(&candidates);
    next.question = question;
    next.candidates = candidates;
    next.current_match = None;
    next.reviewing = false;
    next.mode = Mode::Bracket;
    debug!(candidates = next.candidates.len(), "tournament started");
    Ok(next)
}

/// Opens a match for comparison. Decided matches open in review mode.
pub fn open_match(run: &TournamentRun, match_id: &str) -> Result<TournamentRun, TournamentError> {
    require(run, Mode::Bracket)?;
    let m = run
        .find_match(match_id)
        .ok_or_else(|| TournamentError::UnknownMatch(match_id.to_string()))?;

    let reviewing = m.is_decided();
    if !reviewing && !m.is_ready() {
        return Err(TournamentError::IncompleteMatch(match_id.to_string()));
    }

    let mut next = run.clone();
    next.current_match = Some(match_id.to_string());
    next.reviewing = reviewing;
    next.mode = Mode::Comparison;
    Ok(next)
}

pub fn select_winner(run: &TournamentRun, candidate_id: &str) -> Result<TournamentRun, TournamentError> {
    require(run, Mode::Comparison)?;
    if run.reviewing {
        return Err(TournamentError::Reviewing);
    }
    let current = run
        .active_match()
        .ok_or_else(|| TournamentError::UnknownMatch(run.current_match.clone().unwrap_or_default()))?;
    if current.is_decided() {
        return Err(TournamentError::AlreadyDecided(current.id.clone()));
    }
    let winner = current
        .contains(candidate_id)
        .cloned()
        .ok_or_else(|| TournamentError::UnknownCandidate(candidate_id.to_string()))?;
    let (match_id, round) = (current.id.clone(), current.round);

    let mut next = run.clone();
    if let Some(m) = next.matches.iter_mut().find(|m| m.id == match_id) {
        m.winner = Some(winner);
    }

    let successor_exists = next.matches.iter().any(|m| m.round == round + 1);
    if !successor_exists {
        match bracket::advance_round(round, &next.matches) {
            RoundOutcome::NextRound(matches) => {
                debug!(round = round + 1, matches = matches.len(), "round advanced");
                next.matches.extend(matches);
            }
            RoundOutcome::Champion(champion) => {
                debug!(champion = %champion.name, "tournament decided");
            }
            RoundOutcome::Incomplete => {}
        }
    }

    next.current_match = None;
    next.reviewing = false;
    next.mode = Mode::Bracket;
    Ok(next)
}

pub fn back(run: &TournamentRun) -> Result<TournamentRun, TournamentError> {
    require(run, Mode::Comparison)?;
    let mut next = run.clone();
    next.current_match = None;
    next.reviewing = false;
    next.mode = Mode::Bracket;
    Ok(next)
}

pub fn reset(_run: &TournamentRun) -> TournamentRun {
    TournamentRun::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tournament::SetupDraft;

    fn draft_run(question: &str, contents: &[&str]) -> TournamentRun {
        TournamentRun {
            draft: SetupDraft {
                question: question.into(),
                candidates: contents
                    .iter()
                    .enumerate()
                    .map(|(i, content)| Candidate {
                        id: (i + 1).to_string(),
                        name: content.to_string(),
                        content: content.to_string(),
                    })
                    .collect(),
            },
            ..TournamentRun::default()
        }
    }

    fn pick(run: &TournamentRun, match_id: &str, name: &str) -> TournamentRun {
        let opened = open_match(run, match_id).unwrap();
        let m = opened.active_match().unwrap();
        let id = [&m.candidate1, &m.candidate2]
            .into_iter()
            .flatten()
            .find(|c| c.name == name)
            .unwrap()
            .id
            .clone();
        select_winner(&opened, &id).unwrap()
    }

    #[test]
    fn four_candidate_scenario() {
        let run = start(&draft_run("Q", &["A", "B", "C", "D"])).unwrap();
        assert_eq!(run.mode, Mode::Bracket);
        assert_eq!(run.question, "Q");
        assert_eq!(run.matches.len(), 2);

        let run = pick(&run, "match-1-0", "A");
        assert_eq!(run.matches.len(), 2);
        let run = pick(&run, "match-1-1", "C");
        assert_eq!(run.matches.len(), 3);
        let final_match = run.find_match("match-2-0").unwrap();
        assert_eq!(final_match.candidate1.as_ref().unwrap().name, "A");
        assert_eq!(final_match.candidate2.as_ref().unwrap().name, "C");

        let run = pick(&run, "match-2-0", "A");
        assert_eq!(run.matches.len(), 3);
        assert_eq!(run.mode, Mode::Bracket);
        assert_eq!(bracket::champion(&run.matches).unwrap().name, "A");
    }

    #[test]
    fn three_candidates_stay_in_setup() {
        let run = draft_run("Q", &["A", "B", "C"]);
        let err = start(&run).unwrap_err();
        assert_eq!(err, TournamentError::Validation(validation::MSG_NOT_POWER_OF_TWO));
        assert_eq!(run.mode, Mode::Setup);
        assert!(run.matches.is_empty());
    }

    #[test]
    fn blank_question_rejected() {
        let err = start(&draft_run(" ", &["A", "B"])).unwrap_err();
        assert_eq!(err, TournamentError::Validation(validation::MSG_EMPTY_QUESTION));
    }

    #[test]
    fn decided_match_opens_in_review() {
        let run = start(&draft_run("Q", &["A", "B", "C", "D"])).unwrap();
        let run = pick(&run, "match-1-0", "B");
        let review = open_match(&run, "match-1-0").unwrap();
        assert!(review.reviewing);
        assert_eq!(review.mode, Mode::Comparison);

        let a_id = review.active_match().unwrap().candidate1.as_ref().unwrap().id.clone();
        assert_eq!(select_winner(&review, &a_id).unwrap_err(), TournamentError::Reviewing);

        let back_run = back(&review).unwrap();
        assert_eq!(back_run.mode, Mode::Bracket);
        assert!(!back_run.reviewing);
        assert_eq!(back_run.matches, run.matches);
    }

    #[test]
    fn back_without_pick_changes_nothing() {
        let run = start(&draft_run("Q", &["A", "B"])).unwrap();
        let opened = open_match(&run, "match-1-0").unwrap();
        assert!(!opened.reviewing);
        let returned = back(&opened).unwrap();
        assert_eq!(returned.matches, run.matches);
        assert!(returned.current_match.is_none());
    }

    #[test]
    fn winner_must_be_in_match() {
        let run = start(&draft_run("Q", &["A", "B", "C", "D"])).unwrap();
        let opened = open_match(&run, "match-1-0").unwrap();
        assert_eq!(
            select_winner(&opened, "3").unwrap_err(),
            TournamentError::UnknownCandidate("3".into())
        );
    }

    #[test]
    fn incomplete_match_cannot_be_opened() {
        let mut run = start(&draft_run("Q", &["A", "B"])).unwrap();
        run.matches[0].candidate2 = None;
        assert_eq!(
            open_match(&run, "match-1-0").unwrap_err(),
            TournamentError::IncompleteMatch("match-1-0".into())
        );
        assert_eq!(
            open_match(&run, "match-9-9").unwrap_err(),
            TournamentError::UnknownMatch("match-9-9".into())
        );
    }

    #[test]
    fn transitions_check_mode() {
        let run = TournamentRun::default();
        assert_eq!(open_match(&run, "match-1-0").unwrap_err(), TournamentError::WrongMode(Mode::Setup));
        assert_eq!(back(&run).unwrap_err(), TournamentError::WrongMode(Mode::Setup));
        let started = start(&draft_run("Q", &["A", "B"])).unwrap();
        assert_eq!(start(&started).unwrap_err(), TournamentError::WrongMode(Mode::Bracket));
        assert!(set_question(&started, "new").is_err());
    }

    #[test]
    fn reset_clears_everything() {
        let run = start(&draft_run("Q", &["A", "B"])).unwrap();
        let opened = open_match(&run, "match-1-0").unwrap();
        let fresh = reset(&opened);
        assert_eq!(fresh, TournamentRun::default());
        assert_eq!(fresh.draft.candidates.len(), 4);
    }

    #[test]
    fn draft_editing() {
        let run = TournamentRun::default();
        let run = remove_candidate(&run, "2").unwrap();
        let run = add_candidate(&run, CandidateCreate::default()).unwrap();
        let ids: Vec<&str> = run.draft.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["1", "3", "4", "5"]);

        let run = update_candidate(
            &run,
            "5",
            CandidatePatch {
                name: Some("Terse".into()),
                content: Some("Answer in one line.".into()),
            },
        )
        .unwrap();
        assert_eq!(run.draft.candidates[3].name, "Terse");

        let run = remove_candidate(&run, "1").unwrap();
        let run = remove_candidate(&run, "3").unwrap();
        assert_eq!(run.draft.candidates.len(), 2);
        assert!(remove_candidate(&run, "4").is_err());
        assert!(update_candidate(&run, "42", CandidatePatch::default()).is_err());
    }
}
