//! Single-elimination pairing and round advancement.
//!
//! Everything here is pure: callers own the match list and decide when to
//! merge the output back in.

use crate::models::tournament::{BracketView, Candidate, Match, MatchView, RoundView};

const EMPTY_SLOT: &str = "TBD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// At least one match in the round has no winner yet.
    Incomplete,
    Champion(Candidate),
    NextRound(Vec<Match>),
}

/// Pairs entries in order: (0,1), (2,3), ... An odd trailing entry gets an
/// empty second slot, which is never offered for comparison.
fn pair(round: u32, entries: &[Candidate]) -> Vec<Match> {
    entries
        .chunks(2)
        .enumerate()
        .map(|(i, chunk)| Match::new(round, i as u32, chunk[0].clone(), chunk.get(1).cloned()))
        .collect()
}

pub fn build_first_round(candidates: &[Candidate]) -> Vec<Match> {
    pair(1, candidates)
}

pub fn round_matches(matches: &[Match], round: u32) -> impl Iterator<Item = &Match> {
    matches.iter().filter(move |m| m.round == round)
}

pub fn round_complete(matches: &[Match], round: u32) -> bool {
    let mut in_round = round_matches(matches, round).peekable();
    in_round.peek().is_some() && in_round.all(Match::is_decided)
}

pub fn highest_round(matches: &[Match]) -> Option<u32> {
    matches.iter().map(|m| m.round).max()
}

pub fn advance_round(round: u32, matches: &[Match]) -> RoundOutcome {
    if !round_complete(matches, round) {
        return RoundOutcome::Incomplete;
    }

    let mut decided: Vec<&Match> = round_matches(matches, round).collect();
    decided.sort_by_key(|m| m.match_number);
    let winners: Vec<Candidate> = decided.into_iter().filter_map(|m| m.winner.clone()).collect();

    match winners.as_slice() {
        [only] => RoundOutcome::Champion(only.clone()),
        _ => RoundOutcome::NextRound(pair(round + 1, &winners)),
    }
}

/// The winner of the final, once the highest round is a single decided match.
pub fn champion(matches: &[Match]) -> Option<&Candidate> {
    let top = highest_round(matches)?;
    let mut finals = round_matches(matches, top);
    match (finals.next(), finals.next()) {
        (Some(only), None) => only.winner.as_ref(),
        _ => None,
    }
}

pub fn bracket_view(matches: &[Match]) -> BracketView {
    let top = highest_round(matches).unwrap_or(0);
    let rounds = (1..=top)
        .map(|round| {
            let mut in_round: Vec<&Match> = round_matches(matches, round).collect();
            in_round.sort_by_key(|m| m.match_number);
            let label = if round == top && in_round.len() == 1 {
                "Final".to_string()
            } else {
                format!("Round {}", round)
            };
            RoundView {
                round,
                label,
                matches: in_round.into_iter().map(match_view).collect(),
            }
        })
        .collect();

    BracketView {
        rounds,
        champion: champion(matches).cloned(),
    }
}

fn match_view(m: &Match) -> MatchView {
    let slot = |c: &Option<Candidate>| c.as_ref().map_or_else(|| EMPTY_SLOT.to_string(), |c| c.name.clone());
    MatchView {
        id: m.id.clone(),
        round: m.round,
        match_number: m.match_number,
        candidate1: slot(&m.candidate1),
        candidate2: slot(&m.candidate2),
        winner: m.winner.clone(),
        can_compare: !m.is_decided() && m.is_ready(),
        can_review: m.is_decided(),
    }
}
