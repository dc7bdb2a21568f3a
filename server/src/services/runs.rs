//! In-memory registry of tournament runs.
//!
//! Runs are never written to the database; they disappear when discarded
//! or when the process exits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::generation::{Side, SideState};
use crate::models::tournament::{Candidate, ComparisonView, Mode, RunSnapshot, TournamentRun};
use crate::services::bracket;
use crate::services::controller::{self, TournamentError};

/// Responses for the match currently on the comparison screen.
#[derive(Debug, Clone)]
pub struct ComparisonState {
    pub ticket: u64,
    pub left: SideState,
    pub right: SideState,
}

impl ComparisonState {
    pub fn is_settled(&self) -> bool {
        self.left.is_settled() && self.right.is_settled()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunEntry {
    pub run: TournamentRun,
    pub comparison: Option<ComparisonState>,
}

/// Work handed to the fetcher after a match is opened.
#[derive(Debug, Clone)]
pub struct PendingComparison {
    pub run_id: String,
    pub ticket: u64,
    pub question: String,
    pub left: Candidate,
    pub right: Candidate,
}

#[derive(Default)]
pub struct RunRegistry {
    runs: Mutex<HashMap<String, RunEntry>>,
    tickets: AtomicU64,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RunEntry>> {
        self.runs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create(&self) -> RunSnapshot {
        let id = Uuid::new_v4().to_string();
        let entry = RunEntry::default();
        let snapshot = build_snapshot(&id, &entry);
        self.lock().insert(id.clone(), entry);
        info!(run = %id, "run created");
        snapshot
    }

    pub fn snapshot(&self, run_id: &str) -> Result<RunSnapshot, AppError> {
        let runs = self.lock();
        let entry = runs.get(run_id).ok_or_else(|| unknown_run(run_id))?;
        Ok(build_snapshot(run_id, entry))
    }

    pub fn discard(&self, run_id: &str) -> Result<(), AppError> {
        self.lock().remove(run_id).ok_or_else(|| unknown_run(run_id))?;
        info!(run = %run_id, "run discarded");
        Ok(())
    }

    /// Replaces the run with the result of `transition`. Any comparison in
    /// flight is dropped once the run leaves the comparison screen.
    pub fn apply<F>(&self, run_id: &str, transition: F) -> Result<RunSnapshot, AppError>
    where
        F: FnOnce(&TournamentRun) -> Result<TournamentRun, TournamentError>,
    {
        let mut runs = self.lock();
        let entry = runs.get_mut(run_id).ok_or_else(|| unknown_run(run_id))?;
        let next = transition(&entry.run)?;
        if next.mode != Mode::Comparison {
            entry.comparison = None;
        }
        entry.run = next;
        Ok(build_snapshot(run_id, entry))
    }

    /// Moves to the comparison screen and issues a fresh ticket; both sides
    /// start out loading.
    pub fn open_match(&self, run_id: &str, match_id: &str) -> Result<(RunSnapshot, PendingComparison), AppError> {
        let mut runs = self.lock();
        let entry = runs.get_mut(run_id).ok_or_else(|| unknown_run(run_id))?;
        let next = controller::open_match(&entry.run, match_id)?;

        let (left, right) = next
            .active_match()
            .and_then(|m| Some((m.candidate1.clone()?, m.candidate2.clone()?)))
            .ok_or_else(|| AppError::from(TournamentError::IncompleteMatch(match_id.to_string())))?;

        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed) + 1;
        entry.comparison = Some(ComparisonState {
            ticket,
            left: SideState::Loading,
            right: SideState::Loading,
        });
        let pending = PendingComparison {
            run_id: run_id.to_string(),
            ticket,
            question: next.question.clone(),
            left,
            right,
        };
        entry.run = next;
        debug!(run = %run_id, match_id = %match_id, ticket, "comparison opened");
        Ok((build_snapshot(run_id, entry), pending))
    }

    /// Records a winner once both responses have settled. Failed sides do
    /// not block the pick.
    pub fn select_winner(&self, run_id: &str, candidate_id: &str) -> Result<RunSnapshot, AppError> {
        {
            let runs = self.lock();
            let entry = runs.get(run_id).ok_or_else(|| unknown_run(run_id))?;
            if let Some(comparison) = &entry.comparison {
                if !comparison.is_settled() {
                    return Err(AppError::Conflict(
                        "Wait for both responses before picking a winner".into(),
                    ));
                }
            }
        }
        self.apply(run_id, |run| controller::select_winner(run, candidate_id))
    }

    /// Stores one side's result if `ticket` still names the open comparison.
    /// Returns false when the result arrived too late and was dropped.
    pub fn settle(&self, run_id: &str, ticket: u64, side: Side, state: SideState) -> bool {
        let mut runs = self.lock();
        let comparison = runs
            .get_mut(run_id)
            .and_then(|entry| entry.comparison.as_mut())
            .filter(|c| c.ticket == ticket);
        match comparison {
            Some(c) => {
                match side {
                    Side::Left => c.left = state,
                    Side::Right => c.right = state,
                }
                true
            }
            None => {
                debug!(run = %run_id, ticket, ?side, "discarding stale response");
                false
            }
        }
    }

    pub fn active_runs(&self) -> usize {
        self.lock().len()
    }
}

fn unknown_run(run_id: &str) -> AppError {
    AppError::NotFound(format!("Unknown run: {}", run_id))
}

fn build_snapshot(run_id: &str, entry: &RunEntry) -> RunSnapshot {
    let run = &entry.run;
    let bracket = (run.mode != Mode::Setup).then(|| bracket::bracket_view(&run.matches));

    let comparison = match (run.mode, run.active_match()) {
        (Mode::Comparison, Some(current)) => {
            let (left, right) = entry
                .comparison
                .as_ref()
                .map(|c| (c.left.clone(), c.right.clone()))
                .unwrap_or((SideState::Loading, SideState::Loading));
            let selection_enabled = !run.reviewing
                && !current.is_decided()
                && left.is_settled()
                && right.is_settled();
            Some(ComparisonView {
                label: format!("Round {} - Match {}", current.round, current.match_number + 1),
                current: current.clone(),
                reviewing: run.reviewing,
                left,
                right,
                selection_enabled,
            })
        }
        _ => None,
    };

    RunSnapshot {
        id: run_id.to_string(),
        mode: run.mode,
        question: run.question.clone(),
        draft: run.draft.clone(),
        candidates: run.candidates.clone(),
        bracket,
        comparison,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tournament::CandidatePatch;

    fn started(registry: &RunRegistry) -> String {
        let id = registry.create().id;
        for (cid, content) in [("1", "Be terse."), ("2", "Be verbose.")] {
            registry
                .apply(&id, |run| {
                    controller::update_candidate(
                        run,
                        cid,
                        CandidatePatch {
                            name: None,
                            content: Some(content.into()),
                        },
                    )
                })
                .unwrap();
        }
        registry.apply(&id, |run| controller::set_question(run, "Why?")).unwrap();
        registry.apply(&id, controller::start).unwrap();
        id
    }

    #[test]
    fn unknown_run_is_not_found() {
        let registry = RunRegistry::new();
        assert!(matches!(registry.snapshot("nope"), Err(AppError::NotFound(_))));
        assert!(matches!(registry.discard("nope"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn rejected_transition_keeps_run() {
        let registry = RunRegistry::new();
        let id = registry.create().id;
        let err = registry.apply(&id, controller::start).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(registry.snapshot(&id).unwrap().mode, Mode::Setup);
    }

    #[test]
    fn winner_gated_on_loading_not_on_errors() {
        let registry = RunRegistry::new();
        let id = started(&registry);
        let (snapshot, pending) = registry.open_match(&id, "match-1-0").unwrap();
        assert!(!snapshot.comparison.unwrap().selection_enabled);

        let err = registry.select_winner(&id, &pending.left.id).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        assert!(registry.settle(&id, pending.ticket, Side::Left, SideState::Failed { error: "boom".into() }));
        assert!(registry.select_winner(&id, &pending.left.id).is_err());
        assert!(registry.settle(
            &id,
            pending.ticket,
            Side::Right,
            SideState::Ready { response: "Because.".into() }
        ));
        let view = registry.snapshot(&id).unwrap().comparison.unwrap();
        assert!(view.selection_enabled);
        assert_eq!(view.left, SideState::Failed { error: "boom".into() });

        let after = registry.select_winner(&id, &pending.left.id).unwrap();
        assert_eq!(after.mode, Mode::Bracket);
        assert_eq!(after.bracket.unwrap().champion.unwrap().id, pending.left.id);
    }

    #[test]
    fn stale_results_are_dropped() {
        let registry = RunRegistry::new();
        let id = started(&registry);
        let (_, first) = registry.open_match(&id, "match-1-0").unwrap();
        registry.apply(&id, controller::back).unwrap();
        assert!(!registry.settle(&id, first.ticket, Side::Left, SideState::Ready { response: "late".into() }));

        let (_, second) = registry.open_match(&id, "match-1-0").unwrap();
        assert_ne!(first.ticket, second.ticket);
        assert!(!registry.settle(&id, first.ticket, Side::Right, SideState::Ready { response: "late".into() }));
        let view = registry.snapshot(&id).unwrap().comparison.unwrap();
        assert_eq!(view.left, SideState::Loading);
        assert_eq!(view.right, SideState::Loading);

        registry.discard(&id).unwrap();
        assert!(!registry.settle(&id, second.ticket, Side::Left, SideState::Loading));
        assert_eq!(registry.active_runs(), 0);
    }
}
