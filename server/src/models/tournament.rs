use serde::{Deserialize, Serialize};

use super::generation::SideState;

pub const DEFAULT_DRAFT_SIZE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub content: String,
}

impl Candidate {
    pub fn blank(id: usize) -> Self {
        Candidate {
            id: id.to_string(),
            name: format!("Prompt {}", id),
            content: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub round: u32,
    pub match_number: u32,
    pub candidate1: Option<Candidate>,
    pub candidate2: Option<Candidate>,
    pub winner: Option<Candidate>,
}

impl Match {
    pub fn new(round: u32, match_number: u32, candidate1: Candidate, candidate2: Option<Candidate>) -> Self {
        Match {
            id: format!("match-{}-{}", round, match_number),
            round,
            match_number,
            candidate1: Some(candidate1),
            candidate2,
            winner: None,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// Both slots filled, so the pair can be compared.
    pub fn is_ready(&self) -> bool {
        self.candidate1.is_some() && self.candidate2.is_some()
    }

    pub fn contains(&self, candidate_id: &str) -> Option<&Candidate> {
        [&self.candidate1, &self.candidate2]
            .into_iter()
            .flatten()
            .find(|c| c.id == candidate_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Setup,
    Bracket,
    Comparison,
}

/// Contents of the setup form before a tournament starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupDraft {
    pub question: String,
    pub candidates: Vec<Candidate>,
}

impl Default for SetupDraft {
    fn default() -> Self {
        SetupDraft {
            question: String::new(),
            candidates: (1..=DEFAULT_DRAFT_SIZE).map(Candidate::blank).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentRun {
    pub question: String,
    pub candidates: Vec<Candidate>,
    pub matches: Vec<Match>,
    pub current_match: Option<String>,
    pub mode: Mode,
    pub reviewing: bool,
    pub draft: SetupDraft,
}

impl Default for TournamentRun {
    fn default() -> Self {
        TournamentRun {
            question: String::new(),
            candidates: Vec::new(),
            matches: Vec::new(),
            current_match: None,
            mode: Mode::Setup,
            reviewing: false,
            draft: SetupDraft::default(),
        }
    }
}

impl TournamentRun {
    pub fn find_match(&self, match_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    pub fn active_match(&self) -> Option<&Match> {
        self.current_match.as_deref().and_then(|id| self.find_match(id))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub id: String,
    pub round: u32,
    pub match_number: u32,
    pub candidate1: String,
    pub candidate2: String,
    pub winner: Option<Candidate>,
    pub can_compare: bool,
    pub can_review: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundView {
    pub round: u32,
    pub label: String,
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BracketView {
    pub rounds: Vec<RoundView>,
    pub champion: Option<Candidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonView {
    #[serde(rename = "match")]
    pub current: Match,
    pub label: String,
    pub reviewing: bool,
    pub left: SideState,
    pub right: SideState,
    pub selection_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub id: String,
    pub mode: Mode,
    pub question: String,
    pub draft: SetupDraft,
    pub candidates: Vec<Candidate>,
    pub bracket: Option<BracketView>,
    pub comparison: Option<ComparisonView>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionUpdate {
    pub question: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateCreate {
    pub name: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidatePatch {
    pub name: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WinnerSelection {
    pub candidate_id: String,
}
