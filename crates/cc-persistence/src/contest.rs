use cc_dto::DrawAdjudication;
use serde::{Deserialize, Serialize};

/// Kind of contest. Only `Match` is modeled (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestKind {
    Match,
}

/// A named engine participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
}

/// Immutable settings for one contest (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestInfo {
    pub id: String,
    pub name: String,
    pub kind: ContestKind,
    pub players: [Player; 2],
    pub time_control: Option<String>,
    pub opening_book: Option<String>,
    pub score_threshold: i32,
    pub deadline_margin_ms: i64,
    pub match_games: u32,
    /// Contest-wide defaults for each dispatched job's additive
    /// adjudication fields; `None` preserves spec.md's exact resign-only
    /// semantics.
    pub draw_adjudication: Option<DrawAdjudication>,
    pub max_moves: Option<u32>,
}

/// Running tally of a Match's finished games, split by pairing orientation
/// (spec.md §4.7, §4.8: first/second/draw counts plus how many were played
/// with the pair inverted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchTally {
    pub first_wins: u32,
    pub draws: u32,
    pub second_wins: u32,
    pub inverted_count: u32,
}

/// Terminal disposition of a contest. Mirrors [`cc_dto::JobStatus`]'s
/// shape but is a distinct type: a contest has no `Unknown`/`Running`
/// ambiguity worth sharing with a single job's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ContestStatus {
    Running,
    Succeeded,
    Aborted(String),
    Failed(String),
}

impl ContestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ContestStatus::Running)
    }
}

/// Mutable per-contest bookkeeping (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestData {
    pub status: ContestStatus,
    pub failed_jobs: u32,
    pub last_index: u64,
    pub match_tally: MatchTally,
}

impl ContestData {
    pub fn fresh() -> Self {
        Self {
            status: ContestStatus::Running,
            failed_jobs: 0,
            last_index: 0,
            match_tally: MatchTally::default(),
        }
    }
}
