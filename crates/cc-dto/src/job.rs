use serde::{Deserialize, Serialize};

/// One named engine slot in a job (spec.md §3, §6: `white:{name}, black:{name}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    pub name: String,
}

/// A unit of work handed to a room: two engines, a clock, and a starting
/// position. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_board: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_moves: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_margin: Option<i64>,
    /// Consecutive near-zero-score plies before adjudicating a draw.
    /// Additive to `score_threshold`'s resign semantics; off by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_adjudication: Option<DrawAdjudication>,
    /// Ply count after which the battle driver adjudicates a draw. Off by
    /// default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_moves: Option<u32>,
    pub white: Engine,
    pub black: Engine,
}

/// A draw-by-adjudication window: `count` consecutive plies must each
/// report a score within `threshold` centipawns of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawAdjudication {
    pub threshold: i32,
    pub count: u32,
}

/// A [`Job`] bound to the contest and ledger slot that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningJob {
    #[serde(flatten)]
    pub job: Job,
    pub contest_id: String,
    pub white_engine_index: i32,
    pub black_engine_index: i32,
}

/// Which side the final position favors, or that the job never reached a
/// terminal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    WhiteWins,
    BlackWins,
    Draw,
    Running,
}

/// A [`RunningJob`] that reached a terminal [`super::JobStatus`], with its
/// contest-sequential index (assigned only on success) and optional PGN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedJob {
    #[serde(flatten)]
    pub running: RunningJob,
    pub status: super::JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pgn: Option<String>,
}
