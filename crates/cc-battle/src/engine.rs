use cc_core::{Score, Timestamp};

use crate::error::EngineError;

/// One engine's reported search result for a single move (spec.md §4.2,
/// §4.3: score, principal variation, depth, nodes, nps).
#[derive(Debug, Clone, Default)]
pub struct SearchInfo {
    pub score: Option<Score>,
    pub pv: Vec<String>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
}

/// The chosen move plus the search info that produced it.
#[derive(Debug, Clone)]
pub struct BestMove {
    pub uci: String,
    pub info: SearchInfo,
}

/// The seam between the battle driver and a real UCI engine process.
/// Implementations own the process lifecycle; the driver only calls these
/// four operations in sequence (spec.md §4.2).
#[async_trait::async_trait]
pub trait UciEngine: Send {
    async fn new_game(&mut self) -> Result<(), EngineError>;
    async fn set_position(&mut self, fen: &str, moves: &[String]) -> Result<(), EngineError>;
    /// Searches until `deadline`. Implementations should race their own
    /// I/O against the deadline and return `WaitTimeout` rather than block
    /// past it.
    async fn go(&mut self, deadline: Timestamp) -> Result<BestMove, EngineError>;
    /// Best-effort stop of an in-flight search, used when the pool
    /// reclaims a healthy engine mid-think.
    async fn stop(&mut self);
}

/// Acquires and releases engines for one color, bounding how long
/// acquisition may take (spec.md §4.2: "per-pool create timeout").
#[async_trait::async_trait]
pub trait EnginePool: Send + Sync {
    async fn acquire(&self, timeout: std::time::Duration) -> Result<Box<dyn UciEngine>, EngineError>;
    async fn release(&self, engine: Box<dyn UciEngine>, healthy: bool);
}
