use cc_delta::{GameStatus, Verdict};

use crate::board::Color;
use crate::engine::SearchInfo;

/// A player's clock as reported after a move (spec.md §4.3: "clock is
/// carried too so that a non-ticking player still shows a remaining
/// time").
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    pub remaining_ms: i64,
}

/// The battle driver's sole observable side-channel (spec.md §4.2). All
/// four hooks are called synchronously from within the driver's game
/// loop; implementations that need to do real work should hand off to a
/// background task rather than block here.
#[async_trait::async_trait]
pub trait Watcher: Send + Sync {
    async fn on_game_inited(&self, fen: &str);
    async fn on_game_updated(&self, fen: &str, mover: Color, clock: Option<Clock>);
    async fn on_engine_info(&self, mover: Color, info: &SearchInfo);
    async fn on_game_finished(&self, fen: &str, status: GameStatus, verdict: Option<Verdict>, warnings: &[String]);
}

/// A [`Watcher`] that observes nothing. Useful for tests and for battles
/// run without live spectators.
pub struct NullWatcher;

#[async_trait::async_trait]
impl Watcher for NullWatcher {
    async fn on_game_inited(&self, _fen: &str) {}
    async fn on_game_updated(&self, _fen: &str, _mover: Color, _clock: Option<Clock>) {}
    async fn on_engine_info(&self, _mover: Color, _info: &SearchInfo) {}
    async fn on_game_finished(&self, _fen: &str, _status: GameStatus, _verdict: Option<Verdict>, _warnings: &[String]) {}
}
