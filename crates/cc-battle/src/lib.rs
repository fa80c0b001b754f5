//! Drives one chess game to completion against two UCI engine pools, and
//! mirrors its progress into a cursor/delta-replicated [`cc_delta::JobState`]
//! (spec.md §4.2, §4.3).

mod board;
mod delta_watcher;
mod driver;
mod engine;
mod error;
mod watcher;

pub use board::Board;
pub use board::Color;
pub use delta_watcher::DeltaWatcher;
pub use driver::BattleConfig;
pub use driver::BattleDriver;
pub use driver::BattleOutcome;
pub use engine::BestMove;
pub use engine::EnginePool;
pub use engine::SearchInfo;
pub use engine::UciEngine;
pub use error::EngineError;
pub use watcher::Clock;
pub use watcher::NullWatcher;
pub use watcher::Watcher;
