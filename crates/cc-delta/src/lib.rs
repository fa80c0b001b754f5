//! Cursor/delta model for replicating a room's live game state (spec.md
//! §4.1). Pure, I/O-free: snapshot, delta-from-cursor, delta-apply.

mod cursor;
mod error;
mod job_state;
mod log;
mod player;
mod position;
mod room_state;

pub use cursor::JobCursor;
pub use error::ApplyError;
pub use error::DeltaError;
pub use job_state::Info;
pub use job_state::JobState;
pub use log::AppendLog;
pub use player::PlayerState;
pub use position::GameStatus;
pub use position::PositionState;
pub use position::Verdict;
pub use room_state::RoomCursor;
pub use room_state::RoomState;
