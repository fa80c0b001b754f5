//! The room registry: per-room exclusivity, liveness GC, and the
//! four-verb RPC surface that room clients speak (spec.md §4.5, §4.6).

mod keeper;
mod machine;
mod room;

pub use cc_core::MAX_JOB_FETCH_TIMEOUT;
pub use cc_core::ROOM_LIVENESS_TIMEOUT;
pub use keeper::RoomKeeper;
pub use machine::RoomMachine;
pub use machine::UpdateError;
pub use machine::UpdateOutcome;
pub use room::RoomExt;
pub use room::RoomInner;
