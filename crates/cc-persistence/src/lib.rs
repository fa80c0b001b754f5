//! Durable-state contract for rooms, contests, and finished jobs (spec.md
//! §6), plus an in-memory reference implementation for tests and
//! single-process development.

mod contest;
mod memory;
mod repository;
mod room;

pub use contest::ContestData;
pub use contest::ContestInfo;
pub use contest::ContestKind;
pub use contest::ContestStatus;
pub use contest::MatchTally;
pub use contest::Player;
pub use memory::InMemoryRepository;
pub use repository::PersistenceError;
pub use repository::Repository;
pub use room::RoomRecord;
