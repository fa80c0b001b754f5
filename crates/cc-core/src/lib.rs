//! Core type aliases, identifiers, and tunables shared across the contest
//! orchestrator workspace.
#![allow(dead_code)]

#[cfg(feature = "server")]
mod init;
mod score;
mod timestamp;
mod tunables;
mod ulid;

#[cfg(feature = "server")]
pub use init::init_logging;
#[cfg(feature = "server")]
pub use init::install_shutdown_signal;
pub use score::Score;
pub use timestamp::Timestamp;
pub use timestamp::TimestampBase;
pub use timestamp::TimestampDiff;
pub use tunables::*;
pub use ulid::InvalidUlid;
pub use ulid::Ulid;

/// Centipawn / mate score carried in engine search info.
pub type Centipawns = i32;
/// Ply count within a game.
pub type Ply = u32;

/// Unique identifier trait for domain entities, mirrors the teacher's
/// `Unique` trait but keyed by the untyped [`Ulid`] used on the wire.
pub trait Unique {
    fn id(&self) -> Ulid;
}
