//! The worker-side room client: hello/job polling loop, battle execution,
//! and the update pump that streams deltas back to the keeper (spec.md
//! §4.4).

mod client;
mod error;
mod pump;
mod registry;
mod retry;
mod transport;

pub use client::RoomClient;
pub use client::RoomClientConfig;
pub use error::RoomError;
pub use registry::EngineRegistry;
pub use transport::RoomTransport;
