use std::sync::Arc;
use std::time::Duration;

use cc_battle::DeltaWatcher;
use cc_core::Timestamp;
use cc_dto::ApiError;
use cc_delta::JobCursor;
use cc_dto::rpc::update;
use tokio_util::sync::CancellationToken;

use crate::error::RoomError;
use crate::transport::RoomTransport;

/// Streams a job's [`DeltaWatcher`] back to the keeper: on every ping tick,
/// every watcher notification, and at game end (spec.md §4.4 step 3).
pub struct UpdatePump {
    transport: Arc<RoomTransport>,
    ping_interval: Duration,
}

impl UpdatePump {
    pub fn new(transport: Arc<RoomTransport>, ping_interval: Duration) -> Self {
        Self { transport, ping_interval }
    }

    /// Runs until the watcher closes (game end) or `cancel` fires. Returns
    /// `Ok(())` if the job ended with a clean final Update, `Err` if a
    /// non-retriable error aborted it early.
    pub async fn run(&self, room_id: &str, job_id: &str, watcher: &DeltaWatcher, cancel: &CancellationToken) -> Result<(), RoomError> {
        let mut from = JobCursor::ZERO;
        let mut ticker = tokio::time::interval(self.ping_interval);
        ticker.tick().await; // first tick fires immediately; skip it

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = watcher.changed() => {}
                _ = cancel.cancelled() => return Ok(()),
            }

            let done = watcher.is_closed();
            let (delta, new_cursor) = match watcher.state_delta(&from).await {
                Ok(v) => v,
                Err(_) => {
                    log::error!("room {room_id} job {job_id}: local cursor outran watcher state, resyncing");
                    from = JobCursor::ZERO;
                    continue;
                }
            };

            let req = update::Request {
                room_id: room_id.to_string(),
                job_id: Some(job_id.to_string()),
                from,
                delta,
                timestamp: Timestamp::now(),
                done,
                error: None,
            };

            match self.transport.update(&req).await {
                Ok(_) => {
                    from = new_cursor;
                    if done {
                        return Ok(());
                    }
                }
                Err(RoomError::Api(ApiError::NeedsResync)) if !from.is_zero() => {
                    from = JobCursor::ZERO;
                }
                Err(err) if err.is_retriable() => {
                    // re-enter backoff by waiting for the next natural trigger
                }
                Err(err) => return Err(err),
            }
        }
    }
}
