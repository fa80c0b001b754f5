use cc_dto::{FinishedJob, RunningJob};

use crate::contest::{ContestData, ContestInfo};
use crate::room::RoomRecord;

/// Failure of a durable-state operation. Callers log and continue; the
/// next successful save captures whatever diverged (spec.md §7: recovery
/// is via startup reconciliation, not retried writes).
#[derive(Debug, Clone, thiserror::Error)]
#[error("persistence error: {0}")]
pub struct PersistenceError(pub String);

/// The durable-state contract assumed by the keeper and scheduler
/// (spec.md §6). Implementations are expected to be cheap to clone or to
/// be held behind `Arc`; no method borrows across an `await` in the
/// caller.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    async fn list_active_rooms(&self) -> Result<Vec<RoomRecord>, PersistenceError>;
    async fn create_room(&self, room: &RoomRecord) -> Result<(), PersistenceError>;
    async fn update_room(&self, room_id: &str, job_id: Option<&str>) -> Result<(), PersistenceError>;
    async fn stop_room(&self, room_id: &str) -> Result<(), PersistenceError>;

    async fn list_running_contests_full(&self) -> Result<Vec<(ContestInfo, ContestData)>, PersistenceError>;
    async fn create_contest(&self, info: &ContestInfo, data: &ContestData) -> Result<(), PersistenceError>;
    async fn update_contest(&self, contest_id: &str, data: &ContestData) -> Result<(), PersistenceError>;
    async fn get_contest(&self, contest_id: &str) -> Result<Option<(ContestInfo, ContestData)>, PersistenceError>;

    async fn create_running_job(&self, job: &RunningJob) -> Result<(), PersistenceError>;
    async fn finish_running_job(&self, job: &FinishedJob) -> Result<(), PersistenceError>;
    async fn list_contest_succeeded_jobs(&self, contest_id: &str) -> Result<Vec<FinishedJob>, PersistenceError>;
}
