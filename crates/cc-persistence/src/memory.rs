use std::collections::HashMap;

use cc_dto::{FinishedJob, RunningJob};
use tokio::sync::Mutex;

use crate::contest::{ContestData, ContestInfo};
use crate::repository::{PersistenceError, Repository};
use crate::room::RoomRecord;

/// Reference [`Repository`] implementation backed by in-process maps.
/// Intended for tests and single-process development, not production
/// durability.
#[derive(Default)]
pub struct InMemoryRepository {
    rooms: Mutex<HashMap<String, RoomRecord>>,
    contests: Mutex<HashMap<String, (ContestInfo, ContestData)>>,
    succeeded_jobs: Mutex<HashMap<String, Vec<FinishedJob>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Repository for InMemoryRepository {
    async fn list_active_rooms(&self) -> Result<Vec<RoomRecord>, PersistenceError> {
        Ok(self.rooms.lock().await.values().cloned().collect())
    }

    async fn create_room(&self, room: &RoomRecord) -> Result<(), PersistenceError> {
        self.rooms
            .lock()
            .await
            .insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn update_room(&self, room_id: &str, job_id: Option<&str>) -> Result<(), PersistenceError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| PersistenceError(format!("no such room: {room_id}")))?;
        room.assigned_job_id = job_id.map(str::to_owned);
        Ok(())
    }

    async fn stop_room(&self, room_id: &str) -> Result<(), PersistenceError> {
        self.rooms.lock().await.remove(room_id);
        Ok(())
    }

    async fn list_running_contests_full(&self) -> Result<Vec<(ContestInfo, ContestData)>, PersistenceError> {
        Ok(self.contests.lock().await.values().cloned().collect())
    }

    async fn create_contest(&self, info: &ContestInfo, data: &ContestData) -> Result<(), PersistenceError> {
        self.contests
            .lock()
            .await
            .insert(info.id.clone(), (info.clone(), data.clone()));
        Ok(())
    }

    async fn update_contest(&self, contest_id: &str, data: &ContestData) -> Result<(), PersistenceError> {
        let mut contests = self.contests.lock().await;
        let (_, existing) = contests
            .get_mut(contest_id)
            .ok_or_else(|| PersistenceError(format!("no such contest: {contest_id}")))?;
        *existing = data.clone();
        Ok(())
    }

    async fn get_contest(&self, contest_id: &str) -> Result<Option<(ContestInfo, ContestData)>, PersistenceError> {
        Ok(self.contests.lock().await.get(contest_id).cloned())
    }

    async fn create_running_job(&self, _job: &RunningJob) -> Result<(), PersistenceError> {
        Ok(())
    }

    async fn finish_running_job(&self, job: &FinishedJob) -> Result<(), PersistenceError> {
        if job.status.is_finished() && matches!(job.status, cc_dto::JobStatus::Succeeded) {
            self.succeeded_jobs
                .lock()
                .await
                .entry(job.running.contest_id.clone())
                .or_default()
                .push(job.clone());
        }
        Ok(())
    }

    async fn list_contest_succeeded_jobs(&self, contest_id: &str) -> Result<Vec<FinishedJob>, PersistenceError> {
        Ok(self
            .succeeded_jobs
            .lock()
            .await
            .get(contest_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_dto::{Engine, Job, JobStatus, Outcome};

    fn sample_job(contest_id: &str) -> FinishedJob {
        FinishedJob {
            running: RunningJob {
                job: Job {
                    id: "job-1".into(),
                    fixed_time: None,
                    time_control: None,
                    start_board: None,
                    start_moves: None,
                    score_threshold: None,
                    time_margin: None,
                    draw_adjudication: None,
                    max_moves: None,
                    white: Engine { name: "a".into() },
                    black: Engine { name: "b".into() },
                },
                contest_id: contest_id.into(),
                white_engine_index: 0,
                black_engine_index: 1,
            },
            status: JobStatus::Succeeded,
            index: Some(1),
            outcome: Outcome::WhiteWins,
            pgn: None,
        }
    }

    #[tokio::test]
    async fn room_round_trips_through_create_update_stop() {
        let repo = InMemoryRepository::new();
        let room = RoomRecord::new("room-1", "host-a");
        repo.create_room(&room).await.unwrap();
        assert_eq!(repo.list_active_rooms().await.unwrap().len(), 1);

        repo.update_room("room-1", Some("job-1")).await.unwrap();
        let rooms = repo.list_active_rooms().await.unwrap();
        assert_eq!(rooms[0].assigned_job_id.as_deref(), Some("job-1"));

        repo.stop_room("room-1").await.unwrap();
        assert!(repo.list_active_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_succeeded_jobs_are_listed() {
        let repo = InMemoryRepository::new();
        let succeeded = sample_job("contest-1");
        let mut aborted = sample_job("contest-1");
        aborted.status = JobStatus::Aborted("room stopped".into());

        repo.finish_running_job(&succeeded).await.unwrap();
        repo.finish_running_job(&aborted).await.unwrap();

        let listed = repo.list_contest_succeeded_jobs("contest-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, JobStatus::Succeeded);
    }
}
