use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cc_core::{Timestamp, TimestampDiff, Ulid, MAX_JOB_FETCH_TIMEOUT, ROOM_LIVENESS_TIMEOUT};
use cc_delta::JobState;
use cc_dto::rpc::{bye, hello, job, update};
use cc_dto::{ApiError, JobStatus};
use cc_persistence::{Repository, RoomRecord};
use cc_scheduler::{GameExt, OpeningBook, Scheduler};
use tokio_util::sync::CancellationToken;

use crate::machine::UpdateOutcome;
use crate::room::RoomExt;

/// The stateful room registry: per-room exclusivity, liveness GC, and the
/// four-verb RPC surface (spec.md §4.5).
pub struct RoomKeeper {
    rooms: tokio::sync::RwLock<HashMap<String, Arc<RoomExt>>>,
    scheduler: Arc<Scheduler>,
    repo: Arc<dyn Repository>,
    liveness_timeout: Duration,
}

impl RoomKeeper {
    pub fn new(scheduler: Arc<Scheduler>, repo: Arc<dyn Repository>) -> Self {
        Self {
            rooms: tokio::sync::RwLock::new(HashMap::new()),
            scheduler,
            repo,
            liveness_timeout: ROOM_LIVENESS_TIMEOUT,
        }
    }

    /// Startup reconciliation (spec.md §6 "Recovery on startup: rooms are
    /// rehydrated as-is, then every running job not still present in a
    /// known room is finalized as `Aborted("job lost by rooms")`").
    ///
    /// `hello` always mints a fresh room id, so a room persisted from a
    /// previous process can never reconnect under its old id — rehydrating
    /// it would only ever leave a dead entry in the registry. Instead each
    /// stale room is dropped from persistence immediately and its
    /// assignment (if any) is reported lost; the contest's own ledger
    /// reconstruction (built only from completed-game tallies) then
    /// naturally re-offers that color pair rather than requiring a
    /// separate aborted-job record.
    pub async fn recover(
        scheduler: Arc<Scheduler>,
        repo: Arc<dyn Repository>,
    ) -> Result<Self, cc_persistence::PersistenceError> {
        let keeper = Self::new(scheduler, repo);
        let stale = keeper.repo.list_active_rooms().await?;
        for room in stale {
            if let Some(job_id) = &room.assigned_job_id {
                log::warn!("room {}: job {job_id} lost by rooms at startup", room.id);
            }
            if let Err(err) = keeper.repo.stop_room(&room.id).await {
                log::warn!("room {}: failed to clear stale room at startup: {err}", room.id);
            }
        }
        Ok(keeper)
    }

    pub async fn hello(&self, req: hello::Request) -> Result<hello::Response, ApiError> {
        if !req.supported_proto_versions.contains(&1) {
            return Err(ApiError::IncompatibleProto);
        }
        let room_id = Ulid::generate().to_string();
        let ext = Arc::new(RoomExt::new(format!("room-{room_id}")));
        self.rooms.write().await.insert(room_id.clone(), ext);
        if let Err(err) = self
            .repo
            .create_room(&RoomRecord::new(room_id.clone(), format!("room-{room_id}")))
            .await
        {
            log::warn!("room {room_id}: failed to persist new room: {err}");
        }
        Ok(hello::Response {
            room_id,
            proto_version: 1,
        })
    }

    pub async fn job(
        &self,
        req: job::Request,
        book: &dyn OpeningBook,
    ) -> Result<job::Response, ApiError> {
        let ext = self.lookup(&req.room_id).await?;
        let mut inner = ext.try_lock().ok_or(ApiError::Locked)?;
        inner.touch();

        let timeout = Duration::from_nanos(req.timeout.max(0) as u64).min(MAX_JOB_FETCH_TIMEOUT);
        let cancel = CancellationToken::new();
        let running = tokio::select! {
            job = self.scheduler.next_job(book, &cancel) => job,
            _ = tokio::time::sleep(timeout) => { cancel.cancel(); None }
        };
        let running = running.ok_or(ApiError::NoJob)?;

        if let Some(stale) = inner.machine.current_job().cloned() {
            if let Err(err) = self
                .scheduler
                .finalize_job(&stale.job.id, JobStatus::Aborted("job lost by room".into()), None)
                .await
            {
                log::warn!("job {}: failed to finalize stale job: {err}", stale.job.id);
            }
        }
        inner.machine.set_job(Some(running.clone()));
        drop(inner);

        if let Err(err) = self.repo.update_room(&req.room_id, Some(&running.job.id)).await {
            log::warn!("room {}: failed to persist job assignment: {err}", req.room_id);
        }
        Ok(job::Response { job: running.job })
    }

    pub async fn update(&self, req: update::Request) -> Result<update::Response, ApiError> {
        let ext = self.lookup(&req.room_id).await?;
        let mut inner = ext.try_lock().ok_or(ApiError::Locked)?;
        inner.touch();

        let job_id = match &req.job_id {
            Some(id) => id.clone(),
            None => inner
                .machine
                .current_job()
                .map(|j| j.job.id.clone())
                .ok_or(ApiError::NoJobRunning)?,
        };

        if let Some(reason) = self.scheduler.is_job_aborted(&job_id).await {
            if let Err(err) = self
                .scheduler
                .finalize_job(&job_id, JobStatus::Aborted(reason), None)
                .await
            {
                log::warn!("job {job_id}: failed to finalize aborted job: {err}");
            }
            inner.machine.set_job(None);
            return Err(ApiError::NoJobRunning);
        }

        let delta = rebase_delta(req.delta, req.timestamp);
        let outcome = inner
            .machine
            .update(&job_id, req.from, Some(delta), req.done, req.error.as_deref())
            .map_err(|_| ApiError::NoJobRunning)?;

        match outcome {
            UpdateOutcome::NeedsResync => Err(ApiError::NeedsResync),
            UpdateOutcome::Running => {
                drop(inner);
                self.persist_room(&req.room_id).await;
                Ok(update::Response::default())
            }
            UpdateOutcome::Terminal { state, status } => {
                drop(inner);
                let game = Some(game_ext_from_state(&state));
                if let Err(err) = self.scheduler.finalize_job(&job_id, status, game).await {
                    log::warn!("job {job_id}: failed to finalize terminal job: {err}");
                }
                self.persist_room(&req.room_id).await;
                Ok(update::Response::default())
            }
        }
    }

    pub async fn bye(&self, req: bye::Request) -> Result<bye::Response, ApiError> {
        let ext = self.rooms.write().await.remove(&req.room_id);
        match ext {
            Some(ext) => {
                self.stop_room(&req.room_id, &ext, "room stopped").await;
                Ok(bye::Response::default())
            }
            None => Err(ApiError::NoSuchRoom),
        }
    }

    /// Evicts every room whose last RPC predates the liveness timeout and
    /// is not currently mid-RPC (spec.md §4.5 GC).
    pub async fn gc_sweep(&self) {
        let now = Timestamp::now();
        let expired: Vec<(String, Arc<RoomExt>)> = {
            let rooms = self.rooms.read().await;
            rooms
                .iter()
                .filter_map(|(id, ext)| {
                    let inner = ext.try_lock()?;
                    let expired = (inner.last_seen.as_millis() + self.liveness_timeout.as_millis() as i64)
                        < now.as_millis();
                    expired.then(|| (id.clone(), ext.clone()))
                })
                .collect()
        };
        for (id, ext) in expired {
            self.rooms.write().await.remove(&id);
            self.stop_room(&id, &ext, "room stopped").await;
        }
    }

    pub async fn run_gc_loop(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.gc_sweep().await,
                _ = cancel.cancelled() => return,
            }
        }
    }

    async fn stop_room(&self, room_id: &str, ext: &Arc<RoomExt>, reason: &str) {
        if let Some(mut inner) = ext.try_lock() {
            if let Some(job) = inner.machine.current_job().cloned() {
                if let Err(err) = self
                    .scheduler
                    .finalize_job(&job.job.id, JobStatus::Aborted(reason.to_string()), None)
                    .await
                {
                    log::warn!("job {}: failed to finalize job on room stop: {err}", job.job.id);
                }
            }
            inner.machine.set_job(None);
        }
        if let Err(err) = self.repo.stop_room(room_id).await {
            log::warn!("room {room_id}: failed to persist removal: {err}");
        }
    }

    async fn persist_room(&self, room_id: &str) {
        let ext = match self.rooms.read().await.get(room_id).cloned() {
            Some(ext) => ext,
            None => return,
        };
        let job_id = ext
            .try_lock()
            .and_then(|inner| inner.machine.current_job().map(|j| j.job.id.clone()));
        if let Err(err) = self.repo.update_room(room_id, job_id.as_deref()).await {
            log::warn!("room {room_id}: failed to persist update: {err}");
        }
    }

    async fn lookup(&self, room_id: &str) -> Result<Arc<RoomExt>, ApiError> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .ok_or(ApiError::NoSuchRoom)
    }
}

/// Rebases a room's self-reported deadlines into the keeper's own
/// timestamp frame (spec.md §4.1, §4.5).
fn rebase_delta(mut delta: JobState, their_now: Timestamp) -> JobState {
    let diff = TimestampDiff {
        their_now,
        our_now: Timestamp::now(),
    };
    if let Some(deadline) = delta.white.deadline {
        delta.white.deadline = Some(diff.rebase(deadline));
    }
    if let Some(deadline) = delta.black.deadline {
        delta.black.deadline = Some(diff.rebase(deadline));
    }
    delta
}

fn game_ext_from_state(state: &JobState) -> GameExt {
    use cc_delta::{GameStatus, Verdict};
    use cc_dto::Outcome;
    let outcome = match (state.position.status, state.position.verdict) {
        (GameStatus::InProgress, _) => Outcome::Running,
        (_, Some(Verdict::WhiteWins)) => Outcome::WhiteWins,
        (_, Some(Verdict::BlackWins)) => Outcome::BlackWins,
        (_, Some(Verdict::Draw)) | (_, None) => Outcome::Draw,
    };
    GameExt { outcome, pgn: None }
}

