use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use cc_dto::{FinishedJob, JobStatus, RunningJob};
use cc_persistence::Repository;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio_util::sync::CancellationToken;

use crate::book::OpeningBook;
use crate::contest::ContestScheduler;
use crate::error::SchedulerError;
use crate::game::GameExt;

/// Top-level coordinator across all running contests (spec.md §4.7): a
/// registry of per-contest schedulers, a fairness queue across them, and a
/// reverse job→contest index so the keeper can police zombie jobs.
pub struct Scheduler {
    repo: Arc<dyn Repository>,
    contests: RwLock<HashMap<String, Arc<ContestScheduler>>>,
    queue: Mutex<VecDeque<String>>,
    queue_notify: Notify,
    jobs: RwLock<HashMap<String, String>>,
    save_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

const DB_SAVE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

impl Scheduler {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            contests: RwLock::new(HashMap::new()),
            queue: Mutex::new(VecDeque::new()),
            queue_notify: Notify::new(),
            jobs: RwLock::new(HashMap::new()),
            save_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Rebuilds every contest still running at last shutdown from
    /// persistence (spec.md §7: "recovery is via startup reconciliation").
    /// In-flight jobs are not recovered — their rooms will either
    /// reconnect and get evicted as stale, or the keeper's GC will finalize
    /// them as lost — so each contest starts with an empty dispatch set.
    pub async fn recover(repo: Arc<dyn Repository>) -> Result<Self, SchedulerError> {
        let scheduler = Self::new(repo);
        let running = scheduler
            .repo
            .list_running_contests_full()
            .await
            .map_err(|err| SchedulerError::Persistence(err.to_string()))?;
        for (info, data) in running {
            log::info!("recovering contest {}", info.id);
            scheduler.register(ContestScheduler::new(info, data, Vec::new())).await;
        }
        Ok(scheduler)
    }

    /// Registers a freshly recovered or newly created contest and enqueues
    /// it for dispatch.
    pub async fn register(&self, contest: ContestScheduler) {
        let id = contest.info.id.clone();
        self.contests.write().await.insert(id.clone(), Arc::new(contest));
        self.queue.lock().await.push_back(id);
        self.queue_notify.notify_one();
    }

    pub async fn get(&self, contest_id: &str) -> Option<Arc<ContestScheduler>> {
        self.contests.read().await.get(contest_id).cloned()
    }

    /// Pops terminal contests off the fairness queue and returns the next
    /// live one, cycling it to the back so contests interleave fairly
    /// (spec.md §4.7 `acquireContest`).
    async fn acquire_contest(&self, cancel: &CancellationToken) -> Option<Arc<ContestScheduler>> {
        loop {
            {
                let mut queue = self.queue.lock().await;
                while let Some(id) = queue.pop_front() {
                    let contests = self.contests.read().await;
                    let Some(contest) = contests.get(&id) else { continue };
                    if contest.is_terminal().await {
                        continue;
                    }
                    let contest = contest.clone();
                    drop(contests);
                    queue.push_back(id);
                    return Some(contest);
                }
            }
            tokio::select! {
                _ = self.queue_notify.notified() => {}
                _ = cancel.cancelled() => return None,
            }
        }
    }

    /// Draws the next job from whichever live contest is due, recording it
    /// in the reverse index (spec.md §4.7's top-level `NextJob` path).
    pub async fn next_job(&self, book: &dyn OpeningBook, cancel: &CancellationToken) -> Option<RunningJob> {
        loop {
            let contest = self.acquire_contest(cancel).await?;
            if let Some(job) = contest.next_job(book, cancel).await {
                self.jobs
                    .write()
                    .await
                    .insert(job.job.id.clone(), job.contest_id.clone());
                self.persist_running_job(&job).await;
                return Some(job);
            }
            if cancel.is_cancelled() {
                return None;
            }
        }
    }

    /// True (with a reason) if `job_id` is not trackable to a live
    /// contest: either the contest is gone, or the job itself was already
    /// finalized (spec.md §4.7 `IsJobAborted`, used by the keeper to
    /// police stale assignments).
    pub async fn is_job_aborted(&self, job_id: &str) -> Option<String> {
        let contest_id = match self.jobs.read().await.get(job_id).cloned() {
            Some(contest_id) => contest_id,
            None => return Some("job not tracked by scheduler".to_string()),
        };
        let contest = self.contests.read().await.get(&contest_id).cloned();
        match contest {
            None => Some("contest no longer tracked".to_string()),
            Some(contest) if !contest.has_job(job_id).await => {
                Some("job lost from contest scheduler".to_string())
            }
            Some(_) => None,
        }
    }

    pub async fn finalize_job(
        &self,
        job_id: &str,
        status: JobStatus,
        game: Option<GameExt>,
    ) -> Result<FinishedJob, SchedulerError> {
        let contest_id = self
            .jobs
            .write()
            .await
            .remove(job_id)
            .ok_or_else(|| SchedulerError::NoSuchJob(job_id.to_string()))?;
        let contest = self
            .contests
            .read()
            .await
            .get(&contest_id)
            .cloned()
            .ok_or_else(|| SchedulerError::NoSuchContest(contest_id.clone()))?;
        let finished = contest.finalize_job(job_id, status, game).await?;
        self.save_contest(&contest_id, &contest).await;
        self.persist_finished_job(&finished).await;
        Ok(finished)
    }

    pub async fn abort_contest(&self, contest_id: &str, reason: impl Into<String>) {
        if let Some(contest) = self.contests.read().await.get(contest_id).cloned() {
            contest.abort(reason).await;
            self.save_contest(contest_id, &contest).await;
        }
    }

    async fn save_lock(&self, contest_id: &str) -> Arc<Mutex<()>> {
        self.save_locks
            .lock()
            .await
            .entry(contest_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Serializes persistence saves per contest: at most one save in
    /// flight at a time, bounded by `DB_SAVE_TIMEOUT` (spec.md §4.7 "DB
    /// save discipline"). Failures are logged and swallowed; the next
    /// successful save captures the diverged state.
    async fn save_contest(&self, contest_id: &str, contest: &ContestScheduler) {
        let lock = self.save_lock(contest_id).await;
        let guard = match tokio::time::timeout(DB_SAVE_TIMEOUT, lock.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                log::warn!("contest {contest_id}: timed out waiting for save slot");
                return;
            }
        };
        let data = contest.data().await;
        if let Err(err) = self.repo.update_contest(contest_id, &data).await {
            log::warn!("contest {contest_id}: failed to persist contest state: {err}");
        }
        drop(guard);
    }

    async fn persist_running_job(&self, job: &RunningJob) {
        if let Err(err) = self.repo.create_running_job(job).await {
            log::warn!("job {}: failed to persist dispatch: {err}", job.job.id);
        }
    }

    async fn persist_finished_job(&self, job: &FinishedJob) {
        if let Err(err) = self.repo.finish_running_job(job).await {
            log::warn!("job {}: failed to persist result: {err}", job.running.job.id);
        }
    }
}
