use std::sync::Arc;
use std::time::Duration;

use cc_battle::{BattleConfig, BattleDriver, DeltaWatcher};
use cc_core::{BackoffConfig, Ulid, JOB_POLL_DURATION, PING_INTERVAL};
use cc_delta::Info;
use cc_dto::rpc::{bye, hello, job as job_rpc, update};
use cc_dto::{ApiError, Job};
use tokio_util::sync::CancellationToken;

use crate::error::RoomError;
use crate::pump::UpdatePump;
use crate::registry::EngineRegistry;
use crate::retry::{retry_with_backoff, sleep_with_jitter, RetryOutcome};
use crate::transport::RoomTransport;

const SUPPORTED_PROTO_VERSIONS: &[i32] = &[1];

#[derive(Clone)]
pub struct RoomClientConfig {
    pub backoff: BackoffConfig,
    pub job_poll_timeout: Duration,
    pub ping_interval: Duration,
    pub battle: BattleConfig,
}

impl Default for RoomClientConfig {
    fn default() -> Self {
        Self {
            backoff: BackoffConfig::default(),
            job_poll_timeout: JOB_POLL_DURATION,
            ping_interval: PING_INTERVAL,
            battle: BattleConfig::default(),
        }
    }
}

/// One worker-host room slot: the outer hello/job loop of spec.md §4.4.
pub struct RoomClient {
    transport: Arc<RoomTransport>,
    registry: Arc<dyn EngineRegistry>,
    config: RoomClientConfig,
}

impl RoomClient {
    pub fn new(base_url: impl Into<String>, registry: Arc<dyn EngineRegistry>, config: RoomClientConfig) -> Self {
        Self {
            transport: Arc::new(RoomTransport::new(base_url)),
            registry,
            config,
        }
    }

    pub async fn run(&self, cancel: CancellationToken) {
        let mut room_id: Option<String> = None;

        while !cancel.is_cancelled() {
            let rid = match room_id.take() {
                Some(rid) => rid,
                None => match self.hello(&cancel).await {
                    Some(rid) => rid,
                    None => break,
                },
            };

            match self.poll_job(&rid, &cancel).await {
                PollOutcome::Job(job) => {
                    self.run_job(&rid, job, &cancel).await;
                    room_id = Some(rid);
                }
                PollOutcome::NoJob => room_id = Some(rid),
                PollOutcome::NoSuchRoom => room_id = None,
                PollOutcome::GaveUp => room_id = None,
                PollOutcome::Cancelled => {
                    room_id = Some(rid);
                    break;
                }
            }
        }

        if let Some(rid) = room_id {
            let _ = self
                .transport
                .bye(&bye::Request { room_id: rid })
                .await;
        }
    }

    async fn hello(&self, cancel: &CancellationToken) -> Option<String> {
        let req = hello::Request {
            supported_proto_versions: SUPPORTED_PROTO_VERSIONS.to_vec(),
        };
        match retry_with_backoff(&self.config.backoff, cancel, || self.transport.hello(&req)).await {
            RetryOutcome::Ready(resp) => Some(resp.room_id),
            RetryOutcome::Cancelled | RetryOutcome::GaveUp(_) => None,
        }
    }

    /// Spec.md §4.4 step 2: `NoJob` and `NoSuchRoom` are routine signals
    /// checked on every attempt, never folded into the backoff loop that
    /// handles genuinely unexpected errors.
    async fn poll_job(&self, room_id: &str, cancel: &CancellationToken) -> PollOutcome {
        let req = job_rpc::Request {
            room_id: room_id.to_string(),
            timeout: self.config.job_poll_timeout.as_nanos() as i64,
        };
        for attempt in 0..self.config.backoff.max_attempts {
            if cancel.is_cancelled() {
                return PollOutcome::Cancelled;
            }
            match self.transport.job(&req).await {
                Ok(resp) => return PollOutcome::Job(resp.job),
                Err(RoomError::Api(ApiError::NoJob)) => return PollOutcome::NoJob,
                Err(RoomError::Api(ApiError::NoSuchRoom)) => return PollOutcome::NoSuchRoom,
                Err(err) if err.is_retriable() => {
                    tokio::select! {
                        _ = sleep_with_jitter(&self.config.backoff, attempt) => {}
                        _ = cancel.cancelled() => return PollOutcome::Cancelled,
                    }
                }
                Err(_) => return PollOutcome::GaveUp,
            }
        }
        PollOutcome::GaveUp
    }

    async fn run_job(&self, room_id: &str, job: Job, cancel: &CancellationToken) {
        let job_id = Ulid::try_from(job.id.as_str()).unwrap_or_else(|_| Ulid::generate());
        let watcher = Arc::new(DeltaWatcher::new(job_id));
        watcher
            .set_info(Info {
                white_name: job.white.name.clone(),
                black_name: job.black.name.clone(),
                start_board: job.start_board.clone(),
                time_control: job.time_control.clone(),
                fixed_time_ms: job.fixed_time,
            })
            .await;

        let (white_pool, black_pool) = match (self.registry.pool_for(&job.white.name), self.registry.pool_for(&job.black.name)) {
            (Some(w), Some(b)) => (w, b),
            _ => {
                self.prefail(room_id, &job.id, "no engine pool registered for one or both sides").await;
                return;
            }
        };

        let driver = BattleDriver::new(self.config.battle.clone(), white_pool, black_pool, watcher.clone());
        let pump = UpdatePump::new(self.transport.clone(), self.config.ping_interval);

        let battle_cancel = cancel.clone();
        let pump_watcher = watcher.clone();
        let pump_room_id = room_id.to_string();
        let pump_job_id = job.id.clone();
        let pump_handle = tokio::spawn(async move { pump.run(&pump_room_id, &pump_job_id, &pump_watcher, &battle_cancel).await });

        match driver.run(&job).await {
            Ok(_) => {
                let _ = pump_handle.await;
            }
            Err(err) => {
                // Pool acquisition failed before the watcher ever saw real
                // state; skip the pump's own final flush and send the
                // single prefail Update spec.md §4.4 step 4 calls for.
                pump_handle.abort();
                self.prefail(room_id, &job.id, &err.to_string()).await;
            }
        }
    }

    async fn prefail(&self, room_id: &str, job_id: &str, reason: &str) {
        log::warn!("room {room_id} job {job_id}: prefailing, {reason}");
        let req = update::Request {
            room_id: room_id.to_string(),
            job_id: Some(job_id.to_string()),
            from: cc_delta::JobCursor::ZERO,
            delta: cc_delta::JobState::new(Ulid::try_from(job_id).unwrap_or_else(|_| Ulid::generate())),
            timestamp: cc_core::Timestamp::now(),
            done: true,
            error: Some(reason.to_string()),
        };
        let _ = self.transport.update(&req).await;
    }
}

enum PollOutcome {
    Job(Job),
    NoJob,
    NoSuchRoom,
    GaveUp,
    Cancelled,
}
