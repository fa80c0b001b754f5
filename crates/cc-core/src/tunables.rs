use std::time::Duration;

/// Long-poll duration a room client requests when fetching a job.
pub const JOB_POLL_DURATION: Duration = Duration::from_secs(30);
/// Upper clamp the keeper applies to a room's requested job-fetch timeout.
pub const MAX_JOB_FETCH_TIMEOUT: Duration = Duration::from_secs(3 * 60);
/// A room is evicted once this long has passed without a successful RPC.
pub const ROOM_LIVENESS_TIMEOUT: Duration = Duration::from_secs(2 * 60);
/// Interval at which the room client pings the server with state updates.
pub const PING_INTERVAL: Duration = Duration::from_secs(3);
/// Deadline slack added to every move's computed deadline (§4.2).
pub const DEFAULT_DEADLINE_SLACK: Duration = Duration::from_millis(50);
/// A contest is failed once more than this many of its jobs report Failed.
pub const MAX_FAILED_JOBS: u32 = 10;
/// Cap on principal-variation length retained by the delta watcher.
pub const MAX_PV_LEN: usize = 32;

/// `GCInterval = max(500ms, livenessTimeout/5)`.
pub fn gc_interval(liveness_timeout: Duration) -> Duration {
    std::cmp::max(Duration::from_millis(500), liveness_timeout / 5)
}

/// Exponential backoff with jitter, defaults per spec.md §6.
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub min: Duration,
    pub max: Duration,
    pub grow: f64,
    pub jitter: f64,
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(500),
            max: Duration::from_secs(60),
            grow: 2.0,
            jitter: 1.5,
            max_attempts: 64,
        }
    }
}

impl BackoffConfig {
    /// Base delay for the given zero-indexed attempt, before jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.min.as_secs_f64() * self.grow.powi(attempt as i32);
        Duration::from_secs_f64(scaled.min(self.max.as_secs_f64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gc_interval_floors_at_500ms() {
        assert_eq!(gc_interval(Duration::from_secs(1)), Duration::from_millis(500));
    }

    #[test]
    fn gc_interval_scales_with_liveness() {
        assert_eq!(gc_interval(Duration::from_secs(10)), Duration::from_secs(2));
    }

    #[test]
    fn backoff_grows_and_clamps() {
        let cfg = BackoffConfig::default();
        assert_eq!(cfg.delay_for(0), Duration::from_millis(500));
        assert_eq!(cfg.delay_for(1), Duration::from_millis(1000));
        assert!(cfg.delay_for(20) <= cfg.max);
    }
}
