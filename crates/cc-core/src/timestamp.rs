use rand::Rng;
use std::sync::OnceLock;
use std::time::Duration;
use std::time::Instant;

/// Process-wide monotonic clock base. Initialized once with a random
/// negative offset of up to 24 hours, so that a [`Timestamp`] is
/// meaningless across processes except as a delta (spec.md §4.1).
pub struct TimestampBase {
    anchor: Instant,
    offset_ms: i64,
}

impl TimestampBase {
    fn global() -> &'static TimestampBase {
        static BASE: OnceLock<TimestampBase> = OnceLock::new();
        BASE.get_or_init(|| {
            let offset_ms = -rand::rng().random_range(0..=24 * 3600 * 1000);
            TimestampBase {
                anchor: Instant::now(),
                offset_ms,
            }
        })
    }
}

/// A point in this process's timestamp frame, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn now() -> Self {
        let base = TimestampBase::global();
        Timestamp(base.offset_ms + base.anchor.elapsed().as_millis() as i64)
    }

    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    pub fn plus(&self, duration: Duration) -> Self {
        Timestamp(self.0 + duration.as_millis() as i64)
    }

    /// Duration until `other`, or zero if `other` is in the past.
    pub fn until(&self, other: Timestamp) -> Duration {
        Duration::from_millis((other.0 - self.0).max(0) as u64)
    }
}

/// Lets a receiver rebase a sender's timestamps into its own frame:
/// `our_ts = their_ts - their_now + our_now`.
#[derive(Debug, Clone, Copy)]
pub struct TimestampDiff {
    pub their_now: Timestamp,
    pub our_now: Timestamp,
}

impl TimestampDiff {
    pub fn new(their_now: Timestamp, our_now: Timestamp) -> Self {
        Self { their_now, our_now }
    }

    pub fn rebase(&self, their_ts: Timestamp) -> Timestamp {
        Timestamp(their_ts.0 - self.their_now.0 + self.our_now.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_monotonic() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(b >= a);
    }

    #[test]
    fn rebase_identity_when_frames_match() {
        let now = Timestamp::now();
        let diff = TimestampDiff::new(now, now);
        let ts = now.plus(Duration::from_secs(5));
        assert_eq!(diff.rebase(ts), ts);
    }

    #[test]
    fn rebase_shifts_by_frame_offset() {
        let their_now = Timestamp::from_millis(1_000);
        let our_now = Timestamp::from_millis(5_000);
        let diff = TimestampDiff::new(their_now, our_now);
        let their_deadline = Timestamp::from_millis(1_500);
        assert_eq!(diff.rebase(their_deadline).as_millis(), 5_500);
    }
}
