use std::sync::atomic::{AtomicBool, Ordering};

use cc_core::{Timestamp, Ulid, MAX_PV_LEN};
use cc_delta::{DeltaError, GameStatus, Info, JobCursor, JobState, Verdict};
use tokio::sync::{Mutex, Notify};

use crate::board::Color;
use crate::engine::SearchInfo;
use crate::watcher::{Clock, Watcher};

/// Wraps a job's [`JobState`] under a mutex and a notification channel, and
/// implements [`Watcher`] so a [`crate::driver::BattleDriver`] can be
/// pointed at it directly (spec.md §4.3).
pub struct DeltaWatcher {
    state: Mutex<JobState>,
    notify: Notify,
    closed: AtomicBool,
    max_pv_len: usize,
}

impl DeltaWatcher {
    pub fn new(job_id: Ulid) -> Self {
        Self {
            state: Mutex::new(JobState::new(job_id)),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
            max_pv_len: MAX_PV_LEN,
        }
    }

    /// Sets the one-shot `Info` sub-state. Must be called at most once,
    /// before the driver starts, since `Info` is otherwise immutable.
    pub async fn set_info(&self, info: Info) {
        self.mutate(|state| state.info = Some(info)).await;
    }

    /// Computes the minimal patch since `old`, eliding the raw PV arrays
    /// (the rendered PV string is kept) to shrink the wire payload.
    pub async fn state_delta(&self, old: &JobCursor) -> Result<(JobState, JobCursor), DeltaError> {
        let state = self.state.lock().await;
        let mut patch = state.delta(old)?;
        let cursor = state.cursor();
        drop(state);
        patch.white.pv.clear();
        patch.black.pv.clear();
        Ok((patch, cursor))
    }

    /// Idempotent; subsequent calls are no-ops. Wakes every pump currently
    /// blocked on [`DeltaWatcher::changed`].
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Resolves on the next mutation, or immediately if already closed.
    pub async fn changed(&self) {
        if self.is_closed() {
            return;
        }
        self.notify.notified().await;
    }

    async fn mutate(&self, f: impl FnOnce(&mut JobState)) {
        let mut state = self.state.lock().await;
        let before = state.cursor();
        f(&mut state);
        let after = state.cursor();
        drop(state);
        if before != after {
            self.notify.notify_one();
        }
    }

    fn render_pv(pv: &[String]) -> String {
        pv.join(" ")
    }
}

#[async_trait::async_trait]
impl Watcher for DeltaWatcher {
    async fn on_game_inited(&self, fen: &str) {
        let fen = fen.to_string();
        self.mutate(|state| state.position.advance(fen, GameStatus::InProgress, None)).await;
    }

    async fn on_game_updated(&self, fen: &str, mover: Color, clock: Option<Clock>) {
        let fen = fen.to_string();
        self.mutate(|state| {
            state.position.advance(fen, GameStatus::InProgress, None);
            let (active, inactive) = match mover {
                Color::White => (&mut state.white, &mut state.black),
                Color::Black => (&mut state.black, &mut state.white),
            };
            active.active = true;
            active.clock_remaining_ms = clock.map(|c| c.remaining_ms);
            active.deadline = clock.map(|c| Timestamp::now().plus(std::time::Duration::from_millis(c.remaining_ms.max(0) as u64)));
            active.bump();
            inactive.active = false;
            inactive.deadline = None;
            inactive.bump();
        })
        .await;
    }

    async fn on_engine_info(&self, mover: Color, info: &SearchInfo) {
        let info = info.clone();
        let max_pv_len = self.max_pv_len;
        self.mutate(move |state| {
            let side = match mover {
                Color::White => &mut state.white,
                Color::Black => &mut state.black,
            };
            let mut pv = info.pv;
            pv.truncate(max_pv_len);
            if pv != side.pv {
                side.pv_rendered = Self::render_pv(&pv);
                side.pv = pv;
            }
            side.score = info.score;
            side.depth = info.depth;
            side.nodes = info.nodes;
            side.nps = info.nps;
            side.bump();
        })
        .await;
    }

    async fn on_game_finished(&self, fen: &str, status: GameStatus, verdict: Option<Verdict>, warnings: &[String]) {
        let fen = fen.to_string();
        let warnings = warnings.to_vec();
        self.mutate(move |state| {
            state.position.advance(fen, status, verdict);
            for warning in warnings.into_iter().skip(state.warnings.entries.len()) {
                state.warnings.push(warning);
            }
            state.white.active = false;
            state.white.deadline = None;
            state.white.bump();
            state.black.active = false;
            state.black.deadline = None;
            state.black.bump();
        })
        .await;
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_watcher_yields_full_snapshot() {
        let watcher = DeltaWatcher::new(Ulid::generate());
        let (patch, cursor) = watcher.state_delta(&JobCursor::ZERO).await.unwrap();
        assert!(patch.info.is_none());
        assert_eq!(cursor, JobCursor::ZERO);
    }

    #[tokio::test]
    async fn game_inited_bumps_position_and_notifies() {
        let watcher = DeltaWatcher::new(Ulid::generate());
        watcher.on_game_inited("startpos").await;
        let (_, cursor) = watcher.state_delta(&JobCursor::ZERO).await.unwrap();
        assert_eq!(cursor.position, 2);
    }

    #[tokio::test]
    async fn engine_info_truncates_pv_and_renders_it() {
        let watcher = DeltaWatcher::new(Ulid::generate());
        let info = SearchInfo {
            pv: (0..40).map(|i| format!("m{i}")).collect(),
            ..Default::default()
        };
        watcher.on_engine_info(Color::White, &info).await;
        let (patch, _) = watcher.state_delta(&JobCursor::ZERO).await.unwrap();
        assert!(patch.white.pv.is_empty(), "raw pv is elided from the wire patch");
        assert_eq!(patch.white.pv_rendered.split(' ').count(), MAX_PV_LEN);
    }

    #[tokio::test]
    async fn game_finished_appends_warnings_once() {
        let watcher = DeltaWatcher::new(Ulid::generate());
        let warnings = vec!["engine crashed".to_string()];
        watcher.on_game_finished("mate", GameStatus::Checkmate, Some(Verdict::WhiteWins), &warnings).await;
        let (patch, _) = watcher.state_delta(&JobCursor::ZERO).await.unwrap();
        assert_eq!(patch.warnings.entries, warnings);
        assert!(watcher.is_closed());
    }

    #[tokio::test]
    async fn close_wakes_pending_waiter() {
        let watcher = DeltaWatcher::new(Ulid::generate());
        watcher.close();
        tokio::time::timeout(std::time::Duration::from_millis(50), watcher.changed())
            .await
            .expect("changed() resolves immediately once closed");
    }
}
