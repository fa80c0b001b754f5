use std::collections::HashMap;

use cc_core::{Ulid, MAX_FAILED_JOBS};
use cc_dto::{Engine, FinishedJob, Job, JobStatus, Outcome, RunningJob};
use cc_persistence::{ContestData, ContestInfo, ContestStatus, MatchTally};
use tokio::sync::{Notify, RwLock};
use tokio_util::sync::CancellationToken;

use crate::book::{Opening, OpeningBook};
use crate::error::SchedulerError;
use crate::game::GameExt;
use crate::ledger::{ColorPair, Schedule};

/// All state dedicated to one running contest: its immutable settings, its
/// mutable tally, the ledger of remaining color-pair slots, and the jobs
/// currently dispatched against it (spec.md §4.7).
pub struct ContestScheduler {
    pub info: ContestInfo,
    data: RwLock<ContestData>,
    ledger: tokio::sync::Mutex<Schedule>,
    dispatched: RwLock<HashMap<String, RunningJob>>,
    notify: Notify,
    max_failed_jobs: u32,
}

impl ContestScheduler {
    /// Reconstructs a scheduler for a contest recovered from persistence:
    /// the ledger is rebuilt from the match tally, then reduced once per
    /// job that was already dispatched when the process last stopped.
    /// A recovered job whose pair has no remaining ledger slot is dropped
    /// (it will be finalized separately as lost by room recovery).
    pub fn new(info: ContestInfo, data: ContestData, existing_jobs: Vec<RunningJob>) -> Self {
        let tally = data.match_tally;
        let completed = tally.first_wins + tally.draws + tally.second_wins;
        let played_non_inverted = completed.saturating_sub(tally.inverted_count);
        let mut ledger = Schedule::for_match(info.match_games, played_non_inverted, tally.inverted_count);

        let mut dispatched = HashMap::new();
        for job in existing_jobs {
            let pair = ColorPair {
                white_id: job.white_engine_index,
                black_id: job.black_engine_index,
            };
            if !ledger.dec(pair) {
                log::warn!(
                    "contest {}: dropping recovered job {} whose pair is not in the ledger",
                    info.id,
                    job.job.id
                );
                continue;
            }
            dispatched.insert(job.job.id.clone(), job);
        }

        Self {
            info,
            data: RwLock::new(data),
            ledger: tokio::sync::Mutex::new(ledger),
            dispatched: RwLock::new(dispatched),
            notify: Notify::new(),
            max_failed_jobs: MAX_FAILED_JOBS,
        }
    }

    pub async fn data(&self) -> ContestData {
        self.data.read().await.clone()
    }

    pub async fn is_terminal(&self) -> bool {
        self.data.read().await.status.is_terminal()
    }

    pub async fn dispatched_count(&self) -> usize {
        self.dispatched.read().await.len()
    }

    /// Draws the next job from this contest's ledger, waiting for a slot
    /// to free up (via [`Self::finalize_job`]'s `inc`) or for `cancel`.
    /// Returns `None` once the contest goes terminal.
    pub async fn next_job(&self, book: &dyn OpeningBook, cancel: &CancellationToken) -> Option<RunningJob> {
        loop {
            if self.is_terminal().await {
                return None;
            }
            let drawn = {
                let mut ledger = self.ledger.lock().await;
                ledger.peek().inspect(|pair| {
                    ledger.dec(*pair);
                })
            };
            if let Some(pair) = drawn {
                let job = self.build_job(pair, book.draw());
                self.dispatched
                    .write()
                    .await
                    .insert(job.job.id.clone(), job.clone());
                return Some(job);
            }
            tokio::select! {
                _ = self.notify.notified() => {}
                _ = cancel.cancelled() => return None,
            }
        }
    }

    fn build_job(&self, pair: ColorPair, opening: Opening) -> RunningJob {
        let white = &self.info.players[pair.white_id as usize];
        let black = &self.info.players[pair.black_id as usize];
        RunningJob {
            job: Job {
                id: Ulid::generate().to_string(),
                fixed_time: None,
                time_control: self.info.time_control.clone(),
                start_board: opening.start_board,
                start_moves: opening.start_moves,
                score_threshold: Some(self.info.score_threshold),
                time_margin: Some(self.info.deadline_margin_ms),
                draw_adjudication: self.info.draw_adjudication,
                max_moves: self.info.max_moves,
                white: Engine { name: white.name.clone() },
                black: Engine { name: black.name.clone() },
            },
            contest_id: self.info.id.clone(),
            white_engine_index: pair.white_id,
            black_engine_index: pair.black_id,
        }
    }

    /// Closes out a dispatched job: applies ledger/tally rules and returns
    /// the [`FinishedJob`] to be persisted by the caller (spec.md §4.7).
    pub async fn finalize_job(
        &self,
        job_id: &str,
        mut status: JobStatus,
        game: Option<GameExt>,
    ) -> Result<FinishedJob, SchedulerError> {
        if self.is_terminal().await {
            log::warn!(
                "refusing to finalize job {job_id} for terminal contest {}",
                self.info.id
            );
            return Err(SchedulerError::ContestTerminal(self.info.id.clone()));
        }
        let running = self
            .dispatched
            .write()
            .await
            .remove(job_id)
            .ok_or_else(|| SchedulerError::NoSuchJob(job_id.to_string()))?;

        let pair = ColorPair {
            white_id: running.white_engine_index,
            black_id: running.black_engine_index,
        };
        let outcome = game.as_ref().map(|g| g.outcome).unwrap_or(Outcome::Running);
        if outcome == Outcome::Running && matches!(status, JobStatus::Succeeded) {
            status = JobStatus::Aborted("unexpected game result".into());
        }

        let mut data = self.data.write().await;
        let mut index = None;
        match &status {
            JobStatus::Aborted(_) => {
                self.ledger.lock().await.inc(pair);
                self.notify.notify_one();
            }
            JobStatus::Failed(_) => {
                self.ledger.lock().await.inc(pair);
                self.notify.notify_one();
                data.failed_jobs += 1;
                if data.failed_jobs > self.max_failed_jobs {
                    data.status = ContestStatus::Failed(format!(
                        "too many failed jobs ({})",
                        data.failed_jobs
                    ));
                    drop(data);
                    self.dispatched.write().await.clear();
                    self.notify.notify_waiters();
                    return Ok(FinishedJob {
                        running,
                        status,
                        index,
                        outcome,
                        pgn: game.and_then(|g| g.pgn),
                    });
                }
            }
            JobStatus::Succeeded => {
                data.last_index += 1;
                index = Some(data.last_index);
                Self::tally(&mut data.match_tally, pair, outcome);
                let empty = self.ledger.lock().await.is_empty();
                if empty && self.dispatched.read().await.is_empty() {
                    data.status = ContestStatus::Succeeded;
                }
            }
            JobStatus::Unknown | JobStatus::Running => {
                return Err(SchedulerError::JobAlreadyFinal(job_id.to_string()));
            }
        }

        Ok(FinishedJob {
            running,
            status,
            index,
            outcome,
            pgn: game.and_then(|g| g.pgn),
        })
    }

    fn tally(tally: &mut MatchTally, pair: ColorPair, outcome: Outcome) {
        let inverted = pair.white_id != 0;
        if inverted {
            tally.inverted_count += 1;
        }
        match (inverted, outcome) {
            (false, Outcome::WhiteWins) | (true, Outcome::BlackWins) => tally.first_wins += 1,
            (false, Outcome::BlackWins) | (true, Outcome::WhiteWins) => tally.second_wins += 1,
            (_, Outcome::Draw) => tally.draws += 1,
            (_, Outcome::Running) => {}
        }
    }

    /// Drops all in-flight jobs and transitions to `Aborted(reason)` if not
    /// already terminal (spec.md §4.7 `Abort`).
    pub async fn abort(&self, reason: impl Into<String>) {
        let mut data = self.data.write().await;
        if data.status.is_terminal() {
            return;
        }
        data.status = ContestStatus::Aborted(reason.into());
        drop(data);
        self.dispatched.write().await.clear();
        self.notify.notify_waiters();
    }

    pub async fn has_job(&self, job_id: &str) -> bool {
        self.dispatched.read().await.contains_key(job_id)
    }

    /// A read-only snapshot of the match tally, not wired to any UI.
    pub async fn summary(&self) -> ContestSummary {
        let tally = self.data.read().await.match_tally;
        let total = tally.first_wins + tally.draws + tally.second_wins;
        let decisive_pct = if total == 0 {
            0.0
        } else {
            100.0 * (total - tally.draws) as f64 / total as f64
        };
        ContestSummary {
            total_games: total,
            first_engine_wins: tally.first_wins,
            second_engine_wins: tally.second_wins,
            draws: tally.draws,
            decisive_pct,
        }
    }
}

/// Total games, wins by engine, and decisive-result percentage for one
/// contest. `first_engine`/`second_engine` refer to `ContestInfo.players[0]`
/// and `players[1]` respectively, independent of which side they played.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContestSummary {
    pub total_games: u32,
    pub first_engine_wins: u32,
    pub second_engine_wins: u32,
    pub draws: u32,
    pub decisive_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_persistence::{ContestKind, Player};

    fn sample_info(games: u32) -> ContestInfo {
        ContestInfo {
            id: "c1".into(),
            name: "stockfish vs leela".into(),
            kind: ContestKind::Match,
            players: [Player { name: "white-engine".into() }, Player { name: "black-engine".into() }],
            time_control: Some("40/5400".into()),
            opening_book: None,
            score_threshold: 800,
            deadline_margin_ms: 50,
            match_games: games,
            draw_adjudication: None,
            max_moves: None,
        }
    }

    #[tokio::test]
    async fn next_job_draws_from_ledger_and_decrements() {
        let scheduler = ContestScheduler::new(sample_info(2), ContestData::fresh(), Vec::new());
        let cancel = CancellationToken::new();
        let job = scheduler.next_job(&crate::book::NullBook, &cancel).await.unwrap();
        assert_eq!(job.contest_id, "c1");
        assert_eq!(scheduler.dispatched_count().await, 1);
    }

    #[tokio::test]
    async fn finalize_succeeded_increments_index_and_tally() {
        let scheduler = ContestScheduler::new(sample_info(1), ContestData::fresh(), Vec::new());
        let cancel = CancellationToken::new();
        let job = scheduler.next_job(&crate::book::NullBook, &cancel).await.unwrap();
        let finished = scheduler
            .finalize_job(
                &job.job.id,
                JobStatus::Succeeded,
                Some(GameExt { outcome: Outcome::WhiteWins, pgn: None }),
            )
            .await
            .unwrap();
        assert_eq!(finished.index, Some(1));
        assert_eq!(scheduler.data().await.match_tally.first_wins, 1);
        assert!(matches!(scheduler.data().await.status, ContestStatus::Succeeded));
    }

    #[tokio::test]
    async fn finalize_aborted_returns_slot_to_ledger() {
        let scheduler = ContestScheduler::new(sample_info(1), ContestData::fresh(), Vec::new());
        let cancel = CancellationToken::new();
        let job = scheduler.next_job(&crate::book::NullBook, &cancel).await.unwrap();
        scheduler
            .finalize_job(&job.job.id, JobStatus::Aborted("room stopped".into()), None)
            .await
            .unwrap();
        assert_eq!(scheduler.dispatched_count().await, 0);
        let cancel2 = CancellationToken::new();
        assert!(scheduler.next_job(&crate::book::NullBook, &cancel2).await.is_some());
    }

    #[tokio::test]
    async fn succeeded_status_with_running_outcome_is_demoted_to_aborted() {
        let scheduler = ContestScheduler::new(sample_info(1), ContestData::fresh(), Vec::new());
        let cancel = CancellationToken::new();
        let job = scheduler.next_job(&crate::book::NullBook, &cancel).await.unwrap();
        let finished = scheduler
            .finalize_job(
                &job.job.id,
                JobStatus::Succeeded,
                Some(GameExt { outcome: Outcome::Running, pgn: None }),
            )
            .await
            .unwrap();
        assert!(matches!(finished.status, JobStatus::Aborted(_)));
    }

    #[tokio::test]
    async fn exceeding_max_failed_jobs_fails_the_contest() {
        let mut info = sample_info(20);
        info.match_games = 20;
        let scheduler = ContestScheduler::new(info, ContestData::fresh(), Vec::new());
        for _ in 0..11 {
            let cancel = CancellationToken::new();
            let job = scheduler.next_job(&crate::book::NullBook, &cancel).await.unwrap();
            let _ = scheduler
                .finalize_job(&job.job.id, JobStatus::Failed("engine crashed".into()), None)
                .await;
        }
        assert!(matches!(scheduler.data().await.status, ContestStatus::Failed(_)));
    }
}
