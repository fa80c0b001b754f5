use std::sync::Arc;
use std::time::Duration;

use cc_core::{Centipawns, Score, Timestamp};
use cc_delta::{GameStatus, Verdict};
use cc_dto::{DrawAdjudication, Job};

use crate::board::{Board, Color};
use crate::engine::{EnginePool, UciEngine};
use crate::error::EngineError;
use crate::watcher::{Clock, Watcher};

/// Per-battle tuning, overridden per job by [`BattleConfig::for_job`]
/// (spec.md §4.2).
#[derive(Debug, Clone)]
pub struct BattleConfig {
    pub fixed_time_ms: Option<i64>,
    /// Seed for each side's clock when `fixed_time_ms` is unset. The wire
    /// job only carries an opaque `time_control` label, so the numeric
    /// clock budget is supplied out of band by whoever configures the pool.
    pub initial_clock_ms: Option<i64>,
    pub deadline_slack: Duration,
    /// Centipawn/mate threshold past which two opposed decisive scores
    /// trigger a resignation. Zero disables resignation.
    pub resign_threshold: Centipawns,
    pub engine_acquire_timeout: Duration,
    /// Consecutive near-zero-score plies before adjudicating a draw.
    /// Additive to `resign_threshold`; `None` disables it.
    pub draw_adjudication: Option<DrawAdjudication>,
    /// Ply count after which the game is adjudicated a draw. `None`
    /// disables it.
    pub max_moves: Option<u32>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            fixed_time_ms: None,
            initial_clock_ms: None,
            deadline_slack: cc_core::DEFAULT_DEADLINE_SLACK,
            resign_threshold: 0,
            engine_acquire_timeout: Duration::from_secs(10),
            draw_adjudication: None,
            max_moves: None,
        }
    }
}

impl BattleConfig {
    fn for_job(&self, job: &Job) -> BattleConfig {
        BattleConfig {
            fixed_time_ms: job.fixed_time.or(self.fixed_time_ms),
            initial_clock_ms: self.initial_clock_ms,
            deadline_slack: job
                .time_margin
                .map(|ms| Duration::from_millis(ms.max(0) as u64))
                .unwrap_or(self.deadline_slack),
            resign_threshold: job.score_threshold.unwrap_or(self.resign_threshold),
            engine_acquire_timeout: self.engine_acquire_timeout,
            draw_adjudication: job.draw_adjudication.or(self.draw_adjudication),
            max_moves: job.max_moves.or(self.max_moves),
        }
    }
}

fn is_near_zero(score: &Score, threshold: Centipawns) -> bool {
    match score {
        Score::Mate(_) => false,
        Score::Centipawns(cp) => cp.abs() <= threshold,
    }
}

/// The game's terminal classification, as seen by whoever dispatched the
/// battle (spec.md §4.2 step 2/3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleOutcome {
    pub status: GameStatus,
    pub verdict: Option<Verdict>,
}

/// Drives one game between two pooled UCI engines, reporting every
/// observable event through a [`Watcher`] (spec.md §4.2).
pub struct BattleDriver {
    config: BattleConfig,
    white_pool: Arc<dyn EnginePool>,
    black_pool: Arc<dyn EnginePool>,
    watcher: Arc<dyn Watcher>,
}

fn verdict_for(winner: Color) -> Verdict {
    match winner {
        Color::White => Verdict::WhiteWins,
        Color::Black => Verdict::BlackWins,
    }
}

fn opponent_verdict(offender: Color) -> Verdict {
    verdict_for(offender.opponent())
}

fn negate(score: Score) -> Score {
    match score {
        Score::Mate(n) => Score::Mate(-n),
        Score::Centipawns(cp) => Score::Centipawns(-cp),
    }
}

/// `None` unless `score`, reported by `mover`, is decisive one way or the
/// other; `Some(color)` names whichever side it favors.
fn decisive_winner(score: &Score, mover: Color, threshold: Centipawns) -> Option<Color> {
    if score.is_decisive(threshold) {
        Some(mover)
    } else if negate(*score).is_decisive(threshold) {
        Some(mover.opponent())
    } else {
        None
    }
}

/// Maps a board's own status to the wire `GameStatus`/`Verdict` pair, or
/// `None` if the game is still in progress.
fn terminal_status(board_status: GameStatus, mover: Color) -> Option<(GameStatus, Option<Verdict>)> {
    match board_status {
        GameStatus::InProgress => None,
        GameStatus::Checkmate => Some((GameStatus::Checkmate, Some(opponent_verdict(mover)))),
        GameStatus::Stalemate => Some((GameStatus::Stalemate, Some(Verdict::Draw))),
        GameStatus::Draw => Some((GameStatus::Draw, Some(Verdict::Draw))),
        other => Some((other, None)),
    }
}

impl BattleDriver {
    pub fn new(
        config: BattleConfig,
        white_pool: Arc<dyn EnginePool>,
        black_pool: Arc<dyn EnginePool>,
        watcher: Arc<dyn Watcher>,
    ) -> Self {
        Self {
            config,
            white_pool,
            black_pool,
            watcher,
        }
    }

    /// Runs `job` to completion. Only pool-acquisition failure is
    /// propagated as an `Err`: that is the one setup error the caller
    /// cannot blame on either engine (spec.md §4.4 step 4, "prefail").
    /// Every other failure is folded into a terminal [`BattleOutcome`].
    pub async fn run(&self, job: &Job) -> Result<BattleOutcome, EngineError> {
        let config = self.config.for_job(job);
        let mut white = self.white_pool.acquire(config.engine_acquire_timeout).await?;
        let mut black = self.black_pool.acquire(config.engine_acquire_timeout).await?;

        let (outcome, unhealthy) = self.play(&config, white.as_mut(), black.as_mut(), job).await;

        self.white_pool.release(white, unhealthy != Some(Color::White)).await;
        self.black_pool.release(black, unhealthy != Some(Color::Black)).await;

        Ok(outcome)
    }

    async fn finish(
        &self,
        fen: &str,
        status: GameStatus,
        verdict: Option<Verdict>,
        warnings: &[String],
    ) -> BattleOutcome {
        self.watcher.on_game_finished(fen, status, verdict, warnings).await;
        BattleOutcome { status, verdict }
    }

    fn deadline_for(&self, config: &BattleConfig, mover: Color, clock_ms: &[Option<i64>; 2]) -> Timestamp {
        let now = Timestamp::now();
        let think_time = match config.fixed_time_ms {
            Some(ms) => Duration::from_millis(ms.max(0) as u64),
            None => Duration::from_millis(clock_ms[mover.index()].unwrap_or(0).max(0) as u64),
        };
        now.plus(think_time + config.deadline_slack)
    }

    async fn play(
        &self,
        config: &BattleConfig,
        white: &mut dyn UciEngine,
        black: &mut dyn UciEngine,
        job: &Job,
    ) -> (BattleOutcome, Option<Color>) {
        let mut warnings = Vec::new();

        if let Err(err) = white.new_game().await {
            log::warn!("white engine failed to start, restarting: {err}");
            warnings.push(format!("white: {err}"));
            let outcome = self
                .finish("(no position)", GameStatus::Aborted, Some(Verdict::BlackWins), &warnings)
                .await;
            return (outcome, Some(Color::White));
        }
        if let Err(err) = black.new_game().await {
            log::warn!("black engine failed to start, restarting: {err}");
            warnings.push(format!("black: {err}"));
            let outcome = self
                .finish("(no position)", GameStatus::Aborted, Some(Verdict::WhiteWins), &warnings)
                .await;
            return (outcome, Some(Color::Black));
        }

        let start_moves = job.start_moves.clone().unwrap_or_default();
        let mut board = match self.init_board(job, &start_moves) {
            Ok(board) => board,
            Err(err) => {
                warnings.push(format!("start position: {err}"));
                let outcome = self.finish("(invalid start position)", GameStatus::Aborted, None, &warnings).await;
                return (outcome, None);
            }
        };

        self.watcher.on_game_inited(&board.fen()).await;

        let mut clock_ms = [config.initial_clock_ms, config.initial_clock_ms];
        let mut last_score: [Option<Score>; 2] = [None, None];
        let mut near_zero_streak: u32 = 0;
        let mut plies: u32 = 0;

        loop {
            if let Some((status, verdict)) = terminal_status(board.status(), board.turn()) {
                let outcome = self.finish(&board.fen(), status, verdict, &warnings).await;
                return (outcome, None);
            }
            if let Some(max_moves) = config.max_moves {
                if plies >= max_moves {
                    let outcome =
                        self.finish(&board.fen(), GameStatus::Draw, Some(Verdict::Draw), &warnings).await;
                    return (outcome, None);
                }
            }

            let mover = board.turn();
            let deadline = self.deadline_for(config, mover, &clock_ms);
            let think_started = Timestamp::now();
            let engine: &mut dyn UciEngine = match mover {
                Color::White => white,
                Color::Black => black,
            };

            if let Err(err) = engine.set_position(&board.fen(), &[]).await {
                log::warn!("{mover:?} engine failed to set position, restarting: {err}");
                warnings.push(format!("{mover:?}: {err}"));
                let outcome = self
                    .finish(&board.fen(), GameStatus::Aborted, Some(opponent_verdict(mover)), &warnings)
                    .await;
                return (outcome, Some(mover));
            }

            let best = match engine.go(deadline).await {
                Ok(best) => best,
                Err(EngineError::WaitTimeout) => {
                    let outcome = self
                        .finish(&board.fen(), GameStatus::TimeForfeit, Some(opponent_verdict(mover)), &warnings)
                        .await;
                    return (outcome, None);
                }
                Err(err) => {
                    log::warn!("{mover:?} engine search failed, restarting: {err}");
                    warnings.push(format!("{mover:?}: {err}"));
                    let outcome = self
                        .finish(&board.fen(), GameStatus::Aborted, Some(opponent_verdict(mover)), &warnings)
                        .await;
                    return (outcome, Some(mover));
                }
            };

            self.watcher.on_engine_info(mover, &best.info).await;

            if let Err(err) = board.apply_uci(&best.uci) {
                log::warn!("{mover:?} engine played illegal move {}: {err}", best.uci);
                warnings.push(format!("{mover:?} played illegal move {}: {err}", best.uci));
                let outcome = self
                    .finish(&board.fen(), GameStatus::Aborted, Some(opponent_verdict(mover)), &warnings)
                    .await;
                return (outcome, Some(mover));
            }

            plies += 1;

            if config.fixed_time_ms.is_none() {
                if let Some(budget) = clock_ms[mover.index()].as_mut() {
                    let elapsed = think_started.until(Timestamp::now()).as_millis() as i64;
                    *budget = (*budget - elapsed).max(0);
                }
            }

            let clock_snapshot = clock_ms[mover.index()].map(|remaining_ms| Clock { remaining_ms });
            self.watcher.on_game_updated(&board.fen(), mover, clock_snapshot).await;

            last_score[mover.index()] = best.info.score;

            if let Some(DrawAdjudication { threshold, count }) = config.draw_adjudication {
                match best.info.score {
                    Some(score) if is_near_zero(&score, threshold) => near_zero_streak += 1,
                    _ => near_zero_streak = 0,
                }
                if near_zero_streak >= count {
                    let outcome = self
                        .finish(&board.fen(), GameStatus::Draw, Some(Verdict::Draw), &warnings)
                        .await;
                    return (outcome, None);
                }
            }

            if config.resign_threshold > 0 {
                if let (Some(w), Some(b)) = (last_score[Color::White.index()], last_score[Color::Black.index()]) {
                    let white_winner = decisive_winner(&w, Color::White, config.resign_threshold);
                    let black_winner = decisive_winner(&b, Color::Black, config.resign_threshold);
                    if let (Some(a), Some(c)) = (white_winner, black_winner) {
                        if a == c {
                            let outcome = self
                                .finish(&board.fen(), GameStatus::Resigned, Some(verdict_for(a)), &warnings)
                                .await;
                            return (outcome, None);
                        }
                    }
                }
            }
        }
    }

    fn init_board(&self, job: &Job, start_moves: &[String]) -> Result<Board, EngineError> {
        let board = match &job.start_board {
            Some(fen) => Board::from_fen(fen)?,
            None => Board::startpos(),
        };
        board.with_moves(start_moves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BestMove, SearchInfo};
    use crate::watcher::NullWatcher;
    use std::sync::Mutex;

    struct ScriptedEngine {
        moves: Vec<&'static str>,
        next: usize,
    }

    #[async_trait::async_trait]
    impl UciEngine for ScriptedEngine {
        async fn new_game(&mut self) -> Result<(), EngineError> {
            Ok(())
        }
        async fn set_position(&mut self, _fen: &str, _moves: &[String]) -> Result<(), EngineError> {
            Ok(())
        }
        async fn go(&mut self, _deadline: Timestamp) -> Result<BestMove, EngineError> {
            let uci = self.moves.get(self.next).copied().ok_or(EngineError::WaitTimeout)?;
            self.next += 1;
            Ok(BestMove {
                uci: uci.to_string(),
                info: SearchInfo::default(),
            })
        }
        async fn stop(&mut self) {}
    }

    struct SinglePool(Mutex<Option<ScriptedEngine>>);

    #[async_trait::async_trait]
    impl EnginePool for SinglePool {
        async fn acquire(&self, _timeout: Duration) -> Result<Box<dyn UciEngine>, EngineError> {
            let engine = self.0.lock().unwrap().take().ok_or(EngineError::Other("spent".into()))?;
            Ok(Box::new(engine))
        }
        async fn release(&self, _engine: Box<dyn UciEngine>, _healthy: bool) {}
    }

    fn job() -> Job {
        Job {
            id: "job".into(),
            fixed_time: Some(1_000),
            time_control: None,
            start_board: None,
            start_moves: None,
            score_threshold: None,
            time_margin: None,
            draw_adjudication: None,
            max_moves: None,
            white: cc_dto::Engine { name: "white".into() },
            black: cc_dto::Engine { name: "black".into() },
        }
    }

    #[tokio::test]
    async fn fools_mate_finishes_with_checkmate_against_white() {
        let white = SinglePool(Mutex::new(Some(ScriptedEngine {
            moves: vec!["f2f3", "g2g4"],
            next: 0,
        })));
        let black = SinglePool(Mutex::new(Some(ScriptedEngine {
            moves: vec!["e7e5", "d8h4"],
            next: 0,
        })));
        let driver = BattleDriver::new(
            BattleConfig::default(),
            Arc::new(white),
            Arc::new(black),
            Arc::new(NullWatcher),
        );
        let outcome = driver.run(&job()).await.unwrap();
        assert_eq!(outcome.status, GameStatus::Checkmate);
        assert_eq!(outcome.verdict, Some(Verdict::BlackWins));
    }

    #[tokio::test]
    async fn engine_returning_no_move_is_treated_as_a_timeout_forfeit() {
        let white = SinglePool(Mutex::new(Some(ScriptedEngine { moves: vec![], next: 0 })));
        let black = SinglePool(Mutex::new(Some(ScriptedEngine { moves: vec![], next: 0 })));
        let driver = BattleDriver::new(
            BattleConfig::default(),
            Arc::new(white),
            Arc::new(black),
            Arc::new(NullWatcher),
        );
        let outcome = driver.run(&job()).await.unwrap();
        assert_eq!(outcome.status, GameStatus::TimeForfeit);
        assert_eq!(outcome.verdict, Some(Verdict::BlackWins));
    }
}
