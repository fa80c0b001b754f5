use cc_core::Ulid;
use cc_delta::{JobCursor, JobState, RoomCursor, RoomState};
use cc_dto::{JobStatus, RunningJob};
use tokio::sync::broadcast;

/// Result of applying one `/update` RPC to a room's state machine
/// (spec.md §4.6).
#[derive(Debug, PartialEq)]
pub enum UpdateOutcome {
    /// The game is still in progress; the room should keep polling.
    Running,
    /// The caller's cursor could not be reconciled without mutation; it
    /// must resend from an empty cursor.
    NeedsResync,
    /// The job reached a terminal status. Carries the final state so the
    /// caller can hand it to the scheduler.
    Terminal { state: JobState, status: JobStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UpdateError {
    #[error("no job running")]
    NoJobRunning,
}

/// Per-room state machine: which job (if any) is assigned, that job's
/// live delta model, and a fanout of mutation notifications for
/// subscribers (spec.md §4.6).
pub struct RoomMachine {
    job: Option<RunningJob>,
    room_state: RoomState,
    notify: broadcast::Sender<()>,
}

impl RoomMachine {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(16);
        Self {
            job: None,
            room_state: RoomState::empty(),
            notify,
        }
    }

    pub fn current_job(&self) -> Option<&RunningJob> {
        self.job.as_ref()
    }

    /// Replaces the assigned job. `None` zeros the state entirely; `Some`
    /// starts a fresh, empty `JobState` under the new job's id.
    pub fn set_job(&mut self, job: Option<RunningJob>) {
        self.room_state = match &job {
            None => RoomState::empty(),
            Some(running) => RoomState {
                job_id: Ulid::try_from(running.job.id.as_str()).ok(),
                state: Some(JobState::new(Ulid::generate())),
            },
        };
        self.job = job;
        self.tick();
    }

    /// Applies one `/update` RPC (spec.md §4.6 `Update`).
    pub fn update(
        &mut self,
        req_job_id: &str,
        from: JobCursor,
        delta: Option<JobState>,
        done: bool,
        error: Option<&str>,
    ) -> Result<UpdateOutcome, UpdateError> {
        let current = self.job.as_ref().ok_or(UpdateError::NoJobRunning)?;
        if current.job.id != req_job_id {
            return Err(UpdateError::NoJobRunning);
        }

        let mut status = match (done, error) {
            (false, _) => JobStatus::Running,
            (true, Some(reason)) if !reason.is_empty() => JobStatus::Aborted(reason.to_string()),
            (true, _) => JobStatus::Succeeded,
        };

        if let Some(patch) = delta {
            let job_state = self
                .room_state
                .state
                .get_or_insert_with(|| JobState::new(Ulid::generate()));
            if job_state.cursor() != from {
                if from.is_zero() {
                    *job_state = JobState::new(Ulid::generate());
                } else {
                    return Ok(UpdateOutcome::NeedsResync);
                }
            }
            if job_state.apply_delta(&patch).is_err() {
                status = JobStatus::Aborted("malformed state delta".to_string());
            }
        }

        if status.is_finished() {
            let state = self
                .room_state
                .state
                .clone()
                .unwrap_or_else(|| JobState::new(Ulid::generate()));
            self.set_job(None);
            return Ok(UpdateOutcome::Terminal { state, status });
        }
        self.tick();
        Ok(UpdateOutcome::Running)
    }

    /// Minimal patch since `old`, or an error if `old` does not dominate
    /// the current cursor (spec.md §4.6 `StateDelta`).
    pub fn state_delta(&self, old: &RoomCursor) -> Result<(RoomState, RoomCursor), cc_delta::DeltaError> {
        let delta = self.room_state.delta(old)?;
        Ok((delta, self.room_state.cursor()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    fn tick(&self) {
        let _ = self.notify.send(());
    }
}

impl Default for RoomMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_dto::{Engine, Job};

    fn sample_job(id: &str) -> RunningJob {
        RunningJob {
            job: Job {
                id: id.into(),
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
            contest_id: "c1".into(),
            white_engine_index: 0,
            black_engine_index: 1,
        }
    }

    #[test]
    fn update_without_job_is_no_job_running() {
        let mut machine = RoomMachine::new();
        assert_eq!(
            machine.update("job-1", JobCursor::ZERO, None, false, None),
            Err(UpdateError::NoJobRunning)
        );
    }

    #[test]
    fn mismatched_cursor_triggers_resync_unless_from_zero() {
        let mut machine = RoomMachine::new();
        let job = sample_job("job-1");
        machine.set_job(Some(job));
        let mut state = JobState::new(Ulid::generate());
        state.moves.push("e4".into());
        let stale_from = JobCursor {
            moves: 5,
            ..JobCursor::ZERO
        };
        let outcome = machine
            .update("job-1", stale_from, Some(state), false, None)
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::NeedsResync));
    }

    #[test]
    fn terminal_update_clears_the_job() {
        let mut machine = RoomMachine::new();
        machine.set_job(Some(sample_job("job-1")));
        let outcome = machine
            .update("job-1", JobCursor::ZERO, None, true, None)
            .unwrap();
        assert!(matches!(
            outcome,
            UpdateOutcome::Terminal { status: JobStatus::Succeeded, .. }
        ));
        assert!(machine.current_job().is_none());
    }

    #[test]
    fn done_with_error_is_aborted_never_failed() {
        let mut machine = RoomMachine::new();
        machine.set_job(Some(sample_job("job-1")));
        let outcome = machine
            .update("job-1", JobCursor::ZERO, None, true, Some("engine crashed"))
            .unwrap();
        assert!(matches!(
            outcome,
            UpdateOutcome::Terminal { status: JobStatus::Aborted(_), .. }
        ));
    }
}
