use cc_core::Ulid;

use crate::cursor::JobCursor;
use crate::error::{ApplyError, DeltaError};
use crate::job_state::JobState;

/// A room's observable state: which job it is currently running, if any,
/// and that job's live [`JobState`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RoomState {
    pub job_id: Option<Ulid>,
    pub state: Option<JobState>,
}

/// What a subscriber has already seen: which job, and how far into it.
/// Opaque to callers other than in that it round-trips through `/update`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RoomCursor {
    pub job_id: Option<Ulid>,
    pub cursor: JobCursor,
}

impl RoomState {
    pub fn empty() -> Self {
        Self {
            job_id: None,
            state: None,
        }
    }

    pub fn cursor(&self) -> RoomCursor {
        RoomCursor {
            job_id: self.job_id,
            cursor: self.state.as_ref().map(JobState::cursor).unwrap_or(JobCursor::ZERO),
        }
    }

    /// Produces a patch relative to `old`. If `old` names a different job
    /// than the one currently running (or no job at all), this is a full
    /// snapshot of the current job rather than a patch, per spec.md §4.1's
    /// job-boundary rule: a stale cursor can never be meaningfully diffed
    /// against a different job's history.
    pub fn delta(&self, old: &RoomCursor) -> Result<RoomState, DeltaError> {
        let same_job = old.job_id.is_some() && old.job_id == self.job_id;
        let state = match &self.state {
            None => None,
            Some(current) => {
                let baseline = if same_job { old.cursor } else { JobCursor::ZERO };
                Some(current.delta(&baseline)?)
            }
        };
        Ok(RoomState {
            job_id: self.job_id,
            state,
        })
    }

    pub fn apply_delta(&mut self, patch: &RoomState) -> Result<(), ApplyError> {
        if self.job_id != patch.job_id {
            self.job_id = patch.job_id;
            self.state = patch.state.clone();
            return Ok(());
        }
        match (&mut self.state, &patch.state) {
            (Some(existing), Some(delta)) => existing.apply_delta(delta),
            (None, Some(snapshot)) => {
                self.state = Some(snapshot.clone());
                Ok(())
            }
            (_, None) => Ok(()),
        }
    }
}

impl Default for RoomState {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_subscriber_gets_full_snapshot() {
        let mut room = RoomState::empty();
        room.job_id = Some(Ulid::generate());
        room.state = Some(JobState::new(room.job_id.unwrap()));

        let old = RoomCursor {
            job_id: None,
            cursor: JobCursor::ZERO,
        };
        let patch = room.delta(&old).unwrap();
        assert_eq!(patch.job_id, room.job_id);
    }

    #[test]
    fn job_change_forces_full_snapshot_even_with_advanced_cursor() {
        let mut room = RoomState::empty();
        room.job_id = Some(Ulid::generate());
        let mut job = JobState::new(room.job_id.unwrap());
        job.moves.push("e4".into());
        room.state = Some(job);

        let stale = RoomCursor {
            job_id: Some(Ulid::generate()),
            cursor: JobCursor {
                moves: 1,
                ..JobCursor::ZERO
            },
        };
        let patch = room.delta(&stale).unwrap();
        assert_eq!(patch.state.unwrap().moves.entries.len(), 1);
    }

    #[test]
    fn apply_delta_on_job_change_replaces_state() {
        let mut receiver = RoomState::empty();
        let new_job = Ulid::generate();
        let snapshot = RoomState {
            job_id: Some(new_job),
            state: Some(JobState::new(new_job)),
        };
        receiver.apply_delta(&snapshot).unwrap();
        assert_eq!(receiver.job_id, Some(new_job));
    }
}
