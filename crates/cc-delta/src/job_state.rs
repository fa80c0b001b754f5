use cc_core::Ulid;

use crate::cursor::JobCursor;
use crate::error::{ApplyError, DeltaError};
use crate::log::AppendLog;
use crate::player::PlayerState;
use crate::position::PositionState;

/// Set exactly once per job, at job start; never changes afterward
/// (spec.md §3: `Info` has no version, only a presence bit in the cursor).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Info {
    pub white_name: String,
    pub black_name: String,
    pub start_board: Option<String>,
    pub time_control: Option<String>,
    pub fixed_time_ms: Option<i64>,
}

/// Full live state of one job: the one-shot `Info`, the replace-on-change
/// `Position`/`White`/`Black`, and the append-only `Moves`/`Warnings`
/// (spec.md §3, §4.1).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JobState {
    pub info: Option<Info>,
    pub position: PositionState,
    pub moves: AppendLog<String>,
    pub warnings: AppendLog<String>,
    pub white: PlayerState,
    pub black: PlayerState,
}

impl JobState {
    pub fn new(job_id: Ulid) -> Self {
        let _ = job_id;
        Self {
            info: None,
            position: PositionState::new("startpos"),
            moves: AppendLog::empty(),
            warnings: AppendLog::empty(),
            white: PlayerState::idle(),
            black: PlayerState::idle(),
        }
    }

    pub fn cursor(&self) -> JobCursor {
        JobCursor {
            has_info: self.info.is_some(),
            warnings: self.warnings.version,
            position: self.position.version,
            moves: self.moves.version,
            white: self.white.version,
            black: self.black.version,
        }
    }

    /// Builds the minimal patch carrying everything that has advanced since
    /// `old`. `old` must dominate nothing it hasn't actually seen: it must
    /// be `<=` this state's own cursor, per spec.md §4.1.
    pub fn delta(&self, old: &JobCursor) -> Result<JobState, DeltaError> {
        let current = self.cursor();
        if !old.le(&current) {
            return Err(DeltaError);
        }
        Ok(JobState {
            info: if old.has_info { None } else { self.info.clone() },
            position: if old.position < current.position {
                self.position.clone()
            } else {
                PositionState {
                    version: old.position,
                    ..self.position.clone()
                }
            },
            moves: self
                .moves
                .delta_since(old.moves)
                .unwrap_or_else(|| AppendLog {
                    version: old.moves,
                    entries: Vec::new(),
                }),
            warnings: self
                .warnings
                .delta_since(old.warnings)
                .unwrap_or_else(|| AppendLog {
                    version: old.warnings,
                    entries: Vec::new(),
                }),
            white: if old.white < current.white {
                self.white.clone()
            } else {
                PlayerState {
                    version: old.white,
                    ..self.white.clone()
                }
            },
            black: if old.black < current.black {
                self.black.clone()
            } else {
                PlayerState {
                    version: old.black,
                    ..self.black.clone()
                }
            },
        })
    }

    /// Applies a patch produced by [`JobState::delta`]. Any violation of the
    /// per-field laws means the patch is malformed and the caller must
    /// resync from a fresh snapshot rather than trust partial application.
    pub fn apply_delta(&mut self, patch: &JobState) -> Result<(), ApplyError> {
        if let Some(info) = &patch.info {
            if self.info.is_some() {
                return Err(ApplyError::InfoAlreadySet);
            }
            self.info = Some(info.clone());
        }
        if patch.position.version > self.position.version {
            self.position = patch.position.clone();
        } else if patch.position.version != self.position.version {
            return Err(ApplyError::NonIncreasingVersion);
        }
        if patch.white.version > self.white.version {
            self.white = patch.white.clone();
        } else if patch.white.version != self.white.version {
            return Err(ApplyError::NonIncreasingVersion);
        }
        if patch.black.version > self.black.version {
            self.black = patch.black.clone();
        } else if patch.black.version != self.black.version {
            return Err(ApplyError::NonIncreasingVersion);
        }
        self.moves.apply(&patch.moves)?;
        self.warnings.apply(&patch.warnings)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::GameStatus;

    fn sample_id() -> Ulid {
        Ulid::generate()
    }

    #[test]
    fn delta_from_zero_cursor_is_full_snapshot() {
        let state = JobState::new(sample_id());
        let patch = state.delta(&JobCursor::ZERO).unwrap();
        assert_eq!(patch.position, state.position);
        assert!(patch.info.is_none());
    }

    #[test]
    fn delta_rejects_cursor_ahead_of_state() {
        let state = JobState::new(sample_id());
        let ahead = JobCursor {
            moves: 5,
            ..JobCursor::ZERO
        };
        assert!(state.delta(&ahead).is_err());
    }

    #[test]
    fn round_trip_delta_and_apply_converges() {
        let mut sender = JobState::new(sample_id());
        sender.info = Some(Info {
            white_name: "a".into(),
            black_name: "b".into(),
            start_board: None,
            time_control: None,
            fixed_time_ms: None,
        });
        sender.moves.push("e4".into());
        sender.position.advance("1.e4", GameStatus::InProgress, None);

        let mut receiver = JobState::new(sample_id());
        let patch = sender.delta(&receiver.cursor()).unwrap();
        receiver.apply_delta(&patch).unwrap();
        assert_eq!(receiver, sender);

        sender.moves.push("e5".into());
        let patch2 = sender.delta(&receiver.cursor()).unwrap();
        receiver.apply_delta(&patch2).unwrap();
        assert_eq!(receiver, sender);
    }

    #[test]
    fn apply_rejects_info_set_twice() {
        let mut receiver = JobState::new(sample_id());
        let info = Info {
            white_name: "a".into(),
            black_name: "b".into(),
            start_board: None,
            time_control: None,
            fixed_time_ms: None,
        };
        receiver.info = Some(info.clone());
        let mut patch = JobState::new(sample_id());
        patch.info = Some(info);
        assert!(matches!(
            receiver.apply_delta(&patch),
            Err(ApplyError::InfoAlreadySet)
        ));
    }
}
