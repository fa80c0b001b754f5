use cc_dto::Outcome;

/// The keeper's best-effort summary of a finished game, handed to
/// [`crate::contest::ContestScheduler::finalize_job`] (spec.md §4.5's
/// `GameExt`, §4.7 `FinalizeJob`). PGN rendering is a separate concern and
/// is carried here only as an already-produced string, if any.
#[derive(Debug, Clone)]
pub struct GameExt {
    pub outcome: Outcome,
    pub pgn: Option<String>,
}
