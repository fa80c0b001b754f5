/// Failure surfaced by a [`crate::engine::UciEngine`] or the board it
/// plays against (spec.md §4.2).
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("engine failed to initialize: {0}")]
    InitFailed(String),
    #[error("engine rejected set-position: {0}")]
    SetPositionFailed(String),
    #[error("engine failed to start search: {0}")]
    GoFailed(String),
    #[error("timed out waiting for bestmove")]
    WaitTimeout,
    #[error("illegal or unparseable move: {0}")]
    IllegalMove(String),
    #[error("engine error: {0}")]
    Other(String),
}
