/// Raised when computing a delta from a cursor that does not dominate the
/// state's own cursor (spec.md §4.1: "defined only when oldCursor ≤
/// state.Cursor()").
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("out-of-order cursor")]
pub struct DeltaError;

/// Raised when applying a malformed delta. The receiver must resync.
#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum ApplyError {
    #[error("bad delta: info already set")]
    InfoAlreadySet,
    #[error("bad delta: replace did not strictly increase version")]
    NonIncreasingVersion,
    #[error("bad delta: append length does not match version gap")]
    AppendLengthMismatch,
}
