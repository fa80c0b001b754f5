use serde::{Deserialize, Serialize};

/// Coded errors carried in RPC response bodies (spec.md §7). `InvalidCode`
/// is a deserialization sentinel and is never constructed by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid error code")]
    InvalidCode,
    #[error("needs resync")]
    NeedsResync,
    #[error("no such room")]
    NoSuchRoom,
    #[error("no job available")]
    NoJob,
    #[error("no job running")]
    NoJobRunning,
    #[error("bad token")]
    BadToken,
    #[error("bad request")]
    BadRequest,
    #[error("incompatible protocol version")]
    IncompatibleProto,
    #[error("room locked")]
    Locked,
}

impl ApiError {
    pub fn code(self) -> i32 {
        match self {
            ApiError::InvalidCode => 0,
            ApiError::NeedsResync => 1,
            ApiError::NoSuchRoom => 2,
            ApiError::NoJob => 3,
            ApiError::NoJobRunning => 4,
            ApiError::BadToken => 5,
            ApiError::BadRequest => 6,
            ApiError::IncompatibleProto => 7,
            ApiError::Locked => 8,
        }
    }

    /// Conventional HTTP status for this error, per spec.md §6.
    pub fn http_status(self) -> u16 {
        match self {
            ApiError::InvalidCode => 500,
            ApiError::NeedsResync => 409,
            ApiError::NoSuchRoom => 410,
            ApiError::NoJob => 404,
            ApiError::NoJobRunning => 404,
            ApiError::BadToken => 403,
            ApiError::BadRequest => 400,
            ApiError::IncompatibleProto => 400,
            ApiError::Locked => 409,
        }
    }

    /// True if a room client should retry this RPC rather than surface the
    /// failure (spec.md §4.4: "retriable if it is ErrLocked or any
    /// transport/IO error").
    pub fn is_retriable(self) -> bool {
        matches!(self, ApiError::Locked)
    }

    /// Inverse of [`ApiError::code`]; unrecognized codes decode to
    /// `InvalidCode` rather than failing deserialization.
    pub fn from_code(code: i32) -> ApiError {
        match code {
            1 => ApiError::NeedsResync,
            2 => ApiError::NoSuchRoom,
            3 => ApiError::NoJob,
            4 => ApiError::NoJobRunning,
            5 => ApiError::BadToken,
            6 => ApiError::BadRequest,
            7 => ApiError::IncompatibleProto,
            8 => ApiError::Locked,
            _ => ApiError::InvalidCode,
        }
    }
}

impl From<CodedError> for ApiError {
    fn from(err: CodedError) -> Self {
        ApiError::from_code(err.code)
    }
}

/// Wire representation of an [`ApiError`]: `{code:int, message:string}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodedError {
    pub code: i32,
    pub message: String,
}

impl From<ApiError> for CodedError {
    fn from(err: ApiError) -> Self {
        CodedError {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_is_the_only_retriable_api_error() {
        assert!(ApiError::Locked.is_retriable());
        assert!(!ApiError::NoSuchRoom.is_retriable());
        assert!(!ApiError::BadRequest.is_retriable());
    }

    #[test]
    fn code_round_trips_through_from_code() {
        for err in [ApiError::NeedsResync, ApiError::NoSuchRoom, ApiError::Locked] {
            assert_eq!(ApiError::from_code(err.code()), err);
        }
        assert_eq!(ApiError::from_code(999), ApiError::InvalidCode);
    }

    #[test]
    fn status_mapping_matches_spec() {
        assert_eq!(ApiError::NoSuchRoom.http_status(), 410);
        assert_eq!(ApiError::NoJob.http_status(), 404);
        assert_eq!(ApiError::Locked.http_status(), 409);
        assert_eq!(ApiError::BadToken.http_status(), 403);
        assert_eq!(ApiError::NeedsResync.http_status(), 409);
    }
}
