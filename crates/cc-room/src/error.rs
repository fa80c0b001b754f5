use cc_dto::ApiError;

/// Everything that can go wrong calling out to the keeper (spec.md §4.4).
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("transport error: {0}")]
    Transport(String),
}

impl RoomError {
    /// `ErrLocked` or any transport/IO error; everything else is not worth
    /// retrying (spec.md §4.4).
    pub fn is_retriable(&self) -> bool {
        match self {
            RoomError::Api(err) => err.is_retriable(),
            RoomError::Transport(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_always_retriable() {
        assert!(RoomError::Transport("connection reset".into()).is_retriable());
    }

    #[test]
    fn only_locked_api_errors_are_retriable() {
        assert!(RoomError::Api(ApiError::Locked).is_retriable());
        assert!(!RoomError::Api(ApiError::NoSuchRoom).is_retriable());
    }
}
