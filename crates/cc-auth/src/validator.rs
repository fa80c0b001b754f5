/// Failure reported by a [`TokenValidator`]; always surfaces as `BadToken`
/// (spec.md §6, §7) regardless of the underlying reason.
#[derive(Debug, Clone, thiserror::Error)]
#[error("bad token: {0}")]
pub struct AuthError(pub String);

/// The one hook the orchestrator needs from authentication: is this bearer
/// token good? Token issuance, rotation, and storage are explicitly out of
/// scope (spec.md "Out of scope": "bearer-token authentication").
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> Result<(), AuthError>;
}

/// Accepts every token. Useful for local development and tests.
pub struct AllowAll;

impl TokenValidator for AllowAll {
    fn validate(&self, _token: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Accepts only tokens present in a fixed set, handed to it at
/// construction time. A minimal stand-in for a real credential store.
pub struct StaticTokenSet {
    tokens: std::collections::HashSet<String>,
}

impl StaticTokenSet {
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

impl TokenValidator for StaticTokenSet {
    fn validate(&self, token: &str) -> Result<(), AuthError> {
        if self.tokens.contains(token) {
            Ok(())
        } else {
            Err(AuthError("token not recognized".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_all_accepts_anything() {
        assert!(AllowAll.validate("whatever").is_ok());
    }

    #[test]
    fn static_set_rejects_unknown_tokens() {
        let set = StaticTokenSet::new(["good-token".to_string()]);
        assert!(set.validate("good-token").is_ok());
        assert!(set.validate("bad-token").is_err());
    }
}
