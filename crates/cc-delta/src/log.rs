use crate::error::ApplyError;

/// An append-only, versioned log, used for both the move list and the
/// warnings list (spec.md §3: `Moves.length == Moves.version`,
/// `Warnings.length == Warnings.version`).
///
/// When this log *is* the full state, `entries` holds every element and
/// `version == entries.len()`. When it is a delta, `entries` holds only
/// the suffix `[old_version, version)` and `version` is the *new* total.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AppendLog<T> {
    pub version: i64,
    pub entries: Vec<T>,
}

impl<T: Clone> AppendLog<T> {
    pub fn empty() -> Self {
        Self {
            version: 0,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, item: T) {
        self.entries.push(item);
        self.version += 1;
    }

    /// Minimal patch carrying changes since `old_version`. `None` if
    /// nothing advanced.
    pub fn delta_since(&self, old_version: i64) -> Option<AppendLog<T>> {
        if old_version >= self.version {
            return None;
        }
        let start = old_version.max(0) as usize;
        Some(AppendLog {
            version: self.version,
            entries: self.entries[start..].to_vec(),
        })
    }

    /// Appends `patch`'s suffix onto `self`, validating length and
    /// monotonicity per spec.md §4.1.
    pub fn apply(&mut self, patch: &AppendLog<T>) -> Result<(), ApplyError> {
        let gap = patch.version - self.version;
        if gap < 0 || patch.entries.len() as i64 != gap {
            return Err(ApplyError::AppendLengthMismatch);
        }
        self.entries.extend(patch.entries.iter().cloned());
        self.version = patch.version;
        Ok(())
    }
}

impl<T: Clone> Default for AppendLog<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_since_returns_suffix_only() {
        let mut log = AppendLog::empty();
        log.push("a");
        log.push("b");
        log.push("c");
        let patch = log.delta_since(1).unwrap();
        assert_eq!(patch.version, 3);
        assert_eq!(patch.entries, vec!["b", "c"]);
    }

    #[test]
    fn delta_since_current_is_none() {
        let mut log = AppendLog::empty();
        log.push("a");
        assert!(log.delta_since(1).is_none());
    }

    #[test]
    fn apply_appends_and_bumps_version() {
        let mut log: AppendLog<&str> = AppendLog::empty();
        let patch = AppendLog {
            version: 2,
            entries: vec!["a", "b"],
        };
        log.apply(&patch).unwrap();
        assert_eq!(log.version, 2);
        assert_eq!(log.entries, vec!["a", "b"]);
    }

    #[test]
    fn apply_rejects_length_mismatch() {
        let mut log: AppendLog<&str> = AppendLog::empty();
        let patch = AppendLog {
            version: 2,
            entries: vec!["a"],
        };
        assert!(log.apply(&patch).is_err());
    }

    #[test]
    fn apply_rejects_overlapping_versions() {
        let mut log = AppendLog::empty();
        log.push("a");
        let patch = AppendLog {
            version: 1,
            entries: vec!["a"],
        };
        assert!(log.apply(&patch).is_err());
    }

    #[test]
    fn round_trip_preserves_structural_equality() {
        let mut full = AppendLog::empty();
        full.push(1);
        full.push(2);
        full.push(3);
        let mut receiver: AppendLog<i32> = AppendLog::empty();
        let patch = full.delta_since(receiver.version).unwrap();
        receiver.apply(&patch).unwrap();
        assert_eq!(receiver, full);
    }
}
