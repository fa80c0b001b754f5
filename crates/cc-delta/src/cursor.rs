/// A snapshot of all six sub-state versions, plus whether `Info` has ever
/// been set. Partially ordered componentwise: `a.le(b)` iff every component
/// of `a` is no greater than the corresponding component of `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JobCursor {
    pub has_info: bool,
    pub warnings: i64,
    pub position: i64,
    pub moves: i64,
    pub white: i64,
    pub black: i64,
}

impl JobCursor {
    pub const ZERO: JobCursor = JobCursor {
        has_info: false,
        warnings: 0,
        position: 0,
        moves: 0,
        white: 0,
        black: 0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Componentwise dominance: true iff `self` is no further along than
    /// `other` in every sub-state.
    pub fn le(&self, other: &JobCursor) -> bool {
        (!self.has_info || other.has_info)
            && self.warnings <= other.warnings
            && self.position <= other.position
            && self.moves <= other.moves
            && self.white <= other.white
            && self.black <= other.black
    }
}

impl Default for JobCursor {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_cursor_dominates_nothing_but_itself_and_above() {
        assert!(JobCursor::ZERO.le(&JobCursor::ZERO));
        let advanced = JobCursor {
            has_info: true,
            moves: 2,
            ..JobCursor::ZERO
        };
        assert!(JobCursor::ZERO.le(&advanced));
        assert!(!advanced.le(&JobCursor::ZERO));
    }

    #[test]
    fn incomparable_cursors_neither_dominates() {
        let a = JobCursor {
            moves: 3,
            ..JobCursor::ZERO
        };
        let b = JobCursor {
            warnings: 1,
            ..JobCursor::ZERO
        };
        assert!(!a.le(&b));
        assert!(!b.le(&a));
    }
}
