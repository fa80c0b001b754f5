use cc_core::{Score, Timestamp};

/// Replace-on-change sub-state for one side's engine: clock, search info,
/// and the (already-truncated) principal variation being rendered to
/// observers (spec.md §3, §4.3 PV truncation).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerState {
    pub version: i64,
    pub active: bool,
    pub clock_remaining_ms: Option<i64>,
    pub deadline: Option<Timestamp>,
    pub score: Option<Score>,
    pub pv: Vec<String>,
    pub pv_rendered: String,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
}

impl PlayerState {
    pub fn idle() -> Self {
        Self {
            version: 1,
            active: false,
            clock_remaining_ms: None,
            deadline: None,
            score: None,
            pv: Vec::new(),
            pv_rendered: String::new(),
            depth: None,
            nodes: None,
            nps: None,
        }
    }

    pub fn bump(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_state_starts_at_version_one() {
        let p = PlayerState::idle();
        assert_eq!(p.version, 1);
        assert!(!p.active);
    }

    #[test]
    fn bump_only_advances_version() {
        let mut p = PlayerState::idle();
        p.active = true;
        p.bump();
        assert_eq!(p.version, 2);
        assert!(p.active);
    }
}
