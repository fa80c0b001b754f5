/// Terminal or in-progress classification of the board (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameStatus {
    InProgress,
    Checkmate,
    Stalemate,
    Draw,
    Resigned,
    TimeForfeit,
    Aborted,
}

/// Who the terminal status favors, if anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Verdict {
    WhiteWins,
    BlackWins,
    Draw,
}

/// Replace-on-change sub-state: the board and its terminal classification.
/// Every field is overwritten wholesale when `version` advances.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PositionState {
    pub version: i64,
    pub board: String,
    pub status: GameStatus,
    pub verdict: Option<Verdict>,
}

impl PositionState {
    pub fn new(board: impl Into<String>) -> Self {
        Self {
            version: 1,
            board: board.into(),
            status: GameStatus::InProgress,
            verdict: None,
        }
    }

    pub fn advance(&mut self, board: impl Into<String>, status: GameStatus, verdict: Option<Verdict>) {
        self.version += 1;
        self.board = board.into();
        self.status = status;
        self.verdict = verdict;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_bumps_version_and_replaces_fields() {
        let mut pos = PositionState::new("startpos");
        pos.advance("1.e4", GameStatus::InProgress, None);
        assert_eq!(pos.version, 2);
        assert_eq!(pos.board, "1.e4");
    }

    #[test]
    fn terminal_status_carries_verdict() {
        let mut pos = PositionState::new("startpos");
        pos.advance("mate", GameStatus::Checkmate, Some(Verdict::WhiteWins));
        assert_eq!(pos.status, GameStatus::Checkmate);
        assert_eq!(pos.verdict, Some(Verdict::WhiteWins));
    }
}
