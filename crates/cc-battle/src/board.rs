use cc_delta::GameStatus;
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color as ShakColor, EnPassantMode, Position};

use crate::error::EngineError;

/// Which side is to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }
}

/// Legality and terminal-status tracking for one game, backed by
/// `shakmaty`. The battle driver owns one of these; engines only ever see
/// FEN strings and UCI move strings.
pub struct Board {
    pos: Chess,
}

impl Board {
    pub fn startpos() -> Self {
        Self { pos: Chess::default() }
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let setup: Fen = fen.parse().map_err(|_| EngineError::IllegalMove(fen.to_string()))?;
        let pos = setup
            .into_position(CastlingMode::Standard)
            .map_err(|_| EngineError::IllegalMove(fen.to_string()))?;
        Ok(Self { pos })
    }

    pub fn with_moves(mut self, moves: &[String]) -> Result<Self, EngineError> {
        for mv in moves {
            self.apply_uci(mv)?;
        }
        Ok(self)
    }

    pub fn apply_uci(&mut self, uci: &str) -> Result<(), EngineError> {
        let parsed: UciMove = uci
            .parse()
            .map_err(|_| EngineError::IllegalMove(uci.to_string()))?;
        let mv = parsed
            .to_move(&self.pos)
            .map_err(|_| EngineError::IllegalMove(uci.to_string()))?;
        self.pos = self
            .pos
            .clone()
            .play(&mv)
            .map_err(|_| EngineError::IllegalMove(uci.to_string()))?;
        Ok(())
    }

    pub fn fen(&self) -> String {
        Fen(self.pos.clone().into_setup(EnPassantMode::Legal)).to_string()
    }

    pub fn turn(&self) -> Color {
        match self.pos.turn() {
            ShakColor::White => Color::White,
            ShakColor::Black => Color::Black,
        }
    }

    /// Terminal classification, `InProgress` otherwise.
    pub fn status(&self) -> GameStatus {
        if self.pos.is_checkmate() {
            GameStatus::Checkmate
        } else if self.pos.is_stalemate() {
            GameStatus::Stalemate
        } else if self.pos.is_insufficient_material() {
            GameStatus::Draw
        } else {
            GameStatus::InProgress
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_in_progress_and_white_to_move() {
        let board = Board::startpos();
        assert_eq!(board.status(), GameStatus::InProgress);
        assert_eq!(board.turn(), Color::White);
    }

    #[test]
    fn fools_mate_is_detected_as_checkmate() {
        let mut board = Board::startpos();
        for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            board.apply_uci(mv).unwrap();
        }
        assert_eq!(board.status(), GameStatus::Checkmate);
    }

    #[test]
    fn illegal_move_is_rejected() {
        let mut board = Board::startpos();
        assert!(board.apply_uci("e2e5").is_err());
    }
}
