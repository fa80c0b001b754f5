/// A starting position drawn from a contest's opening book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opening {
    pub start_board: Option<String>,
    pub start_moves: Option<Vec<String>>,
}

/// Seam for opening-book selection. Parsing and weighting real book
/// formats is out of scope here; callers inject whatever book logic they
/// have, or [`NullBook`] to always start from the game's default position.
pub trait OpeningBook: Send + Sync {
    fn draw(&self) -> Opening;
}

/// Always draws the empty opening (engines start from their default
/// position).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBook;

impl OpeningBook for NullBook {
    fn draw(&self) -> Opening {
        Opening::default()
    }
}
