//! Board configuration errors.

use crate::grid::Size3;

/// Reasons `Board::prepare` can refuse a size. The board is left untouched.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum PrepareError {
    #[error("board {size} is below the 5x5x10 minimum")]
    TooSmall { size: Size3 },
    #[error("board {size} overflows the addressable cell range")]
    TooBig { size: Size3 },
    #[error("could not allocate {cells} cells")]
    OutOfMemory { cells: usize },
}
