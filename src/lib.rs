//! Blockout simulation core.
//!
//! A 3D falling-block puzzle: polycube pieces descend through a rectangular
//! well, can be moved and rotated on three axes, and settle into a grid.
//! Completed horizontal planes are removed and the stack above collapses.
//!
//! The core keeps per-cell face-visibility bits up to date so a renderer can
//! draw only exposed cube faces. Timing, input, scoring and drawing are left
//! to the caller.

pub mod board;
pub mod cell;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod pieces;

pub use board::{Board, MoveResult, RotateResult};
pub use cell::{Cell, Face};
pub use error::PrepareError;
pub use geometry::{Point3, Rotation};
pub use grid::{Size3, MINIMUM_SIZE};
pub use pieces::{Piece, PieceSet};
