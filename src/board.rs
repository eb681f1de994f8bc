//! The well: settled grid, active and next piece, movement and settling.
//!
//! Board coordinates put the ceiling at z = 0 and the floor at
//! z = size.z - 1; pieces fall toward increasing z. The active piece's
//! origin is the board position of its local (0, 0, 0) cell.

use tracing::{debug, trace, warn};

use crate::cell::Cell;
use crate::error::PrepareError;
use crate::geometry::{Point3, Rotation};
use crate::grid::{Grid, Size3};
use crate::pieces::{Piece, PieceSet, PIECE_SIDE};

/// Most planes a single piece can complete at once.
pub const MAX_FULL_PLANES: usize = PIECE_SIDE;

/// Outcome of a translation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveResult {
    /// The piece moved.
    Ok,
    /// The move was rejected; nothing changed.
    Hit,
    /// The piece could not descend and was merged into the grid.
    Consolidated,
}

/// Outcome of a rotation request. Rotations never settle a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotateResult {
    /// The piece turned in place.
    Ok,
    /// The turned piece would leave the well or overlap settled cubes;
    /// nothing changed.
    Hit,
}

/// Where a piece would sit relative to the well walls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bounds {
    Within,
    /// Past a side wall or above the ceiling.
    Outside,
    /// On or past the floor.
    Bottom,
}

/// Game well state.
#[derive(Clone, Debug)]
pub struct Board {
    grid: Grid,
    /// Lowest occupied plane index; `size.z` when the well is empty.
    top: usize,
    /// Two slots; `active` selects the live one, the other holds the next.
    pieces: [Piece; 2],
    active: usize,
    origin: Point3,
    full_planes: [usize; MAX_FULL_PLANES],
    full_plane_count: u8,
    live: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board with no grid. Call [`Board::prepare`] before playing.
    pub fn new() -> Self {
        Self {
            grid: Grid::new(),
            top: 0,
            pieces: [Piece::EMPTY, Piece::EMPTY],
            active: 0,
            origin: Point3::ZERO,
            full_planes: [0; MAX_FULL_PLANES],
            full_plane_count: 0,
            live: false,
        }
    }

    /// Creates and prepares a board in one step.
    pub fn with_size(
        size: Size3,
        next_set: PieceSet,
        next_index: usize,
    ) -> Result<Self, PrepareError> {
        let mut board = Self::new();
        board.prepare(size, next_set, next_index)?;
        Ok(board)
    }

    /// Allocates (or reuses) and clears the grid, resets all state and
    /// builds the first next piece.
    ///
    /// On error the board is left exactly as it was.
    pub fn prepare(
        &mut self,
        size: Size3,
        next_set: PieceSet,
        next_index: usize,
    ) -> Result<(), PrepareError> {
        self.grid.reset(size)?;

        self.top = size.z;
        self.active = 0;
        self.origin = Point3::ZERO;
        self.full_plane_count = 0;
        self.live = false;
        self.pieces[0] = Piece::EMPTY;
        self.pieces[1].rebuild(next_set, next_index);

        debug!(%size, ?next_set, next_index, "board prepared");
        Ok(())
    }

    /// Promotes the next piece to active, builds a new next piece and spawns
    /// the active one centered at the ceiling.
    ///
    /// Returns `false` when the spawn position overlaps settled cubes (game
    /// over) or the board was never prepared. The grid is not modified.
    pub fn insert_piece(&mut self, next_set: PieceSet, next_index: usize) -> bool {
        if !self.grid.is_allocated() {
            warn!("insert on an unprepared board");
            return false;
        }

        self.active = 1 - self.active;
        self.pieces[1 - self.active].rebuild(next_set, next_index);

        let size = self.grid.size();
        let piece = &self.pieces[self.active];
        self.origin = Point3::new(
            ((size.x - PIECE_SIDE) / 2) as i32,
            ((size.y - PIECE_SIDE) / 2) as i32,
            -piece.a().z,
        );

        self.live = !self.content_hit(piece, self.origin);
        if self.live {
            trace!(shape = piece.shape(), origin = ?self.origin, "piece spawned");
        } else {
            warn!(shape = piece.shape(), "spawn blocked");
        }
        self.live
    }

    /// Translates the active piece by `delta`.
    ///
    /// A blocked downward move (positive z) settles the piece at its current
    /// position; any other blocked move is rejected.
    pub fn move_piece(&mut self, delta: Point3) -> MoveResult {
        if !self.live {
            return MoveResult::Hit;
        }

        let piece = &self.pieces[self.active];
        // a delta that leaves the i32 range can only land outside the well
        let Some(point) = self.origin.checked_add(delta) else {
            return MoveResult::Hit;
        };

        match self.bounds_hit(piece.a(), piece.b(), point) {
            Bounds::Outside => return MoveResult::Hit,
            Bounds::Bottom => {
                self.consolidate();
                return MoveResult::Consolidated;
            }
            Bounds::Within => {}
        }

        if self.content_hit(piece, point) {
            if delta.z <= 0 {
                return MoveResult::Hit;
            }
            self.consolidate();
            return MoveResult::Consolidated;
        }

        self.origin = point;
        MoveResult::Ok
    }

    /// Rotates the active piece in place. All or nothing.
    pub fn rotate_piece(&mut self, rotation: Rotation) -> RotateResult {
        if !self.live {
            return RotateResult::Hit;
        }

        let piece = &self.pieces[self.active];
        let (a, b) = piece.rotated_bounds(rotation);

        // touching the floor rejects a rotation too
        if self.bounds_hit(a, b, self.origin) != Bounds::Within {
            return RotateResult::Hit;
        }

        let mut rotated = piece.rotated(rotation);
        if self.content_hit(&rotated, self.origin) {
            return RotateResult::Hit;
        }

        rotated.update_faces();
        self.pieces[self.active] = rotated;
        RotateResult::Ok
    }

    /// Drops the active piece as far as it goes and settles it.
    pub fn drop_piece(&mut self) {
        if !self.live {
            return;
        }

        let piece = &self.pieces[self.active];
        let mut point = self.origin;
        loop {
            point.z += 1;
            if self.bounds_hit(piece.a(), piece.b(), point) != Bounds::Within
                || self.content_hit(piece, point)
            {
                break;
            }
        }

        self.origin.z = point.z - 1;
        self.consolidate();
    }

    /// Removes the planes completed by the last consolidation.
    pub fn remove_full_planes(&mut self) {
        let count = self.full_plane_count as usize;
        if count == 0 {
            return;
        }

        self.grid.remove_planes(&self.full_planes[..count], self.top);
        self.top += count;
        self.full_plane_count = 0;

        debug!(count, top = self.top, "full planes removed");
    }

    fn bounds_hit(&self, a: Point3, b: Point3, point: Point3) -> Bounds {
        let size = self.grid.size();
        // sizes were validated to fit in i32; sums are widened so a point
        // near the i32 limits cannot overflow
        let (sx, sy, sz) = (size.x as i64, size.y as i64, size.z as i64);
        let at = |origin: i32, offset: i32| i64::from(origin) + i64::from(offset);

        if at(point.x, a.x) < 0
            || at(point.x, b.x) >= sx
            || at(point.y, a.y) < 0
            || at(point.y, b.y) >= sy
            || at(point.z, a.z) < 0
        {
            Bounds::Outside
        } else if at(point.z, b.z) >= sz {
            Bounds::Bottom
        } else {
            Bounds::Within
        }
    }

    fn content_hit(&self, piece: &Piece, point: Point3) -> bool {
        piece.solid_cells().any(|(local, _)| {
            self.grid
                .get(point + local)
                .is_some_and(|cell| cell.is_solid())
        })
    }

    /// Copies the active piece into the grid at its origin and records the
    /// planes it completed.
    fn consolidate(&mut self) {
        let piece = &self.pieces[self.active];
        let (a, b) = (piece.a(), piece.b());
        self.full_plane_count = 0;

        for z in a.z..=b.z {
            let plane = (self.origin.z + z) as usize;
            for (local, cell) in piece.solid_cells().filter(|(local, _)| local.z == z) {
                let target = self.origin + local;
                self.grid
                    .set(target.x as usize, target.y as usize, plane, cell);
            }

            if self.grid.plane_is_full(plane) {
                self.full_planes[self.full_plane_count as usize] = plane;
                self.full_plane_count += 1;
            }
        }

        self.top = self.top.min((self.origin.z + a.z) as usize);
        self.live = false;

        debug!(
            shape = piece.shape(),
            origin = ?self.origin,
            top = self.top,
            full_planes = ?self.full_planes(),
            "piece consolidated"
        );
    }

    #[inline]
    pub fn size(&self) -> Size3 {
        self.grid.size()
    }

    /// Lowest occupied plane index; equals `size().z` when the well is empty.
    #[inline]
    pub fn top(&self) -> usize {
        self.top
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Settled cell at `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the well.
    #[inline]
    pub fn cell(&self, x: usize, y: usize, z: usize) -> Cell {
        self.grid.cell(x, y, z)
    }

    /// Settled cells, x fastest, then y, then z.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        self.grid.cells()
    }

    /// The active piece.
    #[inline]
    pub fn piece(&self) -> &Piece {
        &self.pieces[self.active]
    }

    /// The piece that the next insert will spawn.
    #[inline]
    pub fn next_piece(&self) -> &Piece {
        &self.pieces[1 - self.active]
    }

    /// Catalog index of the active piece.
    #[inline]
    pub fn piece_shape(&self) -> u8 {
        self.piece().shape()
    }

    /// Catalog index of the next piece.
    #[inline]
    pub fn next_piece_shape(&self) -> u8 {
        self.next_piece().shape()
    }

    /// Board position of the active piece's local origin.
    #[inline]
    pub fn piece_origin(&self) -> Point3 {
        self.origin
    }

    /// Whether the active piece can still move.
    #[inline]
    pub fn is_piece_live(&self) -> bool {
        self.live
    }

    /// Planes completed by the last consolidation, ascending.
    #[inline]
    pub fn full_planes(&self) -> &[usize] {
        &self.full_planes[..self.full_plane_count as usize]
    }
}
