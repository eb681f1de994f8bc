//! Settled-content storage for the well.
//!
//! The grid is a flat vector of cells ordered x fastest, then y, then z:
//! `idx = (z * size.y + y) * size.x + x`. z is the falling axis; plane 0 is
//! the ceiling and plane `size.z - 1` the floor.

use std::fmt;

use tracing::trace;

use crate::cell::{Cell, Face};
use crate::error::PrepareError;
use crate::geometry::Point3;

/// Smallest accepted well.
pub const MINIMUM_SIZE: Size3 = Size3::new(5, 5, 10);

/// Dimensions of a well, in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size3 {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Size3 {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Total cell count, or `None` on overflow.
    pub fn volume(self) -> Option<usize> {
        self.x.checked_mul(self.y)?.checked_mul(self.z)
    }
}

impl fmt::Display for Size3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// The settled grid.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    cells: Vec<Cell>,
    size: Size3,
}

impl Grid {
    /// An unallocated grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resizes the grid and clears every cell.
    ///
    /// The existing allocation is reused when the cell count does not change.
    /// On error the grid is left as it was.
    pub fn reset(&mut self, size: Size3) -> Result<(), PrepareError> {
        if size.x < MINIMUM_SIZE.x || size.y < MINIMUM_SIZE.y || size.z < MINIMUM_SIZE.z {
            return Err(PrepareError::TooSmall { size });
        }

        let coordinate_limit = i32::MAX as usize;
        let cell_count = size
            .volume()
            .filter(|_| size.x <= coordinate_limit && size.y <= coordinate_limit)
            .filter(|_| size.z <= coordinate_limit)
            .filter(|&cells| {
                cells
                    .checked_mul(std::mem::size_of::<Cell>())
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or(PrepareError::TooBig { size })?;

        if cell_count == self.cells.len() {
            self.cells.fill(Cell::EMPTY);
        } else {
            let mut cells = Vec::new();
            cells
                .try_reserve_exact(cell_count)
                .map_err(|_| PrepareError::OutOfMemory { cells: cell_count })?;
            cells.resize(cell_count, Cell::EMPTY);
            self.cells = cells;
        }

        self.size = size;
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> Size3 {
        self.size
    }

    /// Whether `reset` has succeeded at least once.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Number of cells in one horizontal plane.
    #[inline(always)]
    pub fn plane_size(&self) -> usize {
        self.size.x * self.size.y
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.size.y + y) * self.size.x + x
    }

    /// Cell at a board point, or `None` outside the grid.
    pub fn get(&self, point: Point3) -> Option<Cell> {
        let x = usize::try_from(point.x).ok().filter(|&x| x < self.size.x)?;
        let y = usize::try_from(point.y).ok().filter(|&y| y < self.size.y)?;
        let z = usize::try_from(point.z).ok().filter(|&z| z < self.size.z)?;
        Some(self.cells[self.index(x, y, z)])
    }

    /// Cell at `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the grid.
    #[inline]
    pub fn cell(&self, x: usize, y: usize, z: usize) -> Cell {
        self.cells[self.index(x, y, z)]
    }

    #[inline]
    pub(crate) fn set(&mut self, x: usize, y: usize, z: usize, cell: Cell) {
        let index = self.index(x, y, z);
        self.cells[index] = cell;
    }

    /// All cells, x fastest, then y, then z.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cells of plane `z`.
    pub fn plane(&self, z: usize) -> &[Cell] {
        let start = z * self.plane_size();
        &self.cells[start..start + self.plane_size()]
    }

    pub fn plane_is_full(&self, z: usize) -> bool {
        self.plane(z).iter().all(|cell| cell.is_solid())
    }

    /// Removes full planes and collapses everything between `top` and the
    /// shallowest removed plane toward the floor.
    ///
    /// The `planes.len()` planes starting at `top` end up empty.
    ///
    /// # Panics
    ///
    /// Panics if `planes` is not strictly ascending, if `top` is below the
    /// shallowest removed plane, or if a plane lies outside the grid.
    pub fn remove_planes(&mut self, planes: &[usize], top: usize) {
        let Some(&shallowest) = planes.first() else {
            return;
        };
        assert!(
            planes.windows(2).all(|pair| pair[0] < pair[1]),
            "planes must be strictly ascending: {planes:?}"
        );
        assert!(
            top <= shallowest,
            "top {top} is below the shallowest removed plane {shallowest}"
        );
        assert!(
            planes[planes.len() - 1] < self.size.z,
            "plane out of range for depth {}: {planes:?}",
            self.size.z
        );

        self.reveal_seams(planes);
        self.collapse(planes, top);

        trace!(?planes, top, shallowest, "collapsed planes");
    }

    /// Exposes the faces that looked into a removed plane.
    ///
    /// A removed cell whose -z face was hidden had a solid neighbor above it;
    /// that neighbor's +z face is now exposed. Likewise for the plane below.
    /// Planes are visited deepest first.
    fn reveal_seams(&mut self, planes: &[usize]) {
        let plane_size = self.plane_size();
        let depth = self.size.z;

        for &plane in planes.iter().rev() {
            let start = plane * plane_size;
            for offset in 0..plane_size {
                let removed = self.cells[start + offset];

                if !removed.has_face(Face::ZNegative) && plane > 0 {
                    self.cells[start - plane_size + offset].reveal(Face::ZPositive);
                }

                if !removed.has_face(Face::ZPositive) && plane + 1 < depth {
                    self.cells[start + plane_size + offset].reveal(Face::ZNegative);
                }
            }
        }
    }

    /// Shifts the surviving planes down over the removed ones and clears
    /// the vacated planes at `top`.
    fn collapse(&mut self, planes: &[usize], top: usize) {
        let plane_size = self.plane_size();
        let removed = planes.len();

        // blocks between consecutive removed planes, deepest first; each
        // block moves by the number of removed planes below it
        for (shift, pair) in (1..).zip(planes.windows(2).rev()) {
            let (upper, lower) = (pair[0], pair[1]);
            let block = lower - upper - 1;
            if block > 0 {
                let source = (upper + 1) * plane_size;
                self.cells.copy_within(
                    source..source + block * plane_size,
                    source + shift * plane_size,
                );
            }
        }

        // everything above the shallowest removed plane moves by all of them
        let source = top * plane_size;
        self.cells
            .copy_within(source..planes[0] * plane_size, source + removed * plane_size);
        self.cells[source..source + removed * plane_size].fill(Cell::EMPTY);
    }
}

/// Display character for a catalog shape index: `0-9`, `A-Z`, then `a-e`.
pub fn shape_char(shape_index: u8) -> char {
    match shape_index {
        0..=9 => char::from(b'0' + shape_index),
        10..=35 => char::from(b'A' + shape_index - 10),
        _ => char::from(b'a' + (shape_index - 36).min(25)),
    }
}

/// Formats the settled planes from `top` to the floor.
///
/// Each plane is a block of `size.y` rows of `size.x` characters; empty
/// cells show as '.'.
pub fn format_grid(grid: &Grid, top: usize) -> String {
    let size = grid.size();
    let mut output = String::new();

    for z in top.min(size.z)..size.z {
        output.push_str(&format!("z{z}\n"));
        for y in 0..size.y {
            for x in 0..size.x {
                let cell = grid.cell(x, y, z);
                output.push(if cell.is_solid() {
                    shape_char(cell.shape_index())
                } else {
                    '.'
                });
            }
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(size: Size3) -> Grid {
        let mut grid = Grid::new();
        grid.reset(size).unwrap();
        grid
    }

    fn fill_plane(grid: &mut Grid, z: usize, shape: u8) {
        let size = grid.size();
        for y in 0..size.y {
            for x in 0..size.x {
                let mut cell = Cell::solid(shape);
                for face in Face::ALL {
                    cell.reveal(face);
                }
                grid.set(x, y, z, cell);
            }
        }
    }

    #[test]
    fn test_reset_rejects_small_sizes() {
        let mut grid = Grid::new();
        for size in [
            Size3::new(4, 5, 10),
            Size3::new(5, 4, 10),
            Size3::new(5, 5, 9),
        ] {
            assert_eq!(grid.reset(size), Err(PrepareError::TooSmall { size }));
        }
        assert!(!grid.is_allocated());
    }

    #[test]
    fn test_reset_rejects_huge_sizes() {
        let mut grid = prepared(MINIMUM_SIZE);
        let huge = Size3::new(usize::MAX, 5, 10);
        assert_eq!(grid.reset(huge), Err(PrepareError::TooBig { size: huge }));

        let limit = i32::MAX as usize;
        let overflowing = Size3::new(limit, limit, limit);
        assert_eq!(
            grid.reset(overflowing),
            Err(PrepareError::TooBig { size: overflowing })
        );
        assert_eq!(grid.size(), MINIMUM_SIZE);
        assert_eq!(grid.cells().len(), 250);
    }

    #[test]
    fn test_reset_clears_reused_allocation() {
        let mut grid = prepared(MINIMUM_SIZE);
        grid.set(1, 2, 3, Cell::solid(4));
        grid.reset(Size3::new(5, 10, 5)).unwrap_err();
        assert_eq!(grid.cell(1, 2, 3), Cell::solid(4));
        grid.reset(Size3::new(5, 5, 10)).unwrap();
        assert!(grid.cells().iter().all(|cell| cell.is_empty()));
    }

    #[test]
    fn test_reset_resizes() {
        let mut grid = prepared(MINIMUM_SIZE);
        grid.reset(Size3::new(6, 7, 12)).unwrap();
        assert_eq!(grid.cells().len(), 6 * 7 * 12);
        assert_eq!(grid.plane_size(), 42);
    }

    #[test]
    fn test_index_order_is_x_fastest() {
        let mut grid = prepared(Size3::new(6, 7, 12));
        grid.set(1, 2, 3, Cell::solid(9));
        let flat = grid
            .cells()
            .iter()
            .position(|cell| cell.is_solid())
            .unwrap();
        assert_eq!(flat, (3 * 7 + 2) * 6 + 1);
        assert_eq!(grid.get(Point3::new(1, 2, 3)), Some(Cell::solid(9)));
        assert_eq!(grid.get(Point3::new(-1, 2, 3)), None);
        assert_eq!(grid.get(Point3::new(1, 2, 12)), None);
    }

    #[test]
    fn test_plane_is_full() {
        let mut grid = prepared(MINIMUM_SIZE);
        assert!(!grid.plane_is_full(9));
        fill_plane(&mut grid, 9, 0);
        assert!(grid.plane_is_full(9));
        grid.set(4, 4, 9, Cell::EMPTY);
        assert!(!grid.plane_is_full(9));
    }

    #[test]
    fn test_remove_single_plane_shifts_stack_down() {
        let mut grid = prepared(MINIMUM_SIZE);
        fill_plane(&mut grid, 9, 1);
        grid.set(0, 0, 8, Cell::solid(2));
        grid.set(3, 1, 7, Cell::solid(3));

        grid.remove_planes(&[9], 7);

        assert_eq!(grid.cell(0, 0, 9).shape_index(), 2);
        assert!(grid.cell(0, 0, 9).is_solid());
        assert!(grid.cell(3, 1, 8).is_solid());
        assert!(grid.plane(7).iter().all(|cell| cell.is_empty()));
        assert_eq!(grid.plane(9).iter().filter(|c| c.is_solid()).count(), 1);
        assert_eq!(grid.plane(8).iter().filter(|c| c.is_solid()).count(), 1);
    }

    #[test]
    fn test_remove_separated_planes() {
        let mut grid = prepared(MINIMUM_SIZE);
        // planes 9 and 7 full, 8 holds a marker, 6 and 5 hold markers
        fill_plane(&mut grid, 9, 1);
        fill_plane(&mut grid, 7, 1);
        grid.set(2, 2, 8, Cell::solid(8));
        grid.set(2, 2, 6, Cell::solid(6));
        grid.set(1, 1, 5, Cell::solid(5));

        grid.remove_planes(&[7, 9], 5);

        assert_eq!(grid.cell(2, 2, 9), Cell::solid(8));
        assert_eq!(grid.cell(2, 2, 8), Cell::solid(6));
        assert_eq!(grid.cell(1, 1, 7), Cell::solid(5));
        for z in 0..7 {
            assert!(grid.plane(z).iter().all(|cell| cell.is_empty()), "plane {z}");
        }
        assert_eq!(grid.cells().iter().filter(|c| c.is_solid()).count(), 3);
    }

    #[test]
    fn test_remove_adjacent_planes() {
        let mut grid = prepared(MINIMUM_SIZE);
        fill_plane(&mut grid, 8, 1);
        fill_plane(&mut grid, 9, 1);
        grid.set(4, 0, 7, Cell::solid(7));

        grid.remove_planes(&[8, 9], 7);

        assert_eq!(grid.cell(4, 0, 9), Cell::solid(7));
        assert_eq!(grid.cells().iter().filter(|c| c.is_solid()).count(), 1);
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn test_remove_unsorted_planes_panics() {
        let mut grid = prepared(MINIMUM_SIZE);
        grid.remove_planes(&[9, 7], 5);
    }

    #[test]
    #[should_panic(expected = "below the shallowest removed plane")]
    fn test_remove_plane_above_top_panics() {
        let mut grid = prepared(MINIMUM_SIZE);
        grid.remove_planes(&[6, 9], 8);
    }

    #[test]
    fn test_remove_no_planes_is_noop() {
        let mut grid = prepared(MINIMUM_SIZE);
        grid.set(2, 2, 9, Cell::solid(3));
        grid.remove_planes(&[], 9);
        assert_eq!(grid.cell(2, 2, 9), Cell::solid(3));
    }

    #[test]
    fn test_remove_reveals_seam_faces() {
        let mut grid = prepared(MINIMUM_SIZE);
        fill_plane(&mut grid, 9, 1);

        // a vertical pair whose lower cube sits in the full plane
        let mut upper = Cell::solid(2);
        for face in Face::ALL {
            if face != Face::ZPositive {
                upper.reveal(face);
            }
        }
        let mut lower = Cell::solid(2);
        for face in Face::ALL {
            if face != Face::ZNegative {
                lower.reveal(face);
            }
        }
        grid.set(0, 0, 8, upper);
        grid.set(0, 0, 9, lower);

        grid.remove_planes(&[9], 8);

        let moved = grid.cell(0, 0, 9);
        assert!(moved.is_solid());
        assert!(moved.has_face(Face::ZPositive));
        assert!(moved.has_face(Face::ZNegative));
        // seam patching never marks empty cells
        assert!(grid.cell(1, 0, 9).is_empty());
    }

    #[test]
    fn test_shape_chars() {
        assert_eq!(shape_char(0), '0');
        assert_eq!(shape_char(9), '9');
        assert_eq!(shape_char(10), 'A');
        assert_eq!(shape_char(35), 'Z');
        assert_eq!(shape_char(36), 'a');
        assert_eq!(shape_char(40), 'e');
    }

    #[test]
    fn test_format_grid_starts_at_top() {
        let mut grid = prepared(MINIMUM_SIZE);
        grid.set(0, 0, 9, Cell::solid(12));
        let output = format_grid(&grid, 9);
        assert_eq!(output, "z9\nC....\n.....\n.....\n.....\n.....\n");
        assert_eq!(format_grid(&grid, 10), "");
    }
}
