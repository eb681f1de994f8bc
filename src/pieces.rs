//! Polycube shape catalog and piece construction.
//!
//! Each of the 41 shapes is packed into a 32-bit descriptor:
//!
//! ```text
//! bits 31..30  minimum corner x (0..=3)
//! bits 29..28  minimum corner y
//! bits 27..26  minimum corner z
//! bits 25..23  extent beyond the minimum corner on x (0..=7)
//! bits 22..20  extent on y
//! bits 19..17  extent on z
//! bits  n..0   occupancy, one bit per cell of the bounding box,
//!              z-major, then y, then x (bit 0 first)
//! ```
//!
//! Every shape fits the 5x5x5 local space of a piece in all orientations.

use crate::cell::{Cell, Face};
use crate::geometry::{Point3, Rotation};

/// Side length of a piece's local cell buffer.
pub const PIECE_SIDE: usize = 5;

/// The 41 canonical polycubes.
pub const POLYCUBES: [u32; 41] = [
    0xA8000001, 0x98100003, 0x98200007, 0x8830000F, 0x8840001F, 0x9890000D,
    0x9890000F, 0x98A0001D, 0x98A0001E, 0x98A00035, 0x592001C9, 0x59200079,
    0x5920019A, 0x59200193, 0x59200199, 0x88B000D5, 0x88B00075, 0x98A00037,
    0x98A0003D, 0x88B000B5, 0x592000BA, 0x94A20D60, 0x54A20E90, 0x94A20748,
    0x94A205C4, 0x54A20AC8, 0x94A20790, 0x54A20B60, 0x54A20368, 0x94A20394,
    0x94A205D0, 0x54A20AE0, 0x549200B8, 0x94920074, 0x649200B2, 0x651205C2,
    0x649200F2, 0x651209C4, 0x94A20354, 0x54A203A8, 0xA49200B5,
];

/// Catalog indices of the basic set.
pub const BASIC_SET: [u8; 7] = [5, 7, 8, 9, 32, 33, 34];

/// Catalog indices of the flat set.
pub const FLAT_SET: [u8; 8] = [0, 1, 2, 5, 6, 7, 8, 9];

/// A named selection of shapes from the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceSet {
    /// Seven classic shapes.
    Basic,
    /// Eight shapes lying in a single layer.
    Flat,
    /// The whole catalog.
    Extended,
}

impl PieceSet {
    pub const ALL: [PieceSet; 3] = [PieceSet::Basic, PieceSet::Flat, PieceSet::Extended];

    /// Number of shapes in this set.
    pub const fn piece_count(self) -> usize {
        match self {
            PieceSet::Basic => BASIC_SET.len(),
            PieceSet::Flat => FLAT_SET.len(),
            PieceSet::Extended => POLYCUBES.len(),
        }
    }

    /// Maps an index within this set to a catalog index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.piece_count()`.
    pub const fn catalog_index(self, index: usize) -> usize {
        match self {
            PieceSet::Basic => BASIC_SET[index] as usize,
            PieceSet::Flat => FLAT_SET[index] as usize,
            PieceSet::Extended => {
                assert!(index < POLYCUBES.len(), "shape index out of range");
                index
            }
        }
    }
}

/// A decoded shape descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shape {
    /// Minimum corner of the bounding box in local space.
    pub a: Point3,
    /// Maximum corner of the bounding box in local space.
    pub b: Point3,
    /// Occupancy bits, consumed z-major then y then x.
    pub occupancy: u32,
}

impl Shape {
    pub const fn decode(descriptor: u32) -> Self {
        let a = Point3::new(
            (descriptor >> 30) as i32,
            ((descriptor >> 28) & 3) as i32,
            ((descriptor >> 26) & 3) as i32,
        );
        let b = Point3::new(
            a.x + ((descriptor >> 23) & 7) as i32,
            a.y + ((descriptor >> 20) & 7) as i32,
            a.z + ((descriptor >> 17) & 7) as i32,
        );
        Self {
            a,
            b,
            occupancy: descriptor,
        }
    }

    /// Decodes the catalog entry at `catalog_index`.
    pub const fn from_catalog(catalog_index: usize) -> Self {
        Self::decode(POLYCUBES[catalog_index])
    }
}

type CellBuffer = [[[Cell; PIECE_SIDE]; PIECE_SIDE]; PIECE_SIDE];

/// An in-flight block: a 5x5x5 local buffer plus the box `[a, b]` that
/// holds all of its solid cells.
///
/// The buffer is indexed `[z][y][x]`. Cells outside `[a, b]` are never solid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    cells: CellBuffer,
    a: Point3,
    b: Point3,
    shape: u8,
}

impl Default for Piece {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Piece {
    /// A piece with no cells, used to initialize board slots.
    pub const EMPTY: Self = Self {
        cells: [[[Cell::EMPTY; PIECE_SIDE]; PIECE_SIDE]; PIECE_SIDE],
        a: Point3::ZERO,
        b: Point3::ZERO,
        shape: 0,
    };

    /// Builds the shape at `index` within `set`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for `set`.
    pub fn build(set: PieceSet, index: usize) -> Self {
        let mut piece = Self::EMPTY;
        piece.rebuild(set, index);
        piece
    }

    /// Rebuilds this piece in place from a shape of the catalog.
    pub fn rebuild(&mut self, set: PieceSet, index: usize) {
        let catalog_index = set.catalog_index(index);
        let shape = Shape::from_catalog(catalog_index);

        self.a = shape.a;
        self.b = shape.b;
        self.shape = catalog_index as u8;
        self.cells = Self::EMPTY.cells;

        let mut offset = 0;
        for z in shape.a.z..=shape.b.z {
            for y in shape.a.y..=shape.b.y {
                for x in shape.a.x..=shape.b.x {
                    if shape.occupancy & (1 << offset) != 0 {
                        self.cells[z as usize][y as usize][x as usize] =
                            Cell::solid(catalog_index as u8);
                    }
                    offset += 1;
                }
            }
        }

        self.update_faces();
    }

    /// Minimum corner of the occupied box.
    #[inline]
    pub fn a(&self) -> Point3 {
        self.a
    }

    /// Maximum corner of the occupied box.
    #[inline]
    pub fn b(&self) -> Point3 {
        self.b
    }

    /// Catalog index of the shape this piece was built from.
    #[inline]
    pub fn shape(&self) -> u8 {
        self.shape
    }

    /// Cell at a local point; points outside the buffer read as empty.
    pub fn cell(&self, point: Point3) -> Cell {
        let side = 0..PIECE_SIDE as i32;
        if side.contains(&point.x) && side.contains(&point.y) && side.contains(&point.z) {
            self.cells[point.z as usize][point.y as usize][point.x as usize]
        } else {
            Cell::EMPTY
        }
    }

    /// Solid cells with their local coordinates, z-major.
    pub fn solid_cells(&self) -> impl Iterator<Item = (Point3, Cell)> + '_ {
        let (a, b) = (self.a, self.b);
        (a.z..=b.z)
            .flat_map(move |z| (a.y..=b.y).flat_map(move |y| (a.x..=b.x).map(move |x| (x, y, z))))
            .filter_map(move |(x, y, z)| {
                let cell = self.cells[z as usize][y as usize][x as usize];
                cell.is_solid().then_some((Point3::new(x, y, z), cell))
            })
    }

    /// Number of cubes in this piece.
    pub fn cube_count(&self) -> usize {
        self.solid_cells().count()
    }

    #[inline]
    fn contains(&self, point: Point3) -> bool {
        (self.a.x..=self.b.x).contains(&point.x)
            && (self.a.y..=self.b.y).contains(&point.y)
            && (self.a.z..=self.b.z).contains(&point.z)
    }

    /// Recomputes face visibility of every solid cell.
    ///
    /// A face is visible when the neighbor it looks at lies outside `[a, b]`
    /// or is not solid.
    pub fn update_faces(&mut self) {
        for z in self.a.z..=self.b.z {
            for y in self.a.y..=self.b.y {
                for x in self.a.x..=self.b.x {
                    let point = Point3::new(x, y, z);
                    let mut cell = self.cells[z as usize][y as usize][x as usize].without_faces();
                    if !cell.is_solid() {
                        continue;
                    }

                    for face in Face::ALL {
                        let neighbor = point + Point3::from(face.normal());
                        if !self.contains(neighbor) || !self.cell(neighbor).is_solid() {
                            cell.reveal(face);
                        }
                    }

                    self.cells[z as usize][y as usize][x as usize] = cell;
                }
            }
        }
    }

    /// Occupied box after applying `rotation`, without touching the cells.
    pub fn rotated_bounds(&self, rotation: Rotation) -> (Point3, Point3) {
        rotation.apply_bounds(self.a, self.b)
    }

    /// A rotated copy of this piece.
    ///
    /// Only the solid flag and shape index are carried over; call
    /// [`Piece::update_faces`] on the result before exposing it.
    pub fn rotated(&self, rotation: Rotation) -> Piece {
        let (a, b) = self.rotated_bounds(rotation);
        let mut rotated = Piece {
            cells: Self::EMPTY.cells,
            a,
            b,
            shape: self.shape,
        };

        for (point, cell) in self.solid_cells() {
            let target = rotation.apply(point);
            rotated.cells[target.z as usize][target.y as usize][target.x as usize] =
                cell.without_faces();
        }

        rotated
    }
}

/// Formats a piece as side-by-side z-slices of its occupied box.
///
/// Solid cells show as '#', empty cells as '.'.
pub fn format_piece(piece: &Piece) -> String {
    let (a, b) = (piece.a(), piece.b());
    let width = (b.x - a.x + 1) as usize;

    let mut lines = Vec::new();

    let mut header = String::new();
    for z in a.z..=b.z {
        if z > a.z {
            header.push_str("  ");
        }
        header.push_str(&format!("{:<width$}", format!("z{z}"), width = width));
    }
    lines.push(header);

    for y in a.y..=b.y {
        let mut line = String::new();
        for z in a.z..=b.z {
            if z > a.z {
                line.push_str("  ");
            }
            for x in a.x..=b.x {
                let solid = piece.cell(Point3::new(x, y, z)).is_solid();
                line.push(if solid { '#' } else { '.' });
            }
        }
        lines.push(line);
    }

    let mut output = String::new();
    for line in lines {
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}
