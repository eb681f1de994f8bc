//! Bit-packed grid cell.
//!
//! Each cell is a 16-bit value shared by pieces and the settled grid:
//!
//! ```text
//! bit  14     solid
//! bits 13..8  face visibility (+x, -x, +y, -y, +z, -z)
//! bits 5..0   catalog index of the shape the cube came from
//! ```
//!
//! Renderers read the face bits to draw only exposed faces. Face bits are
//! only ever set on solid cells.

/// Mask of the solid flag.
pub const MASK_SOLID: u16 = 0x4000;
/// Mask of all six face flags.
pub const MASK_FACES: u16 = 0x3F00;
/// Mask of the shape index.
pub const MASK_SHAPE_INDEX: u16 = 0x003F;

/// One of the six faces of a unit cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    XPositive,
    XNegative,
    YPositive,
    YNegative,
    ZPositive,
    ZNegative,
}

impl Face {
    /// All faces, in bit order from most to least significant.
    pub const ALL: [Face; 6] = [
        Face::XPositive,
        Face::XNegative,
        Face::YPositive,
        Face::YNegative,
        Face::ZPositive,
        Face::ZNegative,
    ];

    #[inline(always)]
    pub const fn mask(self) -> u16 {
        match self {
            Face::XPositive => 0x2000,
            Face::XNegative => 0x1000,
            Face::YPositive => 0x0800,
            Face::YNegative => 0x0400,
            Face::ZPositive => 0x0200,
            Face::ZNegative => 0x0100,
        }
    }

    /// Unit step from a cube to the neighbor this face looks at.
    pub const fn normal(self) -> (i32, i32, i32) {
        match self {
            Face::XPositive => (1, 0, 0),
            Face::XNegative => (-1, 0, 0),
            Face::YPositive => (0, 1, 0),
            Face::YNegative => (0, -1, 0),
            Face::ZPositive => (0, 0, 1),
            Face::ZNegative => (0, 0, -1),
        }
    }
}

/// A single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell(u16);

impl Cell {
    pub const EMPTY: Self = Self(0);

    /// A solid cell with no visible faces, tagged with a catalog shape index.
    #[inline]
    pub const fn solid(shape_index: u8) -> Self {
        Self(MASK_SOLID | (shape_index as u16 & MASK_SHAPE_INDEX))
    }

    /// Reinterprets a raw 16-bit value.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[inline(always)]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[inline(always)]
    pub const fn is_solid(self) -> bool {
        self.0 & MASK_SOLID != 0
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn shape_index(self) -> u8 {
        (self.0 & MASK_SHAPE_INDEX) as u8
    }

    #[inline]
    pub const fn has_face(self, face: Face) -> bool {
        self.0 & face.mask() != 0
    }

    /// Marks a face visible. Empty cells are left untouched.
    #[inline]
    pub fn reveal(&mut self, face: Face) {
        if self.is_solid() {
            self.0 |= face.mask();
        }
    }

    /// Same cell with every face flag cleared.
    #[inline]
    pub const fn without_faces(self) -> Self {
        Self(self.0 & !MASK_FACES)
    }

    /// Number of visible faces.
    pub const fn visible_face_count(self) -> u32 {
        (self.0 & MASK_FACES).count_ones()
    }
}
