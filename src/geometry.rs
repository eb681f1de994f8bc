//! Points, quarter-turn rotations and orientation enumeration.
//!
//! Rotations act on the 5x5x5 local space of a piece (indices 0..=4) and
//! turn it about its center cell. A rotation is three quarter-turn counts
//! applied in a fixed order: first around x, then y, then z. The order
//! matters, `(1, 1, 0)` and `(1, 0, 1)` generally produce different
//! orientations.

use std::ops::{Add, Sub};

use rustc_hash::FxHashSet;

use crate::pieces::{Piece, PIECE_SIDE};

/// Largest local coordinate; reflections map `c` to `LOCAL_MAX - c`.
pub const LOCAL_MAX: i32 = PIECE_SIDE as i32 - 1;

/// A 3D integer point, used for local piece coordinates, board positions
/// and translation deltas alike.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point3 {
    pub x: i32,
    pub y: i32,
    /// Grows toward the floor on the board.
    pub z: i32,
}

impl Point3 {
    pub const ZERO: Self = Self::new(0, 0, 0);

    #[inline(always)]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Componentwise sum, or `None` if any component overflows.
    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(rhs.x)?,
            self.y.checked_add(rhs.y)?,
            self.z.checked_add(rhs.z)?,
        ))
    }

    /// Componentwise minimum.
    #[inline]
    pub fn componentwise_min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Componentwise maximum.
    #[inline]
    pub fn componentwise_max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<(i32, i32, i32)> for Point3 {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

/// Quarter-turn counts around the x, y and z axes.
///
/// Counts are reduced with Euclidean modulo 4, so `-1` is three quarter turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rotation {
    /// Quarter turns about the x axis, applied first.
    pub x: i32,
    /// Quarter turns about the y axis.
    pub y: i32,
    /// Quarter turns about the z axis, applied last.
    pub z: i32,
}

impl Rotation {
    pub const IDENTITY: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Rotates a local point: x axis first, then y, then z.
    pub fn apply(self, point: Point3) -> Point3 {
        let Point3 { mut x, mut y, mut z } = point;

        // around x: (y, z) turn
        (y, z) = match self.x.rem_euclid(4) {
            1 => (LOCAL_MAX - z, y),
            2 => (LOCAL_MAX - y, LOCAL_MAX - z),
            3 => (z, LOCAL_MAX - y),
            _ => (y, z),
        };

        // around y: (z, x) turn
        (x, z) = match self.y.rem_euclid(4) {
            1 => (z, LOCAL_MAX - x),
            2 => (LOCAL_MAX - x, LOCAL_MAX - z),
            3 => (LOCAL_MAX - z, x),
            _ => (x, z),
        };

        // around z: (x, y) turn
        (x, y) = match self.z.rem_euclid(4) {
            1 => (LOCAL_MAX - y, x),
            2 => (LOCAL_MAX - x, LOCAL_MAX - y),
            3 => (y, LOCAL_MAX - x),
            _ => (x, y),
        };

        Point3::new(x, y, z)
    }

    /// Rotates a bounding box given by two opposite corners.
    ///
    /// A turn can swap which corner is the minimum, so the result is
    /// re-sorted componentwise.
    pub fn apply_bounds(self, a: Point3, b: Point3) -> (Point3, Point3) {
        let a = self.apply(a);
        let b = self.apply(b);
        (a.componentwise_min(b), a.componentwise_max(b))
    }
}

/// Generates all distinct orientations of a piece.
///
/// Applies all 64 rotation triples, normalizes each result so that the
/// minimum occupied corner sits at the origin, then removes duplicates.
/// No shape has more than 24 orientations; symmetric shapes have fewer.
pub fn orientations(piece: &Piece) -> Vec<Vec<Point3>> {
    let mut seen: FxHashSet<Vec<Point3>> = FxHashSet::default();

    for x in 0..4 {
        for y in 0..4 {
            for z in 0..4 {
                let rotated = piece.rotated(Rotation::new(x, y, z));
                let cubes: Vec<Point3> = rotated.solid_cells().map(|(point, _)| point).collect();
                seen.insert(normalize_to_origin(cubes));
            }
        }
    }

    let mut orientations: Vec<Vec<Point3>> = seen.into_iter().collect();
    orientations.sort();
    orientations
}

/// Translates points so the minimum x, y, z values are all zero, then sorts
/// them so equal shapes compare equal.
fn normalize_to_origin(mut cubes: Vec<Point3>) -> Vec<Point3> {
    let Some(min) = cubes.iter().copied().reduce(Point3::componentwise_min) else {
        return cubes;
    };

    for cube in &mut cubes {
        *cube = *cube - min;
    }

    cubes.sort();
    cubes
}
