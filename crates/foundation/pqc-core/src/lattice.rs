//! 2D Integer Lattices
//!
//! A lattice is every integer combination `i·b1 + j·b2` of a basis. The
//! closest-vector sampler searches a small window of coefficients by brute
//! force, which is enough to build intuition for why CVP gets hard once the
//! dimension grows.

use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Coefficient window used by [`closest_vector`]: i, j ∈ [−5, 5]
pub const SEARCH_RADIUS: u32 = 5;

/// Integer 2-vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i64,
    pub y: i64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0, y: 0 };

    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance, widened so it cannot overflow
    pub fn distance_sq(self, other: Vec2) -> i128 {
        let dx = self.x as i128 - other.x as i128;
        let dy = self.y as i128 - other.y as i128;
        dx * dx + dy * dy
    }

    /// Both coordinates fit in `i32`, the range accepted by [`FromStr`].
    ///
    /// Inside this range [`Basis::combine`] cannot overflow for any
    /// coefficient window the tools use.
    pub fn in_coordinate_range(self) -> bool {
        i32::try_from(self.x).is_ok() && i32::try_from(self.y).is_ok()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<Vec2> for i64 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self * rhs.x, self * rhs.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Parses `"x,y"`, optionally wrapped in brackets: `"[3, 4]"`.
impl FromStr for Vec2 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(Error::Parse(format!("expected 'x,y', got '{s}'")));
        }

        let coord = |p: &str| {
            p.parse::<i32>()
                .map(i64::from)
                .map_err(|e| Error::Parse(format!("bad coordinate '{p}': {e}")))
        };
        Ok(Vec2::new(coord(parts[0])?, coord(parts[1])?))
    }
}

/// Basis of a 2D lattice, stored as rows `b1`, `b2`.
///
/// Degenerate bases (zero or collinear vectors) are allowed. They span a
/// sublattice, and the sampler simply searches whatever they reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basis {
    pub b1: Vec2,
    pub b2: Vec2,
}

impl Basis {
    pub const fn new(b1: Vec2, b2: Vec2) -> Self {
        Self { b1, b2 }
    }

    pub const fn from_rows(rows: [[i64; 2]; 2]) -> Self {
        Self {
            b1: Vec2::new(rows[0][0], rows[0][1]),
            b2: Vec2::new(rows[1][0], rows[1][1]),
        }
    }

    pub fn in_coordinate_range(&self) -> bool {
        self.b1.in_coordinate_range() && self.b2.in_coordinate_range()
    }

    /// The lattice point `i·b1 + j·b2`. Expects coordinates within
    /// [`in_coordinate_range`](Self::in_coordinate_range).
    pub fn combine(&self, i: i64, j: i64) -> Vec2 {
        i * self.b1 + j * self.b2
    }

    pub fn determinant(&self) -> i64 {
        self.b1.x * self.b2.y - self.b1.y * self.b2.x
    }

    pub fn is_degenerate(&self) -> bool {
        self.determinant() == 0
    }
}

impl Default for Basis {
    fn default() -> Self {
        Basis::from_rows([[2, 1], [1, 2]])
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b1={} b2={}", self.b1, self.b2)
    }
}

/// Parses `"x1,y1;x2,y2"`.
impl FromStr for Basis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.split(';').collect();
        match rows.as_slice() {
            [b1, b2] => Ok(Basis::new(b1.parse()?, b2.parse()?)),
            _ => Err(Error::Parse(format!("expected 'x1,y1;x2,y2', got '{s}'"))),
        }
    }
}

/// A lattice point together with its coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticePoint {
    pub i: i64,
    pub j: i64,
    pub point: Vec2,
}

/// Result of a closest-vector search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosestPoint {
    pub i: i64,
    pub j: i64,
    pub point: Vec2,
    pub distance_sq: i128,
}

/// Every point `i·b1 + j·b2` with i, j ∈ [−radius, radius].
///
/// Order is i ascending (outer), then j ascending (inner).
pub fn lattice_points(basis: &Basis, radius: u32) -> impl Iterator<Item = LatticePoint> + '_ {
    let r = radius as i64;
    (-r..=r).flat_map(move |i| {
        (-r..=r).map(move |j| LatticePoint {
            i,
            j,
            point: basis.combine(i, j),
        })
    })
}

/// Closest lattice point to `target` within the given coefficient window.
///
/// Only a strictly smaller distance replaces the current best, so ties go to
/// the point enumerated first in (i, j) order.
pub fn closest_vector_in(basis: &Basis, target: Vec2, radius: u32) -> ClosestPoint {
    let mut best: Option<ClosestPoint> = None;

    for lp in lattice_points(basis, radius) {
        let d = lp.point.distance_sq(target);
        if best.map_or(true, |b| d < b.distance_sq) {
            best = Some(ClosestPoint {
                i: lp.i,
                j: lp.j,
                point: lp.point,
                distance_sq: d,
            });
        }
    }

    // The window always holds at least the origin (i = j = 0)
    best.unwrap_or(ClosestPoint {
        i: 0,
        j: 0,
        point: Vec2::ZERO,
        distance_sq: Vec2::ZERO.distance_sq(target),
    })
}

/// Closest lattice point to `target` over i, j ∈ [−5, 5] (121 candidates).
pub fn closest_vector(basis: &Basis, target: Vec2) -> ClosestPoint {
    let closest = closest_vector_in(basis, target, SEARCH_RADIUS);
    tracing::trace!(%basis, %target, point = %closest.point, "closest vector search");
    closest
}
