//! Plain geometric value types shared by the map model and the movement
//! integrator. Integer coordinates describe map geometry; real coordinates
//! describe dog positions and velocities.

use serde::{Deserialize, Serialize};

/// Integer map coordinate.
pub type Coord = i64;

/// Integer extent (building widths, office offsets).
pub type Dimension = i64;

/// A point on the integer map grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

/// Width and height of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: Dimension,
    pub height: Dimension,
}

/// An axis-aligned rectangle described by its corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub position: Point,
    pub size: Size,
}

/// Offset of an office marker relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub dx: Dimension,
    pub dy: Dimension,
}

/// A real-valued position in map units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointD {
    pub x: f64,
    pub y: f64,
}

impl PointD {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    pub fn distance_sq(&self, other: PointD) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Component-wise closeness within the given tolerance.
    pub fn is_close(&self, other: PointD, eps: f64) -> bool {
        (self.x - other.x).abs() < eps && (self.y - other.y).abs() < eps
    }
}

/// A real-valued velocity in map units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2D {
    pub u: f64,
    pub v: f64,
}

impl Vec2D {
    pub const ZERO: Vec2D = Vec2D { u: 0.0, v: 0.0 };

    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    pub fn is_zero(&self) -> bool {
        self.u == 0.0 && self.v == 0.0
    }
}
