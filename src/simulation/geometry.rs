//! Geometry helpers for the single-cell layout.
//!
//! Positions are plain 2-D coordinates in meters. The cell has no obstacles,
//! so the only geometric question the link model asks is "how far apart are
//! the transmitter and the receiver".

use serde::{Deserialize, Serialize};

/// Simple 2D point in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct Point {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl Point {
    pub(crate) const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Squared Euclidean distance (avoids a sqrt when only comparing distances).
pub(crate) fn distance2(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Euclidean distance between two points.
pub(crate) fn distance(a: &Point, b: &Point) -> f64 {
    distance2(a, b).sqrt()
}
