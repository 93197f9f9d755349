//! Axis-aligned rectangles of the position domain.
//!
//! `Rect` lives in continuous coordinates (curvilinear lon/lat for position
//! rectangles, position/velocity for polygon bounds); `GridRect` is its
//! integer counterpart on the repartition grid.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle `[x_min, x_max] x [y_min, y_max]`.
///
/// Invariant: `x_min <= x_max`, `y_min <= y_max`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Rect {
    #[inline]
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        debug_assert!(x_min <= x_max && y_min <= y_max, "inverted rectangle");
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Squared length of the diagonal.
    #[inline]
    pub fn diagonal_squared(&self) -> f64 {
        self.width() * self.width() + self.height() * self.height()
    }

    /// Strict overlap: the open intersection is non-empty. Rectangles that
    /// only share an edge do not overlap.
    #[inline]
    pub fn overlaps_strictly(&self, other: &Rect) -> bool {
        self.x_min < other.x_max
            && other.x_min < self.x_max
            && self.y_min < other.y_max
            && other.y_min < self.y_max
    }

    /// Whether `other` lies entirely within this rectangle (closed bounds).
    #[inline]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x_min <= other.x_min
            && self.y_min <= other.y_min
            && other.x_max <= self.x_max
            && other.y_max <= self.y_max
    }

    /// Two halves split along the longer axis; ties split along x.
    pub fn split(&self) -> (Rect, Rect) {
        if self.width() >= self.height() {
            let mid = (self.x_min + self.x_max) / 2.0;
            (
                Rect::new(self.x_min, self.y_min, mid, self.y_max),
                Rect::new(mid, self.y_min, self.x_max, self.y_max),
            )
        } else {
            let mid = (self.y_min + self.y_max) / 2.0;
            (
                Rect::new(self.x_min, self.y_min, self.x_max, mid),
                Rect::new(self.x_min, mid, self.x_max, self.y_max),
            )
        }
    }

    /// Grows the rectangle by `margin` on every side.
    #[inline]
    pub fn inflate(&self, margin: f64) -> Rect {
        Rect::new(
            self.x_min - margin,
            self.y_min - margin,
            self.x_max + margin,
            self.y_max + margin,
        )
    }
}

/// Rectangle with corners on the integer repartition grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridRect {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl GridRect {
    #[inline]
    pub fn new(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> Self {
        debug_assert!(x_min <= x_max && y_min <= y_max, "inverted grid rectangle");
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }
}
