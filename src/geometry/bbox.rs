//! Axis-aligned bounding boxes in XYWH format.

use serde::{Deserialize, Serialize};

use crate::ir::Point;

/// An axis-aligned bounding box as (x, y, width, height).
///
/// `x`/`y` are the minimum corner. Width and height are never negative for
/// boxes produced by [`super::bounding_box`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box containing every point; all zeros for an empty slice.
    pub fn from_points(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };

        let (mut xmin, mut ymin, mut xmax, mut ymax) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            xmin = xmin.min(p.x);
            ymin = ymin.min(p.y);
            xmax = xmax.max(p.x);
            ymax = ymax.max(p.y);
        }

        Self::new(xmin, ymin, xmax - xmin, ymax - ymin)
    }

    /// Returns the maximum x coordinate.
    #[inline]
    pub fn xmax(&self) -> f64 {
        self.x + self.width
    }

    /// Returns the maximum y coordinate.
    #[inline]
    pub fn ymax(&self) -> f64 {
        self.y + self.height
    }

    /// The box as an `(x, y, width, height)` tuple.
    #[inline]
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.width, self.height)
    }
}
