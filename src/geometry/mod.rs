//! Plane geometry over annotation vertices.
//!
//! Every function here is total: empty, single-point, collinear and
//! coincident inputs produce a defined default (0, an empty vector, `false`)
//! instead of panicking, so feature extraction and validation can treat
//! degenerate annotations as ordinary data.

mod bbox;

pub use bbox::BoundingBox;

use std::f64::consts::PI;

use crate::ir::Point;

/// Lengths at or below this are treated as zero.
pub const EPS: f64 = 1e-8;

/// Total length of the open path through `points`.
///
/// Returns 0 for fewer than two points.
pub fn arc_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(w[1])).sum()
}

/// Length of the closed boundary through `points` (last vertex joins the first).
pub fn closed_perimeter(points: &[Point]) -> f64 {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => {
            arc_length(points) + last.distance_to(*first)
        }
        _ => 0.0,
    }
}

/// Straight-line distance between two points.
#[inline]
pub fn euclidean_distance(a: Point, b: Point) -> f64 {
    a.distance_to(b)
}

/// Discrete curvature at every interior vertex.
///
/// For vertex `i` with neighbours `p[i-1]` and `p[i+1]`, the turning angle θ
/// between `p[i-1] - p[i]` and `p[i+1] - p[i]` gives the curvature of the
/// circle through the three points: `κ = 2·sin(π - θ) / |p[i+1] - p[i-1]|`.
/// A straight run has θ = π and κ ≈ 0.
///
/// Returns `points.len() - 2` values, or an empty vector for fewer than three
/// points.
pub fn discrete_curvature(points: &[Point]) -> Vec<f64> {
    points
        .windows(3)
        .map(|w| {
            let (prev, curr, next) = (w[0], w[1], w[2]);
            let (v1x, v1y) = (prev.x - curr.x, prev.y - curr.y);
            let (v2x, v2y) = (next.x - curr.x, next.y - curr.y);

            let norms = v1x.hypot(v1y) * v2x.hypot(v2y);
            // Clamp guards acos against rounding just outside [-1, 1].
            let cos_angle = ((v1x * v2x + v1y * v2y) / (norms + EPS)).clamp(-1.0, 1.0);
            let angle = cos_angle.acos();

            let chord = prev.distance_to(next);
            if chord > EPS {
                2.0 * (PI - angle).sin() / chord
            } else {
                0.0
            }
        })
        .collect()
}

/// Polygon area by the shoelace formula, with implicit closure.
///
/// The absolute value is returned, so winding order does not matter.
/// Fewer than three points have zero area.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let n = points.len();
    let twice_area: f64 = (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();

    twice_area.abs() / 2.0
}

/// Arithmetic mean of the vertices; the origin for an empty slice.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::default();
    }

    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// Axis-aligned bounds of the vertices as (x, y, width, height).
pub fn bounding_box(points: &[Point]) -> BoundingBox {
    BoundingBox::from_points(points)
}

/// Signed area of the triangle (a, b, c), doubled.
///
/// Positive for a counter-clockwise turn, negative for clockwise, zero when
/// collinear.
#[inline]
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[inline]
fn opposite_signs(a: f64, b: f64) -> bool {
    (a > 0.0 && b < 0.0) || (a < 0.0 && b > 0.0)
}

/// True if segment `p1–p2` intersects segment `p3–p4`.
///
/// Proper crossings intersect. When all four orientations are exactly zero
/// the segments are collinear and intersect iff their extents overlap.
/// Touching at a single endpoint without crossing does not count.
pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);

    if opposite_signs(d1, d2) && opposite_signs(d3, d4) {
        return true;
    }

    if d1 == 0.0 && d2 == 0.0 && d3 == 0.0 && d4 == 0.0 {
        let overlaps = |a1: f64, a2: f64, b1: f64, b2: f64| {
            a1.min(a2) <= b1.max(b2) && b1.min(b2) <= a1.max(a2)
        };
        return overlaps(p1.x, p2.x, p3.x, p4.x) && overlaps(p1.y, p2.y, p3.y, p4.y);
    }

    false
}

/// True if two non-adjacent edges of the closed polygon cross.
///
/// Adjacent edges, including the last/first pair, share a vertex and are not
/// compared. Polygons with fewer than four vertices are never
/// self-intersecting.
///
/// This compares every pair of edges (O(n²)), which is fine for hand-drawn
/// contours of a few dozen vertices but not for dense traced outlines.
pub fn is_self_intersecting(points: &[Point]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }

    let edge = |i: usize| (points[i], points[(i + 1) % n]);

    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (a1, a2) = edge(i);
            let (b1, b2) = edge(j);
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }

    false
}
