//! Geometry kernel for room polygons.
//!
//! Every function here is total: degenerate or malformed input yields `false` or `0.0` and the
//! rule layer decides what to report. Pairwise edge tests are O(n²), which is fine for room
//! outlines (well under a hundred vertices) but will not scale to arbitrary drawings.

use serde::{Deserialize, Serialize};

/// Default closure/planarity tolerance in drawing units.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Drawing-space coordinate. `z` is only inspected by the planarity check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub const fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    fn coincides(&self, other: &Point, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

/// Ordered boundary points; insertion order is boundary order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn is_finite(&self) -> bool {
        self.points.iter().all(Point::is_finite)
    }

    /// Boundary without the repeated closing point.
    fn ring(&self, epsilon: f64) -> &[Point] {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 1 && first.coincides(last, epsilon) => {
                &self.points[..self.points.len() - 1]
            }
            _ => &self.points,
        }
    }

    /// Ring with consecutive repeated vertices collapsed, so no edge has zero length.
    fn distinct_ring(&self, epsilon: f64) -> Vec<Point> {
        let mut distinct: Vec<Point> = Vec::with_capacity(self.points.len());
        for point in self.ring(epsilon) {
            if distinct
                .last()
                .map_or(true, |previous| !previous.coincides(point, epsilon))
            {
                distinct.push(*point);
            }
        }
        while distinct.len() > 1 {
            match (distinct.first(), distinct.last()) {
                (Some(first), Some(last)) if first.coincides(last, epsilon) => {
                    distinct.pop();
                }
                _ => break,
            }
        }
        distinct
    }

    fn edges(&self, epsilon: f64) -> Vec<(Point, Point)> {
        let ring = self.distinct_ring(epsilon);
        let n = ring.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n).map(|i| (ring[i], ring[(i + 1) % n])).collect()
    }

    /// Vertex average of the ring, used as an interior sample point for overlap tests.
    fn vertex_mean(&self, epsilon: f64) -> Option<Point> {
        let ring = self.ring(epsilon);
        if ring.is_empty() {
            return None;
        }
        let n = ring.len() as f64;
        let (x, y) = ring
            .iter()
            .fold((0.0, 0.0), |(x, y), point| (x + point.x, y + point.y));
        Some(Point::new(x / n, y / n))
    }
}

/// True when the first and last point coincide within `epsilon` and at least three distinct
/// vertices precede the closing point.
pub fn is_closed(polygon: &Polygon, epsilon: f64) -> bool {
    let points = &polygon.points;
    if points.len() < 3 {
        return false;
    }
    let first = points[0];
    let last = points[points.len() - 1];
    first.coincides(&last, epsilon) && polygon.distinct_ring(epsilon).len() >= 3
}

/// True when every vertex lies on z = 0 within `epsilon`.
pub fn is_planar(polygon: &Polygon, epsilon: f64) -> bool {
    polygon.points.iter().all(|point| point.z.abs() <= epsilon)
}

/// First vertex that leaves the z = 0 plane.
pub fn first_non_planar(polygon: &Polygon, epsilon: f64) -> Option<Point> {
    polygon
        .points
        .iter()
        .find(|point| point.z.abs() > epsilon)
        .copied()
}

/// True when two non-adjacent edges of the (implicitly closed) ring touch or cross.
pub fn self_intersects(polygon: &Polygon) -> bool {
    self_intersection(polygon, DEFAULT_EPSILON).is_some()
}

/// Start point of the first edge involved in a self-intersection.
pub fn self_intersection(polygon: &Polygon, epsilon: f64) -> Option<Point> {
    let edges = polygon.edges(epsilon);
    let n = edges.len();
    if n < 4 {
        return None;
    }

    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (a1, a2) = edges[i];
            let (b1, b2) = edges[j];
            if segments_intersect(a1, a2, b1, b2, epsilon) {
                return Some(a1);
            }
        }
    }

    None
}

/// Absolute shoelace area in squared drawing units; 0 for fewer than three vertices.
pub fn area(polygon: &Polygon) -> f64 {
    let ring = polygon.ring(DEFAULT_EPSILON);
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let twice_signed: f64 = (0..n)
        .map(|i| {
            let current = ring[i];
            let next = ring[(i + 1) % n];
            current.x * next.y - next.x * current.y
        })
        .sum();

    (twice_signed / 2.0).abs()
}

/// Ray-casting containment test. Boundary points may fall either way; use
/// [`strictly_contains`] when the boundary must be excluded.
pub fn contains_point(polygon: &Polygon, point: Point) -> bool {
    let ring = polygon.ring(DEFAULT_EPSILON);
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = ring[i];
        let pj = ring[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let crossing_x = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Containment that excludes points within `epsilon` of the boundary.
pub fn strictly_contains(polygon: &Polygon, point: Point, epsilon: f64) -> bool {
    let on_boundary = polygon
        .edges(epsilon)
        .into_iter()
        .any(|(a, b)| distance_to_segment(point, a, b) <= epsilon);
    !on_boundary && contains_point(polygon, point)
}

/// True when the interiors of two polygons share area. Rooms that only share a wall do not
/// overlap.
pub fn polygons_overlap(a: &Polygon, b: &Polygon, epsilon: f64) -> bool {
    if a.ring(epsilon).len() < 3 || b.ring(epsilon).len() < 3 {
        return false;
    }

    let a_edges = a.edges(epsilon);
    let b_edges = b.edges(epsilon);
    for &(a1, a2) in &a_edges {
        for &(b1, b2) in &b_edges {
            if segments_cross_properly(a1, a2, b1, b2, epsilon) {
                return true;
            }
        }
    }

    let vertex_inside = |outer: &Polygon, inner: &Polygon| {
        inner
            .ring(epsilon)
            .iter()
            .any(|point| strictly_contains(outer, *point, epsilon))
    };
    if vertex_inside(b, a) || vertex_inside(a, b) {
        return true;
    }

    let shared_interior = |own: &Polygon, other: &Polygon| {
        own.vertex_mean(epsilon).is_some_and(|sample| {
            strictly_contains(own, sample, epsilon) && strictly_contains(other, sample, epsilon)
        })
    };
    shared_interior(a, b) || shared_interior(b, a)
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn within_bounds(a: Point, b: Point, p: Point, epsilon: f64) -> bool {
    p.x >= a.x.min(b.x) - epsilon
        && p.x <= a.x.max(b.x) + epsilon
        && p.y >= a.y.min(b.y) - epsilon
        && p.y <= a.y.max(b.y) + epsilon
}

fn opposite_sides(d1: f64, d2: f64, epsilon: f64) -> bool {
    (d1 > epsilon && d2 < -epsilon) || (d1 < -epsilon && d2 > epsilon)
}

fn segments_cross_properly(p1: Point, p2: Point, q1: Point, q2: Point, epsilon: f64) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    opposite_sides(d1, d2, epsilon) && opposite_sides(d3, d4, epsilon)
}

fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point, epsilon: f64) -> bool {
    if segments_cross_properly(p1, p2, q1, q2, epsilon) {
        return true;
    }

    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    (d1.abs() <= epsilon && within_bounds(q1, q2, p1, epsilon))
        || (d2.abs() <= epsilon && within_bounds(q1, q2, p2, epsilon))
        || (d3.abs() <= epsilon && within_bounds(p1, p2, q1, epsilon))
        || (d4.abs() <= epsilon && within_bounds(p1, p2, q2, epsilon))
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    let cx = a.x + t * dx;
    let cy = a.y + t * dy;
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
