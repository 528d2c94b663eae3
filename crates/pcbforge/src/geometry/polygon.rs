//! Closed polygon rings for outlines, zones and drill approximations.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::BoardError;

use super::types::{BoundingBox, Point};

const POINT_EQUALITY_EPSILON: f64 = 1e-9;
const MITER_EPSILON: f64 = 1e-9;

/// A simple polygon described by its exterior ring.
///
/// The ring is always stored closed: the last vertex repeats the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    exterior: Vec<Point>,
}

impl Polygon {
    /// Builds a polygon from its vertices, closing the ring when needed.
    ///
    /// Vertices are kept in order, repeats included. Only a trailing copy of
    /// the first vertex is dropped before the ring is closed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::DegeneratePolygon`] when fewer than three
    /// distinct vertices remain.
    pub fn new(points: &[Point]) -> Result<Self, BoardError> {
        let mut ring: Vec<Point> = points.to_vec();
        if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
            if ring.len() > 1 && first.approx_eq(last, POINT_EQUALITY_EPSILON) {
                ring.pop();
            }
        }

        let distinct = distinct_vertices(&ring);
        if distinct < 3 {
            return Err(BoardError::DegeneratePolygon(distinct));
        }

        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        Ok(Self { exterior: ring })
    }

    /// Axis-aligned rectangle spanning `(0, 0)` to `(width, height)`.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self {
            exterior: vec![
                Point::new(0.0, 0.0),
                Point::new(width, 0.0),
                Point::new(width, height),
                Point::new(0.0, height),
                Point::new(0.0, 0.0),
            ],
        }
    }

    /// Regular `segments`-gon inscribed in a circle, closed by repeating the
    /// first vertex (so `segments + 1` points).
    pub fn regular_ring(center: Point, radius: f64, segments: u32) -> Vec<Point> {
        let segments = segments.max(3);
        let mut ring = Vec::with_capacity(segments as usize + 1);
        for i in 0..segments {
            let angle = TAU * f64::from(i) / f64::from(segments);
            ring.push(Point::new(
                radius.mul_add(angle.cos(), center.x),
                radius.mul_add(angle.sin(), center.y),
            ));
        }
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        ring
    }

    /// The closed exterior ring.
    pub fn exterior(&self) -> &[Point] {
        &self.exterior
    }

    /// Number of ring vertices, not counting the closing point.
    pub fn vertex_count(&self) -> usize {
        self.exterior.len().saturating_sub(1)
    }

    /// Shoelace area; positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        self.exterior
            .windows(2)
            .map(|pair| match pair {
                [a, b] => a.x.mul_add(b.y, -(b.x * a.y)),
                _ => 0.0,
            })
            .sum::<f64>()
            / 2.0
    }

    /// Absolute enclosed area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Bounding box of the ring.
    pub fn bounds(&self) -> BoundingBox {
        self.exterior.iter().copied().collect()
    }

    /// Offsets every edge outward by `margin` (inward when negative), joining
    /// edges with mitred corners.
    #[must_use]
    pub fn offset(&self, margin: f64) -> Self {
        let vertices = self.exterior.get(..self.vertex_count()).unwrap_or(&[]);
        let orientation = if self.signed_area() < 0.0 { -1.0 } else { 1.0 };

        let normals: Vec<Point> = self
            .exterior
            .windows(2)
            .map(|pair| match pair {
                [a, b] => outward_normal(*a, *b, orientation),
                _ => Point::default(),
            })
            .collect();

        let count = normals.len();
        let previous = normals.iter().cycle().skip(count.saturating_sub(1));

        let mut ring: Vec<Point> = vertices
            .iter()
            .zip(previous)
            .zip(normals.iter())
            .map(|((&vertex, &n1), &n2)| miter_vertex(vertex, n1, n2, margin))
            .collect();

        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        Self { exterior: ring }
    }
}

/// Vertex count of an open ring once consecutive repeats and a wrap-around
/// repeat are folded together.
fn distinct_vertices(ring: &[Point]) -> usize {
    let mut distinct = ring.to_vec();
    distinct.dedup_by(|a, b| a.approx_eq(*b, POINT_EQUALITY_EPSILON));
    if let (Some(&first), Some(&last)) = (distinct.first(), distinct.last()) {
        if distinct.len() > 1 && first.approx_eq(last, POINT_EQUALITY_EPSILON) {
            distinct.pop();
        }
    }
    distinct.len()
}

fn outward_normal(a: Point, b: Point, orientation: f64) -> Point {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = dx.hypot(dy);
    if length <= POINT_EQUALITY_EPSILON {
        return Point::default();
    }
    Point::new(orientation * dy / length, -orientation * dx / length)
}

fn miter_vertex(vertex: Point, n1: Point, n2: Point, margin: f64) -> Point {
    let sum = Point::new(n1.x + n2.x, n1.y + n2.y);
    let length = sum.x.hypot(sum.y);
    if length <= MITER_EPSILON {
        return Point::new(
            n1.x.mul_add(margin, vertex.x),
            n1.y.mul_add(margin, vertex.y),
        );
    }

    let bisector = Point::new(sum.x / length, sum.y / length);
    let cos_half = bisector.x.mul_add(n1.x, bisector.y * n1.y);
    let scale = if cos_half > MITER_EPSILON {
        margin / cos_half
    } else {
        margin
    };
    Point::new(
        bisector.x.mul_add(scale, vertex.x),
        bisector.y.mul_add(scale, vertex.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn open_ring_is_closed() {
        let poly = Polygon::new(&[
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
        ]);
        assert!(poly.is_ok());
        if let Ok(poly) = poly {
            assert_eq!(poly.exterior().len(), 4);
            assert_eq!(poly.exterior().first(), poly.exterior().last());
            assert_eq!(poly.vertex_count(), 3);
        }
    }

    #[test]
    fn closed_ring_is_not_closed_twice() {
        let poly = Polygon::new(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 0.0),
        ]);
        assert!(matches!(poly, Ok(ref p) if p.exterior().len() == 4));
    }

    #[test]
    fn two_points_are_degenerate() {
        let poly = Polygon::new(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert_eq!(poly, Err(BoardError::DegeneratePolygon(2)));
    }

    #[test]
    fn repeated_points_do_not_count_as_distinct() {
        let poly = Polygon::new(&[
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
        ]);
        assert_eq!(poly, Err(BoardError::DegeneratePolygon(2)));
    }

    #[test]
    fn repeated_vertex_stays_in_ring() {
        let poly = Polygon::new(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ]);
        assert!(poly.is_ok());
        if let Ok(poly) = poly {
            assert_eq!(poly.exterior().len(), 5);
            assert_eq!(poly.vertex_count(), 4);
            assert!((poly.area() - 0.5).abs() < EPSILON);
        }
    }

    #[test]
    fn rectangle_area_and_orientation() {
        let rect = Polygon::rectangle(4.0, 3.0);
        assert!((rect.signed_area() - 12.0).abs() < EPSILON);
        let bounds = rect.bounds();
        assert!((bounds.width() - 4.0).abs() < EPSILON);
        assert!((bounds.height() - 3.0).abs() < EPSILON);
    }

    #[test]
    fn regular_ring_has_closing_point() {
        let ring = Polygon::regular_ring(Point::new(1.0, 1.0), 0.5, 12);
        assert_eq!(ring.len(), 13);
        assert_eq!(ring.first(), ring.last());
        for point in &ring {
            assert!((point.distance(Point::new(1.0, 1.0)) - 0.5).abs() < EPSILON);
        }
    }

    #[test]
    fn offset_grows_rectangle_on_every_side() {
        let grown = Polygon::rectangle(10.0, 5.0).offset(1.0);
        let bounds = grown.bounds();
        assert!((bounds.min_x + 1.0).abs() < EPSILON);
        assert!((bounds.min_y + 1.0).abs() < EPSILON);
        assert!((bounds.max_x - 11.0).abs() < EPSILON);
        assert!((bounds.max_y - 6.0).abs() < EPSILON);
        assert_eq!(grown.vertex_count(), 4);
    }

    #[test]
    fn offset_respects_clockwise_rings() {
        let cw = Polygon::new(&[
            Point::new(0.0, 0.0),
            Point::new(0.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 0.0),
        ]);
        assert!(cw.is_ok());
        if let Ok(cw) = cw {
            assert!(cw.signed_area() < 0.0);
            let bounds = cw.offset(0.5).bounds();
            assert!((bounds.min_x + 0.5).abs() < EPSILON);
            assert!((bounds.max_y - 2.5).abs() < EPSILON);
        }
    }
}
