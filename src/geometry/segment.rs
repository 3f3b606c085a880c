//! Line segments and the buffered probe built around them

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::common::Point2D;
use super::bounds::BoundingBox;
use super::polygon::Polygon;

/// Segment between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point2D,
    pub end: Point2D,
}

impl Segment {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Vector from start to end
    pub fn direction(&self) -> Vector2<f64> {
        self.end.to_vector() - self.start.to_vector()
    }

    /// Left-hand normal (not normalized)
    pub fn normal(&self) -> Vector2<f64> {
        let d = self.direction();
        Vector2::new(-d.y, d.x)
    }

    pub fn project(&self, axis: &Vector2<f64>) -> (f64, f64) {
        let a = self.start.to_vector().dot(axis);
        let b = self.end.to_vector().dot(axis);
        (a.min(b), a.max(b))
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points([&self.start, &self.end])
    }

    pub fn midpoint(&self) -> Point2D {
        Point2D::new((self.start.x + self.end.x) / 2.0, (self.start.y + self.end.y) / 2.0)
    }
}

/// Quadrilateral hugging `segment`: offset `left_margin` to its left and
/// `right_margin` to its right, with both ends padded along the segment by
/// the larger of the two margins.
///
/// Returns `None` for a zero-length segment.
pub fn segment_buffer(segment: &Segment, left_margin: f64, right_margin: f64) -> Option<Polygon> {
    let length = segment.length();
    if length == 0.0 {
        return None;
    }

    let dir = segment.direction() / length;
    let left = Vector2::new(-dir.y, dir.x);
    let pad = dir * left_margin.max(right_margin);

    let s = segment.start.to_vector() - pad;
    let e = segment.end.to_vector() + pad;

    let vertices = vec![
        Point2D::from(s - left * right_margin),
        Point2D::from(e - left * right_margin),
        Point2D::from(e + left * left_margin),
        Point2D::from(s + left * left_margin),
    ];
    Polygon::new(vertices).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_is_perpendicular() {
        let s = Segment::new(Point2D::new(0.0, 0.0), Point2D::new(2.0, 1.0));
        assert!(s.normal().dot(&s.direction()).abs() < 1e-12);
    }

    #[test]
    fn test_buffer_of_horizontal_segment() {
        let s = Segment::new(Point2D::new(0.0, 0.0), Point2D::new(2.0, 0.0));
        let probe = segment_buffer(&s, 0.5, 0.25).unwrap();
        let b = probe.bounds();
        assert!((b.min_x + 0.5).abs() < 1e-12);
        assert!((b.max_x - 2.5).abs() < 1e-12);
        assert!((b.min_y + 0.25).abs() < 1e-12);
        assert!((b.max_y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_buffer_of_degenerate_segment_is_none() {
        let p = Point2D::new(1.0, 1.0);
        assert!(segment_buffer(&Segment::new(p, p), 0.2, 0.2).is_none());
    }
}
