//! Pairwise shape intersection via axis projection
//!
//! For every candidate separating axis (edge normals of polygons, normal and
//! direction of segments) both shapes are projected onto the axis. A gap on
//! any axis means the shapes are disjoint; overlap on all of them is
//! reported as an intersection.
//!
//! Circles contribute no axes of their own. Against a polygon or a segment
//! the circle's projected interval is tested on the other shape's axes only,
//! which over-reports near polygon corners. Planners are tuned against this
//! behavior, so it is kept as is.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::common::Point2D;
use super::bounds::BoundingBox;
use super::circle::Circle;
use super::polygon::Polygon;
use super::segment::Segment;

/// Closed set of shapes understood by the collision module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Point(Point2D),
    Segment(Segment),
    Polygon(Polygon),
    Circle(Circle),
}

impl Shape {
    pub fn bounds(&self) -> BoundingBox {
        match self {
            Shape::Point(p) => BoundingBox::from_points([p]),
            Shape::Segment(s) => s.bounds(),
            Shape::Polygon(poly) => poly.bounds(),
            Shape::Circle(c) => c.bounds(),
        }
    }

    pub fn project(&self, axis: &Vector2<f64>) -> (f64, f64) {
        match self {
            Shape::Point(p) => {
                let d = p.to_vector().dot(axis);
                (d, d)
            }
            Shape::Segment(s) => s.project(axis),
            Shape::Polygon(poly) => poly.project(axis),
            Shape::Circle(c) => c.project(axis),
        }
    }

    /// Candidate separating axes contributed by this shape
    fn axes(&self) -> Vec<Vector2<f64>> {
        match self {
            Shape::Point(_) | Shape::Circle(_) => Vec::new(),
            Shape::Segment(s) if s.is_degenerate() => Vec::new(),
            Shape::Segment(s) => vec![s.normal(), s.direction()],
            Shape::Polygon(poly) => poly.axes(),
        }
    }
}

impl From<Polygon> for Shape {
    fn from(polygon: Polygon) -> Self {
        Shape::Polygon(polygon)
    }
}

impl From<Segment> for Shape {
    fn from(segment: Segment) -> Self {
        Shape::Segment(segment)
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}

impl From<Point2D> for Shape {
    fn from(point: Point2D) -> Self {
        Shape::Point(point)
    }
}

fn intervals_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    !(a.1 < b.0 || b.1 < a.0)
}

/// True when `a` and `b` intersect (touching counts). Symmetric in its
/// arguments for every shape pair.
pub fn check_intersection(a: &Shape, b: &Shape) -> bool {
    match (a, b) {
        (Shape::Circle(c1), Shape::Circle(c2)) => {
            c1.center.position().distance(&c2.center.position()) <= c1.radius + c2.radius
        }
        (Shape::Circle(c), Shape::Point(p)) | (Shape::Point(p), Shape::Circle(c)) => {
            c.contains_point(p)
        }
        (Shape::Point(p), Shape::Point(q)) => p == q,
        _ => {
            if !a.bounds().overlaps(&b.bounds()) {
                return false;
            }
            a.axes()
                .iter()
                .chain(b.axes().iter())
                .all(|axis| intervals_overlap(a.project(axis), b.project(axis)))
        }
    }
}

/// `check_intersection` with a borrowed polygon on one side, so callers
/// holding obstacle polygons need not clone them into a `Shape`
pub fn polygon_intersects(polygon: &Polygon, other: &Shape) -> bool {
    if !polygon.bounds().overlaps(&other.bounds()) {
        return false;
    }
    polygon.axes()
        .iter()
        .chain(other.axes().iter())
        .all(|axis| intervals_overlap(polygon.project(axis), other.project(axis)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Pose2D;
    use proptest::prelude::*;

    fn square(x: f64, y: f64, size: f64) -> Shape {
        Shape::Polygon(Polygon::rectangle(Pose2D::new(x, y, 0.0), size, size).unwrap())
    }

    #[test]
    fn test_polygon_polygon() {
        assert!(check_intersection(&square(0.0, 0.0, 1.0), &square(0.9, 0.0, 1.0)));
        assert!(check_intersection(&square(0.0, 0.0, 1.0), &square(1.0, 0.0, 1.0)));
        assert!(!check_intersection(&square(0.0, 0.0, 1.0), &square(1.2, 0.0, 1.0)));
    }

    #[test]
    fn test_rotated_polygons_separated_on_diagonal() {
        // diamond next to a square: bounding boxes overlap, shapes do not
        let diamond = Shape::Polygon(
            Polygon::rectangle(Pose2D::new(1.1, 1.1, std::f64::consts::FRAC_PI_4), 1.0, 1.0).unwrap(),
        );
        assert!(diamond.bounds().overlaps(&square(0.0, 0.0, 1.0).bounds()));
        assert!(!check_intersection(&diamond, &square(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_segment_cases() {
        let crossing = Shape::Segment(Segment::new(Point2D::new(-1.0, 0.0), Point2D::new(1.0, 0.0)));
        let above = Shape::Segment(Segment::new(Point2D::new(-1.0, 0.6), Point2D::new(1.0, 0.6)));
        assert!(check_intersection(&crossing, &square(0.0, 0.0, 1.0)));
        assert!(!check_intersection(&above, &square(0.0, 0.0, 1.0)));

        let vertical = Shape::Segment(Segment::new(Point2D::new(0.0, -1.0), Point2D::new(0.0, 1.0)));
        assert!(check_intersection(&crossing, &vertical));
        let parallel = Shape::Segment(Segment::new(Point2D::new(-1.0, 0.1), Point2D::new(1.0, 0.1)));
        assert!(!check_intersection(&crossing, &parallel));
    }

    #[test]
    fn test_circle_cases() {
        let c = Shape::Circle(Circle::at(Point2D::new(0.0, 0.0), 1.0));
        let far = Shape::Circle(Circle::at(Point2D::new(2.5, 0.0), 1.0));
        let near = Shape::Circle(Circle::at(Point2D::new(1.5, 0.0), 1.0));
        assert!(!check_intersection(&c, &far));
        assert!(check_intersection(&c, &near));
        assert!(check_intersection(&c, &Shape::Point(Point2D::new(0.5, 0.5))));
        assert!(!check_intersection(&square(3.0, 0.0, 1.0), &c));
    }

    #[test]
    fn test_circle_polygon_is_conservative_at_corners() {
        // the circle misses the corner but overlaps on both edge normals
        let sq = square(0.0, 0.0, 2.0);
        let c = Shape::Circle(Circle::at(Point2D::new(1.6, 1.6), 0.7));
        assert!(Point2D::new(1.6, 1.6).distance(&Point2D::new(1.0, 1.0)) > 0.7);
        assert!(check_intersection(&sq, &c));
    }

    #[test]
    fn test_point_in_polygon() {
        assert!(check_intersection(&Shape::Point(Point2D::new(0.2, 0.2)), &square(0.0, 0.0, 1.0)));
        assert!(!check_intersection(&Shape::Point(Point2D::new(0.7, 0.2)), &square(0.0, 0.0, 1.0)));
    }

    fn arb_shape() -> impl Strategy<Value = Shape> {
        prop_oneof![
            (-3.0..3.0f64, -3.0..3.0f64, 0.1..2.0f64, 0.1..2.0f64, -3.2..3.2f64).prop_map(
                |(x, y, w, h, yaw)| Shape::Polygon(Polygon::rectangle(Pose2D::new(x, y, yaw), w, h).unwrap())
            ),
            (-3.0..3.0f64, -3.0..3.0f64, -3.0..3.0f64, -3.0..3.0f64).prop_map(|(a, b, c, d)| {
                Shape::Segment(Segment::new(Point2D::new(a, b), Point2D::new(c, d)))
            }),
            (-3.0..3.0f64, -3.0..3.0f64, 0.1..2.0f64)
                .prop_map(|(x, y, r)| Shape::Circle(Circle::at(Point2D::new(x, y), r))),
            (-3.0..3.0f64, -3.0..3.0f64).prop_map(|(x, y)| Shape::Point(Point2D::new(x, y))),
        ]
    }

    proptest! {
        #[test]
        fn prop_intersection_is_symmetric(a in arb_shape(), b in arb_shape()) {
            prop_assert_eq!(check_intersection(&a, &b), check_intersection(&b, &a));
        }

        #[test]
        fn prop_borrowed_polygon_matches_shape(
            x in -3.0..3.0f64, y in -3.0..3.0f64, yaw in -3.2..3.2f64, b in arb_shape(),
        ) {
            let poly = Polygon::rectangle(Pose2D::new(x, y, yaw), 1.0, 0.5).unwrap();
            prop_assert_eq!(
                polygon_intersects(&poly, &b),
                check_intersection(&Shape::Polygon(poly.clone()), &b)
            );
        }

        #[test]
        fn prop_shape_intersects_itself(a in arb_shape()) {
            prop_assert!(check_intersection(&a, &a));
        }
    }
}
