//! Convex polygons with a cached centroid pose and enclosing radius

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::common::{Point2D, Pose2D, RoboticsError, RoboticsResult};
use super::bounds::BoundingBox;
use super::segment::Segment;

/// Ordered vertex list of a convex polygon.
///
/// `centroid` and `radius` are derived from the vertices and recomputed by
/// every mutating method. The centroid yaw is the orientation accumulated
/// through rotations, so `transform_to` can place the polygon at an
/// absolute pose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PolygonData", into = "PolygonData")]
pub struct Polygon {
    points: Vec<Point2D>,
    centroid: Pose2D,
    radius: f64,
}

/// Persisted form `{"points": [{"x": .., "y": ..}, ..]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonData {
    pub points: Vec<Point2D>,
}

impl Polygon {
    pub fn new(points: Vec<Point2D>) -> RoboticsResult<Self> {
        if points.len() < 3 {
            return Err(RoboticsError::InvalidParameter(format!(
                "polygon needs at least 3 vertices, got {}",
                points.len()
            )));
        }
        let mut polygon = Self {
            points,
            centroid: Pose2D::origin(),
            radius: 0.0,
        };
        polygon.recompute(0.0);
        Ok(polygon)
    }

    /// Axis-aligned rectangle of the given size, then rotated to `pose.yaw`
    /// and centered at the pose position.
    pub fn rectangle(pose: Pose2D, width: f64, height: f64) -> RoboticsResult<Self> {
        if !(width > 0.0) || !(height > 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "rectangle dimensions must be positive, got {} x {}",
                width, height
            )));
        }
        let (hw, hh) = (width / 2.0, height / 2.0);
        let mut rect = Self::new(vec![
            Point2D::new(-hw, -hh),
            Point2D::new(hw, -hh),
            Point2D::new(hw, hh),
            Point2D::new(-hw, hh),
        ])?;
        rect.transform_to(pose);
        Ok(rect)
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn centroid(&self) -> Pose2D {
        self.centroid
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Overwrite the recorded orientation without moving any vertex
    pub fn set_orientation(&mut self, yaw: f64) {
        self.centroid.yaw = yaw;
    }

    fn recompute(&mut self, yaw: f64) {
        let n = self.points.len() as f64;
        let cx = self.points.iter().map(|p| p.x).sum::<f64>() / n;
        let cy = self.points.iter().map(|p| p.y).sum::<f64>() / n;
        let center = Point2D::new(cx, cy);
        self.radius = self.points.iter()
            .map(|p| p.distance(&center))
            .fold(0.0, f64::max);
        self.centroid = Pose2D::new(cx, cy, yaw);
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
        self.recompute(self.centroid.yaw);
    }

    /// Rotate around the centroid
    pub fn rotate(&mut self, angle: f64) {
        let pivot = self.centroid.position();
        self.rotate_around(&pivot, angle);
    }

    pub fn rotate_around(&mut self, pivot: &Point2D, angle: f64) {
        for p in &mut self.points {
            *p = p.rotated_around(pivot, angle);
        }
        self.recompute(self.centroid.yaw + angle);
    }

    /// Rotate by `dtheta` around the centroid, then translate by `(dx, dy)`
    pub fn transform(&mut self, dx: f64, dy: f64, dtheta: f64) {
        if dtheta != 0.0 {
            self.rotate(dtheta);
        }
        self.translate(dx, dy);
    }

    /// Place the centroid at `pose` with orientation `pose.yaw`
    pub fn transform_to(&mut self, pose: Pose2D) {
        let c = self.centroid;
        self.transform(pose.x - c.x, pose.y - c.y, pose.yaw - c.yaw);
        // land exactly on the requested pose despite rounding
        self.centroid = pose;
    }

    pub fn project(&self, axis: &Vector2<f64>) -> (f64, f64) {
        self.points.iter()
            .map(|p| p.to_vector().dot(axis))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)))
    }

    pub fn edges(&self) -> Vec<Segment> {
        (0..self.points.len())
            .map(|i| Segment::new(self.points[i], self.points[(i + 1) % self.points.len()]))
            .collect()
    }

    /// Edge normals, the candidate separating axes of this polygon
    pub fn axes(&self) -> Vec<Vector2<f64>> {
        self.edges().iter()
            .filter(|e| !e.is_degenerate())
            .map(|e| e.normal())
            .collect()
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Point-in-convex-polygon test; boundary points are inside
    pub fn contains_point(&self, p: &Point2D) -> bool {
        self.axes().iter().all(|axis| {
            let (lo, hi) = self.project(axis);
            let d = p.to_vector().dot(axis);
            d >= lo && d <= hi
        })
    }
}

/// Polygons compare by their vertices; the cached centroid and radius are
/// derived and may differ in the last bits after a round trip.
impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl TryFrom<PolygonData> for Polygon {
    type Error = RoboticsError;

    fn try_from(data: PolygonData) -> Result<Self, Self::Error> {
        Polygon::new(data.points)
    }
}

impl From<Polygon> for PolygonData {
    fn from(polygon: Polygon) -> Self {
        PolygonData { points: polygon.points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn unit_square() -> Polygon {
        Polygon::rectangle(Pose2D::origin(), 1.0, 1.0).unwrap()
    }

    #[test]
    fn test_requires_three_vertices() {
        let pts = vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)];
        assert!(Polygon::new(pts).is_err());
    }

    #[test]
    fn test_rectangle_rejects_non_positive_size() {
        assert!(Polygon::rectangle(Pose2D::origin(), 0.0, 1.0).is_err());
        assert!(Polygon::rectangle(Pose2D::origin(), 1.0, -2.0).is_err());
    }

    #[test]
    fn test_centroid_and_radius() {
        let sq = unit_square();
        assert_eq!(sq.centroid().position(), Point2D::new(0.0, 0.0));
        assert!((sq.radius() - 0.5_f64.hypot(0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_follows_translation() {
        let mut sq = unit_square();
        sq.translate(2.0, -1.0);
        assert!((sq.centroid().x - 2.0).abs() < 1e-12);
        assert!((sq.centroid().y + 1.0).abs() < 1e-12);
        assert!((sq.bounds().min_x - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_transform_to_is_absolute() {
        let mut sq = Polygon::rectangle(Pose2D::origin(), 2.0, 1.0).unwrap();
        sq.transform_to(Pose2D::new(3.0, 3.0, FRAC_PI_2));
        sq.transform_to(Pose2D::new(3.0, 3.0, FRAC_PI_2));
        let b = sq.bounds();
        // rotated a quarter turn exactly once: 1 wide, 2 high
        assert!((b.width() - 1.0).abs() < 1e-9);
        assert!((b.height() - 2.0).abs() < 1e-9);
        assert_eq!(sq.centroid(), Pose2D::new(3.0, 3.0, FRAC_PI_2));
    }

    #[test]
    fn test_project_and_contains() {
        let sq = unit_square();
        assert_eq!(sq.project(&Vector2::new(1.0, 0.0)), (-0.5, 0.5));
        assert!(sq.contains_point(&Point2D::new(0.5, 0.0)));
        assert!(!sq.contains_point(&Point2D::new(0.6, 0.0)));
        assert_eq!(sq.edges().len(), 4);
    }

    #[test]
    fn test_json_shape() {
        let tri = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
        ]).unwrap();
        let json = serde_json::to_value(&tri).unwrap();
        assert_eq!(json["points"][1]["x"], 1.0);
        let back: Polygon = serde_json::from_value(json).unwrap();
        assert_eq!(back.points(), tri.points());
    }
}
