//! Common types used throughout rust_motion_planning

use nalgebra::{Rotation2, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn to_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Heading of the vector from `self` to `other`
    pub fn angle_to(&self, other: &Point2D) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Rotate this point by `angle` radians around `pivot`
    pub fn rotated_around(&self, pivot: &Point2D, angle: f64) -> Point2D {
        let rotated = Rotation2::new(angle) * (self.to_vector() - pivot.to_vector());
        Point2D::from(rotated + pivot.to_vector())
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(array: [f64; 2]) -> Self {
        Self { x: array[0], y: array[1] }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// 2D pose (position + orientation), yaw in radians.
///
/// Serialized as `[x, y, yaw]` to match the map persistence format.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, yaw: 0.0 }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.yaw)
    }

    /// Normalize yaw to [-pi, pi]
    pub fn normalize_yaw(&mut self) {
        while self.yaw > std::f64::consts::PI {
            self.yaw -= 2.0 * std::f64::consts::PI;
        }
        while self.yaw < -std::f64::consts::PI {
            self.yaw += 2.0 * std::f64::consts::PI;
        }
    }
}

impl From<Point2D> for Pose2D {
    fn from(p: Point2D) -> Self {
        Self { x: p.x, y: p.y, yaw: 0.0 }
    }
}

impl From<[f64; 3]> for Pose2D {
    fn from(a: [f64; 3]) -> Self {
        Self { x: a[0], y: a[1], yaw: a[2] }
    }
}

impl From<Pose2D> for [f64; 3] {
    fn from(p: Pose2D) -> Self {
        [p.x, p.y, p.yaw]
    }
}

impl From<Vector3<f64>> for Pose2D {
    fn from(v: Vector3<f64>) -> Self {
        Self { x: v[0], y: v[1], yaw: v[2] }
    }
}

/// Path represented as a sequence of 2D points
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path2D {
    pub points: Vec<Point2D>,
}

impl Path2D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn first(&self) -> Option<&Point2D> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point2D> {
        self.points.last()
    }

    /// Remove and return the first waypoint
    pub fn pop_front(&mut self) -> Option<Point2D> {
        if self.points.is_empty() {
            None
        } else {
            Some(self.points.remove(0))
        }
    }

    pub fn total_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.points.windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }

    /// Length of the path when driven from `start`
    pub fn length_from(&self, start: &Point2D) -> f64 {
        match self.points.first() {
            Some(first) => start.distance(first) + self.total_length(),
            None => 0.0,
        }
    }
}

/// Integer cell of a discretized plane, used by the grid planners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridNode {
    pub x: i64,
    pub y: i64,
}

impl GridNode {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Cell of side `resolution` nearest to `point`
    pub fn snap(point: &Point2D, resolution: f64) -> Self {
        Self {
            x: (point.x / resolution).round() as i64,
            y: (point.y / resolution).round() as i64,
        }
    }

    pub fn to_point(&self, resolution: f64) -> Point2D {
        Point2D::new(self.x as f64 * resolution, self.y as f64 * resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_point2d_array_and_json_round_trip() {
        let p = Point2D::new(1.5, -2.0);
        assert_eq!(Point2D::from(p.to_array()), p);

        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"x":1.5,"y":-2.0}"#);
        let back: Point2D = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_rotated_around() {
        let p = Point2D::new(2.0, 1.0);
        let r = p.rotated_around(&Point2D::new(1.0, 1.0), std::f64::consts::FRAC_PI_2);
        assert!((r.x - 1.0).abs() < 1e-12);
        assert!((r.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pose2d_normalize_yaw() {
        let mut pose = Pose2D::new(0.0, 0.0, 4.0);
        pose.normalize_yaw();
        assert!(pose.yaw >= -std::f64::consts::PI && pose.yaw <= std::f64::consts::PI);
    }

    #[test]
    fn test_pose2d_serializes_as_array() {
        let pose = Pose2D::new(1.0, 2.0, 0.5);
        assert_eq!(serde_json::to_string(&pose).unwrap(), "[1.0,2.0,0.5]");
    }

    #[test]
    fn test_path2d_total_length() {
        let path = Path2D::from_points(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
        ]);
        assert!((path.total_length() - 2.0).abs() < 1e-10);
        assert!((path.length_from(&Point2D::new(-1.0, 0.0)) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_grid_node_snap() {
        let cell = GridNode::snap(&Point2D::new(0.29, -0.31), 0.2);
        assert_eq!(cell, GridNode::new(1, -2));
    }
}
