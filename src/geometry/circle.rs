//! Circles for the goal clearance zone and keep-out areas during generation

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::common::{Point2D, Pose2D};
use super::bounds::BoundingBox;

/// Circle centered at a pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Pose2D,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Pose2D, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn at(point: Point2D, radius: f64) -> Self {
        Self { center: Pose2D::from(point), radius }
    }

    /// Projection onto `axis`; the axis need not be normalized
    pub fn project(&self, axis: &Vector2<f64>) -> (f64, f64) {
        let c = self.center.position().to_vector().dot(axis);
        let r = self.radius * axis.norm();
        (c - r, c + r)
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            min_x: self.center.x - self.radius,
            min_y: self.center.y - self.radius,
            max_x: self.center.x + self.radius,
            max_y: self.center.y + self.radius,
        }
    }

    pub fn contains_point(&self, p: &Point2D) -> bool {
        self.center.position().distance(p) <= self.radius
    }
}
