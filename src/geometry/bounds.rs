//! Axis-aligned bounding boxes

use serde::{Deserialize, Serialize};

use crate::common::{Point2D, RoboticsError, RoboticsResult};

/// Axis-aligned box `(min_x, min_y, max_x, max_y)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a box, rejecting empty or inverted ranges
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> RoboticsResult<Self> {
        if !(min_x < max_x) || !(min_y < max_y) {
            return Err(RoboticsError::InvalidParameter(format!(
                "invalid bounds ({}, {}, {}, {}): min must be below max",
                min_x, min_y, max_x, max_y
            )));
        }
        Ok(Self { min_x, min_y, max_x, max_y })
    }

    /// Box around a set of points. Degenerate boxes are allowed here since
    /// segments and points have zero extent along some axis.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point2D>,
    {
        let mut bounds = Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for p in points {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        bounds
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.min_y, self.max_x, self.max_y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point2D {
        Point2D::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Closed-interval overlap test, touching boxes overlap
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn contains_point(&self, p: &Point2D) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// The four quadrants NW, NE, SW, SE
    pub fn quadrants(&self) -> [BoundingBox; 4] {
        let c = self.center();
        [
            BoundingBox { min_x: self.min_x, min_y: c.y, max_x: c.x, max_y: self.max_y },
            BoundingBox { min_x: c.x, min_y: c.y, max_x: self.max_x, max_y: self.max_y },
            BoundingBox { min_x: self.min_x, min_y: self.min_y, max_x: c.x, max_y: c.y },
            BoundingBox { min_x: c.x, min_y: self.min_y, max_x: self.max_x, max_y: c.y },
        ]
    }
}
