//! Sampling primitives shared by the RRT family

use nalgebra::{Rotation2, Vector2};
use rand::Rng;
use rand_distr::{Distribution, UnitDisc};

use crate::common::Point2D;
use crate::geometry::BoundingBox;
use super::tree::SearchTree;

/// Uniform point inside `bounds`
pub fn uniform_sample(rng: &mut impl Rng, bounds: &BoundingBox) -> Point2D {
    Point2D::new(
        rng.gen_range(bounds.min_x..=bounds.max_x),
        rng.gen_range(bounds.min_y..=bounds.max_y),
    )
}

/// The goal with probability `goal_sample_rate`, otherwise a uniform point
pub fn generate_random_node(
    rng: &mut impl Rng,
    bounds: &BoundingBox,
    goal: Point2D,
    goal_sample_rate: f64,
) -> Point2D {
    if rng.gen::<f64>() < goal_sample_rate {
        goal
    } else {
        uniform_sample(rng, bounds)
    }
}

/// Index of the valid tree node closest to `point`
pub fn nearest_neighbor(tree: &SearchTree, point: &Point2D) -> Option<usize> {
    tree.nearest(point)
}

/// Move from `near` toward `target` by at most `step_length`
pub fn new_state(near: &Point2D, target: &Point2D, step_length: f64) -> Point2D {
    let d = near.distance(target);
    if d <= step_length {
        return *target;
    }
    let theta = near.angle_to(target);
    Point2D::new(near.x + step_length * theta.cos(), near.y + step_length * theta.sin())
}

/// Samples the ellipse with foci `start` and `goal` whose major axis is the
/// current best path length
#[derive(Debug, Clone)]
pub struct InformedSampler {
    center: Vector2<f64>,
    rotation: Rotation2<f64>,
    c_min: f64,
}

impl InformedSampler {
    pub fn new(start: &Point2D, goal: &Point2D) -> Self {
        let center = (start.to_vector() + goal.to_vector()) / 2.0;
        Self {
            center,
            rotation: Rotation2::new(start.angle_to(goal)),
            c_min: start.distance(goal),
        }
    }

    /// Distance between the foci
    pub fn c_min(&self) -> f64 {
        self.c_min
    }

    /// Point inside the ellipse of major axis `c_max`
    pub fn sample(&self, rng: &mut impl Rng, c_max: f64) -> Point2D {
        let r1 = c_max / 2.0;
        let r2 = (c_max * c_max - self.c_min * self.c_min).max(0.0).sqrt() / 2.0;
        let [a, b]: [f64; 2] = UnitDisc.sample(rng);
        let scaled = Vector2::new(r1 * a, r2 * b);
        Point2D::from(self.rotation * scaled + self.center)
    }
}
