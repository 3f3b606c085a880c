//! Random map generation
//!
//! Places the goal at a random polar offset from an origin, then scatters
//! rectangular obstacles with randomly drawn motion laws.

use std::f64::consts::PI;

use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::common::{Point2D, Pose2D, RoboticsError, RoboticsResult};
use crate::geometry::{check_intersection, polygon_intersects, Circle, Shape};
use super::obstacle::{MotionLaw, Obstacle};
use super::world_map::WorldMap;

/// Configuration for random map generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of obstacles to place
    pub obs_count: usize,
    /// Smallest obstacle side length
    pub obs_min_size: f64,
    /// Largest obstacle side length
    pub obs_max_size: f64,
    /// Range of obstacle orientations [rad]
    pub obs_angle_range: [f64; 2],
    /// Snap obstacle centers to a grid of this spacing
    pub grid_snap: Option<f64>,
    /// Minimum goal distance from the origin
    pub goal_min_dist: f64,
    /// Maximum goal distance from the origin
    pub goal_max_dist: f64,
    /// Range of goal bearings from the origin [rad]
    pub goal_angle_range: [f64; 2],
    /// Probability an obstacle translates
    pub translate_rate: f64,
    /// Probability an obstacle translates and spins
    pub translate_rotate_rate: f64,
    /// Probability an obstacle drives in a circle
    pub circular_rate: f64,
    /// Largest linear speed of a moving obstacle [m/s]
    pub max_speed: f64,
    /// Largest angular speed of a moving obstacle [rad/s]
    pub max_omega: f64,
    /// Sampling attempts before giving up
    pub max_attempts: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            obs_count: 10,
            obs_min_size: 0.3,
            obs_max_size: 1.5,
            obs_angle_range: [0.0, PI],
            grid_snap: None,
            goal_min_dist: 3.0,
            goal_max_dist: 8.0,
            goal_angle_range: [-PI, PI],
            translate_rate: 0.0,
            translate_rotate_rate: 0.0,
            circular_rate: 0.0,
            max_speed: 0.5,
            max_omega: 0.5,
            max_attempts: 1000,
        }
    }
}

fn check_range(name: &str, range: [f64; 2]) -> RoboticsResult<()> {
    if !(range[0] <= range[1]) || !range[0].is_finite() || !range[1].is_finite() {
        return Err(RoboticsError::InvalidParameter(format!(
            "{} must be an ordered finite range, got [{}, {}]",
            name, range[0], range[1]
        )));
    }
    Ok(())
}

fn check_rate(name: &str, rate: f64) -> RoboticsResult<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(RoboticsError::InvalidParameter(format!(
            "{} must be within [0, 1], got {}",
            name, rate
        )));
    }
    Ok(())
}

impl GenerationConfig {
    pub fn validate(&self) -> RoboticsResult<()> {
        if !(self.obs_min_size > 0.0) || self.obs_max_size < self.obs_min_size {
            return Err(RoboticsError::InvalidParameter(format!(
                "obstacle sizes must satisfy 0 < min <= max, got {} and {}",
                self.obs_min_size, self.obs_max_size
            )));
        }
        if self.goal_min_dist < 0.0 || self.goal_max_dist < self.goal_min_dist {
            return Err(RoboticsError::InvalidParameter(format!(
                "goal distances must satisfy 0 <= min <= max, got {} and {}",
                self.goal_min_dist, self.goal_max_dist
            )));
        }
        check_range("obs_angle_range", self.obs_angle_range)?;
        check_range("goal_angle_range", self.goal_angle_range)?;
        if let Some(snap) = self.grid_snap {
            if !(snap > 0.0) {
                return Err(RoboticsError::InvalidParameter(format!(
                    "grid_snap must be positive, got {}",
                    snap
                )));
            }
        }
        check_rate("translate_rate", self.translate_rate)?;
        check_rate("translate_rotate_rate", self.translate_rotate_rate)?;
        check_rate("circular_rate", self.circular_rate)?;
        let moving = self.translate_rate + self.translate_rotate_rate + self.circular_rate;
        if moving > 1.0 {
            return Err(RoboticsError::InvalidParameter(format!(
                "motion law rates sum to {} which exceeds 1",
                moving
            )));
        }
        if self.max_speed < 0.0 || self.max_omega < 0.0 {
            return Err(RoboticsError::InvalidParameter(
                "max_speed and max_omega must not be negative".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(RoboticsError::InvalidParameter(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn sample_in(rng: &mut impl Rng, range: [f64; 2]) -> f64 {
        if range[0] == range[1] {
            range[0]
        } else {
            rng.gen_range(range[0]..range[1])
        }
    }

    fn sample_motion(&self, rng: &mut impl Rng) -> MotionLaw {
        let draw: f64 = rng.gen();
        let speed = Self::sample_in(rng, [-self.max_speed, self.max_speed]);
        let omega = Self::sample_in(rng, [-self.max_omega, self.max_omega]);
        let heading = rng.gen_range(-PI..PI);
        let (vx, vy) = (speed * heading.cos(), speed * heading.sin());

        if draw < self.translate_rate {
            MotionLaw::Translate { vx, vy }
        } else if draw < self.translate_rate + self.translate_rotate_rate {
            MotionLaw::TranslateRotate { vx, vy, omega }
        } else if draw < self.translate_rate + self.translate_rotate_rate + self.circular_rate {
            MotionLaw::Circular { speed: speed.abs(), omega }
        } else {
            MotionLaw::Static
        }
    }

    fn snap(&self, value: f64) -> f64 {
        match self.grid_snap {
            Some(step) => (value / step).round() * step,
            None => value,
        }
    }
}

impl WorldMap {
    /// Replace the map content with a random goal and random obstacles.
    ///
    /// The goal lands between `goal_min_dist` and `goal_max_dist` from
    /// `origin`, inside the boundaries and clear of every forbidden zone.
    /// Obstacles avoid the goal clearance circle, the forbidden zones and
    /// each other. When `max_attempts` runs out the map keeps whatever was
    /// placed so far. Returns the number of obstacles placed.
    pub fn generate(
        &mut self,
        config: &GenerationConfig,
        origin: Point2D,
        forbidden_zones: &[Circle],
        rng: &mut impl Rng,
    ) -> RoboticsResult<usize> {
        config.validate()?;
        if !self.changes_enabled() {
            warn!("map generation skipped: changes disabled");
            return Ok(0);
        }
        self.reset();

        let mut goal_placed = false;
        for _ in 0..config.max_attempts {
            let bearing = GenerationConfig::sample_in(rng, config.goal_angle_range);
            let dist = GenerationConfig::sample_in(rng, [config.goal_min_dist, config.goal_max_dist]);
            let goal = Point2D::new(origin.x + dist * bearing.cos(), origin.y + dist * bearing.sin());
            if !self.contains_point(&goal) {
                continue;
            }
            let zone = Shape::Circle(Circle::at(goal, self.goal_clearance()));
            if forbidden_zones.iter().any(|z| check_intersection(&zone, &Shape::Circle(*z))) {
                continue;
            }
            self.set_goal(goal);
            goal_placed = true;
            break;
        }
        if !goal_placed {
            warn!("could not place the goal in {} attempts, keeping {:?}", config.max_attempts, self.goal());
        }
        debug!("goal at ({:.3}, {:.3})", self.goal().x, self.goal().y);

        let bounds = *self.boundaries();
        let mut attempts = 0;
        while self.obstacle_count() < config.obs_count && attempts < config.max_attempts {
            attempts += 1;

            let width = GenerationConfig::sample_in(rng, [config.obs_min_size, config.obs_max_size]);
            let height = GenerationConfig::sample_in(rng, [config.obs_min_size, config.obs_max_size]);
            let x = config.snap(rng.gen_range(bounds.min_x..bounds.max_x));
            let y = config.snap(rng.gen_range(bounds.min_y..bounds.max_y));
            let yaw = GenerationConfig::sample_in(rng, config.obs_angle_range);

            let obstacle = Obstacle::rectangle(Pose2D::new(x, y, yaw), width, height, config.sample_motion(rng))?;
            let polygon = obstacle.polygon();
            if forbidden_zones.iter().any(|z| polygon_intersects(polygon, &Shape::Circle(*z))) {
                continue;
            }
            if !self.query_polygon(&obstacle.shape()).is_empty() {
                continue;
            }
            // boundary and goal clearance are checked by the map
            self.add_obstacle(obstacle);
        }

        if self.obstacle_count() < config.obs_count {
            warn!(
                "placed {} of {} obstacles after {} attempts",
                self.obstacle_count(),
                config.obs_count,
                attempts
            );
        } else {
            info!("generated map with {} obstacles", self.obstacle_count());
        }
        Ok(self.obstacle_count())
    }
}
