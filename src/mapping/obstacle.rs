//! Obstacles and the motion laws that move them

use crate::common::{Pose2D, RoboticsError, RoboticsResult};
use crate::geometry::{Polygon, Shape};

/// How an obstacle moves each tick. All angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionLaw {
    Static,
    /// Constant world-frame velocity
    Translate { vx: f64, vy: f64 },
    /// Constant world-frame velocity plus spin about the centroid
    TranslateRotate { vx: f64, vy: f64, omega: f64 },
    /// Forward motion along the heading while turning, tracing a circle of
    /// radius `speed / omega`
    Circular { speed: f64, omega: f64 },
}

impl Default for MotionLaw {
    fn default() -> Self {
        MotionLaw::Static
    }
}

impl MotionLaw {
    /// Pose after `dt` seconds
    pub fn apply(&self, pose: Pose2D, dt: f64) -> Pose2D {
        match *self {
            MotionLaw::Static => pose,
            MotionLaw::Translate { vx, vy } => Pose2D::new(pose.x + vx * dt, pose.y + vy * dt, pose.yaw),
            MotionLaw::TranslateRotate { vx, vy, omega } => {
                Pose2D::new(pose.x + vx * dt, pose.y + vy * dt, pose.yaw + omega * dt)
            }
            MotionLaw::Circular { speed, omega } => Pose2D::new(
                pose.x + speed * pose.yaw.cos() * dt,
                pose.y + speed * pose.yaw.sin() * dt,
                pose.yaw + omega * dt,
            ),
        }
    }

    /// Velocity tuple used by the map file format
    pub fn velocity(&self) -> Vec<f64> {
        match *self {
            MotionLaw::Static => Vec::new(),
            MotionLaw::Translate { vx, vy } => vec![vx, vy],
            MotionLaw::TranslateRotate { vx, vy, omega } => vec![vx, vy, omega],
            MotionLaw::Circular { speed, omega } => vec![speed, omega],
        }
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, MotionLaw::Circular { .. })
    }

    /// Rebuild a law from its velocity tuple. A two-element tuple is a
    /// translation unless `circular` is set.
    pub fn from_velocity(vel: &[f64], circular: bool) -> RoboticsResult<Self> {
        match (vel, circular) {
            ([], false) => Ok(MotionLaw::Static),
            ([speed, omega], true) => Ok(MotionLaw::Circular { speed: *speed, omega: *omega }),
            ([vx, vy], false) => Ok(MotionLaw::Translate { vx: *vx, vy: *vy }),
            ([vx, vy, omega], false) => Ok(MotionLaw::TranslateRotate { vx: *vx, vy: *vy, omega: *omega }),
            _ => Err(RoboticsError::InvalidParameter(format!(
                "velocity {:?} does not describe a {} motion law",
                vel,
                if circular { "circular" } else { "linear" }
            ))),
        }
    }
}

/// A convex polygonal obstacle placed at a pose
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    polygon: Polygon,
    pose: Pose2D,
    motion: MotionLaw,
}

impl Obstacle {
    /// Obstacle whose pose is the polygon's centroid pose
    pub fn new(polygon: Polygon, motion: MotionLaw) -> Self {
        let pose = polygon.centroid();
        Self { polygon, pose, motion }
    }

    /// Obstacle with an explicit pose, as read back from a map file. The
    /// vertices are kept as given and only the recorded orientation follows
    /// `pose.yaw`.
    pub fn from_parts(mut polygon: Polygon, pose: Pose2D, motion: MotionLaw) -> Self {
        polygon.set_orientation(pose.yaw);
        Self { polygon, pose, motion }
    }

    pub fn rectangle(pose: Pose2D, width: f64, height: f64, motion: MotionLaw) -> RoboticsResult<Self> {
        Ok(Self::new(Polygon::rectangle(pose, width, height)?, motion))
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    pub fn motion(&self) -> MotionLaw {
        self.motion
    }

    pub fn set_motion(&mut self, motion: MotionLaw) {
        self.motion = motion;
    }

    /// Move to `pose`, re-deriving the polygon
    pub fn set_pose(&mut self, pose: Pose2D) {
        self.pose = pose;
        self.polygon.transform_to(pose);
    }

    /// Advance by the motion law. Returns true if the obstacle moved.
    pub fn step(&mut self, dt: f64) -> bool {
        if self.motion == MotionLaw::Static {
            return false;
        }
        let next = self.motion.apply(self.pose, dt);
        self.set_pose(next);
        true
    }

    pub fn shape(&self) -> Shape {
        Shape::Polygon(self.polygon.clone())
    }
}
