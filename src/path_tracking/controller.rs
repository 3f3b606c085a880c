//! Waypoint controller
//!
//! Bridges a planner and a robot: advances the planner while there is work
//! to do and hands out the next target pose along the published path.

use log::{debug, trace};

use crate::common::{Point2D, Pose2D, RoboticsError, RoboticsResult, Robot, SearchAlgorithm};
use crate::mapping::WorldMap;

/// How much planner work a controller step triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// One planner `step` per controller step
    Incremental,
    /// Run the planner to termination in one controller step
    OneShot,
}

pub struct Controller<R: Robot> {
    robot: R,
    planner: Box<dyn SearchAlgorithm>,
    goal_tolerance: f64,
    mode: ControlMode,
}

impl<R: Robot> Controller<R> {
    pub fn new(robot: R, planner: Box<dyn SearchAlgorithm>, goal_tolerance: f64, mode: ControlMode) -> Self {
        Self { robot, planner, goal_tolerance, mode }
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut R {
        &mut self.robot
    }

    pub fn planner(&self) -> &dyn SearchAlgorithm {
        self.planner.as_ref()
    }

    pub fn planner_mut(&mut self) -> &mut dyn SearchAlgorithm {
        self.planner.as_mut()
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn at_goal(&self, goal: &Point2D) -> bool {
        self.robot.pose().position().distance(goal) <= self.goal_tolerance
    }

    /// Advance the planner if the robot still needs a path, or if the
    /// planner keeps replanning while the robot drives
    pub fn step(&mut self, map: &mut WorldMap) {
        if self.at_goal(&map.goal()) {
            trace!("controller: robot within {} of the goal", self.goal_tolerance);
            return;
        }
        let planner = self.planner.as_mut();
        if planner.has_terminated() || !(planner.path().is_empty() || planner.is_dynamic()) {
            return;
        }
        match self.mode {
            ControlMode::Incremental => planner.step(map),
            ControlMode::OneShot => {
                planner.search(map);
                debug!("controller: one-shot search finished, path found: {}", planner.has_path());
            }
        }
    }

    /// Target pose toward the next waypoint, `None` while there is no path.
    /// A waypoint the robot sits exactly on is consumed.
    pub fn next(&mut self) -> Option<Pose2D> {
        let position = self.robot.pose().position();
        let path = &mut self.planner.core_mut().path;
        let first = *path.first()?;
        let target = if first == position {
            path.pop_front();
            path.first().copied().unwrap_or(first)
        } else {
            first
        };
        Some(Pose2D::new(target.x, target.y, position.angle_to(&target)))
    }

    /// Like `next`, but a missing path is an error
    pub fn try_next(&mut self) -> RoboticsResult<Pose2D> {
        self.next().ok_or(RoboticsError::EmptyPath)
    }
}
