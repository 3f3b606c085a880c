//! RustMotionPlanning - 2D motion planning among moving polygonal obstacles
//!
//! This crate provides a convex collision-geometry kernel, a quadtree
//! spatial index, a gated obstacle map, incremental grid and sampling
//! planners, and a controller that turns a planner's path into target poses.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod geometry;
pub mod mapping;
pub mod path_planning;
pub mod path_tracking;

// Re-export common types for convenience
pub use common::{GridNode, Path2D, Point2D, Pose2D};
pub use common::{Robot, SearchAlgorithm};
pub use common::{RoboticsError, RoboticsResult};
pub use geometry::{check_intersection, Shape};
pub use mapping::{MotionLaw, Obstacle, WorldMap};
pub use path_planning::{build_planner, PlannerConfig, PlannerKind};
pub use path_tracking::{ControlMode, Controller};
