//! Map persistence
//!
//! JSON layout:
//!
//! ```text
//! {
//!   "obstacles": [
//!     {"id": 0, "obstacle": {"polygon": {"points": [{"x": .., "y": ..}, ..]},
//!                            "pose": [x, y, yaw], "vel": [..]}}
//!   ],
//!   "goal": {"x": .., "y": ..}
//! }
//! ```
//!
//! `vel` is empty for static obstacles, `[vx, vy]` for translation and
//! `[vx, vy, omega]` for translation with rotation. Circular motion writes
//! `[speed, omega]` together with `"law": "circular"`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::common::{Point2D, Pose2D, RoboticsError, RoboticsResult};
use crate::geometry::{BoundingBox, Polygon};
use super::obstacle::{MotionLaw, Obstacle};
use super::world_map::WorldMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LawTag {
    Circular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleData {
    pub polygon: Polygon,
    pub pose: Pose2D,
    #[serde(default)]
    pub vel: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub law: Option<LawTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleEntry {
    pub id: usize,
    pub obstacle: ObstacleData,
}

/// Serializable snapshot of a map's obstacles and goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub obstacles: Vec<ObstacleEntry>,
    pub goal: Point2D,
}

impl From<&Obstacle> for ObstacleData {
    fn from(obstacle: &Obstacle) -> Self {
        let motion = obstacle.motion();
        Self {
            polygon: obstacle.polygon().clone(),
            pose: obstacle.pose(),
            vel: motion.velocity(),
            law: if motion.is_circular() { Some(LawTag::Circular) } else { None },
        }
    }
}

impl TryFrom<ObstacleData> for Obstacle {
    type Error = RoboticsError;

    fn try_from(data: ObstacleData) -> Result<Self, Self::Error> {
        let motion = MotionLaw::from_velocity(&data.vel, data.law == Some(LawTag::Circular))?;
        Ok(Obstacle::from_parts(data.polygon, data.pose, motion))
    }
}

impl WorldMap {
    pub fn to_data(&self) -> MapData {
        MapData {
            obstacles: self
                .obstacles()
                .map(|(id, o)| ObstacleEntry { id, obstacle: ObstacleData::from(o) })
                .collect(),
            goal: self.goal(),
        }
    }

    /// Build a map from a snapshot. IDs are kept as stored and numbering
    /// continues after the largest one. Placement rules are not re-checked.
    ///
    /// The snapshot does not record a spatial index, so the map comes back
    /// without one. Call `enable_spatial_index` on the result to rebuild it.
    pub fn from_data(data: MapData, boundaries: BoundingBox, goal_clearance: f64) -> RoboticsResult<Self> {
        let mut map = WorldMap::new(boundaries, data.goal, goal_clearance);
        let mut seen = HashSet::new();
        for entry in data.obstacles {
            if !seen.insert(entry.id) {
                return Err(RoboticsError::InvalidParameter(format!(
                    "duplicate obstacle id {} in map data",
                    entry.id
                )));
            }
            map.insert_unchecked(entry.id, Obstacle::try_from(entry.obstacle)?);
        }
        Ok(map)
    }

    pub fn to_json(&self) -> RoboticsResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_data())?)
    }

    pub fn from_json(json: &str, boundaries: BoundingBox, goal_clearance: f64) -> RoboticsResult<Self> {
        let data: MapData = serde_json::from_str(json)?;
        Self::from_data(data, boundaries, goal_clearance)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> RoboticsResult<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        info!("saved map with {} obstacles to {:?}", self.obstacle_count(), path.as_ref());
        Ok(())
    }

    /// Read a map written by `save`. Like `from_data`, no spatial index.
    pub fn load<P: AsRef<Path>>(path: P, boundaries: BoundingBox, goal_clearance: f64) -> RoboticsResult<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let map = Self::from_json(&json, boundaries, goal_clearance)?;
        info!("loaded map with {} obstacles from {:?}", map.obstacle_count(), path.as_ref());
        Ok(map)
    }
}
