// Obstacle map module

pub mod generation;
pub mod obstacle;
pub mod quadtree;
pub mod serialization;
pub mod world_map;

pub use generation::GenerationConfig;
pub use obstacle::{MotionLaw, Obstacle};
pub use quadtree::{QuadTree, QuadTreeNode};
pub use serialization::{LawTag, MapData, ObstacleData, ObstacleEntry};
pub use world_map::WorldMap;
