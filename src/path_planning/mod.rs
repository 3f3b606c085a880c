// Path Planning algorithms module

pub mod config;
pub mod search;
pub mod tree;
pub mod sampling;
pub mod grid_search;
pub mod rrt;
pub mod rrt_star;
pub mod informed_rrt_star;
pub mod dynamic_rrt;
pub mod factory;

pub use config::PlannerConfig;
pub use search::{path_shapes, segment_collides, SearchCore, SearchState};
pub use tree::{SearchTree, TreeNode};
pub use sampling::InformedSampler;
pub use grid_search::{GridSearch, GridStrategy};
pub use rrt::Rrt;
pub use rrt_star::RrtStar;
pub use informed_rrt_star::InformedRrtStar;
pub use dynamic_rrt::{DynamicPhase, DynamicRrt};
pub use factory::{build_planner, PlannerKind};
