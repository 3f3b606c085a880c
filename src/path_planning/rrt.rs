//! RRT (Rapidly-exploring Random Tree) path planning algorithm
//!
//! Grows a tree from the start by extending toward random samples and stops
//! at the first connection to the goal.

use log::{debug, info};

use crate::common::{Path2D, Point2D, SearchAlgorithm};
use crate::geometry::BoundingBox;
use crate::mapping::WorldMap;
use super::config::PlannerConfig;
use super::sampling::{generate_random_node, nearest_neighbor, new_state};
use super::search::{path_shapes, segment_collides, SearchCore};
use super::tree::SearchTree;

/// RRT path planner
pub struct Rrt {
    core: SearchCore,
    config: PlannerConfig,
    tree: SearchTree,
    bounds: Option<BoundingBox>,
    goal_node: Option<usize>,
}

impl Rrt {
    pub fn new(map: &WorldMap, start: Point2D, config: PlannerConfig) -> Self {
        Self {
            core: SearchCore::new(map, start, &config),
            config,
            tree: SearchTree::new(),
            bounds: None,
            goal_node: None,
        }
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Index of the goal node once connected
    pub fn goal_node(&self) -> Option<usize> {
        self.goal_node
    }

    /// Try to join `index` to the goal. On success the goal becomes a node
    /// of the tree and the path is published.
    fn try_connect_goal(&mut self, map: &WorldMap, index: usize) -> bool {
        let point = self.tree.node(index).point;
        let goal = self.core.goal;
        if point.distance(&goal) > self.config.step_length
            || segment_collides(map, &point, &goal, self.core.margin)
        {
            return false;
        }
        let goal_index = if point == goal { index } else { self.tree.add(goal, Some(index), 0.0) };
        self.goal_node = Some(goal_index);
        self.core.path = Path2D::from_points(self.tree.backtrack(goal_index).into_iter().skip(1).collect());
        true
    }
}

impl SearchAlgorithm for Rrt {
    fn core(&self) -> &SearchCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SearchCore {
        &mut self.core
    }

    fn pre_search(&mut self, map: &WorldMap) {
        self.core.goal = map.goal();
        self.bounds = Some(*map.boundaries());
        let h = self.heuristic(&self.core.start);
        self.tree = SearchTree::with_root(self.core.start, h);
        debug!("rrt: searching from {:?} to {:?}", self.core.start, self.core.goal);
    }

    fn step_search(&mut self, map: &WorldMap) {
        let Some(bounds) = self.bounds else { return };
        let sample = generate_random_node(&mut self.core.rng, &bounds, self.core.goal, self.config.goal_sample_rate);
        let Some(near) = nearest_neighbor(&self.tree, &sample) else { return };
        let near_point = self.tree.node(near).point;
        let new_point = new_state(&near_point, &sample, self.config.step_length);

        if new_point == near_point
            || !map.contains_point(&new_point)
            || segment_collides(map, &near_point, &new_point, self.core.margin)
        {
            return;
        }

        let h = self.heuristic(&new_point);
        let index = self.tree.add(new_point, Some(near), h);
        if self.try_connect_goal(map, index) {
            info!("rrt: path found after {} iterations, {} nodes", self.core.iterations + 1, self.tree.len());
        }
    }

    fn can_run(&self) -> bool {
        self.goal_node.is_none() && self.core.iterations < self.config.max_iterations
    }

    fn post_search(&mut self, _map: &WorldMap) {
        if self.goal_node.is_none() {
            info!("rrt: no path within {} iterations", self.config.max_iterations);
        }
        let mut shapes = self.tree.edge_shapes();
        shapes.extend(path_shapes(&self.core.start, &self.core.path));
        self.core.draw_list = shapes;
    }

    fn clear(&mut self) {
        self.tree = SearchTree::new();
        self.bounds = None;
        self.goal_node = None;
    }
}
