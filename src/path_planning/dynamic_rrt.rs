//! Dynamic RRT
//!
//! Plans like RRT with the map frozen, then keeps running with the map live.
//! When obstacles change, edges are re-tested, blocked branches are cut and
//! the tree regrows toward the goal, biased to the waypoints the cut removed
//! so the repaired path stays close to the old one.

use log::{debug, info};
use rand::Rng;

use crate::common::{Path2D, Point2D, SearchAlgorithm};
use crate::geometry::BoundingBox;
use crate::mapping::WorldMap;
use super::config::PlannerConfig;
use super::sampling::{generate_random_node, nearest_neighbor, new_state, uniform_sample};
use super::search::{path_shapes, segment_collides, SearchCore};
use super::tree::SearchTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicPhase {
    /// Initial search, map frozen
    Planning,
    /// Path known, map live, repairs on change
    Replanning,
}

pub struct DynamicRrt {
    core: SearchCore,
    config: PlannerConfig,
    tree: SearchTree,
    bounds: Option<BoundingBox>,
    phase: DynamicPhase,
    /// Tree indices of the published route. The root is left out of the
    /// first route and leads every repaired one.
    path_nodes: Vec<usize>,
    /// Points of cut path nodes not yet moved to the waypoint cache
    invalidated: Vec<Point2D>,
    waypoints: Vec<Point2D>,
    /// Deepest surviving node of the cut path, set until the goal is reconnected
    last_valid: Option<usize>,
    goal_node: Option<usize>,
    seen_revision: u64,
}

impl DynamicRrt {
    pub fn new(map: &WorldMap, start: Point2D, config: PlannerConfig) -> Self {
        Self {
            core: SearchCore::new(map, start, &config),
            config,
            tree: SearchTree::new(),
            bounds: None,
            phase: DynamicPhase::Planning,
            path_nodes: Vec::new(),
            invalidated: Vec::new(),
            waypoints: Vec::new(),
            last_valid: None,
            goal_node: None,
            seen_revision: map.revision(),
        }
    }

    pub fn phase(&self) -> DynamicPhase {
        self.phase
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Cached points of the last cut path, sampled while regrowing
    pub fn waypoints(&self) -> &[Point2D] {
        &self.waypoints
    }

    pub fn last_valid(&self) -> Option<usize> {
        self.last_valid
    }

    /// Re-test every edge against the current map and mark the child of each
    /// blocked edge invalid. The tree is first re-rooted at the follower, so
    /// a blocked edge always cuts the side away from the robot. Returns how
    /// many nodes became invalid.
    pub fn invalidate_nodes(&mut self, map: &WorldMap) -> usize {
        self.follow_reroot();
        let blocked: Vec<usize> = self
            .tree
            .edges()
            .into_iter()
            .filter(|&(_, c)| self.tree.node(c).valid)
            .filter(|&(p, c)| {
                segment_collides(map, &self.tree.node(p).point, &self.tree.node(c).point, self.core.margin)
            })
            .map(|(_, c)| c)
            .collect();
        let count = blocked.into_iter().filter(|&c| self.tree.invalidate(c)).count();
        if count > 0 {
            debug!("dynamic rrt: {} edges blocked", count);
        }
        count
    }

    /// Cascade invalidity to descendants, cut the published path at its
    /// first invalid node and discard every invalid node. Returns the number
    /// of nodes discarded.
    pub fn trim(&mut self) -> usize {
        let cascaded = self.tree.cascade_invalid();
        let consumed = self.consumed();
        let cut = self.path_nodes.iter().position(|&i| !self.tree.node(i).valid);

        if let Some(k) = cut {
            self.invalidated
                .extend(self.path_nodes[k..].iter().map(|&i| self.tree.node(i).point));
            let last = if k == 0 { self.tree.backtrack_indices(self.path_nodes[0])[0] } else { self.path_nodes[k - 1] };
            self.last_valid = Some(last);
            self.path_nodes.truncate(k);
        }

        let before = self.tree.len();
        let remap = self.tree.retain_valid();
        let removed = before - self.tree.len();

        self.path_nodes = self.path_nodes.iter().filter_map(|&i| remap[i]).collect();
        self.last_valid = self.last_valid.and_then(|i| remap.get(i).copied().flatten());
        self.goal_node = self.goal_node.and_then(|i| remap.get(i).copied().flatten());

        if cut.is_some() {
            let from = consumed.min(self.path_nodes.len());
            self.core.path = Path2D::from_points(
                self.path_nodes[from..].iter().map(|&i| self.tree.node(i).point).collect(),
            );
        }
        debug!("dynamic rrt: trimmed {} nodes ({} by cascade)", removed, cascaded);
        removed
    }

    /// Move the points of the cut path into the waypoint cache. The goal is
    /// skipped since it is sampled on its own.
    pub fn extract_waypoints(&mut self) -> usize {
        let goal = self.core.goal;
        let before = self.waypoints.len();
        self.waypoints
            .extend(self.invalidated.drain(..).filter(|p| *p != goal));
        self.waypoints.len() - before
    }

    /// True while the published route is broken and not yet repaired
    pub fn is_path_invalid(&self) -> bool {
        self.last_valid.is_some()
            || self.path_nodes.iter().any(|&i| !self.tree.node(i).valid)
    }

    /// Leading published nodes the follower already popped off the path
    fn consumed(&self) -> usize {
        self.path_nodes.len().saturating_sub(self.core.path.len())
    }

    /// Re-root the tree at the last waypoint the follower popped and drop the
    /// driven part of the route. The robot sits on the new root or on the
    /// edge leaving it.
    fn follow_reroot(&mut self) {
        let consumed = self.consumed();
        if consumed == 0 {
            return;
        }
        let node = self.path_nodes[consumed - 1];
        self.tree.reroot(node);
        self.path_nodes.drain(..consumed);
        self.core.start = self.tree.node(node).point;
        debug!("dynamic rrt: re-rooted at {:?} after {} waypoints", self.core.start, consumed);
    }

    fn route_blocked(&self, map: &WorldMap) -> bool {
        self.path_nodes.iter().any(|&i| {
            let node = self.tree.node(i);
            node.parent.map_or(false, |p| {
                segment_collides(map, &self.tree.node(p).point, &node.point, self.core.margin)
            })
        })
    }

    fn repair(&mut self, map: &WorldMap) {
        let blocked = self.invalidate_nodes(map);
        let removed = self.trim();
        let cached = self.extract_waypoints();
        if blocked > 0 {
            info!(
                "dynamic rrt: {} edges blocked, {} nodes cut, {} waypoints cached",
                blocked, removed, cached
            );
        }
    }

    fn sample(&mut self, bounds: &BoundingBox) -> Point2D {
        if self.phase == DynamicPhase::Planning {
            return generate_random_node(&mut self.core.rng, bounds, self.core.goal, self.config.goal_sample_rate);
        }
        let r: f64 = self.core.rng.gen();
        if r < self.config.goal_sample_rate {
            self.core.goal
        } else if r < self.config.goal_sample_rate + self.config.waypoint_sampling_rate && !self.waypoints.is_empty() {
            let i = self.core.rng.gen_range(0..self.waypoints.len());
            self.waypoints[i]
        } else {
            uniform_sample(&mut self.core.rng, bounds)
        }
    }

    /// One tree extension. Returns the new node index when it reaches the goal.
    fn extend(&mut self, map: &WorldMap) -> Option<usize> {
        let bounds = self.bounds?;
        let sample = self.sample(&bounds);
        let near = nearest_neighbor(&self.tree, &sample)?;
        let near_point = self.tree.node(near).point;
        let new_point = new_state(&near_point, &sample, self.config.step_length);

        if new_point == near_point
            || !map.contains_point(&new_point)
            || segment_collides(map, &near_point, &new_point, self.core.margin)
        {
            return None;
        }

        let h = self.heuristic(&new_point);
        let index = self.tree.add(new_point, Some(near), h);
        let goal = self.core.goal;
        if new_point.distance(&goal) > self.config.step_length
            || segment_collides(map, &new_point, &goal, self.core.margin)
        {
            return None;
        }
        let goal_index = if new_point == goal { index } else { self.tree.add(goal, Some(index), 0.0) };
        Some(goal_index)
    }

    /// Publish the route to `goal_index`. A repaired route keeps the root as
    /// its first waypoint: the follower may be part way along an edge out of
    /// the root, and driving back to it stays on a checked edge.
    fn publish(&mut self, goal_index: usize, with_root: bool) {
        self.follow_reroot();
        let skip = if with_root { 0 } else { 1 };
        let route: Vec<usize> = self.tree.backtrack_indices(goal_index).into_iter().skip(skip).collect();
        self.core.path = Path2D::from_points(route.iter().map(|&i| self.tree.node(i).point).collect());
        self.path_nodes = route;
        self.goal_node = Some(goal_index);
        self.refresh_draw_list();
    }

    fn refresh_draw_list(&mut self) {
        let mut shapes = self.tree.edge_shapes();
        shapes.extend(path_shapes(&self.core.start, &self.core.path));
        self.core.draw_list = shapes;
    }
}

impl SearchAlgorithm for DynamicRrt {
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
        self.seen_revision = map.revision();
    }

    fn step_search(&mut self, map: &WorldMap) {
        match self.phase {
            DynamicPhase::Planning => {
                if let Some(goal_index) = self.extend(map) {
                    self.publish(goal_index, false);
                    self.phase = DynamicPhase::Replanning;
                    self.core.dynamic = true;
                    self.seen_revision = map.revision();
                    info!(
                        "dynamic rrt: path found after {} iterations, switching to replanning",
                        self.core.iterations + 1
                    );
                }
            }
            DynamicPhase::Replanning => {
                let changed = map.revision() != self.seen_revision;
                if changed || (!self.is_path_invalid() && self.route_blocked(map)) {
                    self.seen_revision = map.revision();
                    self.repair(map);
                    self.refresh_draw_list();
                }
                if self.is_path_invalid() {
                    if let Some(goal_index) = self.extend(map) {
                        self.publish(goal_index, true);
                        self.last_valid = None;
                        self.waypoints.clear();
                        info!("dynamic rrt: path repaired, {} waypoints", self.core.path.len());
                    }
                }
            }
        }
    }

    fn can_run(&self) -> bool {
        match self.phase {
            DynamicPhase::Planning => self.core.iterations < self.config.max_iterations,
            DynamicPhase::Replanning => true,
        }
    }

    fn post_search(&mut self, _map: &WorldMap) {
        info!("dynamic rrt: no path within {} iterations", self.config.max_iterations);
        self.refresh_draw_list();
    }

    fn clear(&mut self) {
        self.tree = SearchTree::new();
        self.bounds = None;
        self.phase = DynamicPhase::Planning;
        self.path_nodes.clear();
        self.invalidated.clear();
        self.waypoints.clear();
        self.last_valid = None;
        self.goal_node = None;
        self.core.dynamic = false;
    }
}
