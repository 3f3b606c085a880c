//! RRT* path planning algorithm
//!
//! RRT with choose-parent and rewiring over a fixed-radius neighborhood.
//! The best goal connection is refreshed whenever a node lands near the
//! goal, so the published path only ever gets shorter.

use log::{debug, info, trace};

use crate::common::{Path2D, Point2D, SearchAlgorithm};
use crate::geometry::BoundingBox;
use crate::mapping::WorldMap;
use super::config::PlannerConfig;
use super::sampling::{generate_random_node, nearest_neighbor, new_state, InformedSampler};
use super::search::{path_shapes, segment_collides, SearchCore};
use super::tree::SearchTree;

/// RRT* path planner
pub struct RrtStar {
    core: SearchCore,
    config: PlannerConfig,
    tree: SearchTree,
    bounds: Option<BoundingBox>,
    /// Tree node the goal is reached from, with the total cost
    best: Option<(usize, f64)>,
    /// Switches sampling to the informed ellipse once a path exists
    informed: Option<InformedSampler>,
    informed_enabled: bool,
    rewire_count: usize,
}

impl RrtStar {
    pub fn new(map: &WorldMap, start: Point2D, config: PlannerConfig) -> Self {
        Self {
            core: SearchCore::new(map, start, &config),
            config,
            tree: SearchTree::new(),
            bounds: None,
            best: None,
            informed: None,
            informed_enabled: false,
            rewire_count: 0,
        }
    }

    /// Same planner with informed sampling turned on
    pub(crate) fn informed(mut self) -> Self {
        self.informed_enabled = true;
        self
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Length of the published path, infinite before the first solution
    pub fn best_cost(&self) -> f64 {
        self.best.map_or(f64::INFINITY, |(_, c)| c)
    }

    pub(crate) fn sampling_informed(&self) -> bool {
        self.informed.is_some()
    }

    /// Number of successful re-parentings so far
    pub fn rewire_count(&self) -> usize {
        self.rewire_count
    }

    fn sample(&mut self) -> Option<Point2D> {
        let bounds = self.bounds?;
        let c_best = self.best_cost();
        if let Some(sampler) = self.informed.as_ref() {
            if c_best.is_finite() {
                return Some(sampler.sample(&mut self.core.rng, c_best + self.config.informed_slack));
            }
        }
        Some(generate_random_node(&mut self.core.rng, &bounds, self.core.goal, self.config.goal_sample_rate))
    }

    /// Collision-free neighbors of `point`, in index order
    fn find_neighborhood(&self, map: &WorldMap, point: &Point2D) -> Vec<usize> {
        self.tree
            .within(point, self.config.search_radius)
            .into_iter()
            .filter(|&i| !segment_collides(map, &self.tree.node(i).point, point, self.core.margin))
            .collect()
    }

    /// Neighbor minimizing cost-to-come through it; first minimum wins
    fn choose_parent(&self, neighborhood: &[usize], point: &Point2D) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &i in neighborhood {
            let node = self.tree.node(i);
            let cost = node.cost + node.point.distance(point);
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((i, cost));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Re-parent neighbors that get strictly cheaper through `new_index`
    fn rewire(&mut self, new_index: usize, neighborhood: &[usize]) {
        let new_point = self.tree.node(new_index).point;
        let new_cost = self.tree.node(new_index).cost;
        for &i in neighborhood {
            if Some(i) == self.tree.node(new_index).parent {
                continue;
            }
            let old_cost = self.tree.node(i).cost;
            let through_new = new_cost + new_point.distance(&self.tree.node(i).point);
            if through_new < old_cost && self.tree.set_parent(i, new_index) {
                self.rewire_count += 1;
                trace!("rrt*: rewired node {} ({:.3} -> {:.3})", i, old_cost, through_new);
            }
        }
    }

    /// Scan nodes near the goal and publish a cheaper connection if one exists
    fn update_best_goal(&mut self, map: &WorldMap) {
        let goal = self.core.goal;
        let mut candidate: Option<(usize, f64)> = None;
        for i in self.tree.within(&goal, self.config.search_radius) {
            let node = self.tree.node(i);
            let total = node.cost + node.point.distance(&goal);
            if candidate.map_or(false, |(_, c)| total >= c) {
                continue;
            }
            if segment_collides(map, &node.point, &goal, self.core.margin) {
                continue;
            }
            candidate = Some((i, total));
        }

        let Some((index, cost)) = candidate else { return };
        if cost >= self.best_cost() {
            return;
        }
        let first = self.best.is_none();
        self.best = Some((index, cost));

        let mut points: Vec<Point2D> = self.tree.backtrack(index).into_iter().skip(1).collect();
        if points.last() != Some(&goal) {
            points.push(goal);
        }
        self.core.path = Path2D::from_points(points);

        if first {
            info!("rrt*: first path with cost {:.3} after {} iterations", cost, self.core.iterations + 1);
            if self.informed_enabled {
                self.informed = Some(InformedSampler::new(&self.core.start, &goal));
            }
        } else {
            debug!("rrt*: improved path cost to {:.3}", cost);
        }
    }
}

impl SearchAlgorithm for RrtStar {
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
    }

    fn step_search(&mut self, map: &WorldMap) {
        let Some(sample) = self.sample() else { return };
        let Some(near) = nearest_neighbor(&self.tree, &sample) else { return };
        let near_point = self.tree.node(near).point;
        let new_point = new_state(&near_point, &sample, self.config.step_length);

        if new_point == near_point
            || !map.contains_point(&new_point)
            || segment_collides(map, &near_point, &new_point, self.core.margin)
        {
            return;
        }

        let neighborhood = self.find_neighborhood(map, &new_point);
        let parent = self.choose_parent(&neighborhood, &new_point).unwrap_or(near);
        let h = self.heuristic(&new_point);
        let new_index = self.tree.add(new_point, Some(parent), h);
        self.rewire(new_index, &neighborhood);

        if new_point.distance(&self.core.goal) <= self.config.search_radius {
            self.update_best_goal(map);
        }
    }

    fn can_run(&self) -> bool {
        if self.core.iterations >= self.config.max_iterations {
            return false;
        }
        self.config.search_until_max_iterations || self.best.is_none()
    }

    fn post_search(&mut self, map: &WorldMap) {
        // rewiring may have shortened the route since the last refresh
        self.update_best_goal(map);
        match self.best {
            Some((_, cost)) => info!(
                "rrt*: finished with cost {:.3}, {} nodes, {} rewires",
                cost,
                self.tree.len(),
                self.rewire_count
            ),
            None => info!("rrt*: no path within {} iterations", self.config.max_iterations),
        }
        let mut shapes = self.tree.edge_shapes();
        shapes.extend(path_shapes(&self.core.start, &self.core.path));
        self.core.draw_list = shapes;
    }

    fn clear(&mut self) {
        self.tree = SearchTree::new();
        self.bounds = None;
        self.best = None;
        self.informed = None;
        self.rewire_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Pose2D;
    use crate::mapping::{MotionLaw, Obstacle};

    fn create_map() -> WorldMap {
        let mut map = WorldMap::new(BoundingBox::new(-5.0, -5.0, 5.0, 5.0).unwrap(), Point2D::new(3.0, 0.0), 0.3);
        map.add_obstacle(Obstacle::rectangle(Pose2D::new(0.0, 0.0, 0.0), 1.0, 2.0, MotionLaw::Static).unwrap());
        map
    }

    fn create_config(max_iterations: usize) -> PlannerConfig {
        PlannerConfig {
            max_iterations,
            step_length: 0.5,
            search_radius: 1.0,
            goal_sample_rate: 0.1,
            iterations_per_step: 50,
            seed: 21,
            ..Default::default()
        }
    }

    #[test]
    fn test_tree_stays_consistent_while_rewiring() {
        let mut map = create_map();
        let mut planner = RrtStar::new(&map, Point2D::new(-3.0, 0.0), create_config(1500));
        while !planner.has_terminated() {
            planner.step(&mut map);
            assert!(planner.tree().is_consistent(1e-9));
        }
        assert!(planner.has_path());
        assert!(planner.rewire_count() > 0);
    }

    #[test]
    fn test_best_cost_never_increases() {
        let mut map = create_map();
        let mut planner = RrtStar::new(&map, Point2D::new(-3.0, 0.0), create_config(3000));
        let mut last = f64::INFINITY;
        while !planner.has_terminated() {
            planner.step(&mut map);
            let cost = planner.best_cost();
            assert!(cost <= last);
            last = cost;
        }
        assert!(last.is_finite());
        // never shorter than the straight line
        assert!(last >= 6.0);
        assert!((planner.path().length_from(&Point2D::new(-3.0, 0.0)) - last).abs() < 1e-6);
    }

    #[test]
    fn test_stops_at_first_solution_when_asked() {
        let mut map = create_map();
        let config = PlannerConfig { search_until_max_iterations: false, ..create_config(3000) };
        let mut planner = RrtStar::new(&map, Point2D::new(-3.0, 0.0), config);
        planner.search(&mut map);
        assert!(planner.has_path());
        assert!(planner.core().iterations < 3000);
    }

    #[test]
    fn test_path_clears_obstacle() {
        let mut map = create_map();
        let mut planner = RrtStar::new(&map, Point2D::new(-3.0, 0.0), create_config(1500));
        planner.search(&mut map);
        let mut prev = Point2D::new(-3.0, 0.0);
        for p in &planner.path().points {
            assert!(!segment_collides(&map, &prev, p, 0.2));
            prev = *p;
        }
        assert_eq!(planner.path().last(), Some(&Point2D::new(3.0, 0.0)));
    }
}
