//! Informed RRT* path planning algorithm
//!
//! RRT* that, once a first path is known, only samples the ellipse with
//! foci start and goal whose major axis is the best path length plus
//! `informed_slack`. The ellipse shrinks every time the path improves.

use crate::common::{Point2D, SearchAlgorithm};
use crate::mapping::WorldMap;
use super::config::PlannerConfig;
use super::rrt_star::RrtStar;
use super::search::SearchCore;
use super::tree::SearchTree;

pub struct InformedRrtStar {
    inner: RrtStar,
}

impl InformedRrtStar {
    pub fn new(map: &WorldMap, start: Point2D, config: PlannerConfig) -> Self {
        Self { inner: RrtStar::new(map, start, config).informed() }
    }

    pub fn tree(&self) -> &SearchTree {
        self.inner.tree()
    }

    pub fn best_cost(&self) -> f64 {
        self.inner.best_cost()
    }

    /// True once samples come from the ellipse
    pub fn sampling_informed(&self) -> bool {
        self.inner.sampling_informed()
    }
}

impl SearchAlgorithm for InformedRrtStar {
    fn core(&self) -> &SearchCore {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut SearchCore {
        self.inner.core_mut()
    }

    fn pre_search(&mut self, map: &WorldMap) {
        self.inner.pre_search(map);
    }

    fn step_search(&mut self, map: &WorldMap) {
        self.inner.step_search(map);
    }

    fn can_run(&self) -> bool {
        self.inner.can_run()
    }

    fn post_search(&mut self, map: &WorldMap) {
        self.inner.post_search(map);
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Pose2D;
    use crate::geometry::BoundingBox;
    use crate::mapping::{MotionLaw, Obstacle};

    fn create_map() -> WorldMap {
        let mut map = WorldMap::new(BoundingBox::new(-5.0, -5.0, 5.0, 5.0).unwrap(), Point2D::new(3.0, 0.0), 0.3);
        map.add_obstacle(Obstacle::rectangle(Pose2D::new(0.0, 0.0, 0.0), 1.0, 2.0, MotionLaw::Static).unwrap());
        map
    }

    #[test]
    fn test_switches_to_ellipse_after_first_path() {
        let mut map = create_map();
        let start = Point2D::new(-3.0, 0.0);
        let config = PlannerConfig { max_iterations: 2000, goal_sample_rate: 0.1, iterations_per_step: 25, seed: 5, ..Default::default() };
        let mut planner = InformedRrtStar::new(&map, start, config);

        let mut first_cost = None;
        while !planner.has_terminated() {
            assert_eq!(planner.sampling_informed(), first_cost.is_some() || planner.has_path());
            planner.step(&mut map);
            if first_cost.is_none() && planner.has_path() {
                first_cost = Some(planner.best_cost());
            }
        }
        let first_cost = first_cost.expect("informed rrt* found no path");
        assert!(planner.sampling_informed());
        assert!(planner.best_cost() <= first_cost);
        assert!(planner.best_cost() >= 6.0);
        assert!(planner.tree().is_consistent(1e-9));
    }

    #[test]
    fn test_reset_forgets_ellipse() {
        let mut map = create_map();
        let config = PlannerConfig { max_iterations: 800, seed: 6, ..Default::default() };
        let mut planner = InformedRrtStar::new(&map, Point2D::new(-3.0, 0.0), config);
        planner.search(&mut map);
        planner.reset(&map);
        assert!(planner.best_cost().is_infinite());
        assert!(planner.tree().is_empty());
    }
}
