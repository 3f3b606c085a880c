//! Common traits defining interfaces for planners and robots

use log::debug;

use crate::common::types::*;
use crate::geometry::Shape;
use crate::mapping::WorldMap;
use crate::path_planning::search::{segment_collides, SearchCore, SearchState};

/// Incremental search driven one tick at a time.
///
/// Implementors supply the algorithm hooks; the provided `step` runs the
/// lifecycle `pre_search` -> `step_search`* -> `post_search` and keeps the
/// map frozen for non-dynamic planners while they search.
pub trait SearchAlgorithm {
    fn core(&self) -> &SearchCore;

    fn core_mut(&mut self) -> &mut SearchCore;

    /// One-time setup before the first iteration
    fn pre_search(&mut self, map: &WorldMap);

    /// A single iteration
    fn step_search(&mut self, map: &WorldMap);

    /// Sole termination predicate
    fn can_run(&self) -> bool;

    /// Runs exactly once, after `can_run` turned false
    fn post_search(&mut self, map: &WorldMap);

    /// Drop algorithm-specific state
    fn clear(&mut self);

    /// Estimated cost from `point` to the goal
    fn heuristic(&self, point: &Point2D) -> f64 {
        point.distance(&self.core().goal)
    }

    /// Advance by at most `iterations_per_step` iterations
    fn step(&mut self, map: &mut WorldMap) {
        if self.core().state == SearchState::Terminated {
            return;
        }
        if self.core().state == SearchState::Created {
            self.pre_search(map);
            self.core_mut().state = SearchState::Initialized;
        }

        if self.core().dynamic {
            map.enable();
        } else {
            map.disable();
        }

        let budget = self.core().iterations_per_step;
        for _ in 0..budget {
            if !self.can_run() {
                break;
            }
            self.step_search(map);
            let core = self.core_mut();
            core.iterations += 1;
            core.state = SearchState::Searching;
        }

        if !self.can_run() {
            self.post_search(map);
            self.core_mut().state = SearchState::Terminated;
            debug!("search terminated after {} iterations", self.core().iterations);
            map.enable();
        } else if self.core().dynamic {
            // a planner may have turned dynamic during this step
            map.enable();
        }
    }

    /// Run to termination
    fn search(&mut self, map: &mut WorldMap) {
        while !self.has_terminated() {
            self.step(map);
        }
    }

    /// Forget everything and start over against the current goal. The
    /// random generator is reseeded, so a reset planner replays its run.
    fn reset(&mut self, map: &WorldMap) {
        self.clear();
        let core = self.core_mut();
        core.path.clear();
        core.draw_list.clear();
        core.goal = map.goal();
        core.iterations = 0;
        core.state = SearchState::Created;
        core.reseed();
    }

    fn path(&self) -> &Path2D {
        &self.core().path
    }

    fn draw_list(&self) -> &[Shape] {
        &self.core().draw_list
    }

    fn has_path(&self) -> bool {
        self.core().path.last() == Some(&self.core().goal)
    }

    fn has_terminated(&self) -> bool {
        self.core().state == SearchState::Terminated
    }

    fn is_dynamic(&self) -> bool {
        self.core().dynamic
    }

    /// Margin-buffered collision test of the move `a -> b`
    fn collides(&self, map: &WorldMap, a: &Point2D, b: &Point2D) -> bool {
        segment_collides(map, a, b, self.core().margin)
    }
}

/// Anything with a pose the controller can steer
pub trait Robot {
    fn pose(&self) -> Pose2D;
}
