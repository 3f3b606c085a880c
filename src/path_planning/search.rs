//! State shared by every incremental planner

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::common::{Path2D, Point2D};
use crate::geometry::{segment_buffer, Segment, Shape};
use crate::mapping::WorldMap;
use super::config::PlannerConfig;

/// Lifecycle of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Constructed or reset, `pre_search` not run yet
    Created,
    /// `pre_search` done
    Initialized,
    /// At least one `step_search` ran
    Searching,
    /// `post_search` ran; nothing happens until `reset`
    Terminated,
}

/// Fields every planner carries
#[derive(Debug, Clone)]
pub struct SearchCore {
    pub start: Point2D,
    pub goal: Point2D,
    /// Clearance kept around every path segment
    pub margin: f64,
    pub iterations_per_step: usize,
    /// `step_search` calls since the last reset
    pub iterations: usize,
    /// Waypoints from the first hop to the goal, start excluded
    pub path: Path2D,
    /// Debug shapes for rendering
    pub draw_list: Vec<Shape>,
    /// Dynamic planners let the map change while they search
    pub dynamic: bool,
    pub state: SearchState,
    /// Seed `rng` was built from; `reseed` replays it
    pub seed: u64,
    pub rng: StdRng,
}

impl SearchCore {
    pub fn new(map: &WorldMap, start: Point2D, config: &PlannerConfig) -> Self {
        Self {
            start,
            goal: map.goal(),
            margin: config.margin,
            iterations_per_step: config.iterations_per_step.max(1),
            iterations: 0,
            path: Path2D::new(),
            draw_list: Vec::new(),
            dynamic: false,
            state: SearchState::Created,
            seed: config.seed,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    pub fn reseed(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}

/// True when the segment `a -> b` swept by `margin` touches an obstacle.
/// A zero-length segment never collides.
pub fn segment_collides(map: &WorldMap, a: &Point2D, b: &Point2D, margin: f64) -> bool {
    let segment = Segment::new(*a, *b);
    if segment.is_degenerate() {
        return false;
    }
    if margin <= 0.0 {
        return map.collides(&Shape::Segment(segment));
    }
    match segment_buffer(&segment, margin, margin) {
        Some(probe) => map.collides(&Shape::Polygon(probe)),
        None => false,
    }
}

/// Shapes drawing a polyline through `points`
pub fn path_shapes(start: &Point2D, path: &Path2D) -> Vec<Shape> {
    std::iter::once(start)
        .chain(path.points.iter())
        .tuple_windows()
        .map(|(a, b)| Shape::Segment(Segment::new(*a, *b)))
        .collect()
}
