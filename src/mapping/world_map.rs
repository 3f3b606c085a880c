//! Dynamic obstacle map
//!
//! The map owns the obstacle set and the goal. Mutations go through an
//! `enable_changes` gate: while it is closed no obstacle can be added,
//! removed or moved, which is what lets static planners assume a frozen
//! world for the whole of a search.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::common::Point2D;
use crate::geometry::{check_intersection, polygon_intersects, BoundingBox, Circle, Shape};
use super::obstacle::Obstacle;
use super::quadtree::QuadTree;

/// Obstacle set, goal and map boundaries
#[derive(Debug, Clone)]
pub struct WorldMap {
    obstacles: BTreeMap<usize, Obstacle>,
    next_id: usize,
    goal: Point2D,
    boundaries: BoundingBox,
    goal_clearance: f64,
    enable_changes: bool,
    index: Option<QuadTree>,
    revision: u64,
}

impl WorldMap {
    pub fn new(boundaries: BoundingBox, goal: Point2D, goal_clearance: f64) -> Self {
        Self {
            obstacles: BTreeMap::new(),
            next_id: 0,
            goal,
            boundaries,
            goal_clearance: goal_clearance.max(0.0),
            enable_changes: true,
            index: None,
            revision: 0,
        }
    }

    /// Map whose queries are pre-filtered by a quadtree over `boundaries`
    pub fn with_spatial_index(boundaries: BoundingBox, goal: Point2D, goal_clearance: f64) -> Self {
        let mut map = Self::new(boundaries, goal, goal_clearance);
        map.enable_spatial_index();
        map
    }

    /// Build a quadtree over the current obstacles
    pub fn enable_spatial_index(&mut self) {
        let mut index = QuadTree::new(self.boundaries);
        for (id, obstacle) in &self.obstacles {
            index.insert(*id, obstacle.polygon());
        }
        self.index = Some(index);
    }

    pub fn has_spatial_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn spatial_index(&self) -> Option<&QuadTree> {
        self.index.as_ref()
    }

    pub fn goal(&self) -> Point2D {
        self.goal
    }

    pub fn set_goal(&mut self, goal: Point2D) {
        self.goal = goal;
    }

    pub fn goal_clearance(&self) -> f64 {
        self.goal_clearance
    }

    /// Circle around the goal that obstacles may not enter
    pub fn goal_zone(&self) -> Circle {
        Circle::at(self.goal, self.goal_clearance)
    }

    pub fn boundaries(&self) -> &BoundingBox {
        &self.boundaries
    }

    pub fn contains_point(&self, p: &Point2D) -> bool {
        self.boundaries.contains_point(p)
    }

    pub fn enable(&mut self) {
        self.enable_changes = true;
    }

    pub fn disable(&mut self) {
        self.enable_changes = false;
    }

    pub fn changes_enabled(&self) -> bool {
        self.enable_changes
    }

    /// Bumped by every structural change (add, remove, reset)
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn obstacle(&self, id: usize) -> Option<&Obstacle> {
        self.obstacles.get(&id)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = (usize, &Obstacle)> {
        self.obstacles.iter().map(|(id, o)| (*id, o))
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Add an obstacle and return its ID.
    ///
    /// Returns `None` when changes are disabled, when the obstacle leaves
    /// the map boundaries or when it reaches into the goal clearance circle.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> Option<usize> {
        if !self.enable_changes {
            debug!("add_obstacle rejected: changes disabled");
            return None;
        }
        if !self.boundaries.contains_box(&obstacle.polygon().bounds()) {
            debug!("add_obstacle rejected: outside boundaries");
            return None;
        }
        if polygon_intersects(obstacle.polygon(), &Shape::Circle(self.goal_zone())) {
            debug!("add_obstacle rejected: inside goal clearance");
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.insert_unchecked(id, obstacle);
        Some(id)
    }

    /// Remove obstacle `id`. Returns false if the gate is closed or the ID
    /// is unknown.
    pub fn remove_obstacle(&mut self, id: usize) -> bool {
        if !self.enable_changes {
            debug!("remove_obstacle({}) rejected: changes disabled", id);
            return false;
        }
        if self.obstacles.remove(&id).is_none() {
            return false;
        }
        if let Some(index) = self.index.as_mut() {
            index.remove(id);
        }
        self.revision += 1;
        true
    }

    /// Store `obstacle` under `id` skipping every placement check. Used when
    /// restoring a saved map.
    pub(crate) fn insert_unchecked(&mut self, id: usize, obstacle: Obstacle) {
        if let Some(index) = self.index.as_mut() {
            index.insert(id, obstacle.polygon());
        }
        self.obstacles.insert(id, obstacle);
        self.next_id = self.next_id.max(id + 1);
        self.revision += 1;
    }

    /// IDs of obstacles whose polygon intersects `shape`, sorted and unique
    pub fn query_polygon(&self, shape: &Shape) -> Vec<usize> {
        let candidates: Vec<usize> = match &self.index {
            Some(index) => {
                let mut ids = index.query_region(&shape.bounds());
                ids.sort_unstable();
                ids.dedup();
                ids
            }
            None => self.obstacles.keys().copied().collect(),
        };

        candidates
            .into_iter()
            .filter(|id| {
                self.obstacles
                    .get(id)
                    .map_or(false, |o| polygon_intersects(o.polygon(), shape))
            })
            .collect()
    }

    /// True if `shape` touches any obstacle
    pub fn collides(&self, shape: &Shape) -> bool {
        !self.query_polygon(shape).is_empty()
    }

    /// True if `shape` touches the goal clearance circle
    pub fn touches_goal_zone(&self, shape: &Shape) -> bool {
        check_intersection(shape, &Shape::Circle(self.goal_zone()))
    }

    /// Advance every obstacle by `dt` seconds. Does nothing while changes
    /// are disabled.
    pub fn step_motion(&mut self, dt: f64) {
        if !self.enable_changes {
            return;
        }
        let mut moved = 0;
        for (id, obstacle) in self.obstacles.iter_mut() {
            if obstacle.step(dt) {
                moved += 1;
                if let Some(index) = self.index.as_mut() {
                    index.update(*id, obstacle.polygon());
                }
            }
        }
        trace!("step_motion: {} obstacles moved", moved);
    }

    /// Drop every obstacle and restart ID numbering
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.next_id = 0;
        if let Some(index) = self.index.as_mut() {
            index.clear();
        }
        self.revision += 1;
    }
}
