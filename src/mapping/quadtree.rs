//! Region quadtree over obstacle polygons
//!
//! Each node holds up to `capacity` `(id, polygon)` items before it splits
//! into exactly four quadrants of its own bounds. A split node keeps no items
//! itself. A polygon overlapping several quadrants is stored in every one of
//! them, so queries can return the same ID more than once.
//!
//! The index prunes by bounding box only. Callers post-filter with an exact
//! intersection test.

use crate::geometry::{BoundingBox, Polygon};

/// Items per node before it splits
pub const DEFAULT_CAPACITY: usize = 4;

/// Depth at which leaves stop splitting and just grow
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// A single node of the quadtree
#[derive(Debug, Clone)]
pub struct QuadTreeNode {
    bounds: BoundingBox,
    depth: usize,
    items: Vec<(usize, Polygon)>,
    children: Option<Box<[QuadTreeNode; 4]>>,
}

impl QuadTreeNode {
    pub fn new(bounds: BoundingBox, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn items(&self) -> &[(usize, Polygon)] {
        &self.items
    }

    pub fn children(&self) -> Option<&[QuadTreeNode; 4]> {
        self.children.as_deref()
    }

    pub fn is_split(&self) -> bool {
        self.children.is_some()
    }

    fn insert(&mut self, id: usize, polygon: &Polygon, capacity: usize, max_depth: usize) -> bool {
        if !self.bounds.overlaps(&polygon.bounds()) {
            return false;
        }

        if let Some(children) = self.children.as_mut() {
            // no short-circuit: every overlapping quadrant gets a copy
            let mut accepted = false;
            for child in children.iter_mut() {
                accepted |= child.insert(id, polygon, capacity, max_depth);
            }
            return accepted;
        }

        if self.items.len() < capacity || self.depth >= max_depth {
            self.items.push((id, polygon.clone()));
            return true;
        }

        self.subdivide(capacity, max_depth);
        self.insert(id, polygon, capacity, max_depth)
    }

    fn subdivide(&mut self, capacity: usize, max_depth: usize) {
        let depth = self.depth + 1;
        let mut children = Box::new(self.bounds.quadrants().map(|b| QuadTreeNode::new(b, depth)));

        for (id, polygon) in self.items.drain(..) {
            for child in children.iter_mut() {
                child.insert(id, &polygon, capacity, max_depth);
            }
        }

        self.children = Some(children);
    }

    fn remove(&mut self, id: usize) -> bool {
        let before = self.items.len();
        self.items.retain(|(item_id, _)| *item_id != id);
        let mut removed = self.items.len() != before;

        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                removed |= child.remove(id);
            }
        }
        removed
    }

    fn query(&self, region: &BoundingBox, out: &mut Vec<usize>) {
        if !self.bounds.overlaps(region) {
            return;
        }

        out.extend(
            self.items.iter()
                .filter(|(_, polygon)| polygon.bounds().overlaps(region))
                .map(|(id, _)| *id),
        );

        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query(region, out);
            }
        }
    }

    fn collect_ids(&self, out: &mut Vec<usize>) {
        out.extend(self.items.iter().map(|(id, _)| *id));
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.collect_ids(out);
            }
        }
    }

    fn count_nodes(&self) -> usize {
        1 + self.children.as_ref()
            .map(|c| c.iter().map(|n| n.count_nodes()).sum())
            .unwrap_or(0)
    }
}

/// Quadtree index mirroring obstacle IDs to their polygons
#[derive(Debug, Clone)]
pub struct QuadTree {
    root: QuadTreeNode,
    capacity: usize,
    max_depth: usize,
    /// Items whose bounds leave the root region (e.g. obstacles that drifted
    /// off the map). Always checked by queries.
    outliers: Vec<(usize, Polygon)>,
}

impl QuadTree {
    pub fn new(bounds: BoundingBox) -> Self {
        Self::with_capacity(bounds, DEFAULT_CAPACITY, DEFAULT_MAX_DEPTH)
    }

    pub fn with_capacity(bounds: BoundingBox, capacity: usize, max_depth: usize) -> Self {
        Self {
            root: QuadTreeNode::new(bounds, 0),
            capacity: capacity.max(1),
            max_depth,
            outliers: Vec::new(),
        }
    }

    pub fn root(&self) -> &QuadTreeNode {
        &self.root
    }

    /// Insert `polygon` under `id`. Returns false when the polygon lies
    /// outside the root bounds; it is then kept as an outlier.
    pub fn insert(&mut self, id: usize, polygon: &Polygon) -> bool {
        let inserted = self.root.insert(id, polygon, self.capacity, self.max_depth);
        if !inserted {
            self.outliers.push((id, polygon.clone()));
        }
        inserted
    }

    /// Remove `id` from every node. Children are never merged back.
    pub fn remove(&mut self, id: usize) -> bool {
        let before = self.outliers.len();
        self.outliers.retain(|(item_id, _)| *item_id != id);
        let removed_outlier = self.outliers.len() != before;
        self.root.remove(id) || removed_outlier
    }

    /// Replace the stored polygon of `id`
    pub fn update(&mut self, id: usize, polygon: &Polygon) {
        self.remove(id);
        self.insert(id, polygon);
    }

    /// IDs whose polygon bounds overlap `region`. May contain duplicates.
    pub fn query_region(&self, region: &BoundingBox) -> Vec<usize> {
        let mut out = Vec::new();
        self.root.query(region, &mut out);
        out.extend(
            self.outliers.iter()
                .filter(|(_, polygon)| polygon.bounds().overlaps(region))
                .map(|(id, _)| *id),
        );
        out
    }

    /// Number of distinct IDs stored
    pub fn len(&self) -> usize {
        let mut ids = Vec::new();
        self.root.collect_ids(&mut ids);
        ids.extend(self.outliers.iter().map(|(id, _)| *id));
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.root = QuadTreeNode::new(self.root.bounds, 0);
        self.outliers.clear();
    }

    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }
}
