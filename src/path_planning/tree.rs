//! Arena-backed search tree
//!
//! Nodes live in one `Vec` and refer to their parent by index. Children
//! lists are kept in step with the parent links so cost updates can walk
//! down the tree. Edges are derived from the parent links on demand.

use crate::common::Point2D;
use crate::geometry::{Segment, Shape};

/// A vertex of the search tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub point: Point2D,
    pub parent: Option<usize>,
    /// Path length from the root
    pub cost: f64,
    /// Estimated cost to the goal
    pub heuristic: f64,
    /// Cleared when the edge to this node, or to an ancestor, is blocked
    pub valid: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
    children: Vec<Vec<usize>>,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(point: Point2D, heuristic: f64) -> Self {
        let mut tree = Self::new();
        tree.add(point, None, heuristic);
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Panics on an out of range index, like slice indexing
    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    pub fn get(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    pub fn children(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    /// Append a node under `parent` and return its index. The cost is
    /// derived from the parent.
    pub fn add(&mut self, point: Point2D, parent: Option<usize>, heuristic: f64) -> usize {
        let cost = parent
            .map(|p| self.nodes[p].cost + self.nodes[p].point.distance(&point))
            .unwrap_or(0.0);
        let index = self.nodes.len();
        self.nodes.push(TreeNode { point, parent, cost, heuristic, valid: true });
        self.children.push(Vec::new());
        if let Some(p) = parent {
            self.children[p].push(index);
        }
        index
    }

    /// True if `ancestor` lies on the parent chain of `index` (or is it)
    pub fn is_ancestor(&self, ancestor: usize, index: usize) -> bool {
        let mut current = Some(index);
        while let Some(i) = current {
            if i == ancestor {
                return true;
            }
            current = self.nodes[i].parent;
        }
        false
    }

    /// Re-parent `child` under `parent` and update the cost of its whole
    /// subtree. Refuses moves that would create a cycle.
    pub fn set_parent(&mut self, child: usize, parent: usize) -> bool {
        if self.is_ancestor(child, parent) {
            return false;
        }
        if let Some(old) = self.nodes[child].parent {
            self.children[old].retain(|&c| c != child);
        }
        self.nodes[child].parent = Some(parent);
        self.children[parent].push(child);
        self.propagate_cost(child);
        true
    }

    /// Recompute costs from `index` down through its descendants
    pub fn propagate_cost(&mut self, index: usize) {
        let mut stack = vec![index];
        while let Some(i) = stack.pop() {
            if let Some(p) = self.nodes[i].parent {
                self.nodes[i].cost = self.nodes[p].cost + self.nodes[p].point.distance(&self.nodes[i].point);
            }
            stack.extend(self.children[i].iter().copied());
        }
    }

    /// Make `index` the root by reversing the parent links on its chain to
    /// the old root. Edges keep their endpoints; costs are recomputed.
    pub fn reroot(&mut self, index: usize) {
        let chain = self.backtrack_indices(index);
        for pair in chain.windows(2) {
            let (parent, child) = (pair[0], pair[1]);
            self.children[parent].retain(|&c| c != child);
            self.nodes[parent].parent = Some(child);
            self.children[child].push(parent);
        }
        self.nodes[index].parent = None;
        self.nodes[index].cost = 0.0;
        self.propagate_cost(index);
    }

    /// `(parent, child)` pairs
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.parent.map(|p| (p, i)))
            .collect()
    }

    /// Node indices from the root to `index`, both included
    pub fn backtrack_indices(&self, index: usize) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            indices.push(i);
            current = self.nodes[i].parent;
        }
        indices.reverse();
        indices
    }

    /// Points from the root to `index`, both included
    pub fn backtrack(&self, index: usize) -> Vec<Point2D> {
        self.backtrack_indices(index)
            .into_iter()
            .map(|i| self.nodes[i].point)
            .collect()
    }

    /// Closest valid node; ties keep the lowest index
    pub fn nearest(&self, point: &Point2D) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, node) in self.nodes.iter().enumerate() {
            if !node.valid {
                continue;
            }
            let d = node.point.distance(point);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Valid nodes within `radius` of `point`, in index order
    pub fn within(&self, point: &Point2D, radius: f64) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.valid && n.point.distance(point) <= radius)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn descendants(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.children[index].clone();
        while let Some(i) = stack.pop() {
            out.push(i);
            stack.extend(self.children[i].iter().copied());
        }
        out
    }

    /// Mark `index` invalid. Returns false if it already was.
    pub fn invalidate(&mut self, index: usize) -> bool {
        let was_valid = self.nodes[index].valid;
        self.nodes[index].valid = false;
        was_valid
    }

    /// Push invalidity from every invalid node down to all its descendants.
    /// Returns how many nodes changed.
    pub fn cascade_invalid(&mut self) -> usize {
        let roots: Vec<usize> = (0..self.nodes.len()).filter(|&i| !self.nodes[i].valid).collect();
        let mut changed = 0;
        for root in roots {
            for d in self.descendants(root) {
                if self.invalidate(d) {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Drop invalid nodes, and any node cut off from a root by them.
    /// Returns the old-to-new index map.
    pub fn retain_valid(&mut self) -> Vec<Option<usize>> {
        let mut keep = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| self.nodes[i].parent.is_none() && self.nodes[i].valid)
            .collect();
        while let Some(i) = stack.pop() {
            keep[i] = true;
            stack.extend(self.children[i].iter().copied().filter(|&c| self.nodes[c].valid));
        }

        let mut remap = vec![None; self.nodes.len()];
        let mut next = 0;
        for (i, k) in keep.iter().enumerate() {
            if *k {
                remap[i] = Some(next);
                next += 1;
            }
        }

        let old_nodes = std::mem::take(&mut self.nodes);
        let old_children = std::mem::take(&mut self.children);
        for (i, mut node) in old_nodes.into_iter().enumerate() {
            if !keep[i] {
                continue;
            }
            node.parent = node.parent.and_then(|p| remap[p]);
            self.nodes.push(node);
            self.children.push(old_children[i].iter().filter_map(|&c| remap[c]).collect());
        }
        remap
    }

    /// Segments of every edge, for drawing
    pub fn edge_shapes(&self) -> Vec<Shape> {
        self.edges()
            .into_iter()
            .map(|(p, c)| Shape::Segment(Segment::new(self.nodes[p].point, self.nodes[c].point)))
            .collect()
    }

    /// Check the structural invariants: parents and children agree, every
    /// node reaches a root without a cycle, costs match edge lengths.
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        for (i, node) in self.nodes.iter().enumerate() {
            match node.parent {
                Some(p) => {
                    if p >= self.nodes.len() || !self.children[p].contains(&i) {
                        return false;
                    }
                    let expected = self.nodes[p].cost + self.nodes[p].point.distance(&node.point);
                    if (node.cost - expected).abs() > tolerance {
                        return false;
                    }
                }
                None => {
                    if node.cost != 0.0 {
                        return false;
                    }
                }
            }
            if self.children[i].iter().any(|&c| self.nodes[c].parent != Some(i)) {
                return false;
            }
            // a chain longer than the tree means a cycle
            let mut steps = 0;
            let mut current = node.parent;
            while let Some(p) = current {
                steps += 1;
                if steps > self.nodes.len() {
                    return false;
                }
                current = self.nodes[p].parent;
            }
        }
        true
    }
}
