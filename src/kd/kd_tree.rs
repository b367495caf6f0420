// src/kd/kd_tree.rs

use std::cmp::Ordering;
use std::collections::HashSet;

use log::debug;

use crate::kd::{Axis, KdLeaf, KdNode, NodeRef, Placement, PointSide};
use crate::utils::util::quantize;
use crate::utils::Vec3;

/// Scene-wide set of distinct vertex positions, in first-seen order.
/// Positions that fall into the same epsilon cell count as one.
#[derive(Debug, Clone)]
pub struct PointSet {
    points: Vec<Vec3>,
    seen: HashSet<(i64, i64, i64)>,
    epsilon: f64,
}

impl PointSet {
    pub fn new(epsilon: f64) -> Self {
        PointSet {
            points: Vec::new(),
            seen: HashSet::new(),
            epsilon,
        }
    }

    /// Adds `point` unless an equivalent one is already present.
    pub fn insert(&mut self, point: Vec3) -> bool {
        if self.seen.insert(quantize(&point, self.epsilon)) {
            self.points.push(point);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Vec3> {
        self.points
    }
}

impl Extend<Vec3> for PointSet {
    fn extend<I: IntoIterator<Item = Vec3>>(&mut self, iter: I) {
        for point in iter {
            self.insert(point);
        }
    }
}

/// Median-split point k-d tree stored as two flat arrays.
///
/// Nodes are numbered in pre-order and leaves in the order the recursion
/// reaches them, so node 0 is the root whenever the tree has any node.
/// A tree built from no points is a single empty leaf.
#[derive(Debug, Clone)]
pub struct KdTree {
    pub nodes: Vec<KdNode>,
    pub leaves: Vec<KdLeaf>,
    pub root: NodeRef,
    epsilon: f64,
}

impl KdTree {
    pub fn build(mut points: Vec<Vec3>, epsilon: f64) -> Self {
        let mut tree = KdTree {
            nodes: Vec::new(),
            leaves: Vec::new(),
            root: NodeRef::Leaf(0),
            epsilon,
        };
        tree.root = tree.build_recursive(&mut points, Axis::X);
        debug!(
            "k-d tree: {} points, {} nodes, {} leaves, depth {}",
            points.len(),
            tree.nodes.len(),
            tree.leaves.len(),
            tree.depth()
        );
        tree
    }

    fn build_recursive(&mut self, points: &mut [Vec3], axis: Axis) -> NodeRef {
        if points.is_empty() {
            self.leaves.push(KdLeaf::default());
            return NodeRef::Leaf((self.leaves.len() - 1) as u32);
        }

        let a = axis.index();
        points.sort_by(|p, q| p.get(a).partial_cmp(&q.get(a)).unwrap_or(Ordering::Equal));
        let median = points.len() / 2;

        let index = self.nodes.len();
        self.nodes.push(KdNode {
            axis,
            distance: points[median].get(a),
            near: NodeRef::Leaf(0),
            far: NodeRef::Leaf(0),
        });

        // The median point only fixes the split distance and goes to
        // neither half.
        let (near_points, rest) = points.split_at_mut(median);
        let near = self.build_recursive(near_points, axis.next());
        let far = self.build_recursive(&mut rest[1..], axis.next());

        let node = &mut self.nodes[index];
        node.near = near;
        node.far = far;
        NodeRef::Node(index as u32)
    }

    pub fn classify_point(&self, point: &Vec3, node: &KdNode) -> PointSide {
        let distance = point.get(node.axis.index()) - node.distance;
        if distance > self.epsilon {
            PointSide::Front
        } else if distance < -self.epsilon {
            PointSide::Back
        } else {
            PointSide::On
        }
    }

    pub fn classify_polygon(&self, polygon: &[Vec3], normal: &Vec3, node: &KdNode) -> Placement {
        let (mut front, mut behind) = (0, 0);
        for point in polygon {
            match self.classify_point(point, node) {
                PointSide::Front => front += 1,
                PointSide::Back => behind += 1,
                PointSide::On => {}
            }
        }
        match (front, behind) {
            (f, b) if f > 0 && b > 0 => Placement::Straddling,
            (f, _) if f > 0 => Placement::Far,
            (_, b) if b > 0 => Placement::Near,
            // Coplanar with the split: follow the normal along the axis.
            _ if normal.get(node.axis.index()) < 0.0 => Placement::Near,
            _ => Placement::Far,
        }
    }

    /// Classifies every polygon from the root. The `i`-th polygon is
    /// recorded as brush `i`.
    pub fn assign<'p, I>(&mut self, polygons: I)
    where
        I: IntoIterator<Item = (&'p [Vec3], &'p Vec3)>,
    {
        for (brush, (polygon, normal)) in polygons.into_iter().enumerate() {
            self.insert_polygon(brush as u32, polygon, normal);
        }
    }

    /// Appends `brush` to every leaf the polygon reaches from the root.
    pub fn insert_polygon(&mut self, brush: u32, polygon: &[Vec3], normal: &Vec3) {
        self.insert_at(self.root, brush, polygon, normal);
    }

    fn insert_at(&mut self, at: NodeRef, brush: u32, polygon: &[Vec3], normal: &Vec3) {
        match at {
            NodeRef::Leaf(leaf) => self.leaves[leaf as usize].brush_indices.push(brush),
            NodeRef::Node(index) => {
                let node = &self.nodes[index as usize];
                let (near, far) = (node.near, node.far);
                match self.classify_polygon(polygon, normal, node) {
                    Placement::Near => self.insert_at(near, brush, polygon, normal),
                    Placement::Far => self.insert_at(far, brush, polygon, normal),
                    Placement::Straddling => {
                        self.insert_at(near, brush, polygon, normal);
                        self.insert_at(far, brush, polygon, normal);
                    }
                }
            }
        }
    }

    /// Number of internal nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(tree: &KdTree, at: NodeRef) -> usize {
            match at {
                NodeRef::Leaf(_) => 0,
                NodeRef::Node(index) => {
                    let node = &tree.nodes[index as usize];
                    1 + walk(tree, node.near).max(walk(tree, node.far))
                }
            }
        }
        walk(self, self.root)
    }

    /// Leaves that list `brush`.
    pub fn leaves_of(&self, brush: u32) -> Vec<usize> {
        self.leaves
            .iter()
            .enumerate()
            .filter(|(_, leaf)| leaf.brush_indices.contains(&brush))
            .map(|(index, _)| index)
            .collect()
    }
}
