// src/kd/mod.rs
pub mod kd_node;
pub mod kd_tree;

pub use kd_node::{KdLeaf, KdNode, NodeRef};
pub use kd_tree::{KdTree, PointSet};

/// Splitting axis. The tree cycles X, Y, Z by depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const CYCLE: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn from_index(index: u32) -> Option<Axis> {
        Axis::CYCLE.get(index as usize).copied()
    }

    pub fn next(self) -> Axis {
        Axis::CYCLE[(self.index() + 1) % 3]
    }
}

/// Where a point lies relative to a node's splitting plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointSide {
    Front,
    Back,
    On,
}

/// Which children a polygon must descend into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Near,
    Far,
    Straddling,
}
