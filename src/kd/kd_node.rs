// src/kd/kd_node.rs

use crate::kd::Axis;

/// Child reference inside the flat node/leaf arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Node(u32),
    Leaf(u32),
}

impl NodeRef {
    /// Wire form: nodes as their index, leaves as `-(index + 1)`.
    pub fn encode(self) -> i32 {
        match self {
            NodeRef::Node(index) => index as i32,
            NodeRef::Leaf(index) => -(index as i32) - 1,
        }
    }

    pub fn decode(value: i32) -> Self {
        if value < 0 {
            NodeRef::Leaf((-(value + 1)) as u32)
        } else {
            NodeRef::Node(value as u32)
        }
    }
}

/// Internal node. `near` covers coordinates `<= distance` on `axis`,
/// `far` the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct KdNode {
    pub axis: Axis,
    pub distance: f64,
    pub near: NodeRef,
    pub far: NodeRef,
}

/// Terminal cell, filled with brush indices once the tree is complete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KdLeaf {
    pub brush_indices: Vec<u32>,
}

impl KdLeaf {
    pub fn is_empty(&self) -> bool {
        self.brush_indices.is_empty()
    }
}
