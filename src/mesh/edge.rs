// src/mesh/edge.rs
use std::fmt;

/// Unordered vertex pair identifying an edge, stored smallest index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(pub u32, pub u32);

impl EdgeKey {
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b {
            EdgeKey(a, b)
        } else {
            EdgeKey(b, a)
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// A mesh edge. The vertex order is kept as supplied because the edge
/// direction (`vertices[0] - vertices[1]`) feeds the edge plane normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub vertices: [u32; 2],
}

impl Edge {
    pub fn new(a: u32, b: u32) -> Self {
        Edge { vertices: [a, b] }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.vertices[0], self.vertices[1])
    }

    pub fn touches(&self, vertex: u32) -> bool {
        self.vertices[0] == vertex || self.vertices[1] == vertex
    }
}
