// src/mesh/face.rs
use crate::mesh::EdgeKey;
use crate::utils::Vec3;

/// A polygon of the collision mesh with its precomputed unit normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub vertices: Vec<u32>,
    pub normal: Vec3,
}

impl Face {
    pub fn new(vertices: Vec<u32>, normal: Vec3) -> Self {
        Face { vertices, normal }
    }

    /// Number of different vertex indices the face uses.
    pub fn distinct_vertex_count(&self) -> usize {
        let mut sorted = self.vertices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        sorted.len()
    }

    /// Fewer than three distinct vertices, or a normal that is not unit
    /// length within `epsilon` (collinear vertices leave a zero normal).
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.distinct_vertex_count() < 3 || (self.normal.length() - 1.0).abs() > epsilon
    }

    /// Keys of the boundary edges, in winding order. Repeated consecutive
    /// indices do not form an edge.
    pub fn edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        let count = self.vertices.len();
        (0..count).filter_map(move |i| {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % count];
            (a != b).then(|| EdgeKey::new(a, b))
        })
    }
}
