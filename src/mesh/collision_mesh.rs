// src/mesh/collision_mesh.rs

use std::collections::{HashMap, HashSet};

use crate::error::{CompileError, Result};
use crate::mesh::{Edge, EdgeKey, Face};
use crate::utils::Vec3;

/// The mesh view the compiler consumes: positions, per-vertex normals,
/// faces with normals, and the edge list.
#[derive(Debug, Clone, Default)]
pub struct CollisionMesh {
    pub positions: Vec<Vec3>,
    pub vertex_normals: Vec<Vec3>,
    pub faces: Vec<Face>,
    pub edges: Vec<Edge>,
}

impl CollisionMesh {
    /// Wraps host-supplied data as is. `edges` may contain loose edges.
    pub fn new(positions: Vec<Vec3>, vertex_normals: Vec<Vec3>, faces: Vec<Face>, edges: Vec<Edge>) -> Self {
        CollisionMesh {
            positions,
            vertex_normals,
            faces,
            edges,
        }
    }

    /// Builds a mesh from raw polygons, deriving what a host would
    /// normally precompute: Newell face normals, face-averaged vertex
    /// normals and the edge list in first-appearance order.
    pub fn from_polygons(positions: Vec<Vec3>, polygons: Vec<Vec<u32>>) -> Self {
        let faces: Vec<Face> = polygons
            .into_iter()
            .map(|vertices| {
                let normal = newell_normal(&positions, &vertices);
                Face::new(vertices, normal)
            })
            .collect();

        let mut vertex_normals = vec![Vec3::ZERO; positions.len()];
        for face in &faces {
            let mut seen = HashSet::new();
            for &vertex in &face.vertices {
                if let Some(normal) = vertex_normals.get_mut(vertex as usize) {
                    if seen.insert(vertex) {
                        *normal = *normal + face.normal;
                    }
                }
            }
        }
        for normal in vertex_normals.iter_mut() {
            *normal = normal.normalize();
        }

        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for face in &faces {
            let count = face.vertices.len();
            for i in 0..count {
                let (a, b) = (face.vertices[i], face.vertices[(i + 1) % count]);
                if a != b && seen.insert(EdgeKey::new(a, b)) {
                    edges.push(Edge::new(a, b));
                }
            }
        }

        CollisionMesh::new(positions, vertex_normals, faces, edges)
    }

    pub fn position(&self, vertex: u32) -> Vec3 {
        self.positions[vertex as usize]
    }

    /// Normal for `vertex`, zero when the host supplied none.
    pub fn vertex_normal(&self, vertex: u32) -> Vec3 {
        self.vertex_normals.get(vertex as usize).copied().unwrap_or(Vec3::ZERO)
    }

    /// Checks that every face index addresses a position.
    pub fn validate(&self, object: &str) -> Result<()> {
        for (face_index, face) in self.faces.iter().enumerate() {
            if let Some(&vertex) = face.vertices.iter().find(|&&v| v as usize >= self.positions.len()) {
                return Err(CompileError::VertexOutOfRange {
                    object: object.to_string(),
                    face: face_index,
                    vertex,
                    vertex_count: self.positions.len(),
                });
            }
        }
        Ok(())
    }

    /// For each entry of `edges`, the faces (in face order) that contain it.
    /// Faces with `usable[face] == false` are left out.
    pub fn edge_adjacency(&self, usable: &[bool]) -> Vec<Vec<usize>> {
        let mut by_key: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
        for (face_index, face) in self.faces.iter().enumerate() {
            if !usable[face_index] {
                continue;
            }
            for key in face.edge_keys() {
                let faces = by_key.entry(key).or_default();
                if faces.last() != Some(&face_index) {
                    faces.push(face_index);
                }
            }
        }
        self.edges
            .iter()
            .map(|edge| by_key.get(&edge.key()).cloned().unwrap_or_default())
            .collect()
    }

    /// For each vertex, the usable faces (in face order) that use it.
    pub fn vertex_incidence(&self, usable: &[bool]) -> Vec<Vec<usize>> {
        let mut incidence = vec![Vec::new(); self.positions.len()];
        for (face_index, face) in self.faces.iter().enumerate() {
            if !usable[face_index] {
                continue;
            }
            for &vertex in &face.vertices {
                let faces: &mut Vec<usize> = &mut incidence[vertex as usize];
                if faces.last() != Some(&face_index) {
                    faces.push(face_index);
                }
            }
        }
        incidence
    }

    /// The 8 corners of the axis-aligned box around all positions.
    pub fn bounding_corners(&self) -> [Vec3; 8] {
        let Some(first) = self.positions.first() else {
            return [Vec3::ZERO; 8];
        };
        let (min, max) = self
            .positions
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(p), max.max(p)));
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
        }
        corners
    }
}

fn newell_normal(positions: &[Vec3], vertices: &[u32]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, &a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        if let (Some(p), Some(q)) = (positions.get(a as usize), positions.get(b as usize)) {
            normal = normal
                + Vec3::new(
                    (p.y - q.y) * (p.z + q.z),
                    (p.z - q.z) * (p.x + q.x),
                    (p.x - q.x) * (p.y + q.y),
                );
        }
    }
    normal.normalize()
}
