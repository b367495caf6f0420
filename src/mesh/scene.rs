// src/mesh/scene.rs
use crate::mesh::CollisionMesh;
use crate::utils::Vec3;

/// An entry of the exported scene. Only mesh-bearing objects contribute
/// collision data; everything else (armatures, lights, empties) is carried
/// so callers can hand over a whole scene without filtering it first.
#[derive(Debug, Clone)]
pub enum SceneObject {
    Mesh {
        name: String,
        mesh: CollisionMesh,
        /// World-space corners of the object's bounding box.
        world_bounds: [Vec3; 8],
    },
    Other {
        name: String,
    },
}

impl SceneObject {
    /// Mesh object whose world bounds are its own local bounds.
    pub fn mesh(name: impl Into<String>, mesh: CollisionMesh) -> Self {
        let world_bounds = mesh.bounding_corners();
        SceneObject::Mesh {
            name: name.into(),
            mesh,
            world_bounds,
        }
    }

    pub fn other(name: impl Into<String>) -> Self {
        SceneObject::Other { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            SceneObject::Mesh { name, .. } | SceneObject::Other { name } => name,
        }
    }
}
