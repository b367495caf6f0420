// src/mesh/mod.rs
pub mod collision_mesh;
pub mod edge;
pub mod face;
pub mod scene;

pub use collision_mesh::CollisionMesh;
pub use edge::{Edge, EdgeKey};
pub use face::Face;
pub use scene::SceneObject;
