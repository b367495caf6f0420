// src/collision/mod.rs
pub mod brush;
pub mod brush_builder;
pub mod model;
pub mod plane_table;

pub use brush::{Brush, SixDop};
pub use brush_builder::{BrushBuilder, FaceBrush, MeshBrushes};
pub use model::{BoundingSphere, CollisionModel};
pub use plane_table::{PlaneIndex, PlaneTable};
