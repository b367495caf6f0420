// src/lib.rs

pub mod collision;
pub mod compiler;
pub mod config;
pub mod error;
pub mod format;
pub mod kd;
pub mod mesh;
pub mod utils;

pub use collision::{CollisionModel, PlaneIndex, PlaneTable};
pub use compiler::{CollisionCompiler, Compiled};
pub use config::CompileOptions;
pub use error::{CompileError, GeometryWarning, Result};
pub use format::{BinaryWriter, CollisionFile};
pub use mesh::{CollisionMesh, SceneObject};
