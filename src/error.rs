//! Error handling for the collision compiler.
//!
//! Two kinds of problems show up during a compile. Bad input geometry is
//! recoverable: it becomes a [`GeometryWarning`], the offending face or edge
//! is skipped and the compile carries on. Broken internal invariants and
//! sink failures are fatal and surface as [`CompileError`].

use crate::mesh::EdgeKey;
use thiserror::Error;

/// Fatal compile, write or read failure.
#[derive(Error, Debug)]
pub enum CompileError {
    /// A brush points at a plane the table does not hold.
    #[error("brush {brush} references plane index {index}, but the table holds {plane_count} planes")]
    InvalidPlaneReference {
        brush: usize,
        index: i32,
        plane_count: usize,
    },

    /// A k-d leaf lists a brush that does not exist.
    #[error("leaf {leaf} references brush {brush}, but only {brush_count} brushes exist")]
    InvalidBrushReference {
        leaf: usize,
        brush: u32,
        brush_count: usize,
    },

    /// A k-d node child reference points outside the node or leaf arrays.
    #[error("node {node} has dangling child reference {reference}")]
    InvalidNodeReference { node: usize, reference: i32 },

    /// A face uses a vertex index past the end of the position array.
    #[error("object '{object}' face {face} uses vertex {vertex}, but the mesh has {vertex_count} vertices")]
    VertexOutOfRange {
        object: String,
        face: usize,
        vertex: u32,
        vertex_count: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid magic bytes: {found:?}")]
    InvalidMagic { found: Vec<u8> },

    #[error("collision data truncated in {section} at offset {offset}")]
    Truncated { section: &'static str, offset: u64 },

    #[error("invalid compile options: {0}")]
    Config(#[from] serde_json::Error),

    /// Tolerance that would break quantization and plane matching.
    #[error("epsilon must be finite and positive, got {epsilon}")]
    InvalidEpsilon { epsilon: f64 },
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Recoverable geometry anomaly. Collected and reported after the compile.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryWarning {
    /// Edge bordered by zero or more than two faces; it yields no edge planes.
    #[error("object '{object}': non-manifold edge {edge} shared by {face_count} faces")]
    NonManifoldEdge {
        object: String,
        edge: EdgeKey,
        face_count: usize,
    },

    /// Face with fewer than three distinct vertices, or whose vertices are
    /// collinear so it has no normal; no brush is produced.
    #[error("object '{object}': face {face} is degenerate ({distinct_vertices} distinct vertices or no normal)")]
    DegenerateFace {
        object: String,
        face: usize,
        distinct_vertices: usize,
    },

    /// Zero-length edge, or two faces with opposing normals along an edge.
    #[error("object '{object}': edge {edge} has no usable direction or normal")]
    DegenerateEdge { object: String, edge: EdgeKey },
}
