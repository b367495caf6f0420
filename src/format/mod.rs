// src/format/mod.rs

//! The compiled collision file. Everything is little-endian; integers are
//! 32 bits wide and floats are IEEE single precision.
//!
//! ```text
//! section        count  record
//! -------------  -----  ---------------------------------------------
//! magic              -  "AEONCLN\0" (8 bytes)
//! planes           u32  f32 nx, ny, nz, d                   (16 bytes)
//! plane indices    u32  i32, negative = flipped plane        (4 bytes)
//! nodes            u32  u32 axis, f32 distance, i32 near, i32 far (16)
//! leaves           u32  u32 count, u32 offset                (8 bytes)
//! leaf payload     u32  u32 brush index                      (4 bytes)
//! brushes          u32  f32 +x +y +z -x -y -z, u32 start, u32 count (32)
//! sphere             -  f32 cx, cy, cz, rx, ry, rz          (24 bytes)
//! ```
//!
//! A leaf holding exactly one brush stores the brush index in `offset`.
//! Any other leaf stores the absolute byte position in the file where its
//! entries start inside the leaf payload. Node children are node indices
//! when non-negative and `-(leaf + 1)` otherwise.

pub mod reader;
pub mod text;
pub mod writer;

pub use reader::{CollisionFile, FileBrush, FileLeaf, FileNode};
pub use writer::BinaryWriter;

use crate::collision::CollisionModel;

pub const MAGIC: &[u8; 8] = b"AEONCLN\0";

pub const PLANE_RECORD_SIZE: usize = 16;
pub const INDEX_RECORD_SIZE: usize = 4;
pub const NODE_RECORD_SIZE: usize = 16;
pub const LEAF_RECORD_SIZE: usize = 8;
pub const BRUSH_RECORD_SIZE: usize = 32;
const COUNT_SIZE: usize = 4;

/// Leaf records and the payload they point into, as they will be written.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LeafLayout {
    /// `(count, offset)` per leaf.
    pub records: Vec<(u32, u32)>,
    pub payload: Vec<u32>,
}

/// Byte position of the first leaf payload entry.
pub(crate) fn payload_offset(model: &CollisionModel) -> usize {
    MAGIC.len()
        + COUNT_SIZE
        + model.planes.len() * PLANE_RECORD_SIZE
        + COUNT_SIZE
        + model.plane_indices.len() * INDEX_RECORD_SIZE
        + COUNT_SIZE
        + model.tree.nodes.len() * NODE_RECORD_SIZE
        + COUNT_SIZE
        + model.tree.leaves.len() * LEAF_RECORD_SIZE
        + COUNT_SIZE
}

pub(crate) fn layout_leaves(model: &CollisionModel) -> LeafLayout {
    let base = payload_offset(model);
    let mut records = Vec::with_capacity(model.tree.leaves.len());
    let mut payload = Vec::new();
    for leaf in &model.tree.leaves {
        let count = leaf.brush_indices.len() as u32;
        if count == 1 {
            records.push((1, leaf.brush_indices[0]));
        } else {
            let offset = base + payload.len() * INDEX_RECORD_SIZE;
            records.push((count, offset as u32));
            payload.extend_from_slice(&leaf.brush_indices);
        }
    }
    LeafLayout { records, payload }
}
