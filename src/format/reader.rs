// src/format/reader.rs

use std::io::{self, Cursor, Read};

use byteorder::{ReadBytesExt, LE};

use crate::error::{CompileError, Result};
use crate::format::MAGIC;
use crate::kd::{Axis, NodeRef};

/// Node record as stored: child references are still sign-encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileNode {
    pub axis: u32,
    pub distance: f32,
    pub near: i32,
    pub far: i32,
}

impl FileNode {
    pub fn split_axis(&self) -> Option<Axis> {
        Axis::from_index(self.axis)
    }

    pub fn children(&self) -> (NodeRef, NodeRef) {
        (NodeRef::decode(self.near), NodeRef::decode(self.far))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLeaf {
    pub count: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileBrush {
    pub sixdop: [f32; 6],
    pub start: u32,
    pub count: u32,
}

/// A collision file parsed back into its sections.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionFile {
    pub planes: Vec<[f32; 4]>,
    pub plane_indices: Vec<i32>,
    pub nodes: Vec<FileNode>,
    pub leaves: Vec<FileLeaf>,
    pub payload: Vec<u32>,
    /// Byte position of the first payload entry.
    pub payload_offset: u64,
    pub brushes: Vec<FileBrush>,
    pub sphere: [f32; 6],
}

impl CollisionFile {
    pub fn read(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);

        let mut magic = [0u8; 8];
        section(&mut cursor, "magic", |c| c.read_exact(&mut magic))?;
        if &magic != MAGIC {
            return Err(CompileError::InvalidMagic { found: magic.to_vec() });
        }

        let planes = section(&mut cursor, "planes", |c| {
            records(c, |c| {
                Ok([c.read_f32::<LE>()?, c.read_f32::<LE>()?, c.read_f32::<LE>()?, c.read_f32::<LE>()?])
            })
        })?;
        let plane_indices = section(&mut cursor, "plane indices", |c| records(c, |c| c.read_i32::<LE>()))?;
        let nodes = section(&mut cursor, "nodes", |c| {
            records(c, |c| {
                Ok(FileNode {
                    axis: c.read_u32::<LE>()?,
                    distance: c.read_f32::<LE>()?,
                    near: c.read_i32::<LE>()?,
                    far: c.read_i32::<LE>()?,
                })
            })
        })?;
        let leaves = section(&mut cursor, "leaves", |c| {
            records(c, |c| {
                Ok(FileLeaf {
                    count: c.read_u32::<LE>()?,
                    offset: c.read_u32::<LE>()?,
                })
            })
        })?;
        let payload_offset = cursor.position() + 4;
        let payload = section(&mut cursor, "leaf payload", |c| records(c, |c| c.read_u32::<LE>()))?;
        let brushes = section(&mut cursor, "brushes", |c| {
            records(c, |c| {
                let mut sixdop = [0f32; 6];
                c.read_f32_into::<LE>(&mut sixdop)?;
                Ok(FileBrush {
                    sixdop,
                    start: c.read_u32::<LE>()?,
                    count: c.read_u32::<LE>()?,
                })
            })
        })?;
        let mut sphere = [0f32; 6];
        section(&mut cursor, "sphere", |c| c.read_f32_into::<LE>(&mut sphere))?;

        Ok(CollisionFile {
            planes,
            plane_indices,
            nodes,
            leaves,
            payload,
            payload_offset,
            brushes,
            sphere,
        })
    }

    /// Brushes listed by `leaf`, resolving the inline single-brush form.
    /// `None` if the leaf points outside the payload.
    pub fn leaf_brushes(&self, leaf: usize) -> Option<Vec<u32>> {
        let FileLeaf { count, offset } = *self.leaves.get(leaf)?;
        match count {
            0 => Some(Vec::new()),
            1 => Some(vec![offset]),
            _ => {
                let byte = (offset as u64).checked_sub(self.payload_offset)?;
                let start = (byte / 4) as usize;
                self.payload.get(start..start + count as usize).map(<[u32]>::to_vec)
            }
        }
    }

    /// Signed plane references of `brush`. Empty if the span is out of range.
    pub fn brush_planes(&self, brush: usize) -> &[i32] {
        self.brushes
            .get(brush)
            .and_then(|b| self.plane_indices.get(b.start as usize..(b.start + b.count) as usize))
            .unwrap_or(&[])
    }
}

fn section<'a, T>(
    cursor: &mut Cursor<&'a [u8]>,
    name: &'static str,
    read: impl FnOnce(&mut Cursor<&'a [u8]>) -> io::Result<T>,
) -> Result<T> {
    let offset = cursor.position();
    read(cursor).map_err(|_| CompileError::Truncated { section: name, offset })
}

/// `u32` count followed by that many records.
fn records<'a, T>(
    cursor: &mut Cursor<&'a [u8]>,
    mut record: impl FnMut(&mut Cursor<&'a [u8]>) -> io::Result<T>,
) -> io::Result<Vec<T>> {
    let count = cursor.read_u32::<LE>()?;
    let mut items = Vec::new();
    for _ in 0..count {
        items.push(record(cursor)?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_file() -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        // planes, indices, nodes
        bytes.extend_from_slice(&[0; 12]);
        // one empty leaf at the payload position
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&36u32.to_le_bytes());
        // payload, brushes
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&[0; 24]);
        bytes
    }

    #[test]
    fn test_reads_empty_scene() {
        let file = CollisionFile::read(&empty_file()).expect("valid file");
        assert!(file.planes.is_empty());
        assert!(file.nodes.is_empty());
        assert_eq!(file.leaves, vec![FileLeaf { count: 0, offset: 36 }]);
        assert_eq!(file.payload_offset, 36);
        assert_eq!(file.leaf_brushes(0), Some(Vec::new()));
        assert_eq!(file.sphere, [0.0; 6]);
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let mut bytes = empty_file();
        bytes[0] = b'X';
        match CollisionFile::read(&bytes) {
            Err(CompileError::InvalidMagic { found }) => assert_eq!(&found[1..], &MAGIC[1..]),
            other => panic!("expected InvalidMagic, got {:?}", other),
        }
    }

    #[test]
    fn test_truncation_names_the_section() {
        let bytes = empty_file();
        match CollisionFile::read(&bytes[..bytes.len() - 4]) {
            Err(CompileError::Truncated { section, offset }) => {
                assert_eq!(section, "sphere");
                assert_eq!(offset, bytes.len() as u64 - 24);
            }
            other => panic!("expected Truncated, got {:?}", other),
        }
        assert!(matches!(
            CollisionFile::read(&bytes[..5]),
            Err(CompileError::Truncated { section: "magic", offset: 0 })
        ));
    }
}
