// src/format/writer.rs

use std::io::{self, Write};

use byteorder::{WriteBytesExt, LE};
use log::debug;
use rayon::prelude::*;

use crate::collision::{Brush, CollisionModel, PlaneIndex};
use crate::config::CompileOptions;
use crate::error::Result;
use crate::format::{layout_leaves, MAGIC};
use crate::kd::KdNode;
use crate::utils::Plane;

/// Serializes a [`CollisionModel`] into the collision file layout.
///
/// The model is validated first and the whole file is assembled in memory,
/// so a sink only ever sees one complete `write_all`.
#[derive(Debug, Clone, Copy)]
pub struct BinaryWriter {
    parallel: bool,
}

impl BinaryWriter {
    pub fn new(parallel: bool) -> Self {
        BinaryWriter { parallel }
    }

    pub fn from_options(options: &CompileOptions) -> Self {
        BinaryWriter::new(options.parallel_packing)
    }

    pub fn write<W: Write>(&self, model: &CollisionModel, sink: &mut W) -> Result<()> {
        let bytes = self.to_bytes(model)?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self, model: &CollisionModel) -> Result<Vec<u8>> {
        model.validate()?;
        let leaves = layout_leaves(model);

        let mut out = Vec::new();
        out.write_all(MAGIC)?;

        self.section(&mut out, model.planes.planes(), write_plane)?;
        self.section(&mut out, &model.plane_indices, |buf, index: &PlaneIndex| {
            buf.write_i32::<LE>(index.0)
        })?;
        self.section(&mut out, &model.tree.nodes, write_node)?;
        self.section(&mut out, &leaves.records, |buf, &(count, offset): &(u32, u32)| {
            buf.write_u32::<LE>(count)?;
            buf.write_u32::<LE>(offset)
        })?;
        self.section(&mut out, &leaves.payload, |buf, &brush: &u32| buf.write_u32::<LE>(brush))?;

        let brushes: Vec<(&Brush, (u32, u32))> =
            model.brushes.iter().zip(model.brush_spans.iter().copied()).collect();
        self.section(&mut out, &brushes, |buf, (brush, span): &(&Brush, (u32, u32))| {
            write_brush(buf, brush, *span)
        })?;

        for value in model.sphere.as_array() {
            out.write_f32::<LE>(value as f32)?;
        }

        debug!(
            "packed {} bytes ({} planes, {} indices, {} nodes, {} leaves, {} brushes)",
            out.len(),
            model.planes.len(),
            model.plane_indices.len(),
            model.tree.nodes.len(),
            model.tree.leaves.len(),
            model.brushes.len()
        );
        Ok(out)
    }

    /// Count prefix followed by one fixed-size record per item.
    fn section<T, F>(&self, out: &mut Vec<u8>, items: &[T], record: F) -> io::Result<()>
    where
        T: Sync,
        F: Fn(&mut Vec<u8>, &T) -> io::Result<()> + Sync,
    {
        out.write_u32::<LE>(items.len() as u32)?;
        if self.parallel {
            let chunks = items
                .par_iter()
                .map(|item| {
                    let mut buf = Vec::new();
                    record(&mut buf, item)?;
                    Ok(buf)
                })
                .collect::<io::Result<Vec<Vec<u8>>>>()?;
            for chunk in chunks {
                out.extend_from_slice(&chunk);
            }
        } else {
            for item in items {
                record(&mut *out, item)?;
            }
        }
        Ok(())
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        BinaryWriter::from_options(&CompileOptions::default())
    }
}

fn write_plane(buf: &mut Vec<u8>, plane: &Plane) -> io::Result<()> {
    for value in plane.as_array() {
        buf.write_f32::<LE>(value as f32)?;
    }
    Ok(())
}

fn write_node(buf: &mut Vec<u8>, node: &KdNode) -> io::Result<()> {
    buf.write_u32::<LE>(node.axis.index() as u32)?;
    buf.write_f32::<LE>(node.distance as f32)?;
    buf.write_i32::<LE>(node.near.encode())?;
    buf.write_i32::<LE>(node.far.encode())
}

fn write_brush(buf: &mut Vec<u8>, brush: &Brush, (start, count): (u32, u32)) -> io::Result<()> {
    for value in brush.sixdop.as_array() {
        buf.write_f32::<LE>(value as f32)?;
    }
    buf.write_u32::<LE>(start)?;
    buf.write_u32::<LE>(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{BoundingSphere, PlaneTable, SixDop};
    use crate::compiler::CollisionCompiler;
    use crate::error::CompileError;
    use crate::format::{payload_offset, CollisionFile, BRUSH_RECORD_SIZE};
    use crate::kd::KdTree;
    use crate::mesh::{CollisionMesh, SceneObject};
    use crate::utils::Vec3;
    use std::collections::BTreeSet;

    fn scene() -> Vec<SceneObject> {
        let tri = CollisionMesh::from_polygons(
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.2), Vec3::new(0.0, 1.0, 0.4)],
            vec![vec![0, 1, 2]],
        );
        let far_tri = CollisionMesh::from_polygons(
            vec![Vec3::new(50.0, 0.0, 0.0), Vec3::new(51.0, 0.0, 0.0), Vec3::new(50.0, 1.0, 0.0)],
            vec![vec![0, 1, 2]],
        );
        let ridge = CollisionMesh::from_polygons(
            vec![
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(11.0, 0.0, 1.0),
                Vec3::new(12.0, 0.0, 0.0),
                Vec3::new(10.0, 2.0, 0.0),
                Vec3::new(11.0, 2.0, 1.0),
                Vec3::new(12.0, 2.0, 0.0),
            ],
            vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]],
        );
        vec![
            SceneObject::mesh("tri", tri),
            SceneObject::other("Armature"),
            SceneObject::mesh("far_tri", far_tri),
            SceneObject::mesh("ridge", ridge),
        ]
    }

    fn compiled() -> CollisionModel {
        CollisionCompiler::new(CompileOptions::default())
            .compile(&scene())
            .expect("scene compiles")
            .model
    }

    #[test]
    fn test_round_trip_preserves_brushes() {
        let model = compiled();
        let bytes = BinaryWriter::new(false).to_bytes(&model).expect("writes");
        let file = CollisionFile::read(&bytes).expect("reads back");

        assert_eq!(file.planes.len(), model.planes.len());
        assert_eq!(file.brushes.len(), model.brushes.len());
        assert_eq!(file.nodes.len(), model.tree.nodes.len());
        assert_eq!(file.leaves.len(), model.tree.leaves.len());

        for (i, brush) in model.brushes.iter().enumerate() {
            let expected = brush.sixdop.as_array().map(|v| (v as f32).to_bits());
            assert_eq!(file.brushes[i].sixdop.map(f32::to_bits), expected);

            let read: BTreeSet<i32> = file.brush_planes(i).iter().copied().collect();
            let written: BTreeSet<i32> = brush.plane_indices.iter().map(|p| p.0).collect();
            assert_eq!(read, written);
        }

        for (node, read) in model.tree.nodes.iter().zip(&file.nodes) {
            assert_eq!(read.split_axis(), Some(node.axis));
            assert_eq!(read.distance, node.distance as f32);
            assert_eq!(read.children(), (node.near, node.far));
        }
        for (i, leaf) in model.tree.leaves.iter().enumerate() {
            assert_eq!(file.leaf_brushes(i), Some(leaf.brush_indices.clone()));
        }
    }

    #[test]
    fn test_parallel_and_serial_output_match() {
        let model = compiled();
        let serial = BinaryWriter::new(false).to_bytes(&model).expect("serial");
        let parallel = BinaryWriter::new(true).to_bytes(&model).expect("parallel");
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_layout_header_and_tail() {
        let model = compiled();
        let bytes = BinaryWriter::default().to_bytes(&model).expect("writes");
        assert_eq!(&bytes[..8], MAGIC);
        assert_eq!(u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize, model.planes.len());

        let payload = layout_leaves(&model).payload.len();
        let expected = payload_offset(&model) + payload * 4 + 4 + model.brushes.len() * BRUSH_RECORD_SIZE + 24;
        assert_eq!(bytes.len(), expected);

        let sphere = &bytes[bytes.len() - 24..];
        let cx = f32::from_le_bytes([sphere[0], sphere[1], sphere[2], sphere[3]]);
        assert_eq!(cx, model.sphere.center.x as f32);
    }

    #[test]
    fn test_single_brush_leaf_is_stored_inline() {
        let mut tree = KdTree::build(vec![Vec3::ZERO], 1e-5);
        tree.leaves[0].brush_indices = vec![1];
        tree.leaves[1].brush_indices = vec![0, 1];
        let dop = SixDop::from_points([Vec3::ZERO].iter());
        let brushes = vec![
            Brush { sixdop: dop, plane_indices: BTreeSet::new() },
            Brush { sixdop: dop, plane_indices: BTreeSet::new() },
        ];
        let sphere = BoundingSphere::from_corners(std::iter::empty());
        let model = CollisionModel::new(PlaneTable::new(1e-5), brushes, tree, sphere);

        let bytes = BinaryWriter::new(false).to_bytes(&model).expect("writes");
        let file = CollisionFile::read(&bytes).expect("reads back");
        assert_eq!((file.leaves[0].count, file.leaves[0].offset), (1, 1));
        assert_eq!(file.leaves[1].count, 2);
        assert_eq!(file.leaves[1].offset as u64, file.payload_offset);
        assert_eq!(file.payload, vec![0, 1]);
        assert_eq!(file.leaf_brushes(1), Some(vec![0, 1]));
    }

    #[test]
    fn test_invalid_plane_reference_aborts_before_writing() {
        let dop = SixDop::from_points([Vec3::ZERO].iter());
        let brushes = vec![Brush {
            sixdop: dop,
            plane_indices: [PlaneIndex(-4)].into_iter().collect(),
        }];
        let sphere = BoundingSphere::from_corners(std::iter::empty());
        let model = CollisionModel::new(PlaneTable::new(1e-5), brushes, KdTree::build(Vec::new(), 1e-5), sphere);

        let mut sink = Vec::new();
        let result = BinaryWriter::new(true).write(&model, &mut sink);
        assert!(matches!(result, Err(CompileError::InvalidPlaneReference { brush: 0, index: -4, .. })));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_sink_failure_is_propagated() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let result = BinaryWriter::default().write(&compiled(), &mut Broken);
        assert!(matches!(result, Err(CompileError::Io(_))));
    }
}
