// src/collision/model.rs

use crate::collision::{Brush, PlaneIndex, PlaneTable};
use crate::error::{CompileError, Result};
use crate::kd::{KdTree, NodeRef};
use crate::utils::Vec3;

/// Axis-aligned ellipsoid around the whole scene: box center plus the
/// half-extent along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radii: Vec3,
}

impl BoundingSphere {
    /// Sphere around the box spanned by `corners`. No corners gives the
    /// zero sphere.
    pub fn from_corners<'a, I>(corners: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        let mut corners = corners.into_iter();
        let Some(first) = corners.next() else {
            return BoundingSphere {
                center: Vec3::ZERO,
                radii: Vec3::ZERO,
            };
        };
        let (min, max) = corners.fold((*first, *first), |(min, max), p| (min.min(p), max.max(p)));
        let center = (min + max) * 0.5;
        BoundingSphere {
            center,
            radii: max - center,
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [
            self.center.x,
            self.center.y,
            self.center.z,
            self.radii.x,
            self.radii.y,
            self.radii.z,
        ]
    }
}

/// Everything the binary writer needs, in final order.
///
/// `plane_indices` is the concatenation of every brush's plane set in brush
/// order; `brush_spans[i]` is brush `i`'s `(start, count)` into it.
#[derive(Debug, Clone)]
pub struct CollisionModel {
    pub planes: PlaneTable,
    pub brushes: Vec<Brush>,
    pub plane_indices: Vec<PlaneIndex>,
    pub brush_spans: Vec<(u32, u32)>,
    pub tree: KdTree,
    pub sphere: BoundingSphere,
}

impl CollisionModel {
    pub fn new(planes: PlaneTable, brushes: Vec<Brush>, tree: KdTree, sphere: BoundingSphere) -> Self {
        let mut plane_indices = Vec::new();
        let mut brush_spans = Vec::with_capacity(brushes.len());
        for brush in &brushes {
            let start = plane_indices.len() as u32;
            plane_indices.extend(brush.plane_indices.iter().copied());
            brush_spans.push((start, brush.plane_indices.len() as u32));
        }
        CollisionModel {
            planes,
            brushes,
            plane_indices,
            brush_spans,
            tree,
            sphere,
        }
    }

    /// Plane references of brush `brush`, as laid out in the flat array.
    pub fn brush_planes(&self, brush: usize) -> &[PlaneIndex] {
        let (start, count) = self.brush_spans[brush];
        &self.plane_indices[start as usize..(start + count) as usize]
    }

    /// Checks every cross reference: brush to plane, leaf to brush and
    /// node to child. Any failure means the model must not be written.
    pub fn validate(&self) -> Result<()> {
        let plane_count = self.planes.len();
        for brush in 0..self.brushes.len() {
            if let Some(bad) = self.brush_planes(brush).iter().find(|&&index| !self.planes.contains(index)) {
                return Err(CompileError::InvalidPlaneReference {
                    brush,
                    index: bad.0,
                    plane_count,
                });
            }
        }

        let brush_count = self.brushes.len();
        for (leaf, cell) in self.tree.leaves.iter().enumerate() {
            if let Some(&brush) = cell.brush_indices.iter().find(|&&b| b as usize >= brush_count) {
                return Err(CompileError::InvalidBrushReference {
                    leaf,
                    brush,
                    brush_count,
                });
            }
        }

        for (node, kd) in self.tree.nodes.iter().enumerate() {
            for child in [kd.near, kd.far] {
                if !self.resolves(child) {
                    return Err(CompileError::InvalidNodeReference {
                        node,
                        reference: child.encode(),
                    });
                }
            }
        }
        Ok(())
    }

    fn resolves(&self, reference: NodeRef) -> bool {
        match reference {
            NodeRef::Node(index) => (index as usize) < self.tree.nodes.len(),
            NodeRef::Leaf(index) => (index as usize) < self.tree.leaves.len(),
        }
    }
}
