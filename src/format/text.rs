// src/format/text.rs
//
// Human-readable listing of a collision file, field by field in binary
// order. Values are printed at the precision they are written with.

use crate::collision::CollisionModel;
use crate::format::layout_leaves;
use crate::kd::NodeRef;

pub fn dump(model: &CollisionModel) -> String {
    let leaves = layout_leaves(model);
    let mut out = String::from("AEONCLN\n");

    out.push_str(&format!("planes {}\n", model.planes.len()));
    for (i, plane) in model.planes.planes().iter().enumerate() {
        let [x, y, z, d] = plane.as_array().map(|v| v as f32);
        out.push_str(&format!("  {}: {} {} {} {}\n", i, x, y, z, d));
    }

    out.push_str(&format!("plane_indices {}\n", model.plane_indices.len()));
    for (i, index) in model.plane_indices.iter().enumerate() {
        out.push_str(&format!("  {}: {}\n", i, index));
    }

    out.push_str(&format!("nodes {}\n", model.tree.nodes.len()));
    for (i, node) in model.tree.nodes.iter().enumerate() {
        out.push_str(&format!(
            "  {}: axis {:?} distance {} near {} far {}\n",
            i,
            node.axis,
            node.distance as f32,
            child(node.near),
            child(node.far)
        ));
    }

    out.push_str(&format!("leaves {}\n", leaves.records.len()));
    for (i, ((count, offset), leaf)) in leaves.records.iter().zip(&model.tree.leaves).enumerate() {
        out.push_str(&format!(
            "  {}: count {} offset {} brushes {:?}\n",
            i, count, offset, leaf.brush_indices
        ));
    }

    out.push_str(&format!("payload {}\n", leaves.payload.len()));
    for (i, brush) in leaves.payload.iter().enumerate() {
        out.push_str(&format!("  {}: {}\n", i, brush));
    }

    out.push_str(&format!("brushes {}\n", model.brushes.len()));
    for (i, (brush, (start, count))) in model.brushes.iter().zip(&model.brush_spans).enumerate() {
        let [px, py, pz, nx, ny, nz] = brush.sixdop.as_array().map(|v| v as f32);
        out.push_str(&format!(
            "  {}: +({} {} {}) -({} {} {}) start {} count {}\n",
            i, px, py, pz, nx, ny, nz, start, count
        ));
    }

    let [cx, cy, cz, rx, ry, rz] = model.sphere.as_array().map(|v| v as f32);
    out.push_str(&format!("sphere center ({} {} {}) radii ({} {} {})\n", cx, cy, cz, rx, ry, rz));
    out
}

fn child(reference: NodeRef) -> String {
    match reference {
        NodeRef::Node(index) => format!("node {}", index),
        NodeRef::Leaf(index) => format!("leaf {} ({})", index, reference.encode()),
    }
}
