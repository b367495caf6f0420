// src/collision/brush_builder.rs

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::collision::{Brush, PlaneIndex, PlaneTable, SixDop};
use crate::error::GeometryWarning;
use crate::mesh::{CollisionMesh, Edge, Face};
use crate::utils::{Plane, Vec3};

/// A finished brush together with the face it was built from. The polygon
/// is kept for k-d classification and never serialized.
#[derive(Debug, Clone)]
pub struct FaceBrush {
    pub face: usize,
    pub brush: Brush,
    pub polygon: Vec<Vec3>,
    pub normal: Vec3,
}

/// Output of [`BrushBuilder::build`] for one mesh.
#[derive(Debug, Default)]
pub struct MeshBrushes {
    pub brushes: Vec<FaceBrush>,
    pub warnings: Vec<GeometryWarning>,
}

/// Zero-length edge, or two faces with opposing normals.
struct DegenerateEdge;

/// Brush under construction: slab plus the plane references collected so
/// far, duplicates included.
struct Pending {
    sixdop: SixDop,
    planes: Vec<PlaneIndex>,
}

/// Derives one brush per face of a mesh in three passes (faces, edges,
/// vertices), inserting every separating plane into the shared table.
///
/// Plane insertion order is fixed: faces in order, then edges in the
/// mesh's edge order, then vertices by index.
pub struct BrushBuilder<'a> {
    table: &'a mut PlaneTable,
    epsilon: f64,
}

impl<'a> BrushBuilder<'a> {
    pub fn new(table: &'a mut PlaneTable, epsilon: f64) -> Self {
        BrushBuilder { table, epsilon }
    }

    /// Builds the brushes of `mesh`. Faces must already be validated
    /// against the position array.
    pub fn build(&mut self, object: &str, mesh: &CollisionMesh) -> MeshBrushes {
        let mut warnings = Vec::new();

        let mut pending = self.face_pass(object, mesh, &mut warnings);
        let usable: Vec<bool> = pending.iter().map(Option::is_some).collect();

        self.edge_pass(object, mesh, &usable, &mut pending, &mut warnings);
        self.vertex_pass(mesh, &usable, &mut pending);

        let brushes: Vec<FaceBrush> = pending
            .into_iter()
            .enumerate()
            .filter_map(|(face_index, slot)| {
                let pending = slot?;
                let face = &mesh.faces[face_index];
                Some(FaceBrush {
                    face: face_index,
                    brush: Brush {
                        sixdop: pending.sixdop,
                        plane_indices: pending.planes.into_iter().collect::<BTreeSet<_>>(),
                    },
                    polygon: face.vertices.iter().map(|&v| mesh.position(v)).collect(),
                    normal: face.normal,
                })
            })
            .collect();

        debug!(
            "'{}': {} brushes from {} faces, table now holds {} planes",
            object,
            brushes.len(),
            mesh.faces.len(),
            self.table.len()
        );
        MeshBrushes { brushes, warnings }
    }

    /// Slab for every face, plus the face plane when the slab does not
    /// already bound it. Degenerate faces come back as `None`.
    fn face_pass(
        &mut self,
        object: &str,
        mesh: &CollisionMesh,
        warnings: &mut Vec<GeometryWarning>,
    ) -> Vec<Option<Pending>> {
        mesh.faces
            .iter()
            .enumerate()
            .map(|(face_index, face)| {
                if face.is_degenerate(self.epsilon) {
                    let warning = GeometryWarning::DegenerateFace {
                        object: object.to_string(),
                        face: face_index,
                        distinct_vertices: face.distinct_vertex_count(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                    return None;
                }

                let positions: Vec<Vec3> = face.vertices.iter().map(|&v| mesh.position(v)).collect();
                let mut planes = Vec::new();
                if !face.normal.is_axis_aligned(self.epsilon) {
                    planes.push(self.table.add_plane(face_plane(mesh, face)));
                }
                Some(Pending {
                    sixdop: SixDop::from_points(positions.iter()),
                    planes,
                })
            })
            .collect()
    }

    fn edge_pass(
        &mut self,
        object: &str,
        mesh: &CollisionMesh,
        usable: &[bool],
        pending: &mut [Option<Pending>],
        warnings: &mut Vec<GeometryWarning>,
    ) {
        let adjacency = mesh.edge_adjacency(usable);
        for (edge, faces) in mesh.edges.iter().zip(adjacency.iter()) {
            let outcome = match faces.as_slice() {
                [face] => self.boundary_edge(mesh, edge, *face, pending),
                [a, b] => self.manifold_edge(mesh, edge, *a, *b, pending),
                _ => {
                    let warning = GeometryWarning::NonManifoldEdge {
                        object: object.to_string(),
                        edge: edge.key(),
                        face_count: faces.len(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                    continue;
                }
            };
            if let Err(DegenerateEdge) = outcome {
                let warning = GeometryWarning::DegenerateEdge {
                    object: object.to_string(),
                    edge: edge.key(),
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    /// Edge with a single face: one plane through the edge, perpendicular
    /// to the face, facing away from it.
    fn boundary_edge(
        &mut self,
        mesh: &CollisionMesh,
        edge: &Edge,
        face_index: usize,
        pending: &mut [Option<Pending>],
    ) -> Result<(), DegenerateEdge> {
        let face = &mesh.faces[face_index];
        let origin = mesh.position(edge.vertices[0]);
        let direction = edge_direction(mesh, edge)?;

        let mut plane = Plane::through_point(face.normal.cross(&direction).normalize(), &origin);
        if self.face_in_front(mesh, edge, face, &plane) {
            plane = plane.flipped();
        }
        let index = self.table.add_plane(plane);
        push(pending, face_index, index);
        Ok(())
    }

    /// Edge shared by two faces. The first vertex of face `a` that is off
    /// the edge decides between the convex and the concave treatment.
    fn manifold_edge(
        &mut self,
        mesh: &CollisionMesh,
        edge: &Edge,
        a: usize,
        b: usize,
        pending: &mut [Option<Pending>],
    ) -> Result<(), DegenerateEdge> {
        let (face_a, face_b) = (&mesh.faces[a], &mesh.faces[b]);
        let origin = mesh.position(edge.vertices[0]);
        let normal = (face_a.normal + face_b.normal).normalize();
        if normal == Vec3::ZERO {
            return Err(DegenerateEdge);
        }
        let averaged = Plane::through_point(normal, &origin);

        let Some(off_edge) = face_a.vertices.iter().find(|&&v| !edge.touches(v)) else {
            return Ok(());
        };

        if averaged.signed_distance(&mesh.position(*off_edge)) <= self.epsilon {
            // Convex. An axis-aligned averaged plane with face a behind it
            // is the slab bound on that axis already.
            if !normal.is_axis_aligned(self.epsilon) {
                let index = self.table.add_plane(averaged);
                push(pending, a, index);
                push(pending, b, index);
            }

            let direction = edge_direction(mesh, edge)?;
            let bevel = Plane::through_point(normal.cross(&direction).normalize(), &origin);
            let (keeps, flips) = if self.face_in_front(mesh, edge, face_a, &bevel) {
                (b, a)
            } else {
                (a, b)
            };
            let index = self.table.add_plane(bevel);
            push(pending, keeps, index);
            push(pending, flips, index.flip());
        } else {
            // Concave: each face takes the other face's plane, flipped.
            let index = self.table.add_plane(face_plane(mesh, face_a));
            push(pending, b, index.flip());
            let index = self.table.add_plane(face_plane(mesh, face_b));
            push(pending, a, index.flip());
        }
        Ok(())
    }

    /// One plane per used vertex along its normal, shared by every face
    /// around the vertex.
    fn vertex_pass(&mut self, mesh: &CollisionMesh, usable: &[bool], pending: &mut [Option<Pending>]) {
        let incidence = mesh.vertex_incidence(usable);
        for (vertex, faces) in incidence.iter().enumerate() {
            let normal = mesh.vertex_normal(vertex as u32);
            if faces.is_empty() || normal == Vec3::ZERO {
                continue;
            }
            let index = self
                .table
                .add_plane(Plane::through_point(normal, &mesh.position(vertex as u32)));
            for &face in faces {
                push(pending, face, index);
            }
        }
    }

    /// True if a vertex of `face` off the edge lies more than epsilon in
    /// front of `plane`.
    fn face_in_front(&self, mesh: &CollisionMesh, edge: &Edge, face: &Face, plane: &Plane) -> bool {
        face.vertices
            .iter()
            .filter(|&&v| !edge.touches(v))
            .any(|&v| plane.signed_distance(&mesh.position(v)) > self.epsilon)
    }
}

fn face_plane(mesh: &CollisionMesh, face: &Face) -> Plane {
    Plane::through_point(face.normal, &mesh.position(face.vertices[0]))
}

fn edge_direction(mesh: &CollisionMesh, edge: &Edge) -> Result<Vec3, DegenerateEdge> {
    let direction = (mesh.position(edge.vertices[0]) - mesh.position(edge.vertices[1])).normalize();
    if direction == Vec3::ZERO {
        return Err(DegenerateEdge);
    }
    Ok(direction)
}

fn push(pending: &mut [Option<Pending>], face: usize, index: PlaneIndex) {
    if let Some(brush) = pending[face].as_mut() {
        brush.planes.push(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::EdgeKey;

    const EPSILON: f64 = 1e-5;

    fn build(mesh: &CollisionMesh) -> (PlaneTable, MeshBrushes) {
        let mut table = PlaneTable::new(EPSILON);
        let result = BrushBuilder::new(&mut table, EPSILON).build("test", mesh);
        (table, result)
    }

    fn unit_cube() -> CollisionMesh {
        let positions = (0..8)
            .map(|i| Vec3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
            .collect();
        CollisionMesh::from_polygons(
            positions,
            vec![
                vec![0, 2, 3, 1],
                vec![4, 5, 7, 6],
                vec![0, 1, 5, 4],
                vec![2, 6, 7, 3],
                vec![0, 4, 6, 2],
                vec![1, 3, 7, 5],
            ],
        )
    }

    fn assert_references_resolve(table: &PlaneTable, result: &MeshBrushes) {
        for face_brush in &result.brushes {
            for index in &face_brush.brush.plane_indices {
                assert!(table.resolve(*index).is_some(), "dangling plane index {}", index);
            }
        }
    }

    #[test]
    fn test_isolated_triangle_yields_seven_planes() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(0.0, 3.0, 2.0),
        ];
        let mut mesh = CollisionMesh::from_polygons(positions.clone(), vec![vec![0, 1, 2]]);
        // Spread the vertex normals away from the face normal so that no
        // vertex plane coincides with the face plane.
        let centroid = (positions[0] + positions[1] + positions[2]) * (1.0 / 3.0);
        let face_normal = mesh.faces[0].normal;
        mesh.vertex_normals = positions
            .iter()
            .map(|p| (face_normal + (*p - centroid).normalize()).normalize())
            .collect();

        let (table, result) = build(&mesh);
        assert!(result.warnings.is_empty());
        assert_eq!(result.brushes.len(), 1);
        assert_eq!(table.len(), 7);
        assert_eq!(result.brushes[0].brush.plane_indices.len(), 7);
        assert_references_resolve(&table, &result);
    }

    #[test]
    fn test_boundary_planes_face_away_from_triangle() {
        let mesh = CollisionMesh::from_polygons(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 1.0),
                Vec3::new(0.0, 3.0, 2.0),
            ],
            vec![vec![0, 1, 2]],
        );
        let (table, result) = build(&mesh);
        // Derived vertex normals equal the face normal, so only the face
        // plane and the three edge planes remain.
        assert_eq!(table.len(), 4);
        for index in &result.brushes[0].brush.plane_indices {
            let plane = table.resolve(*index).unwrap();
            for p in &mesh.positions {
                assert!(plane.signed_distance(p) <= EPSILON);
            }
        }
    }

    #[test]
    fn test_cube_has_no_axis_aligned_or_duplicate_planes() {
        let mesh = unit_cube();
        let (table, result) = build(&mesh);

        assert!(result.warnings.is_empty());
        assert_eq!(result.brushes.len(), 6);
        // 12 edge planes, 6 distinct bevels, 8 corner planes.
        assert_eq!(table.len(), 26);
        for (i, a) in table.planes().iter().enumerate() {
            assert!(!a.normal.is_axis_aligned(EPSILON), "axis-aligned plane {:?}", a);
            for b in &table.planes()[i + 1..] {
                assert!(!a.approx_eq(b, EPSILON));
                assert!(!a.flipped().approx_eq(b, EPSILON));
            }
        }
        for face_brush in &result.brushes {
            for p in &face_brush.polygon {
                assert!(face_brush.brush.sixdop.contains(p, 0.0));
            }
        }
        assert_references_resolve(&table, &result);
    }

    #[test]
    fn test_convex_ridge_shares_bevel_with_opposite_signs() {
        let mesh = CollisionMesh::from_polygons(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.5, 1.0, -1.0),
                Vec3::new(0.5, -1.0, -1.0),
            ],
            vec![vec![0, 1, 2], vec![1, 0, 3]],
        );
        let (table, result) = build(&mesh);
        let a = &result.brushes[0].brush.plane_indices;
        let b = &result.brushes[1].brush.plane_indices;

        // Slots 0 and 1 are the face planes. The averaged ridge plane is +Z
        // and left to the slab, so the bevel lands in slot 2.
        assert!(a.contains(&PlaneIndex(2)));
        assert!(b.contains(&PlaneIndex(-3)));
        let bevel = table.resolve(PlaneIndex(2)).unwrap();
        assert!(bevel.approx_eq(&Plane::new(Vec3::new(0.0, -1.0, 0.0), 0.0), EPSILON));
    }

    #[test]
    fn test_concave_valley_cross_attaches_flipped_face_planes() {
        let mesh = CollisionMesh::from_polygons(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.5, 1.0, 1.0),
                Vec3::new(0.5, -1.0, 1.0),
            ],
            vec![vec![0, 1, 2], vec![1, 0, 3]],
        );
        let (_, result) = build(&mesh);
        let a = &result.brushes[0].brush.plane_indices;
        let b = &result.brushes[1].brush.plane_indices;
        assert!(a.contains(&PlaneIndex(0)) && a.contains(&PlaneIndex(-2)));
        assert!(b.contains(&PlaneIndex(1)) && b.contains(&PlaneIndex(-1)));
    }

    #[test]
    fn test_non_manifold_edges_are_reported_not_fatal() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 1.0, 0.3),
            Vec3::new(0.5, -1.0, 0.2),
            Vec3::new(0.5, 0.1, 1.0),
        ];
        let mut mesh = CollisionMesh::from_polygons(positions, vec![vec![0, 1, 2], vec![1, 0, 3], vec![0, 1, 4]]);
        mesh.edges.push(Edge::new(2, 3));

        let (table, result) = build(&mesh);
        assert_eq!(result.brushes.len(), 3);
        assert!(result.warnings.contains(&GeometryWarning::NonManifoldEdge {
            object: "test".to_string(),
            edge: EdgeKey(0, 1),
            face_count: 3,
        }));
        assert!(result.warnings.contains(&GeometryWarning::NonManifoldEdge {
            object: "test".to_string(),
            edge: EdgeKey(2, 3),
            face_count: 0,
        }));
        assert_references_resolve(&table, &result);
    }

    #[test]
    fn test_degenerate_face_is_skipped() {
        let mesh = CollisionMesh::from_polygons(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.5),
                Vec3::new(0.0, 1.0, 0.5),
            ],
            vec![vec![0, 1, 1], vec![0, 1, 2]],
        );
        let (_, result) = build(&mesh);
        assert_eq!(result.brushes.len(), 1);
        assert_eq!(result.brushes[0].face, 1);
        assert_eq!(
            result.warnings,
            vec![GeometryWarning::DegenerateFace {
                object: "test".to_string(),
                face: 0,
                distinct_vertices: 2,
            }]
        );
    }

    #[test]
    fn test_coincident_vertices_report_degenerate_edge() {
        // Host data can carry a valid face normal over a zero-length edge.
        let x = Vec3::new(1.0, 0.0, 0.0);
        let mesh = CollisionMesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.5),
            ],
            vec![x; 3],
            vec![Face::new(vec![0, 1, 2], x)],
            vec![Edge::new(0, 1), Edge::new(1, 2), Edge::new(0, 2)],
        );
        let (_, result) = build(&mesh);
        assert_eq!(result.brushes.len(), 1);
        assert!(result.warnings.contains(&GeometryWarning::DegenerateEdge {
            object: "test".to_string(),
            edge: EdgeKey(0, 1),
        }));
    }

    #[test]
    fn test_collinear_face_is_degenerate() {
        let mesh = CollisionMesh::from_polygons(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        );
        let (table, result) = build(&mesh);
        assert!(result.brushes.is_empty());
        assert!(table.is_empty());
        assert!(result.warnings.contains(&GeometryWarning::DegenerateFace {
            object: "test".to_string(),
            face: 0,
            distinct_vertices: 3,
        }));
    }

    #[test]
    fn test_triangulated_cube_encloses_its_triangles() {
        let quads = unit_cube();
        let triangles = quads
            .faces
            .iter()
            .flat_map(|face| {
                let v = &face.vertices;
                [vec![v[0], v[1], v[2]], vec![v[0], v[2], v[3]]]
            })
            .collect();
        let mesh = CollisionMesh::from_polygons(quads.positions.clone(), triangles);

        let (table, result) = build(&mesh);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert_eq!(result.brushes.len(), 12);
        for plane in table.planes() {
            assert!(!plane.normal.is_axis_aligned(EPSILON), "axis-aligned plane {:?}", plane);
        }
        for face_brush in &result.brushes {
            for &index in &face_brush.brush.plane_indices {
                let plane = table.resolve(index).expect("plane resolves");
                for point in &face_brush.polygon {
                    assert!(
                        plane.signed_distance(point) <= EPSILON,
                        "face {} vertex {:?} in front of {:?}",
                        face_brush.face,
                        point,
                        plane
                    );
                }
            }
        }
    }
}
