// src/compiler.rs

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info, warn};

use crate::collision::{BoundingSphere, BrushBuilder, CollisionModel, PlaneTable};
use crate::config::CompileOptions;
use crate::error::{GeometryWarning, Result};
use crate::format::{text, BinaryWriter};
use crate::kd::{KdTree, PointSet};
use crate::mesh::{CollisionMesh, SceneObject};
use crate::utils::Vec3;

/// Result of a successful compile. Warnings describe geometry that was
/// skipped or only partly bounded.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub model: CollisionModel,
    pub warnings: Vec<GeometryWarning>,
}

/// Turns a scene into a [`CollisionModel`] and optionally writes it out.
#[derive(Debug, Clone, Default)]
pub struct CollisionCompiler {
    options: CompileOptions,
}

impl CollisionCompiler {
    pub fn new(options: CompileOptions) -> Self {
        CollisionCompiler { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles every mesh object of `scene` into one model. Brush indices
    /// run over all meshes in scene order, then face order.
    pub fn compile(&self, scene: &[SceneObject]) -> Result<Compiled> {
        self.options.validate()?;
        let epsilon = self.options.epsilon;

        // 1. Pick out mesh objects and reject out-of-range faces up front.
        let mut meshes: Vec<(&str, &CollisionMesh, &[Vec3; 8])> = Vec::new();
        for object in scene {
            match object {
                SceneObject::Mesh { name, mesh, world_bounds } => {
                    mesh.validate(name)?;
                    meshes.push((name.as_str(), mesh, world_bounds));
                }
                SceneObject::Other { name } => debug!("skipping non-mesh object '{}'", name),
            }
        }

        // 2. Build the k-d tree over every distinct vertex position.
        let mut points = PointSet::new(epsilon);
        for (_, mesh, _) in &meshes {
            points.extend(mesh.positions.iter().copied());
        }
        let point_count = points.len();
        let mut tree = KdTree::build(points.into_points(), epsilon);
        info!(
            "k-d tree: {} points, {} nodes, {} leaves",
            point_count,
            tree.nodes.len(),
            tree.leaves.len()
        );

        // 3. Derive brushes into one shared plane table, in scene order.
        let mut planes = PlaneTable::new(epsilon);
        let mut face_brushes = Vec::new();
        let mut warnings = Vec::new();
        for (name, mesh, _) in &meshes {
            let built = BrushBuilder::new(&mut planes, epsilon).build(name, mesh);
            face_brushes.extend(built.brushes);
            warnings.extend(built.warnings);
        }

        // 4. Drop each brush into the leaves its face reaches.
        tree.assign(face_brushes.iter().map(|fb| (fb.polygon.as_slice(), &fb.normal)));
        let brushes: Vec<_> = face_brushes.into_iter().map(|fb| fb.brush).collect();
        info!(
            "{} brushes, {} planes, {} of {} leaves occupied",
            brushes.len(),
            planes.len(),
            tree.leaves.iter().filter(|leaf| !leaf.is_empty()).count(),
            tree.leaves.len()
        );

        // 5. Scene bounds.
        let sphere = BoundingSphere::from_corners(meshes.iter().flat_map(|(_, _, corners)| corners.iter()));

        let model = CollisionModel::new(planes, brushes, tree, sphere);
        model.validate()?;

        if !warnings.is_empty() {
            warn!(
                "compile finished with {} geometry warnings ({} non-manifold edges, {} degenerate faces, {} degenerate edges)",
                warnings.len(),
                count(&warnings, |w| matches!(w, GeometryWarning::NonManifoldEdge { .. })),
                count(&warnings, |w| matches!(w, GeometryWarning::DegenerateFace { .. })),
                count(&warnings, |w| matches!(w, GeometryWarning::DegenerateEdge { .. })),
            );
        }
        Ok(Compiled { model, warnings })
    }

    pub fn write_to<W: Write>(&self, model: &CollisionModel, sink: &mut W) -> Result<()> {
        BinaryWriter::from_options(&self.options).write(model, sink)
    }

    /// Compiles `scene` and writes it to `path`, plus a `.txt` listing next
    /// to it when text dumps are enabled. Nothing is created if the compile
    /// fails.
    pub fn compile_to_file<P: AsRef<Path>>(&self, scene: &[SceneObject], path: P) -> Result<Compiled> {
        let path = path.as_ref();
        let compiled = self.compile(scene)?;
        let bytes = BinaryWriter::from_options(&self.options).to_bytes(&compiled.model)?;

        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(&bytes)?;
        file.flush()?;
        info!("wrote {} ({} bytes)", path.display(), bytes.len());

        if self.options.write_text_dump {
            let text_path = path.with_extension("txt");
            fs::write(&text_path, text::dump(&compiled.model))?;
            info!("wrote {}", text_path.display());
        }
        Ok(compiled)
    }
}

fn count(warnings: &[GeometryWarning], kind: impl Fn(&GeometryWarning) -> bool) -> usize {
    warnings.iter().filter(|w| kind(w)).count()
}
