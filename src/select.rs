//! Keyword dispatch from a free-text description to a primitive.

use std::path::Path;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::geom::{
    CIRCLE_SECTIONS, GeomMesh, GeomResult, Vec3, box_mesh, capsule_mesh, cone_mesh, cylinder_mesh,
    icosphere_mesh, torus_mesh, uv_sphere_mesh,
};
use crate::parse::obj;
use crate::{ArtifactKind, Export};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box,
    Cylinder,
    Cone,
    Torus,
    Capsule,
    Icosphere,
    Sphere,
}

/// One row of the dispatch table: any keyword selects `kind`.
#[derive(Debug, Clone, Copy)]
pub struct ShapeRule {
    pub keywords: &'static [&'static str],
    pub kind: ShapeKind,
}

/// Rules in priority order. The first rule with a matching keyword wins;
/// [`ShapeKind::Sphere`] is used when none match.
pub const SHAPE_RULES: &[ShapeRule] = &[
    ShapeRule {
        keywords: &["cube", "box"],
        kind: ShapeKind::Box,
    },
    ShapeRule {
        keywords: &["cylinder"],
        kind: ShapeKind::Cylinder,
    },
    ShapeRule {
        keywords: &["cone"],
        kind: ShapeKind::Cone,
    },
    ShapeRule {
        keywords: &["torus", "donut"],
        kind: ShapeKind::Torus,
    },
    ShapeRule {
        keywords: &["capsule"],
        kind: ShapeKind::Capsule,
    },
    ShapeRule {
        keywords: &["icosphere", "ico"],
        kind: ShapeKind::Icosphere,
    },
];

/// Case-insensitive substring match against [`SHAPE_RULES`].
#[must_use]
pub fn select_shape(description: &str) -> ShapeKind {
    let lowered = description.to_lowercase();
    SHAPE_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
        .map_or(ShapeKind::Sphere, |rule| rule.kind)
}

impl ShapeKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Cylinder => "cylinder",
            Self::Cone => "cone",
            Self::Torus => "torus",
            Self::Capsule => "capsule",
            Self::Icosphere => "icosphere",
            Self::Sphere => "sphere",
        }
    }

    /// Builds the canonical mesh for this shape.
    pub fn build(self) -> GeomResult<GeomMesh> {
        match self {
            Self::Box => box_mesh(Vec3::new(1.0, 1.0, 1.0)),
            Self::Cylinder => cylinder_mesh(1.0, 1.0, CIRCLE_SECTIONS),
            Self::Cone => cone_mesh(1.0, 2.0, CIRCLE_SECTIONS),
            Self::Torus => torus_mesh(3.0, 1.0, CIRCLE_SECTIONS, CIRCLE_SECTIONS),
            Self::Capsule => capsule_mesh(0.5, 2.0, CIRCLE_SECTIONS, CIRCLE_SECTIONS),
            Self::Icosphere => icosphere_mesh(1.0, 3),
            Self::Sphere => uv_sphere_mesh(1.0, CIRCLE_SECTIONS, CIRCLE_SECTIONS / 2),
        }
    }
}

/// Selects, builds and exports the shape for `description`.
pub fn generate_from_text(description: &str, config: &EngineConfig) -> EngineResult<Export> {
    println!("Creating a 3D shape based on the description from user: '{description}'");

    let kind = select_shape(description);
    log::debug!("description {description:?} selected {}", kind.name());
    let mesh = kind.build()?;

    let path: &Path = &config.outputs.text_path;
    obj::write_mesh(path, &mesh, kind.name())?;
    log::info!(
        "wrote {} ({} vertices, {} triangles)",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    println!("3D model from text saved as '{}'", path.display());

    Ok(Export {
        path: path.to_path_buf(),
        kind: ArtifactKind::Mesh,
        vertex_count: mesh.vertex_count(),
        face_count: mesh.triangle_count(),
    })
}
