//! Canonical primitive meshes.
//!
//! Every builder returns a closed, outward-wound triangle mesh. Rotational
//! primitives use +Z as their axis.

use hexasphere::shapes::IcoSphere;

use super::mesh::{GeomMesh, SurfaceCaps, mesh_surface};
use super::surface::{CapsuleSurface, ConeSurface, CylinderSurface, SphereSurface, TorusSurface};
use super::{Point3, Vec3};

/// Default number of segments around circular sections.
pub const CIRCLE_SECTIONS: usize = 32;

/// Errors while constructing a primitive.
#[derive(Debug, thiserror::Error)]
pub enum GeomError {
    #[error("{what} must be finite and > 0, got {value}")]
    NonPositive { what: &'static str, value: f64 },
    #[error("{what} requires at least {min} sections, got {got}")]
    TooFewSections {
        what: &'static str,
        min: usize,
        got: usize,
    },
    #[error("invalid surface: {0}")]
    Surface(String),
    #[error("generated mesh is invalid: {0}")]
    InvalidMesh(String),
}

pub type GeomResult<T> = Result<T, GeomError>;

fn positive(what: &'static str, value: f64) -> GeomResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeomError::NonPositive { what, value })
    }
}

fn sections(what: &'static str, got: usize, min: usize) -> GeomResult<usize> {
    if got >= min {
        Ok(got)
    } else {
        Err(GeomError::TooFewSections { what, min, got })
    }
}

/// Axis-aligned box centred on the origin: 8 vertices, 12 triangles.
pub fn box_mesh(extents: Vec3) -> GeomResult<GeomMesh> {
    let hx = positive("box width", extents.x)? * 0.5;
    let hy = positive("box depth", extents.y)? * 0.5;
    let hz = positive("box height", extents.z)? * 0.5;

    // Vertex i sits at (+x if bit 0, +y if bit 1, +z if bit 2).
    let positions = (0..8u32)
        .map(|i| {
            [
                if i & 1 == 0 { -hx } else { hx },
                if i & 2 == 0 { -hy } else { hy },
                if i & 4 == 0 { -hz } else { hz },
            ]
        })
        .collect();

    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1,  1, 2, 3, // -Z
        4, 5, 6,  5, 7, 6, // +Z
        0, 1, 4,  1, 5, 4, // -Y
        2, 6, 3,  3, 6, 7, // +Y
        0, 4, 2,  2, 4, 6, // -X
        1, 3, 5,  3, 7, 5, // +X
    ];

    Ok(GeomMesh::new(positions, indices))
}

/// Capped cylinder centred on the origin.
pub fn cylinder_mesh(radius: f64, height: f64, segments: usize) -> GeomResult<GeomMesh> {
    let height = positive("cylinder height", height)?;
    let segments = sections("cylinder", segments, 3)?;
    let surface = CylinderSurface::new(
        Point3::new(0.0, 0.0, -height * 0.5),
        Vec3::Z.mul_scalar(height),
        radius,
    )
    .map_err(GeomError::Surface)?;
    Ok(mesh_surface(&surface, segments, 2, SurfaceCaps::BOTH))
}

/// Cone with its base disc at `z = 0` and apex at `z = height`.
pub fn cone_mesh(radius: f64, height: f64, segments: usize) -> GeomResult<GeomMesh> {
    let radius = positive("cone radius", radius)?;
    let height = positive("cone height", height)?;
    let segments = sections("cone", segments, 3)?;
    let surface = ConeSurface::new(Point3::ORIGIN, Vec3::Z.mul_scalar(height), radius, 0.0)
        .map_err(GeomError::Surface)?;
    Ok(mesh_surface(&surface, segments, 2, SurfaceCaps::START))
}

/// Torus in the XY plane centred on the origin.
pub fn torus_mesh(
    major_radius: f64,
    minor_radius: f64,
    major_sections: usize,
    minor_sections: usize,
) -> GeomResult<GeomMesh> {
    let major_sections = sections("torus major ring", major_sections, 3)?;
    let minor_sections = sections("torus tube", minor_sections, 3)?;
    let surface = TorusSurface::new(Point3::ORIGIN, major_radius, minor_radius)
        .map_err(GeomError::Surface)?;
    Ok(mesh_surface(&surface, major_sections, minor_sections, SurfaceCaps::NONE))
}

/// Capsule centred on the origin; `height` is the distance between the
/// hemisphere centres.
pub fn capsule_mesh(radius: f64, height: f64, segments: usize, rings: usize) -> GeomResult<GeomMesh> {
    let segments = sections("capsule", segments, 3)?;
    let rings = sections("capsule profile", rings, 2)?;
    let surface = CapsuleSurface::new(Point3::ORIGIN, radius, height).map_err(GeomError::Surface)?;
    Ok(mesh_surface(&surface, segments, rings + 1, SurfaceCaps::NONE))
}

/// Latitude/longitude sphere centred on the origin with single pole vertices.
pub fn uv_sphere_mesh(radius: f64, segments: usize, rings: usize) -> GeomResult<GeomMesh> {
    let segments = sections("sphere", segments, 3)?;
    let rings = sections("sphere latitude", rings, 2)?;
    let surface = SphereSurface::new(Point3::ORIGIN, radius).map_err(GeomError::Surface)?;
    Ok(mesh_surface(&surface, segments, rings + 1, SurfaceCaps::NONE))
}

/// Geodesic sphere from a subdivided icosahedron.
///
/// `subdivisions` is the number of points inserted along each icosahedron
/// edge, so the mesh has `10 * (subdivisions + 1)² + 2` vertices.
pub fn icosphere_mesh(radius: f64, subdivisions: usize) -> GeomResult<GeomMesh> {
    let radius = positive("icosphere radius", radius)?;
    let generated = IcoSphere::new(subdivisions, |_| ());

    let positions = generated
        .raw_points()
        .iter()
        .map(|p| {
            [
                f64::from(p.x) * radius,
                f64::from(p.y) * radius,
                f64::from(p.z) * radius,
            ]
        })
        .collect();

    let mut indices = Vec::with_capacity(generated.indices_per_main_triangle() * 20);
    for i in 0..20 {
        generated.get_indices(i, &mut indices);
    }

    Ok(GeomMesh::new(positions, indices))
}
