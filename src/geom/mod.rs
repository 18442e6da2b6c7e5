mod core;
mod mesh;
mod primitives;
mod surface;
mod triangulation;

pub use self::core::{BBox, Point3, Vec3};
pub use mesh::{GeomMesh, PointCloud, SurfaceCaps, mesh_surface};
pub use primitives::{
    CIRCLE_SECTIONS, GeomError, GeomResult, box_mesh, capsule_mesh, cone_mesh, cylinder_mesh,
    icosphere_mesh, torus_mesh, uv_sphere_mesh,
};
pub use surface::{
    CapsuleSurface, ConeSurface, CylinderSurface, SphereSurface, Surface, TorusSurface,
    tessellate_surface_grid,
};
pub use triangulation::{triangulate_grid_wrapped, triangulate_ring_fan};

#[cfg(test)]
mod tests;
