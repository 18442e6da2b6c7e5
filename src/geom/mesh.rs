use std::collections::HashMap;

use super::surface::{Surface, tessellate_surface_grid};
use super::triangulation::{triangulate_grid_wrapped, triangulate_ring_fan};
use super::{BBox, Point3};

/// Triangle mesh with a flat index buffer (`3 * triangle_count` entries).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
}

impl GeomMesh {
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// Returns true if indices represent a triangle list.
    #[must_use]
    pub fn has_triangle_indices(&self) -> bool {
        self.indices.len() % 3 == 0
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.has_triangle_indices() {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        Ok(())
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        BBox::from_positions(&self.positions)
    }

    /// Iterates triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Number of triangles using each undirected edge.
    #[must_use]
    pub fn edge_use_counts(&self) -> HashMap<(u32, u32), usize> {
        let mut counts = HashMap::new();
        for [a, b, c] in self.triangles() {
            for (i, j) in [(a, b), (b, c), (c, a)] {
                *counts.entry((i.min(j), i.max(j))).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Every edge is shared by exactly two triangles.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        let counts = self.edge_use_counts();
        !counts.is_empty() && counts.values().all(|&n| n == 2)
    }
}

/// Unconnected points; no faces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCloud {
    pub points: Vec<[f64; 3]>,
}

impl PointCloud {
    #[must_use]
    pub fn new(points: Vec<[f64; 3]>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Which open ends of a surface get a flat disc.
///
/// Ends that collapse to a pole are always closed with a single vertex, so a
/// cap flag there has no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceCaps {
    pub start: bool,
    pub end: bool,
}

impl SurfaceCaps {
    pub const NONE: Self = Self {
        start: false,
        end: false,
    };
    pub const BOTH: Self = Self {
        start: true,
        end: true,
    };
    pub const START: Self = Self {
        start: true,
        end: false,
    };
}

/// Meshes a parametric surface on a `u_count × v_count` grid.
///
/// Rows that collapse to a pole are replaced by a single vertex and a triangle
/// fan; open ends of a u-closed surface are closed with discs when `caps` asks
/// for it.
#[must_use]
pub fn mesh_surface(
    surface: &impl Surface,
    u_count: usize,
    v_count: usize,
    caps: SurfaceCaps,
) -> GeomMesh {
    let wrap_u = surface.is_u_closed();
    let wrap_v = surface.is_v_closed();
    let pole_start = wrap_u && !wrap_v && surface.pole_v_start();
    let pole_end = wrap_u && !wrap_v && surface.pole_v_end();

    let u_count = if wrap_u { u_count.max(3) } else { u_count.max(2) };
    let mut v_count = if wrap_v { v_count.max(3) } else { v_count.max(2) };
    if pole_start && pole_end {
        v_count = v_count.max(3);
    }

    let grid = tessellate_surface_grid(surface, u_count, v_count);
    if wrap_v || !wrap_u {
        let positions = grid.into_iter().map(Point3::to_array).collect();
        return GeomMesh::new(positions, triangulate_grid_wrapped(u_count, v_count, wrap_u, wrap_v));
    }

    let first_row = usize::from(pole_start);
    let end_row = if pole_end { v_count - 1 } else { v_count };
    let ring_count = end_row - first_row;

    let mut positions: Vec<[f64; 3]> = grid[first_row * u_count..end_row * u_count]
        .iter()
        .map(|p| p.to_array())
        .collect();
    let mut indices = if ring_count >= 2 {
        triangulate_grid_wrapped(u_count, ring_count, true, false)
    } else {
        Vec::new()
    };

    let last_ring = ((ring_count - 1) * u_count) as u32;

    let start_apex = if pole_start {
        Some(grid[0])
    } else if caps.start {
        Some(ring_centroid(&positions[..u_count]))
    } else {
        None
    };
    if let Some(apex) = start_apex {
        let apex_index = positions.len() as u32;
        positions.push(apex.to_array());
        indices.extend(triangulate_ring_fan(apex_index, 0, u_count, true));
    }

    let end_apex = if pole_end {
        Some(grid[(v_count - 1) * u_count])
    } else if caps.end {
        let start = last_ring as usize;
        Some(ring_centroid(&positions[start..start + u_count]))
    } else {
        None
    };
    if let Some(apex) = end_apex {
        let apex_index = positions.len() as u32;
        positions.push(apex.to_array());
        indices.extend(triangulate_ring_fan(apex_index, last_ring, u_count, false));
    }

    GeomMesh::new(positions, indices)
}

fn ring_centroid(ring: &[[f64; 3]]) -> Point3 {
    let n = ring.len().max(1) as f64;
    let sum = ring.iter().fold([0.0; 3], |acc, p| {
        [acc[0] + p[0], acc[1] + p[1], acc[2] + p[2]]
    });
    Point3::new(sum[0] / n, sum[1] / n, sum[2] / n)
}
