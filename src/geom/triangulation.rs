/// Triangulates a `u_count × v_count` vertex grid laid out row by row
/// (`index = v * u_count + u`), optionally wrapping the last column or row
/// back onto the first.
#[must_use]
pub fn triangulate_grid_wrapped(
    u_count: usize,
    v_count: usize,
    wrap_u: bool,
    wrap_v: bool,
) -> Vec<u32> {
    let u_count = if wrap_u { u_count.max(3) } else { u_count.max(2) };
    let v_count = if wrap_v { v_count.max(3) } else { v_count.max(2) };

    let quad_u = if wrap_u { u_count } else { u_count - 1 };
    let quad_v = if wrap_v { v_count } else { v_count - 1 };
    let mut indices = Vec::with_capacity(quad_u * quad_v * 6);

    let stride = u_count;
    for v in 0..quad_v {
        let v0 = v;
        let v1 = if wrap_v { (v + 1) % v_count } else { v + 1 };

        for u in 0..quad_u {
            let u0 = u;
            let u1 = if wrap_u { (u + 1) % u_count } else { u + 1 };

            let i0 = (v0 * stride + u0) as u32;
            let i1 = (v0 * stride + u1) as u32;
            let i2 = (v1 * stride + u0) as u32;
            let i3 = (v1 * stride + u1) as u32;

            indices.extend_from_slice(&[i0, i1, i2]);
            indices.extend_from_slice(&[i2, i1, i3]);
        }
    }

    indices
}

/// Fan of triangles joining `apex` to a closed ring of `ring_len` vertices
/// starting at `ring_start`.
///
/// `closes_start` selects the winding used at the start of a grid (south pole,
/// bottom cap); otherwise the fan closes the end of the grid.
#[must_use]
pub fn triangulate_ring_fan(apex: u32, ring_start: u32, ring_len: usize, closes_start: bool) -> Vec<u32> {
    let mut indices = Vec::with_capacity(ring_len * 3);
    for u in 0..ring_len {
        let a = ring_start + u as u32;
        let b = ring_start + ((u + 1) % ring_len) as u32;
        if closes_start {
            indices.extend_from_slice(&[a, apex, b]);
        } else {
            indices.extend_from_slice(&[a, b, apex]);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_grid_has_two_triangles_per_quad() {
        let indices = triangulate_grid_wrapped(4, 3, false, false);
        assert_eq!(indices.len(), 3 * 2 * 3 * 2);
        assert!(indices.iter().all(|&i| i < 12));
    }

    #[test]
    fn wrapped_grid_reuses_first_column() {
        let indices = triangulate_grid_wrapped(4, 2, true, false);
        assert_eq!(indices.len() / 3, 4 * 2);
        // Last quad of the row closes the seam back to column 0.
        assert_eq!(&indices[18..21], &[3, 0, 7]);
    }

    #[test]
    fn fan_covers_every_ring_edge_once() {
        let indices = triangulate_ring_fan(10, 0, 5, true);
        assert_eq!(indices.len(), 15);
        assert!(indices.chunks_exact(3).all(|tri| tri[1] == 10));
        assert_eq!(&indices[12..15], &[4, 10, 0]);
    }
}
