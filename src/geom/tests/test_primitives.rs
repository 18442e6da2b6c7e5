use approx::assert_abs_diff_eq;

use crate::geom::{
    BBox, CIRCLE_SECTIONS, GeomError, GeomMesh, Vec3, box_mesh, capsule_mesh, cone_mesh,
    cylinder_mesh, icosphere_mesh, torus_mesh, uv_sphere_mesh,
};

fn assert_bounds(mesh: &GeomMesh, min: [f64; 3], max: [f64; 3]) {
    let BBox { min: lo, max: hi } = mesh.bounds().expect("non-empty mesh");
    for (axis, (got, want)) in lo.to_array().iter().zip(min).enumerate() {
        assert!((got - want).abs() < 1e-6, "min[{axis}] = {got}, expected {want}");
    }
    for (axis, (got, want)) in hi.to_array().iter().zip(max).enumerate() {
        assert!((got - want).abs() < 1e-6, "max[{axis}] = {got}, expected {want}");
    }
}

fn assert_sound(mesh: &GeomMesh) {
    mesh.validate().expect("valid mesh");
    assert!(mesh.is_closed(), "mesh should be watertight");
}

#[test]
fn unit_box_has_eight_corners() {
    let mesh = box_mesh(Vec3::new(1.0, 1.0, 1.0)).unwrap();
    assert_sound(&mesh);
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
    assert_bounds(&mesh, [-0.5; 3], [0.5; 3]);
}

#[test]
fn cylinder_is_centred_and_capped() {
    let mesh = cylinder_mesh(1.0, 1.0, CIRCLE_SECTIONS).unwrap();
    assert_sound(&mesh);
    assert_eq!(mesh.vertex_count(), 2 * 32 + 2);
    assert_eq!(mesh.triangle_count(), 4 * 32);
    assert_bounds(&mesh, [-1.0, -1.0, -0.5], [1.0, 1.0, 0.5]);
}

#[test]
fn cone_base_sits_on_xy_plane() {
    let mesh = cone_mesh(1.0, 2.0, CIRCLE_SECTIONS).unwrap();
    assert_sound(&mesh);
    assert_eq!(mesh.vertex_count(), 32 + 2);
    assert_eq!(mesh.triangle_count(), 2 * 32);
    assert_bounds(&mesh, [-1.0, -1.0, 0.0], [1.0, 1.0, 2.0]);
}

#[test]
fn torus_extents_follow_radii() {
    let mesh = torus_mesh(3.0, 1.0, CIRCLE_SECTIONS, CIRCLE_SECTIONS).unwrap();
    assert_sound(&mesh);
    assert_eq!(mesh.vertex_count(), 32 * 32);
    assert_eq!(mesh.triangle_count(), 2 * 32 * 32);
    assert_bounds(&mesh, [-4.0, -4.0, -1.0], [4.0, 4.0, 1.0]);
}

#[test]
fn capsule_length_includes_hemispheres() {
    let mesh = capsule_mesh(0.5, 2.0, CIRCLE_SECTIONS, CIRCLE_SECTIONS).unwrap();
    assert_sound(&mesh);
    assert_eq!(mesh.vertex_count(), 31 * 32 + 2);
    assert_bounds(&mesh, [-0.5, -0.5, -1.5], [0.5, 0.5, 1.5]);
}

#[test]
fn icosphere_vertices_lie_on_sphere() {
    let mesh = icosphere_mesh(1.0, 3).unwrap();
    assert_sound(&mesh);
    assert_eq!(mesh.vertex_count(), 162);
    assert_eq!(mesh.triangle_count(), 320);
    for p in &mesh.positions {
        assert_abs_diff_eq!(Vec3::from(*p).length(), 1.0, epsilon = 1e-5);
    }
}

#[test]
fn uv_sphere_has_single_pole_vertices() {
    let mesh = uv_sphere_mesh(1.0, 32, 16).unwrap();
    assert_sound(&mesh);
    assert_eq!(mesh.vertex_count(), 15 * 32 + 2);
    assert_eq!(mesh.triangle_count(), 14 * 32 * 2 + 2 * 32);
    let poles = mesh
        .positions
        .iter()
        .filter(|p| (p[2].abs() - 1.0).abs() < 1e-12)
        .count();
    assert_eq!(poles, 2);
}

#[test]
fn invalid_parameters_are_rejected() {
    assert!(matches!(
        cone_mesh(0.0, 2.0, 32),
        Err(GeomError::NonPositive { what: "cone radius", .. })
    ));
    assert!(matches!(
        cylinder_mesh(1.0, 1.0, 2),
        Err(GeomError::TooFewSections { min: 3, got: 2, .. })
    ));
    assert!(matches!(
        torus_mesh(3.0, -1.0, 32, 32),
        Err(GeomError::Surface(_))
    ));
    assert!(box_mesh(Vec3::new(1.0, f64::INFINITY, 1.0)).is_err());
}
