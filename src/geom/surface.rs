use super::{Point3, Vec3};

fn wrap_param(value: f64, start: f64, end: f64) -> f64 {
    let span = end - start;
    if !span.is_finite() || span == 0.0 {
        return start;
    }
    let mut t = (value - start) % span;
    if t < 0.0 {
        t += span;
    }
    start + t
}

fn orthogonal_unit_vector(reference: Vec3) -> Vec3 {
    let candidate = if reference.x.abs() < reference.y.abs() {
        Vec3::new(0.0, -reference.z, reference.y)
    } else {
        Vec3::new(-reference.z, 0.0, reference.x)
    };

    candidate
        .normalized()
        .unwrap_or_else(|| Vec3::new(1.0, 0.0, 0.0))
}

/// Right-handed frame `(x, y, axis)` around a non-zero axis direction.
fn frame_around(axis: Vec3) -> Result<(Vec3, Vec3, Vec3), String> {
    let z = axis.normalized().ok_or_else(|| "surface axis must be non-zero".to_string())?;
    // Prefer world X so +Z axes keep the familiar seam at +X.
    let projected = Vec3::X.sub(z.mul_scalar(Vec3::X.dot(z)));
    let x = projected
        .normalized()
        .unwrap_or_else(|| orthogonal_unit_vector(z));
    let y = z.cross(x).normalized().unwrap_or(Vec3::Y);
    Ok((x, y, z))
}

fn require_positive(value: f64, what: &str) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{what} must be finite and > 0"))
    }
}

/// A parametric surface over the unit square `(u, v) ∈ [0, 1]²`.
///
/// `u` runs around the surface and `v` along it, so `(∂/∂u × ∂/∂v)` points
/// outward for every closed primitive defined here.
pub trait Surface {
    fn point_at(&self, u: f64, v: f64) -> Point3;

    #[must_use]
    fn is_u_closed(&self) -> bool {
        false
    }

    #[must_use]
    fn is_v_closed(&self) -> bool {
        false
    }

    /// The whole `v = 0` row collapses to a single point.
    #[must_use]
    fn pole_v_start(&self) -> bool {
        false
    }

    /// The whole `v = 1` row collapses to a single point.
    #[must_use]
    fn pole_v_end(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderSurface {
    pub base: Point3,
    pub axis: Vec3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub radius: f64,
}

impl CylinderSurface {
    /// Cylinder wall from `base` to `base + axis`.
    pub fn new(base: Point3, axis: Vec3, radius: f64) -> Result<Self, String> {
        require_positive(radius, "cylinder radius")?;
        let (x_axis, y_axis, _) = frame_around(axis)?;
        Ok(Self {
            base,
            axis,
            x_axis,
            y_axis,
            radius,
        })
    }
}

impl Surface for CylinderSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let angle = std::f64::consts::TAU * wrap_param(u, 0.0, 1.0);
        let radial = self
            .x_axis
            .mul_scalar(angle.cos())
            .add(self.y_axis.mul_scalar(angle.sin()))
            .mul_scalar(self.radius);

        self.base.add_vec(self.axis.mul_scalar(v)).add_vec(radial)
    }

    fn is_u_closed(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeSurface {
    pub base: Point3,
    pub axis: Vec3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub radius0: f64,
    pub radius1: f64,
}

impl ConeSurface {
    /// Cone wall from `radius0` at `base` to `radius1` at `base + axis`.
    pub fn new(base: Point3, axis: Vec3, radius0: f64, radius1: f64) -> Result<Self, String> {
        if !radius0.is_finite() || radius0 < 0.0 || !radius1.is_finite() || radius1 < 0.0 {
            return Err("cone radii must be finite and >= 0".to_string());
        }
        if radius0 == 0.0 && radius1 == 0.0 {
            return Err("cone needs at least one non-zero radius".to_string());
        }
        let (x_axis, y_axis, _) = frame_around(axis)?;
        Ok(Self {
            base,
            axis,
            x_axis,
            y_axis,
            radius0,
            radius1,
        })
    }
}

impl Surface for ConeSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let angle = std::f64::consts::TAU * wrap_param(u, 0.0, 1.0);
        let radius = self.radius0 + (self.radius1 - self.radius0) * v;
        let radial = self
            .x_axis
            .mul_scalar(angle.cos())
            .add(self.y_axis.mul_scalar(angle.sin()))
            .mul_scalar(radius);

        self.base.add_vec(self.axis.mul_scalar(v)).add_vec(radial)
    }

    fn is_u_closed(&self) -> bool {
        true
    }

    fn pole_v_start(&self) -> bool {
        self.radius0 == 0.0
    }

    fn pole_v_end(&self) -> bool {
        self.radius1 == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSurface {
    pub center: Point3,
    pub radius: f64,
}

impl SphereSurface {
    pub fn new(center: Point3, radius: f64) -> Result<Self, String> {
        require_positive(radius, "sphere radius")?;
        Ok(Self { center, radius })
    }
}

impl Surface for SphereSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let theta = std::f64::consts::TAU * wrap_param(u, 0.0, 1.0);
        let phi = std::f64::consts::PI * (v.clamp(0.0, 1.0) - 0.5);

        let cos_phi = phi.cos();
        self.center.add_vec(
            Vec3::new(cos_phi * theta.cos(), cos_phi * theta.sin(), phi.sin())
                .mul_scalar(self.radius),
        )
    }

    fn is_u_closed(&self) -> bool {
        true
    }

    fn pole_v_start(&self) -> bool {
        true
    }

    fn pole_v_end(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusSurface {
    pub center: Point3,
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl TorusSurface {
    /// Torus around the world Z axis.
    pub fn new(center: Point3, major_radius: f64, minor_radius: f64) -> Result<Self, String> {
        require_positive(major_radius, "torus major radius")?;
        require_positive(minor_radius, "torus minor radius")?;
        Ok(Self {
            center,
            major_radius,
            minor_radius,
        })
    }
}

impl Surface for TorusSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let theta = std::f64::consts::TAU * wrap_param(u, 0.0, 1.0);
        let phi = std::f64::consts::TAU * wrap_param(v, 0.0, 1.0);

        let radial = Vec3::new(theta.cos(), theta.sin(), 0.0);
        let tube = radial.mul_scalar(self.major_radius + self.minor_radius * phi.cos());
        let vertical = Vec3::Z.mul_scalar(self.minor_radius * phi.sin());
        self.center.add_vec(tube.add(vertical))
    }

    fn is_u_closed(&self) -> bool {
        true
    }

    fn is_v_closed(&self) -> bool {
        true
    }
}

/// Capsule around the world Z axis: two hemispheres of `radius` whose centres
/// sit `height` apart, joined by a cylinder.
///
/// `v` is distributed by profile arc length so rings stay evenly spaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleSurface {
    pub center: Point3,
    pub radius: f64,
    pub height: f64,
}

impl CapsuleSurface {
    pub fn new(center: Point3, radius: f64, height: f64) -> Result<Self, String> {
        require_positive(radius, "capsule radius")?;
        if !height.is_finite() || height < 0.0 {
            return Err("capsule height must be finite and >= 0".to_string());
        }
        Ok(Self {
            center,
            radius,
            height,
        })
    }

    fn cap_fraction(&self) -> f64 {
        let cap_arc = std::f64::consts::FRAC_PI_2 * self.radius;
        cap_arc / (2.0 * cap_arc + self.height)
    }
}

impl Surface for CapsuleSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let theta = std::f64::consts::TAU * wrap_param(u, 0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let cap = self.cap_fraction();
        let half = self.height * 0.5;

        // (latitude, axial offset of the sphere centre)
        let (phi, offset) = if v < cap {
            (std::f64::consts::FRAC_PI_2 * (v / cap - 1.0), -half)
        } else if v > 1.0 - cap {
            (std::f64::consts::FRAC_PI_2 * ((v - (1.0 - cap)) / cap), half)
        } else {
            let t = (v - cap) / (1.0 - 2.0 * cap);
            (0.0, -half + self.height * t)
        };

        let cos_phi = phi.cos();
        self.center.add_vec(Vec3::new(
            self.radius * cos_phi * theta.cos(),
            self.radius * cos_phi * theta.sin(),
            offset + self.radius * phi.sin(),
        ))
    }

    fn is_u_closed(&self) -> bool {
        true
    }

    fn pole_v_start(&self) -> bool {
        true
    }

    fn pole_v_end(&self) -> bool {
        true
    }
}

/// Samples `surface` on a `u_count × v_count` grid, row by row.
///
/// Closed directions do not repeat the seam.
#[must_use]
pub fn tessellate_surface_grid(
    surface: &impl Surface,
    u_count: usize,
    v_count: usize,
) -> Vec<Point3> {
    let u_closed = surface.is_u_closed();
    let v_closed = surface.is_v_closed();

    let u_count = if u_closed { u_count.max(3) } else { u_count.max(2) };
    let v_count = if v_closed { v_count.max(3) } else { v_count.max(2) };

    let u_denom = (if u_closed { u_count } else { u_count - 1 }) as f64;
    let v_denom = (if v_closed { v_count } else { v_count - 1 }) as f64;

    let mut points = Vec::with_capacity(u_count * v_count);
    for v in 0..v_count {
        let v_t = v as f64 / v_denom;
        for u in 0..u_count {
            points.push(surface.point_at(u as f64 / u_denom, v_t));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sphere_poles_and_equator() {
        let sphere = SphereSurface::new(Point3::ORIGIN, 2.0).unwrap();
        assert_abs_diff_eq!(sphere.point_at(0.3, 0.0).z, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sphere.point_at(0.7, 1.0).z, 2.0, epsilon = 1e-12);
        let eq = sphere.point_at(0.0, 0.5);
        assert_abs_diff_eq!(eq.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eq.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn cylinder_runs_along_its_axis() {
        let cyl = CylinderSurface::new(Point3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 2.0), 0.5)
            .unwrap();
        let top = cyl.point_at(0.0, 1.0);
        assert_abs_diff_eq!(top.z, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(top.x, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn cone_apex_is_a_pole() {
        let cone = ConeSurface::new(Point3::ORIGIN, Vec3::Z.mul_scalar(2.0), 1.0, 0.0).unwrap();
        assert!(!cone.pole_v_start());
        assert!(cone.pole_v_end());
        let apex = cone.point_at(0.4, 1.0);
        assert_abs_diff_eq!(apex.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(apex.z, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn capsule_profile_spans_height_plus_caps() {
        let capsule = CapsuleSurface::new(Point3::ORIGIN, 0.5, 2.0).unwrap();
        assert_abs_diff_eq!(capsule.point_at(0.0, 0.0).z, -1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(capsule.point_at(0.0, 1.0).z, 1.5, epsilon = 1e-12);
        let mid = capsule.point_at(0.0, 0.5);
        assert_abs_diff_eq!(mid.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(mid.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn closed_grid_does_not_repeat_seam() {
        let torus = TorusSurface::new(Point3::ORIGIN, 3.0, 1.0).unwrap();
        let grid = tessellate_surface_grid(&torus, 8, 6);
        assert_eq!(grid.len(), 48);
        assert_abs_diff_eq!(grid[0].x, 4.0, epsilon = 1e-12);
        assert!((grid[7].x - 4.0).abs() > 1e-3);
    }

    #[test]
    fn rejects_bad_radii() {
        assert!(SphereSurface::new(Point3::ORIGIN, 0.0).is_err());
        assert!(TorusSurface::new(Point3::ORIGIN, 3.0, f64::NAN).is_err());
        assert!(ConeSurface::new(Point3::ORIGIN, Vec3::Z, 0.0, 0.0).is_err());
        assert!(CylinderSurface::new(Point3::ORIGIN, Vec3::ZERO, 1.0).is_err());
    }
}
