//! Loads an exported artifact and renders it to an image.
//!
//! The camera is a fixed orthographic view. Each axis is scaled to the unit
//! cube independently, so flat artifacts such as heightmaps still fill the
//! frame.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use imageproc::drawing::{Blend, draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use thiserror::Error;

use crate::config::ViewerOptions;
use crate::geom::{BBox, GeomMesh, Point3, PointCloud, Vec3};
use crate::parse::obj::{self, ObjDocument, ObjError};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Obj(#[from] ObjError),
    #[error("failed to save preview: {0}")]
    Image(#[from] image::ImageError),
    #[error("artifact has no vertices to frame")]
    EmptyBounds,
    #[error("artifact has non-finite coordinates")]
    NonFinite,
}

/// A loaded artifact, classified once by what its file contains.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Mesh(GeomMesh),
    PointCloud(PointCloud),
    Unsupported { reason: String },
}

impl From<ObjDocument> for Artifact {
    fn from(doc: ObjDocument) -> Self {
        if doc.positions.is_empty() {
            return Self::Unsupported {
                reason: "no vertices".to_owned(),
            };
        }
        if doc.has_faces() {
            let indices = doc.triangles.iter().flatten().copied().collect();
            return Self::Mesh(GeomMesh::new(doc.positions, indices));
        }
        if doc.line_elements > 0 {
            return Self::Unsupported {
                reason: format!("{} polyline elements and no faces", doc.line_elements),
            };
        }
        Self::PointCloud(PointCloud::new(doc.positions))
    }
}

impl Artifact {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Mesh(_) => "mesh",
            Self::PointCloud(_) => "point cloud",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

pub fn load_artifact(path: &Path) -> Result<Artifact, ViewError> {
    let artifact = Artifact::from(obj::read_file(path)?);
    log::debug!("{} loaded as {}", path.display(), artifact.kind_name());
    Ok(artifact)
}

const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

/// Viridis colour for `t` in `[0, 1]`; values outside are clamped.
#[must_use]
pub fn viridis(t: f64) -> Rgba<u8> {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let f = scaled - i as f64;
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    let mix = |k: usize| (f64::from(a[k]) + (f64::from(b[k]) - f64::from(a[k])) * f).round() as u8;
    Rgba([mix(0), mix(1), mix(2), 255])
}

/// Orthographic camera over the auto-scaled unit cube.
struct Projector {
    center: Point3,
    extent: Vec3,
    right: Vec3,
    up: Vec3,
    toward_eye: Vec3,
    scale: f64,
    origin: (f64, f64),
}

impl Projector {
    fn new(bounds: BBox, options: &ViewerOptions) -> Self {
        let size = bounds.size();
        let fix = |e: f64| if e > f64::EPSILON { e } else { 1.0 };
        let elev = options.elevation_deg.to_radians();
        let azim = options.azimuth_deg.to_radians();

        let toward_eye = Vec3::new(elev.cos() * azim.cos(), elev.cos() * azim.sin(), elev.sin());
        let right = Vec3::new(-azim.sin(), azim.cos(), 0.0);
        let up = toward_eye.cross(right);

        let half_diagonal = 3f64.sqrt() * 0.5;
        let span = f64::from(options.width.min(options.height));
        Self {
            center: bounds.center(),
            extent: Vec3::new(fix(size.x), fix(size.y), fix(size.z)),
            right,
            up,
            toward_eye,
            scale: 0.45 * span / half_diagonal,
            origin: (f64::from(options.width) * 0.5, f64::from(options.height) * 0.5),
        }
    }

    fn normalise(&self, p: [f64; 3]) -> Vec3 {
        let d = Point3::from_array(p).sub_point(self.center);
        Vec3::new(d.x / self.extent.x, d.y / self.extent.y, d.z / self.extent.z)
    }

    /// Screen position and depth; larger depth is nearer the camera.
    fn project(&self, p: [f64; 3]) -> (f32, f32, f64) {
        let n = self.normalise(p);
        self.project_direction(n, self.origin, self.scale)
    }

    fn project_direction(&self, n: Vec3, origin: (f64, f64), scale: f64) -> (f32, f32, f64) {
        let sx = origin.0 + n.dot(self.right) * scale;
        let sy = origin.1 - n.dot(self.up) * scale;
        (sx as f32, sy as f32, n.dot(self.toward_eye))
    }
}

fn frame_bounds(positions: &[[f64; 3]]) -> Result<BBox, ViewError> {
    let bounds = BBox::from_positions(positions).ok_or(ViewError::EmptyBounds)?;
    if bounds.is_finite() {
        Ok(bounds)
    } else {
        Err(ViewError::NonFinite)
    }
}

fn pixel(p: (f32, f32, f64)) -> Point<i32> {
    Point::new(p.0.round() as i32, p.1.round() as i32)
}

fn draw_mesh(canvas: &mut Blend<RgbaImage>, mesh: &GeomMesh, options: &ViewerOptions) -> Result<(), ViewError> {
    let projector = Projector::new(frame_bounds(&mesh.positions)?, options);
    let projected: Vec<_> = mesh.positions.iter().map(|&p| projector.project(p)).collect();

    let mut faces: Vec<([u32; 3], f64)> = mesh
        .triangles()
        .map(|tri| {
            let depth = tri.iter().map(|&i| projected[i as usize].2).sum::<f64>() / 3.0;
            (tri, depth)
        })
        .collect();
    faces.sort_by(|a, b| a.1.total_cmp(&b.1));

    let face = Rgba(options.face_color);
    let edge = Rgba(options.edge_color);
    for (tri, _) in faces {
        let corners = tri.map(|i| projected[i as usize]);
        let points = corners.map(pixel);
        if points[0] != points[1] && points[1] != points[2] && points[0] != points[2] {
            draw_polygon_mut(canvas, &points, face);
        }
        for k in 0..3 {
            let (a, b) = (corners[k], corners[(k + 1) % 3]);
            draw_line_segment_mut(canvas, (a.0, a.1), (b.0, b.1), edge);
        }
    }
    Ok(())
}

fn draw_points(canvas: &mut Blend<RgbaImage>, cloud: &PointCloud, options: &ViewerOptions) -> Result<(), ViewError> {
    let bounds = frame_bounds(&cloud.points)?;
    let projector = Projector::new(bounds, options);
    let z_span = bounds.size().z;

    let mut dots: Vec<((f32, f32, f64), f64)> = cloud
        .points
        .iter()
        .map(|&p| {
            let t = if z_span > 0.0 { (p[2] - bounds.min.z) / z_span } else { 0.0 };
            (projector.project(p), t)
        })
        .collect();
    dots.sort_by(|(a, _), (b, _)| a.2.total_cmp(&b.2));

    for (screen, t) in dots {
        let centre = pixel(screen);
        draw_filled_circle_mut(canvas, (centre.x, centre.y), options.point_radius, viridis(t));
    }
    Ok(())
}

/// Stroke glyphs on a 4 × 6 cell, y down: `[x0, y0, x1, y1]` per segment.
fn glyph(c: char) -> &'static [[f32; 4]] {
    match c {
        'X' => &[[0.0, 0.0, 4.0, 6.0], [4.0, 0.0, 0.0, 6.0]],
        'Y' => &[[0.0, 0.0, 2.0, 3.0], [4.0, 0.0, 2.0, 3.0], [2.0, 3.0, 2.0, 6.0]],
        'Z' => &[[0.0, 0.0, 4.0, 0.0], [4.0, 0.0, 0.0, 6.0], [0.0, 6.0, 4.0, 6.0]],
        '3' => &[
            [0.0, 0.0, 4.0, 0.0],
            [4.0, 0.0, 4.0, 6.0],
            [4.0, 6.0, 0.0, 6.0],
            [1.0, 3.0, 4.0, 3.0],
        ],
        'D' => &[
            [0.0, 0.0, 0.0, 6.0],
            [0.0, 0.0, 3.0, 0.0],
            [3.0, 0.0, 4.0, 1.0],
            [4.0, 1.0, 4.0, 5.0],
            [4.0, 5.0, 3.0, 6.0],
            [3.0, 6.0, 0.0, 6.0],
        ],
        'M' => &[
            [0.0, 6.0, 0.0, 0.0],
            [0.0, 0.0, 2.0, 3.0],
            [2.0, 3.0, 4.0, 0.0],
            [4.0, 0.0, 4.0, 6.0],
        ],
        'o' => &[
            [0.0, 2.0, 4.0, 2.0],
            [4.0, 2.0, 4.0, 6.0],
            [4.0, 6.0, 0.0, 6.0],
            [0.0, 6.0, 0.0, 2.0],
        ],
        'd' => &[
            [0.0, 2.0, 4.0, 2.0],
            [0.0, 2.0, 0.0, 6.0],
            [0.0, 6.0, 4.0, 6.0],
            [4.0, 0.0, 4.0, 6.0],
        ],
        'e' => &[
            [0.0, 4.0, 4.0, 4.0],
            [4.0, 4.0, 4.0, 2.0],
            [4.0, 2.0, 0.0, 2.0],
            [0.0, 2.0, 0.0, 6.0],
            [0.0, 6.0, 4.0, 6.0],
        ],
        'l' => &[[2.0, 0.0, 2.0, 6.0]],
        _ => &[],
    }
}

const GLYPH_ADVANCE: f32 = 6.0;

/// Draws `text` with its cell grid scaled by `scale` pixels, centred on
/// `centre`.
fn draw_label(canvas: &mut Blend<RgbaImage>, text: &str, centre: (f32, f32), scale: f32, colour: Rgba<u8>) {
    let count = text.chars().count() as f32;
    let width = (count * GLYPH_ADVANCE - (GLYPH_ADVANCE - 4.0)) * scale;
    let left = centre.0 - width * 0.5;
    let top = centre.1 - 3.0 * scale;
    for (i, c) in text.chars().enumerate() {
        let x = left + i as f32 * GLYPH_ADVANCE * scale;
        for &[x0, y0, x1, y1] in glyph(c) {
            draw_line_segment_mut(
                canvas,
                (x + x0 * scale, top + y0 * scale),
                (x + x1 * scale, top + y1 * scale),
                colour,
            );
        }
    }
}

/// Labelled X/Y/Z triad in the lower-left corner, in red, green and blue.
fn draw_axes(canvas: &mut Blend<RgbaImage>, options: &ViewerOptions) {
    let bounds = BBox::new(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5));
    let projector = Projector::new(bounds, options);
    let origin = (48.0, f64::from(options.height) - 48.0);
    let axes = [
        (Vec3::X, "X", Rgba([220, 40, 40, 255])),
        (Vec3::Y, "Y", Rgba([40, 160, 40, 255])),
        (Vec3::Z, "Z", Rgba([40, 40, 220, 255])),
    ];
    for (axis, name, colour) in axes {
        let tip = projector.project_direction(axis, origin, 36.0);
        draw_line_segment_mut(canvas, (origin.0 as f32, origin.1 as f32), (tip.0, tip.1), colour);
        let label = projector.project_direction(axis, origin, 46.0);
        draw_label(canvas, name, (label.0, label.1), 1.5, colour);
    }
}

/// Renders `artifact`; `Ok(None)` when the artifact kind cannot be shown.
pub fn render_artifact(artifact: &Artifact, options: &ViewerOptions) -> Result<Option<RgbaImage>, ViewError> {
    let background = RgbaImage::from_pixel(options.width, options.height, Rgba([255, 255, 255, 255]));
    let mut canvas = Blend(background);
    match artifact {
        Artifact::Mesh(mesh) => draw_mesh(&mut canvas, mesh, options)?,
        Artifact::PointCloud(cloud) => draw_points(&mut canvas, cloud, options)?,
        Artifact::Unsupported { reason } => {
            log::debug!("not rendering artifact: {reason}");
            return Ok(None);
        }
    }
    draw_axes(&mut canvas, options);
    let title_y = (options.height as f32 * 0.03).max(10.0);
    draw_label(&mut canvas, "3D Model", (options.width as f32 * 0.5, title_y), 3.0, Rgba([0, 0, 0, 255]));
    Ok(Some(canvas.0))
}

fn show(path: &Path, options: &ViewerOptions) -> Result<Option<PathBuf>, ViewError> {
    let artifact = load_artifact(path)?;
    let Some(frame) = render_artifact(&artifact, options)? else {
        println!("Unsupported model type for visualization.");
        return Ok(None);
    };
    if !options.save_preview {
        return Ok(None);
    }
    let preview = path.with_extension("png");
    frame.save(&preview)?;
    log::info!("wrote preview {}", preview.display());
    println!("Model preview saved as '{}'", preview.display());
    Ok(Some(preview))
}

/// Renders the artifact at `path` and saves a PNG preview next to it.
///
/// Never fails: problems are reported and `None` is returned.
pub fn display_model(path: &Path, options: &ViewerOptions) -> Option<PathBuf> {
    match show(path, options) {
        Ok(preview) => preview,
        Err(err) => {
            println!("Could not display model: {err}");
            log::error!("display of {} failed: {err}", path.display());
            None
        }
    }
}
