//! Image to point cloud: every lit edge or filled-contour pixel becomes a
//! point raised above the image plane.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::drawing::draw_polygon_mut;
use imageproc::filter::separable_filter_equal;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use imageproc::point::Point;
use thiserror::Error;

use crate::config::{EngineConfig, HeightmapOptions};
use crate::error::EngineResult;
use crate::geom::PointCloud;
use crate::parse::obj;
use crate::{ArtifactKind, Export};

pub type HeightmapResult<T> = Result<T, HeightmapError>;

#[derive(Debug, Error)]
pub enum HeightmapError {
    #[error("failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{} has no pixels", .path.display())]
    EmptyImage { path: PathBuf },
    #[error("invalid heightmap options: {0}")]
    InvalidOptions(String),
}

impl HeightmapError {
    /// The input could not be turned into pixels.
    #[must_use]
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::EmptyImage { .. })
    }
}

/// Per-pixel heights of the working grid, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f64>,
}

impl HeightField {
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.values[(y as usize) * (self.width as usize) + x as usize]
    }
}

impl HeightmapOptions {
    pub fn validate(&self) -> HeightmapResult<()> {
        if self.working_size == 0 {
            return Err(HeightmapError::InvalidOptions(
                "working size must be > 0".to_owned(),
            ));
        }
        if self.blur_kernel % 2 == 0 {
            return Err(HeightmapError::InvalidOptions(format!(
                "blur kernel must have an odd number of taps, got {}",
                self.blur_kernel
            )));
        }
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            return Err(HeightmapError::InvalidOptions(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {} / {}",
                self.canny_low, self.canny_high
            )));
        }
        if !(self.height_scale.is_finite() && self.height_scale > 0.0) {
            return Err(HeightmapError::InvalidOptions(format!(
                "height scale must be finite and > 0, got {}",
                self.height_scale
            )));
        }
        Ok(())
    }
}

pub fn load_image(path: &Path) -> HeightmapResult<DynamicImage> {
    let img = image::open(path).map_err(|source| HeightmapError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    if img.width() == 0 || img.height() == 0 {
        return Err(HeightmapError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok(img)
}

/// Resizes to a `size × size` grid (bilinear) and drops colour.
#[must_use]
pub fn prepare_working_image(img: &DynamicImage, size: u32) -> GrayImage {
    img.resize_exact(size, size, FilterType::Triangle).to_luma8()
}

/// Normalised Gaussian taps; sigma follows the usual rule of thumb for a
/// kernel of `taps` samples.
#[must_use]
pub fn gaussian_kernel(taps: usize) -> Vec<f32> {
    let taps = taps.max(1);
    let sigma = 0.3 * ((taps as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let centre = (taps / 2) as f32;
    let weights: Vec<f32> = (0..taps)
        .map(|i| {
            let d = i as f32 - centre;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

#[must_use]
pub fn blur(gray: &GrayImage, taps: usize) -> GrayImage {
    separable_filter_equal(gray, &gaussian_kernel(taps))
}

const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

/// Canny edges of an already smoothed image: Sobel gradients with L1
/// magnitude, non-maximum suppression, then hysteresis between `low` and
/// `high`. No further blurring is applied.
///
/// Returns a binary map, 255 on edges. The one-pixel border is never an edge.
#[must_use]
pub fn detect_edges(gray: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut edges = GrayImage::new(width, height);
    if width < 3 || height < 3 {
        return edges;
    }

    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);
    let gradient = |x: u32, y: u32| (f32::from(gx.get_pixel(x, y).0[0]), f32::from(gy.get_pixel(x, y).0[0]));
    let magnitude = |(x, y): (u32, u32)| {
        let (dx, dy) = gradient(x, y);
        dx.abs() + dy.abs()
    };
    let index = |x: u32, y: u32| (y as usize) * (width as usize) + x as usize;

    // 0 suppressed, 1 weak, 2 strong
    let mut class = vec![0u8; (width as usize) * (height as usize)];
    let mut strong = Vec::new();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let m = magnitude((x, y));
            if m <= low {
                continue;
            }
            let (dx, dy) = gradient(x, y);
            let (ax, ay) = (dx.abs(), dy.abs());
            let (before, after) = if ay <= ax * TAN_22_5 {
                ((x - 1, y), (x + 1, y))
            } else if ay >= ax * TAN_67_5 {
                ((x, y - 1), (x, y + 1))
            } else if (dx >= 0.0) == (dy >= 0.0) {
                ((x - 1, y - 1), (x + 1, y + 1))
            } else {
                ((x + 1, y - 1), (x - 1, y + 1))
            };
            if m > magnitude(before) && m >= magnitude(after) {
                if m > high {
                    class[index(x, y)] = 2;
                    strong.push((x, y));
                } else {
                    class[index(x, y)] = 1;
                }
            }
        }
    }

    while let Some((x, y)) = strong.pop() {
        edges.put_pixel(x, y, Luma([u8::MAX]));
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                let i = index(nx, ny);
                if class[i] == 1 {
                    class[i] = 2;
                    strong.push((nx, ny));
                }
            }
        }
    }
    edges
}

/// Fills every outermost outer contour of `edges` into a new binary map.
#[must_use]
pub fn fill_external_contours(edges: &GrayImage) -> GrayImage {
    let mut filled = GrayImage::new(edges.width(), edges.height());
    let lit = Luma([u8::MAX]);

    let contours = find_contours::<i32>(edges);
    let mut external = 0usize;
    for contour in contours
        .iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
    {
        external += 1;
        let mut points: Vec<Point<i32>> = contour.points.clone();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() >= 3 {
            draw_polygon_mut(&mut filled, &points, lit);
        } else {
            for p in &points {
                // Contour points come from the image grid, so they are in bounds.
                filled.put_pixel(p.x as u32, p.y as u32, lit);
            }
        }
    }
    log::debug!("filled {external} of {} contours", contours.len());
    filled
}

/// Element-wise maximum of the two normalised maps, scaled to `height_scale`.
#[must_use]
pub fn combine_height(edges: &GrayImage, filled: &GrayImage, height_scale: f64) -> HeightField {
    let values = edges
        .pixels()
        .zip(filled.pixels())
        .map(|(e, f)| f64::from(e.0[0].max(f.0[0])) / 255.0 * height_scale)
        .collect();
    HeightField {
        width: edges.width(),
        height: edges.height(),
        values,
    }
}

/// One `(x, y, height)` point per pixel with a positive height, row-major.
#[must_use]
pub fn collect_points(field: &HeightField) -> PointCloud {
    let mut points = Vec::new();
    for y in 0..field.height {
        for x in 0..field.width {
            let z = field.get(x, y);
            if z > 0.0 {
                points.push([f64::from(x), f64::from(y), z]);
            }
        }
    }
    PointCloud::new(points)
}

/// Runs the stages on an already decoded image.
pub fn heightmap_from_image(img: &DynamicImage, options: &HeightmapOptions) -> HeightmapResult<PointCloud> {
    options.validate()?;
    let gray = prepare_working_image(img, options.working_size);
    let blurred = blur(&gray, options.blur_kernel);
    let edges = detect_edges(&blurred, options.canny_low, options.canny_high);
    let filled = fill_external_contours(&edges);
    let field = combine_height(&edges, &filled, options.height_scale);
    Ok(collect_points(&field))
}

pub fn extract_heightmap(path: &Path, options: &HeightmapOptions) -> HeightmapResult<PointCloud> {
    options.validate()?;
    let img = load_image(path)?;
    log::debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    heightmap_from_image(&img, options)
}

/// Extracts and exports the point cloud for the image at `path`.
///
/// Returns `Ok(None)` without writing anything when the image cannot be
/// loaded.
pub fn generate_from_image(path: &Path, config: &EngineConfig) -> EngineResult<Option<Export>> {
    println!("Creating a 3D model of the image from user.");

    let cloud = match extract_heightmap(path, &config.heightmap) {
        Ok(cloud) => cloud,
        Err(err) if err.is_load_failure() => {
            println!("Error loading image: {err}");
            log::warn!("image input skipped: {err}");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let out = &config.outputs.image_path;
    obj::write_points(out, &cloud, "heightmap")?;
    log::info!("wrote {} ({} points)", out.display(), cloud.len());
    println!("3D model from image saved as '{}'", out.display());

    Ok(Some(Export {
        path: out.clone(),
        kind: ArtifactKind::PointCloud,
        vertex_count: cloud.len(),
        face_count: 0,
    }))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use image::{Rgb, RgbImage};
    use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut};
    use imageproc::rect::Rect;

    use super::*;
    use crate::config::OutputPaths;

    fn disk_image(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbImage::new(width, height);
        let centre = ((width / 2) as i32, (height / 2) as i32);
        let radius = (width.min(height) / 3) as i32;
        draw_filled_circle_mut(&mut img, centre, radius, Rgb([255, 255, 255]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let k = gaussian_kernel(5);
        assert_eq!(k.len(), 5);
        assert_abs_diff_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(k[0], k[4], epsilon = 1e-7);
        assert!(k[2] > k[1] && k[1] > k[0]);
        assert_eq!(gaussian_kernel(1), vec![1.0]);
    }

    #[test]
    fn any_resolution_maps_to_working_grid() {
        for (w, h) in [(50, 20), (1, 1), (800, 1200)] {
            let gray = prepare_working_image(&disk_image(w, h), 384);
            assert_eq!(gray.dimensions(), (384, 384));
        }
    }

    #[test]
    fn all_black_image_yields_no_points() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(64, 48));
        let cloud = heightmap_from_image(&img, &HeightmapOptions::default()).unwrap();
        assert!(cloud.is_empty());
    }

    #[test]
    fn disk_produces_bounded_row_major_points() {
        let options = HeightmapOptions::default();
        let cloud = heightmap_from_image(&disk_image(120, 90), &options).unwrap();
        assert!(!cloud.is_empty());
        assert!(cloud.len() <= 384 * 384);
        for p in &cloud.points {
            assert!(p[2] > 0.0 && p[2] <= 0.1, "height {} out of range", p[2]);
            assert!(p[0] < 384.0 && p[1] < 384.0);
        }
        let ordered = cloud
            .points
            .windows(2)
            .all(|w| (w[0][1], w[0][0]) < (w[1][1], w[1][0]));
        assert!(ordered);
    }

    fn step_image(level: u8) -> GrayImage {
        GrayImage::from_fn(20, 20, |x, _| Luma([if x < 10 { 0 } else { level }]))
    }

    #[test]
    fn step_edge_is_one_pixel_wide() {
        let edges = detect_edges(&step_image(100), 100.0, 200.0);
        for y in 1..19 {
            assert_eq!(edges.get_pixel(9, y).0[0], 255, "row {y}");
        }
        assert_eq!(edges.pixels().filter(|p| p.0[0] == 255).count(), 18);
    }

    #[test]
    fn weak_edges_need_a_strong_neighbour() {
        // |gx| = 120 sits between the thresholds everywhere.
        let edges = detect_edges(&step_image(30), 100.0, 200.0);
        assert!(edges.pixels().all(|p| p.0[0] == 0));

        // Lower half is strong, upper half weak but connected to it.
        let mixed = GrayImage::from_fn(20, 20, |x, y| {
            Luma([match (x < 10, y < 10) {
                (true, _) => 0,
                (false, true) => 30,
                (false, false) => 100,
            }])
        });
        let edges = detect_edges(&mixed, 100.0, 200.0);
        assert_eq!(edges.get_pixel(9, 15).0[0], 255);
        assert_eq!(edges.get_pixel(9, 3).0[0], 255);
    }

    #[test]
    fn moderate_contrast_square_survives_single_blur() {
        let mut img = RgbImage::new(384, 384);
        draw_filled_rect_mut(&mut img, Rect::at(102, 102).of_size(180, 180), Rgb([100, 100, 100]));
        let cloud = heightmap_from_image(&DynamicImage::ImageRgb8(img), &HeightmapOptions::default()).unwrap();
        // At least the outline of the square is raised.
        assert!(cloud.len() >= 600, "only {} points", cloud.len());
    }

    #[test]
    fn outer_contours_are_filled_and_nested_ones_ignored() {
        let mut edges = GrayImage::new(40, 40);
        draw_hollow_rect_mut(&mut edges, Rect::at(4, 4).of_size(12, 12), Luma([255]));
        draw_hollow_rect_mut(&mut edges, Rect::at(8, 8).of_size(4, 4), Luma([255]));
        draw_hollow_rect_mut(&mut edges, Rect::at(24, 24).of_size(10, 10), Luma([255]));
        edges.put_pixel(35, 5, Luma([255]));

        let filled = fill_external_contours(&edges);
        assert_eq!(filled.get_pixel(6, 6).0[0], 255);
        assert_eq!(filled.get_pixel(10, 10).0[0], 255);
        assert_eq!(filled.get_pixel(28, 28).0[0], 255);
        assert_eq!(filled.get_pixel(35, 5).0[0], 255);
        assert_eq!(filled.get_pixel(1, 1).0[0], 0);
        assert_eq!(filled.get_pixel(20, 20).0[0], 0);
    }

    #[test]
    fn combined_height_takes_the_brighter_map() {
        let mut edges = GrayImage::new(3, 1);
        let mut filled = GrayImage::new(3, 1);
        edges.put_pixel(0, 0, Luma([255]));
        filled.put_pixel(1, 0, Luma([255]));
        let field = combine_height(&edges, &filled, 0.1);
        assert_eq!(field.values, vec![0.1, 0.1, 0.0]);

        let cloud = collect_points(&field);
        assert_eq!(cloud.points, vec![[0.0, 0.0, 0.1], [1.0, 0.0, 0.1]]);
    }

    #[test]
    fn options_are_checked() {
        let bad = HeightmapOptions {
            blur_kernel: 4,
            ..HeightmapOptions::default()
        };
        assert!(matches!(bad.validate(), Err(HeightmapError::InvalidOptions(_))));
        let bad = HeightmapOptions {
            canny_low: 300.0,
            ..HeightmapOptions::default()
        };
        assert!(bad.validate().is_err());
        assert!(HeightmapOptions::default().validate().is_ok());
    }

    #[test]
    fn missing_image_is_reported_and_nothing_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            outputs: OutputPaths::in_dir(dir.path()),
            ..EngineConfig::default()
        };
        let result = generate_from_image(&dir.path().join("nope.png"), &config).unwrap();
        assert!(result.is_none());
        assert!(!config.outputs.image_path.exists());
    }

    #[test]
    fn image_export_is_vertex_only() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("disk.png");
        disk_image(64, 64).save(&input).unwrap();
        let config = EngineConfig {
            outputs: OutputPaths::in_dir(dir.path()),
            ..EngineConfig::default()
        };

        let export = generate_from_image(&input, &config).unwrap().unwrap();
        assert_eq!(export.kind, ArtifactKind::PointCloud);
        assert_eq!(export.face_count, 0);
        let doc = obj::read_file(&export.path).unwrap();
        assert_eq!(doc.positions.len(), export.vertex_count);
        assert!(!doc.has_faces());
    }
}
