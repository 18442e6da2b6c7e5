//! Fixed parameters of the pipeline, grouped per stage.

use std::path::{Path, PathBuf};

/// Where the two generation paths write their artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub text_path: PathBuf,
    pub image_path: PathBuf,
}

impl OutputPaths {
    /// Both artifacts inside `dir`, with their usual file names.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            text_path: dir.join(TEXT_OUTPUT),
            image_path: dir.join(IMAGE_OUTPUT),
        }
    }
}

pub const TEXT_OUTPUT: &str = "output_text.obj";
pub const IMAGE_OUTPUT: &str = "output_image.obj";

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            text_path: PathBuf::from(TEXT_OUTPUT),
            image_path: PathBuf::from(IMAGE_OUTPUT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightmapOptions {
    /// Side length of the square working grid.
    pub working_size: u32,
    /// Gaussian kernel taps; must be odd.
    pub blur_kernel: usize,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Height given to a fully lit edge/contour pixel.
    pub height_scale: f64,
}

impl Default for HeightmapOptions {
    fn default() -> Self {
        Self {
            working_size: 384,
            blur_kernel: 5,
            canny_low: 100.0,
            canny_high: 200.0,
            height_scale: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerOptions {
    pub width: u32,
    pub height: u32,
    /// Camera elevation above the XY plane, in degrees.
    pub elevation_deg: f64,
    /// Camera azimuth around Z, in degrees.
    pub azimuth_deg: f64,
    /// Face fill as RGBA; alpha blends over what is behind.
    pub face_color: [u8; 4],
    pub edge_color: [u8; 4],
    /// Radius of a scatter point in pixels; 0 draws single pixels.
    pub point_radius: i32,
    /// Write the rendered frame next to the artifact.
    pub save_preview: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            elevation_deg: 30.0,
            azimuth_deg: -60.0,
            face_color: [255, 165, 0, 128],
            edge_color: [0, 0, 0, 255],
            point_radius: 1,
            save_preview: true,
        }
    }
}

/// Everything [`crate::Engine`] needs to run one request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    pub outputs: OutputPaths,
    pub heightmap: HeightmapOptions,
    pub viewer: ViewerOptions,
    /// Render the artifact after writing it.
    pub display: bool,
}

impl EngineConfig {
    /// Defaults with rendering enabled, as the interactive tool runs.
    #[must_use]
    pub fn interactive() -> Self {
        Self {
            display: true,
            ..Self::default()
        }
    }
}
