#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

pub mod config;
pub mod error;
pub mod geom;
pub mod heightmap;
pub mod parse;
pub mod select;
pub mod viewer;

use std::path::PathBuf;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};

/// Which input the user asked for at the first prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Image,
}

impl InputKind {
    /// Accepts `text` or `image`, ignoring case and surrounding whitespace.
    pub fn parse(answer: &str) -> EngineResult<Self> {
        match answer.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(EngineError::InvalidChoice(answer.trim().to_owned())),
        }
    }
}

/// One run of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// A free-text shape description.
    Text(String),
    /// Path of a raster image.
    Image(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Mesh,
    PointCloud,
}

/// A file written by one of the generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub vertex_count: usize,
    pub face_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// `None` when the input image could not be loaded.
    pub export: Option<Export>,
    /// Rendered preview, if display was enabled and succeeded.
    pub preview: Option<PathBuf>,
}

/// Runs a request against a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn run(&self, request: &Request) -> EngineResult<RunReport> {
        run(request, &self.config)
    }
}

/// Generates the artifact for `request`, writes it and optionally renders it.
pub fn run(request: &Request, config: &EngineConfig) -> EngineResult<RunReport> {
    let export = match request {
        Request::Text(description) => Some(select::generate_from_text(description, config)?),
        Request::Image(path) => heightmap::generate_from_image(path, config)?,
    };

    let preview = match &export {
        Some(export) if config.display => viewer::display_model(&export.path, &config.viewer),
        _ => None,
    };

    Ok(RunReport { export, preview })
}
