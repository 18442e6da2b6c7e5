use std::io;

use thiserror::Error;

use crate::geom::GeomError;
use crate::heightmap::HeightmapError;
use crate::parse::obj::ObjError;

/// Failures that escape a pipeline run.
///
/// Image load failures and viewer failures are recovered inside the
/// pipeline and never show up here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Geom(#[from] GeomError),
    #[error(transparent)]
    Obj(#[from] ObjError),
    #[error(transparent)]
    Heightmap(#[from] HeightmapError),
    #[error("invalid choice `{0}`, expected 'text' or 'image'")]
    InvalidChoice(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
