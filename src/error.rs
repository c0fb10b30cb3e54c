use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LesionError>;

#[derive(Error, Debug)]
pub enum LesionError {
    #[error("Path does not exist: `{0}`")]
    PathNotFound(PathBuf),

    #[error("Column `{column}` is missing from `{path}`")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Malformed row at line {line}: column `{column}` has value `{value}`")]
    MalformedRow {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Unable to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unable to decode image `{path}`: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Unable to encode image `{path}`: {source}")]
    ImageWrite {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Validation fraction must be within [0, 1], got {0}")]
    InvalidFraction(f64),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl LesionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LesionError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LesionError::Write {
            path: path.into(),
            source,
        }
    }
}

/// Fails with [`LesionError::PathNotFound`] unless `path` exists.
pub fn require_exists(path: impl Into<PathBuf>) -> Result<PathBuf> {
    let path = path.into();
    if path.exists() {
        Ok(path)
    } else {
        Err(LesionError::PathNotFound(path))
    }
}
