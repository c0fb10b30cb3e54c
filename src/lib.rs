pub mod error;
pub mod labels;
pub mod metadata;

#[cfg(feature = "dataset")]
pub mod dataset;

#[cfg(feature = "inference")]
pub mod inference;

pub use error::{LesionError, Result};
pub use labels::{Label, LabelMap, LabelRow};
pub use metadata::{ImageMetadata, MetadataRow, export_metadata};

#[cfg(feature = "dataset")]
pub use dataset::{DataLayout, DatasetConfig, DatasetSplit, ImageMaskEntry, LabeledImage};

#[cfg(feature = "inference")]
pub use inference::{InferenceConfig, InferenceDriver, PredictionResult, Predictor};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
