//! Dataset assembly: joining ISIC sources into labeled image/mask entries,
//! splitting them, writing image folders and batching them into tensors.

pub mod assemble;
pub mod classification;
pub mod config;
pub mod layout;
pub mod materialize;
pub mod segmentation;
pub mod split;

pub use assemble::{
    Assembly, ImageMaskEntry, LabeledImage, LabeledSample, Skip, SkipReason, assemble,
    collect_labeled_images, join_sources,
};
pub use classification::{ClassificationBatch, ClassificationBatcher};
pub use config::{DatasetConfig, MaskMode, Normalization};
pub use layout::{DataLayout, SourceIndex, SourceKind};
pub use materialize::{MaterializeSummary, materialize};
pub use segmentation::{SegmentationBatch, SegmentationBatcher};
pub use split::{DatasetSplit, split};

use burn::data::dataset::InMemDataset;

/// Wraps both halves of a split as in-memory burn datasets for a data loader.
pub fn into_datasets<T>(split: DatasetSplit<T>) -> (InMemDataset<T>, InMemDataset<T>)
where
    T: Clone + Send + Sync,
{
    (InMemDataset::new(split.train), InMemDataset::new(split.val))
}
