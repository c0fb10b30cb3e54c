mod config;
mod driver;
mod network;
mod prediction;

pub use config::{ChannelOrder, InferenceConfig};
pub use driver::{
    DirectoryReport, ImageReport, InferenceDriver, NoVisualizer, Predictor, Visualization,
    Visualizer, load_image,
};
pub use network::{
    BurnClassifier, BurnSegmenter, ClassificationNetwork, SegmentationNetwork,
    decode_segmentation,
};
pub use prediction::{
    CLASSIFIER_CLASS_NAMES, PredictionResult, RegionBox, SEGMENTATION_CLASS_NAMES, ShapeMismatch,
    UNKNOWN_LABEL, translate,
};
