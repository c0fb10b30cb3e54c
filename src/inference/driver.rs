use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbImage;

use super::config::InferenceConfig;
use super::prediction::{PredictionResult, ShapeMismatch, UNKNOWN_LABEL};
use crate::dataset::assemble::open_rgb;
use crate::dataset::layout::image_id as jpg_image_id;
use crate::error::{LesionError, Result, require_exists};
use crate::labels::LabelMap;

/// A loaded model that predicts on one preprocessed image.
pub trait Predictor {
    fn predict(&self, image: &RgbImage) -> Result<PredictionResult>;
}

/// Renders a consistent prediction. Only called for predictions with
/// regions whose boxes, masks and class ids agree.
pub trait Visualizer {
    fn display(
        &mut self,
        image: &RgbImage,
        prediction: &PredictionResult,
        class_names: &[String],
    ) -> Result<()>;
}

/// Discards every prediction.
pub struct NoVisualizer;

impl Visualizer for NoVisualizer {
    fn display(&mut self, _: &RgbImage, _: &PredictionResult, _: &[String]) -> Result<()> {
        Ok(())
    }
}

/// Checks the path and decodes it as RGB.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let path = require_exists(path)?;
    open_rgb(&path)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Visualization {
    Displayed,
    NoRegions,
    Skipped(ShapeMismatch),
}

#[derive(Debug, Clone)]
pub struct ImageReport {
    pub image_id: String,
    pub ground_truth: String,
    pub labels: Vec<String>,
    pub prediction: PredictionResult,
    pub visualization: Visualization,
}

impl fmt::Display for ImageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Image: {}, Ground Truth Label: {}",
            self.image_id, self.ground_truth
        )?;
        writeln!(f, "Predicted class IDs: {:?}", self.prediction.class_ids)?;
        writeln!(f, "Confidence scores: {:?}", self.prediction.scores)?;
        if self.labels.is_empty() {
            write!(f, "Predicted labels: No prediction")?;
        } else {
            write!(f, "Predicted labels: {:?}", self.labels)?;
        }
        if let Visualization::Skipped(mismatch) = &self.visualization {
            write!(f, "\nVisualization skipped: {mismatch}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DirectoryReport {
    pub reports: Vec<ImageReport>,
    pub failures: Vec<(PathBuf, LesionError)>,
}

pub struct InferenceDriver<P, V> {
    predictor: P,
    visualizer: V,
    config: InferenceConfig,
    class_names: Vec<String>,
    ground_truth: Option<LabelMap>,
}

impl<P: Predictor> InferenceDriver<P, NoVisualizer> {
    pub fn new<S: AsRef<str>>(predictor: P, config: InferenceConfig, class_names: &[S]) -> Self {
        Self {
            predictor,
            visualizer: NoVisualizer,
            config,
            class_names: class_names.iter().map(|s| s.as_ref().to_string()).collect(),
            ground_truth: None,
        }
    }
}

impl<P: Predictor, V: Visualizer> InferenceDriver<P, V> {
    pub fn with_visualizer<W: Visualizer>(self, visualizer: W) -> InferenceDriver<P, W> {
        InferenceDriver {
            predictor: self.predictor,
            visualizer,
            config: self.config,
            class_names: self.class_names,
            ground_truth: self.ground_truth,
        }
    }

    pub fn with_ground_truth(mut self, labels: LabelMap) -> Self {
        self.ground_truth = Some(labels);
        self
    }

    pub fn visualizer(&self) -> &V {
        &self.visualizer
    }

    /// Predicts on one image file. The image id is the file stem.
    pub fn run(&mut self, path: &Path) -> Result<ImageReport> {
        let image = load_image(path)?;
        let image_id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.run_image(&image_id, &image)
    }

    pub fn run_image(&mut self, image_id: &str, image: &RgbImage) -> Result<ImageReport> {
        let prepared = self.config.preprocess(image);

        let mut prediction = self.predictor.predict(&prepared)?;
        prediction.image_id = image_id.to_string();
        let labels = prediction.labels(&self.class_names);

        let ground_truth = self
            .ground_truth
            .as_ref()
            .and_then(|map| map.get(image_id))
            .map_or_else(|| UNKNOWN_LABEL.to_string(), |label| label.to_string());

        let visualization = if !prediction.has_regions() {
            Visualization::NoRegions
        } else {
            match prediction.check_consistency() {
                Ok(()) => {
                    self.visualizer
                        .display(&prepared, &prediction, &self.class_names)?;
                    Visualization::Displayed
                }
                Err(mismatch) => {
                    log::warn!("Skipping visualization of {image_id}: {mismatch}");
                    Visualization::Skipped(mismatch)
                }
            }
        };

        let report = ImageReport {
            image_id: image_id.to_string(),
            ground_truth,
            labels,
            prediction,
            visualization,
        };
        log::info!("{report}");
        Ok(report)
    }

    /// Predicts on every `*.jpg` in `dir`, in file name order. A failing
    /// image is recorded and the run continues.
    pub fn run_directory(&mut self, dir: &Path) -> Result<DirectoryReport> {
        let dir = require_exists(dir)?;

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| LesionError::io(&dir, e))? {
            let path = entry.map_err(|e| LesionError::io(&dir, e))?.path();
            let is_jpg = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(jpg_image_id)
                .is_some();
            if path.is_file() && is_jpg {
                paths.push(path);
            }
        }
        paths.sort();

        let mut report = DirectoryReport::default();
        for path in paths {
            match self.run(&path) {
                Ok(image_report) => report.reports.push(image_report),
                Err(e) => {
                    log::error!("{}: {e}", path.display());
                    report.failures.push((path, e));
                }
            }
        }

        Ok(report)
    }
}
