use std::fmt;

use image::GrayImage;

pub const UNKNOWN_LABEL: &str = "Unknown";

/// Segmentation model classes, background first.
pub const SEGMENTATION_CLASS_NAMES: [&str; 4] =
    ["BG", "malignant", "seborrheic_keratosis", "benign"];

/// Classifier outputs follow the sorted folder names of the training set.
pub const CLASSIFIER_CLASS_NAMES: [&str; 3] = ["benign", "malignant", "seborrheic_keratosis"];

/// Region in pixel coordinates, `y2`/`x2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBox {
    pub y1: u32,
    pub x1: u32,
    pub y2: u32,
    pub x2: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionResult {
    pub image_id: String,
    pub class_ids: Vec<usize>,
    pub scores: Vec<f32>,
    pub boxes: Option<Vec<RegionBox>>,
    pub masks: Option<Vec<GrayImage>>,
}

/// Counts of a prediction whose boxes, masks and class ids disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub boxes: usize,
    pub masks: usize,
    pub class_ids: usize,
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shape mismatch: {} boxes, {} masks, {} class ids",
            self.boxes, self.masks, self.class_ids
        )
    }
}

impl PredictionResult {
    /// True when the prediction carries boxes or masks to draw.
    pub fn has_regions(&self) -> bool {
        self.boxes.is_some() || self.masks.is_some()
    }

    pub fn check_consistency(&self) -> Result<(), ShapeMismatch> {
        let mismatch = ShapeMismatch {
            boxes: self.boxes.as_ref().map_or(0, Vec::len),
            masks: self.masks.as_ref().map_or(0, Vec::len),
            class_ids: self.class_ids.len(),
        };

        if mismatch.boxes == mismatch.class_ids && mismatch.masks == mismatch.class_ids {
            Ok(())
        } else {
            Err(mismatch)
        }
    }

    pub fn labels<S: AsRef<str>>(&self, class_names: &[S]) -> Vec<String> {
        translate(&self.class_ids, class_names)
    }
}

/// Maps class ids to names. Ids outside the table become [`UNKNOWN_LABEL`].
pub fn translate<S: AsRef<str>>(class_ids: &[usize], class_names: &[S]) -> Vec<String> {
    class_ids
        .iter()
        .map(|&id| {
            class_names
                .get(id)
                .map_or(UNKNOWN_LABEL, |name| name.as_ref())
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_ids_are_unknown() {
        let names = translate(&[0, 1, 5], &SEGMENTATION_CLASS_NAMES);
        assert_eq!(names, vec!["BG", "malignant", "Unknown"]);
    }

    #[test]
    fn consistency_counts_every_array() {
        let mut prediction = PredictionResult {
            class_ids: vec![1, 2],
            scores: vec![0.9, 0.8],
            boxes: Some(vec![
                RegionBox { y1: 0, x1: 0, y2: 1, x2: 1 };
                2
            ]),
            masks: Some(vec![GrayImage::new(2, 2); 2]),
            ..Default::default()
        };
        assert!(prediction.check_consistency().is_ok());

        prediction.masks = Some(vec![GrayImage::new(2, 2)]);
        assert_eq!(
            prediction.check_consistency(),
            Err(ShapeMismatch {
                boxes: 2,
                masks: 1,
                class_ids: 2
            })
        );
    }
}
