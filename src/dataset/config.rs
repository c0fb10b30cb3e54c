use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::LesionError;

/// Pixel value scaling applied when images become tensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Raw 0-255 values.
    #[default]
    None,
    /// Values divided by 255.
    UnitRange,
}

impl Normalization {
    pub fn apply(&self, value: u8) -> f32 {
        match self {
            Normalization::None => value as f32,
            Normalization::UnitRange => value as f32 / 255.0,
        }
    }
}

/// How mask pixels are encoded in a segmentation batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskMode {
    /// Foreground is 1, background is 0.
    #[default]
    Binary,
    /// Foreground carries the entry's class id.
    Multiclass,
}

#[derive(Config, Debug)]
pub struct DatasetConfig {
    /// Target `[width, height]` for images and masks.
    #[config(default = "[128, 128]")]
    pub image_size: [u32; 2],
    #[config(default = "0.3")]
    pub val_fraction: f64,
    #[config(default = "Normalization::UnitRange")]
    pub normalization: Normalization,
    #[config(default = "MaskMode::Binary")]
    pub mask_mode: MaskMode,
    /// Unseeded splits differ on every run.
    pub seed: Option<u64>,
    /// Overrides the ground-truth file name under `Labels/`.
    pub label_file: Option<String>,
}

impl DatasetConfig {
    pub fn segmentation() -> Self {
        Self::new()
    }

    pub fn classification() -> Self {
        Self::new().with_image_size([224, 224])
    }

    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.val_fraction) {
            return Err(LesionError::InvalidFraction(self.val_fraction));
        }
        if self.image_size.contains(&0) {
            return Err(LesionError::Config(format!(
                "image size must be non-zero, got {:?}",
                self.image_size
            )));
        }
        Ok(())
    }
}
