use burn::prelude::*;
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::dataset::Normalization;
use crate::dataset::assemble::resize_rgb;

/// Channel order a model expects its input in. Decoded images are RGB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

#[derive(Config, Debug)]
pub struct InferenceConfig {
    /// Model input `[width, height]`.
    #[config(default = "[128, 128]")]
    pub input_size: [u32; 2],
    #[config(default = "ChannelOrder::Rgb")]
    pub channel_order: ChannelOrder,
    #[config(default = "Normalization::None")]
    pub normalization: Normalization,
    /// Instances scoring below this are dropped.
    #[config(default = "0.5")]
    pub min_confidence: f32,
    #[config(default = "3")]
    pub max_instances: usize,
}

impl InferenceConfig {
    /// Mask-RCNN style segmentation on 128x128 RGB input.
    pub fn segmentation() -> Self {
        Self::new()
    }

    /// MobileNet style classification on 224x224 input scaled to [0, 1].
    pub fn classification() -> Self {
        Self::new()
            .with_input_size([224, 224])
            .with_normalization(Normalization::UnitRange)
    }

    /// Reorders channels and resizes to the model input. Value scaling
    /// happens when the image becomes a tensor.
    pub fn preprocess(&self, image: &RgbImage) -> RgbImage {
        let mut prepared = resize_rgb(image, self.input_size);
        if self.channel_order == ChannelOrder::Bgr {
            for pixel in prepared.pixels_mut() {
                pixel.0.swap(0, 2);
            }
        }
        prepared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn bgr_swaps_red_and_blue() {
        let config = InferenceConfig::new()
            .with_input_size([2, 2])
            .with_channel_order(ChannelOrder::Bgr);
        let image = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));

        let prepared = config.preprocess(&image);

        assert_eq!(prepared.dimensions(), (2, 2));
        assert_eq!(prepared.get_pixel(0, 0).0, [30, 20, 10]);
    }

    #[test]
    fn classification_preset() {
        let config = InferenceConfig::classification();
        assert_eq!(config.input_size, [224, 224]);
        assert_eq!(config.normalization, Normalization::UnitRange);
        assert_eq!(config.max_instances, 3);
    }
}
