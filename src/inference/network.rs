//! Adapters that drive burn modules as [`Predictor`]s.

use burn::prelude::*;
use burn::tensor::activation::softmax;
use image::{GrayImage, Luma, RgbImage};

use super::config::InferenceConfig;
use super::driver::Predictor;
use super::prediction::{PredictionResult, RegionBox};
use crate::dataset::segmentation::image_tensor;
use crate::error::{LesionError, Result};

/// A network producing per-pixel class logits.
pub trait SegmentationNetwork<B: Backend> {
    /// `[batch, 3, height, width]` to `[batch, classes, height, width]`.
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4>;
}

/// A network producing per-image class logits.
pub trait ClassificationNetwork<B: Backend> {
    /// `[batch, 3, height, width]` to `[batch, classes]`.
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2>;
}

pub struct BurnSegmenter<B: Backend, N> {
    network: N,
    device: B::Device,
    config: InferenceConfig,
}

impl<B: Backend, N: SegmentationNetwork<B>> BurnSegmenter<B, N> {
    pub fn new(network: N, device: B::Device, config: InferenceConfig) -> Self {
        Self {
            network,
            device,
            config,
        }
    }
}

impl<B: Backend, N: SegmentationNetwork<B>> Predictor for BurnSegmenter<B, N> {
    fn predict(&self, image: &RgbImage) -> Result<PredictionResult> {
        let input = image_tensor::<B>(image, self.config.normalization, &self.device)
            .unsqueeze::<4>();
        let logits = self.network.forward(input);
        let [batch, classes, height, width] = logits.dims();
        if batch != 1 {
            return Err(LesionError::Inference(format!(
                "expected a single prediction, got a batch of {batch}"
            )));
        }

        let probabilities = softmax(logits, 1)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| LesionError::Inference(format!("{e:?}")))?;

        Ok(decode_segmentation(
            &probabilities,
            [classes, height, width],
            self.config.min_confidence,
            self.config.max_instances,
        ))
    }
}

#[derive(Default)]
struct Instance {
    pixels: usize,
    probability: f32,
    y1: u32,
    x1: u32,
    y2: u32,
    x2: u32,
}

/// Turns `[classes, height, width]` probabilities into one instance per
/// foreground class. Each pixel belongs to its most probable class; an
/// instance scores the mean probability over its pixels. Class 0 is
/// background.
pub fn decode_segmentation(
    probabilities: &[f32],
    [classes, height, width]: [usize; 3],
    min_confidence: f32,
    max_instances: usize,
) -> PredictionResult {
    let plane = height * width;
    let mut winners = vec![0usize; plane];
    let mut instances: Vec<Option<Instance>> = (0..classes).map(|_| None).collect();

    for (pixel, winner) in winners.iter_mut().enumerate() {
        let (best, probability) = (0..classes)
            .map(|c| (c, probabilities[c * plane + pixel]))
            .fold((0, f32::MIN), |acc, item| if item.1 > acc.1 { item } else { acc });
        *winner = best;

        if best == 0 {
            continue;
        }

        let (y, x) = ((pixel / width) as u32, (pixel % width) as u32);
        let instance = instances[best].get_or_insert_with(|| Instance {
            y1: y,
            x1: x,
            y2: y,
            x2: x,
            ..Default::default()
        });
        instance.pixels += 1;
        instance.probability += probability;
        instance.y1 = instance.y1.min(y);
        instance.x1 = instance.x1.min(x);
        instance.y2 = instance.y2.max(y);
        instance.x2 = instance.x2.max(x);
    }

    let mut ranked: Vec<(usize, f32, RegionBox)> = instances
        .iter()
        .enumerate()
        .filter_map(|(class_id, instance)| {
            let instance = instance.as_ref()?;
            let score = instance.probability / instance.pixels as f32;
            let region = RegionBox {
                y1: instance.y1,
                x1: instance.x1,
                y2: instance.y2 + 1,
                x2: instance.x2 + 1,
            };
            Some((class_id, score, region))
        })
        .filter(|(_, score, _)| *score >= min_confidence)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(max_instances);

    let mut prediction = PredictionResult::default();
    let mut boxes = Vec::with_capacity(ranked.len());
    let mut masks = Vec::with_capacity(ranked.len());

    for (class_id, score, region) in ranked {
        let mask = GrayImage::from_fn(width as u32, height as u32, |x, y| {
            let owner = winners[y as usize * width + x as usize];
            Luma([if owner == class_id { 255 } else { 0 }])
        });

        prediction.class_ids.push(class_id);
        prediction.scores.push(score);
        boxes.push(region);
        masks.push(mask);
    }

    prediction.boxes = Some(boxes);
    prediction.masks = Some(masks);
    prediction
}

pub struct BurnClassifier<B: Backend, N> {
    network: N,
    device: B::Device,
    config: InferenceConfig,
}

impl<B: Backend, N: ClassificationNetwork<B>> BurnClassifier<B, N> {
    pub fn new(network: N, device: B::Device, config: InferenceConfig) -> Self {
        Self {
            network,
            device,
            config,
        }
    }
}

impl<B: Backend, N: ClassificationNetwork<B>> Predictor for BurnClassifier<B, N> {
    fn predict(&self, image: &RgbImage) -> Result<PredictionResult> {
        let input = image_tensor::<B>(image, self.config.normalization, &self.device)
            .unsqueeze::<4>();
        let logits = self.network.forward(input);
        let [batch, _] = logits.dims();
        if batch != 1 {
            return Err(LesionError::Inference(format!(
                "expected a single prediction, got a batch of {batch}"
            )));
        }

        let probabilities = softmax(logits, 1)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| LesionError::Inference(format!("{e:?}")))?;

        let Some((class_id, score)) = probabilities
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
        else {
            return Ok(PredictionResult::default());
        };

        Ok(PredictionResult {
            class_ids: vec![class_id],
            scores: vec![score],
            ..Default::default()
        })
    }
}
