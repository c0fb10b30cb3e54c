use burn::{data::dataloader::batcher::Batcher, prelude::*};

use super::assemble::LabeledImage;
use super::config::Normalization;
use super::segmentation::image_tensor;

#[derive(Clone)]
pub struct ClassificationBatcher<B: Backend> {
    device: B::Device,
    normalization: Normalization,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device, normalization: Normalization) -> Self {
        Self {
            device,
            normalization,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClassificationBatch<B: Backend> {
    /// `[batch, 3, height, width]`
    pub images: Tensor<B, 4>,
    /// `[batch]` classifier indices.
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> Batcher<LabeledImage, ClassificationBatch<B>> for ClassificationBatcher<B> {
    fn batch(&self, items: Vec<LabeledImage>) -> ClassificationBatch<B> {
        let targets: Vec<i64> = items
            .iter()
            .map(|item| item.label.classifier_index() as i64)
            .collect();

        let images: Vec<Tensor<B, 3>> = items
            .iter()
            .map(|item| image_tensor::<B>(&item.image, self.normalization, &self.device))
            .collect();

        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(targets, Shape::new([items.len()])).convert::<B::IntElem>(),
            &self.device,
        );

        ClassificationBatch {
            images: Tensor::stack::<4>(images, 0),
            targets,
        }
    }
}
