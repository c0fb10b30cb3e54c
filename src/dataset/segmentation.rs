use burn::{data::dataloader::batcher::Batcher, prelude::*};
use image::RgbImage;

use super::assemble::ImageMaskEntry;
use super::config::{DatasetConfig, MaskMode, Normalization};

/// Converts an RGB image into a `[3, height, width]` tensor.
pub fn image_tensor<B: Backend>(
    image: &RgbImage,
    normalization: Normalization,
    device: &B::Device,
) -> Tensor<B, 3> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let raw = image.as_raw();
    let mut image_data = Vec::with_capacity(3 * height * width);

    for c in 0..3 {
        for y in 0..height {
            for x in 0..width {
                let idx = (y * width + x) * 3 + c;
                image_data.push(normalization.apply(raw[idx]));
            }
        }
    }

    Tensor::<B, 3>::from_data(
        TensorData::new(image_data, Shape::new([3, height, width])).convert::<B::FloatElem>(),
        device,
    )
}

#[derive(Clone)]
pub struct SegmentationBatcher<B: Backend> {
    device: B::Device,
    config: DatasetConfig,
}

impl<B: Backend> SegmentationBatcher<B> {
    pub fn new(device: B::Device, config: DatasetConfig) -> Self {
        Self { device, config }
    }
}

#[derive(Clone, Debug)]
pub struct SegmentationBatch<B: Backend> {
    /// `[batch, 3, height, width]`
    pub images: Tensor<B, 4, Float>,
    /// `[batch, 1, height, width]`
    pub masks: Tensor<B, 4, Int>,
    /// `[batch]` segmentation class ids.
    pub labels: Tensor<B, 1, Int>,
}

impl<B: Backend> Batcher<ImageMaskEntry, SegmentationBatch<B>> for SegmentationBatcher<B> {
    fn batch(&self, items: Vec<ImageMaskEntry>) -> SegmentationBatch<B> {
        let batch_size = items.len();

        let mut images = Vec::with_capacity(batch_size);
        let mut masks = Vec::with_capacity(batch_size);
        let mut labels = Vec::with_capacity(batch_size);

        for item in items {
            let (width, height) = item.mask.dimensions();
            let class_id = item.label.class_id() as i64;

            let mask_data: Vec<i64> = match self.config.mask_mode {
                MaskMode::Binary => item
                    .mask
                    .as_raw()
                    .iter()
                    .map(|&x| i64::from(x > 0))
                    .collect(),
                MaskMode::Multiclass => item
                    .mask
                    .as_raw()
                    .iter()
                    .map(|&x| if x > 0 { class_id } else { 0 })
                    .collect(),
            };

            let mask_tensor = Tensor::<B, 3, Int>::from_data(
                TensorData::new(mask_data, Shape::new([1, height as usize, width as usize]))
                    .convert::<B::IntElem>(),
                &self.device,
            );

            images.push(image_tensor::<B>(
                &item.image,
                self.config.normalization,
                &self.device,
            ));
            masks.push(mask_tensor);
            labels.push(class_id);
        }

        let images: Tensor<B, 4> = Tensor::stack::<4>(images, 0);
        let masks: Tensor<B, 4, Int> = Tensor::stack::<4>(masks, 0);
        let labels = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, Shape::new([batch_size])).convert::<B::IntElem>(),
            &self.device,
        );

        SegmentationBatch {
            images,
            masks,
            labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Label;
    use burn::backend::NdArray;
    use image::{GrayImage, Luma, Rgb};

    type TestBackend = NdArray;

    fn entry(label: Label) -> ImageMaskEntry {
        let mut mask = GrayImage::new(4, 4);
        mask.put_pixel(1, 2, Luma([255]));

        ImageMaskEntry {
            image_id: "A".into(),
            label,
            image: RgbImage::from_pixel(4, 4, Rgb([255, 0, 51])),
            mask,
        }
    }

    #[test]
    fn batch_shapes() {
        let device = Default::default();
        let batcher = SegmentationBatcher::<TestBackend>::new(device, DatasetConfig::new());

        let batch = batcher.batch(vec![entry(Label::Malignant), entry(Label::Benign)]);

        assert_eq!(batch.images.dims(), [2, 3, 4, 4]);
        assert_eq!(batch.masks.dims(), [2, 1, 4, 4]);
        assert_eq!(batch.labels.dims(), [2]);
    }

    #[test]
    fn channels_are_planar_and_normalized() {
        let device = Default::default();
        let image = RgbImage::from_pixel(2, 2, Rgb([255, 0, 51]));

        let tensor = image_tensor::<TestBackend>(&image, Normalization::UnitRange, &device);
        let values = tensor.into_data().convert::<f32>().to_vec::<f32>().unwrap();

        assert_eq!(&values[0..4], &[1.0; 4]);
        assert_eq!(&values[4..8], &[0.0; 4]);
        assert!((values[8] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn multiclass_masks_carry_class_id() {
        let device = Default::default();
        let config = DatasetConfig::new().with_mask_mode(MaskMode::Multiclass);
        let batcher = SegmentationBatcher::<TestBackend>::new(device, config);

        let batch = batcher.batch(vec![entry(Label::Benign)]);
        let mask = batch.masks.into_data().convert::<i64>().to_vec::<i64>().unwrap();

        assert_eq!(mask.iter().filter(|&&v| v != 0).count(), 1);
        assert_eq!(mask[2 * 4 + 1], Label::Benign.class_id() as i64);
    }
}
