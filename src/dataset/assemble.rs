use std::fmt;
use std::path::{Path, PathBuf};

use derive_new::new;
use image::imageops::FilterType;
use image::{GrayImage, RgbImage};

use super::config::DatasetConfig;
use super::layout::{DataLayout, SourceIndex, SourceKind};
use crate::error::{LesionError, Result};
use crate::labels::{Label, LabelMap};

/// Why an identifier was left out of an assembled dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingData(Vec<SourceKind>),
    Unlabeled,
    Decode(String),
}

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub image_id: String,
    pub reason: SkipReason,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::MissingData(missing) => {
                let missing: Vec<String> = missing.iter().map(ToString::to_string).collect();
                write!(f, "Missing data for {}: {}", self.image_id, missing.join(", "))
            }
            SkipReason::Unlabeled => {
                write!(f, "Skipping {}: label missing from CSV", self.image_id)
            }
            SkipReason::Decode(message) => write!(f, "Skipping {}: {}", self.image_id, message),
        }
    }
}

/// Paths of one fully resolved identifier.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct SourceTriplet {
    pub image_id: String,
    pub label: Label,
    pub description: PathBuf,
    pub image: PathBuf,
    pub mask: PathBuf,
}

#[derive(Debug, Default)]
pub struct JoinOutcome {
    pub matched: Vec<SourceTriplet>,
    pub skipped: Vec<Skip>,
}

/// Joins the three sources and the label map on image id. Identifiers are
/// visited in sorted order over the union of all sources.
pub fn join_sources(index: &SourceIndex, labels: &LabelMap) -> JoinOutcome {
    let mut outcome = JoinOutcome::default();

    for image_id in index.identifiers() {
        let missing = index.missing(image_id);
        if !missing.is_empty() {
            outcome
                .skipped
                .push(Skip::new(image_id.to_string(), SkipReason::MissingData(missing)));
            continue;
        }

        let Some(label) = labels.get(image_id) else {
            outcome
                .skipped
                .push(Skip::new(image_id.to_string(), SkipReason::Unlabeled));
            continue;
        };

        outcome.matched.push(SourceTriplet::new(
            image_id.to_string(),
            label,
            index.descriptions[image_id].clone(),
            index.images[image_id].clone(),
            index.masks[image_id].clone(),
        ));
    }

    outcome
}

/// A labeled image with its lesion mask, both at the configured size.
#[derive(Debug, Clone)]
pub struct ImageMaskEntry {
    pub image_id: String,
    pub label: Label,
    pub image: RgbImage,
    pub mask: GrayImage,
}

impl ImageMaskEntry {
    /// `[height, width, 1]`.
    pub fn mask_shape(&self) -> [usize; 3] {
        [self.mask.height() as usize, self.mask.width() as usize, 1]
    }
}

#[derive(new, Debug, Clone)]
pub struct LabeledImage {
    pub image_id: String,
    pub label: Label,
    pub image: RgbImage,
}

/// Anything that can be written into a label-partitioned image folder.
pub trait LabeledSample {
    fn image_id(&self) -> &str;
    fn label(&self) -> Label;
    fn image(&self) -> &RgbImage;
}

impl LabeledSample for LabeledImage {
    fn image_id(&self) -> &str {
        &self.image_id
    }

    fn label(&self) -> Label {
        self.label
    }

    fn image(&self) -> &RgbImage {
        &self.image
    }
}

#[derive(Debug)]
pub struct Assembly<T> {
    pub entries: Vec<T>,
    pub skipped: Vec<Skip>,
}

impl<T> Assembly<T> {
    pub fn skipped_ids(&self) -> impl Iterator<Item = &str> {
        self.skipped.iter().map(|skip| skip.image_id.as_str())
    }
}

/// Builds the segmentation dataset under `layout`.
pub fn assemble(
    layout: &DataLayout,
    labels: &LabelMap,
    config: &DatasetConfig,
) -> Result<Assembly<ImageMaskEntry>> {
    config.validate()?;

    let index = layout.index()?;
    let JoinOutcome { matched, skipped } = join_sources(&index, labels);
    for skip in &skipped {
        log::warn!("{skip}");
    }

    let mut assembly = load_entries(matched, config);
    let mut decode_skips = std::mem::replace(&mut assembly.skipped, skipped);
    assembly.skipped.append(&mut decode_skips);

    log::info!(
        "Assembled {} entries ({} skipped) from {}",
        assembly.entries.len(),
        assembly.skipped.len(),
        layout.root().display()
    );
    Ok(assembly)
}

/// Decodes and resizes every triplet, skipping those that fail to decode.
pub fn load_entries(
    matched: Vec<SourceTriplet>,
    config: &DatasetConfig,
) -> Assembly<ImageMaskEntry> {
    let mut entries = Vec::with_capacity(matched.len());
    let mut skipped = Vec::new();

    for triplet in matched {
        let decoded = open_rgb(&triplet.image).and_then(|image| {
            let mask = open_mask(&triplet.mask)?;
            Ok((image, mask))
        });

        match decoded {
            Ok((image, mask)) => entries.push(ImageMaskEntry {
                image: resize_rgb(&image, config.image_size),
                mask: resize_mask(&mask, config.image_size),
                image_id: triplet.image_id,
                label: triplet.label,
            }),
            Err(e) => {
                let skip = Skip::new(triplet.image_id, SkipReason::Decode(e.to_string()));
                log::warn!("{skip}");
                skipped.push(skip);
            }
        }
    }

    Assembly { entries, skipped }
}

/// Builds the classification dataset: every labeled `Images/*.jpg`, no mask
/// required.
pub fn collect_labeled_images(
    layout: &DataLayout,
    labels: &LabelMap,
    config: &DatasetConfig,
) -> Result<Assembly<LabeledImage>> {
    config.validate()?;

    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for (image_id, path) in layout.index_images()? {
        let Some(label) = labels.get(&image_id) else {
            skipped.push(Skip::new(image_id, SkipReason::Unlabeled));
            continue;
        };

        match open_rgb(&path) {
            Ok(image) => entries.push(LabeledImage::new(
                image_id,
                label,
                resize_rgb(&image, config.image_size),
            )),
            Err(e) => skipped.push(Skip::new(image_id, SkipReason::Decode(e.to_string()))),
        }
    }

    for skip in &skipped {
        log::warn!("{skip}");
    }
    log::info!("Loaded {} labeled images", entries.len());

    Ok(Assembly { entries, skipped })
}

pub(crate) fn open_rgb(path: &Path) -> Result<RgbImage> {
    let image = image::open(path).map_err(|source| LesionError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.into_rgb8())
}

pub(crate) fn open_mask(path: &Path) -> Result<GrayImage> {
    let image = image::open(path).map_err(|source| LesionError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.into_luma8())
}

/// Bilinear resize to `[width, height]`.
pub(crate) fn resize_rgb(image: &RgbImage, [width, height]: [u32; 2]) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    image::imageops::resize(image, width, height, FilterType::Triangle)
}

/// Nearest-neighbour resize keeps mask values from blending.
pub(crate) fn resize_mask(mask: &GrayImage, [width, height]: [u32; 2]) -> GrayImage {
    if mask.dimensions() == (width, height) {
        return mask.clone();
    }
    image::imageops::resize(mask, width, height, FilterType::Nearest)
}
