use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::assemble::LabeledSample;
use super::split::DatasetSplit;
use crate::error::{LesionError, Result};
use crate::labels::Label;

pub const DEFAULT_OUTPUT_DIR: &str = "classification_dataset";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MaterializeSummary {
    /// Files written per split name.
    pub written: BTreeMap<String, usize>,
}

impl MaterializeSummary {
    pub fn total(&self) -> usize {
        self.written.values().sum()
    }
}

/// `{output_dir}/{split}/{label}/{label}_{index}.jpg`, where `index` is the
/// position within the split.
pub fn sample_path(output_dir: &Path, split: &str, label: Label, index: usize) -> PathBuf {
    output_dir
        .join(split)
        .join(label.as_str())
        .join(format!("{label}_{index}.jpg"))
}

/// Writes `split` as a label-partitioned image folder. Every label directory
/// exists afterwards, even when no sample carries that label.
pub fn materialize<T: LabeledSample>(
    split: &DatasetSplit<T>,
    output_dir: &Path,
) -> Result<MaterializeSummary> {
    let mut summary = MaterializeSummary::default();

    for (name, _) in split.subsets() {
        for label in Label::ALL {
            let dir = output_dir.join(name).join(label.as_str());
            fs::create_dir_all(&dir).map_err(|e| LesionError::write(&dir, e))?;
        }
    }

    for (name, samples) in split.subsets() {
        for (index, sample) in samples.iter().enumerate() {
            let path = sample_path(output_dir, name, sample.label(), index);
            sample
                .image()
                .save(&path)
                .map_err(|source| LesionError::ImageWrite {
                    path: path.clone(),
                    source,
                })?;
        }
        summary.written.insert(name.to_string(), samples.len());
    }

    log::info!(
        "Wrote {} images to {}",
        summary.total(),
        output_dir.display()
    );
    Ok(summary)
}
