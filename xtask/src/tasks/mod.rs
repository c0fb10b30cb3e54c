pub mod assemble;
pub mod config;
pub mod labels;
pub mod metadata;
pub mod prepare;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use burn::config::Config;
use burn_lesion::dataset::{DataLayout, DatasetConfig};
use burn_lesion::dataset::layout::TRAINING_LABEL_FILE;
use burn_lesion::LabelMap;

const DATA_ROOT_PROMPT: &str =
    "Insert the path of Data [e.g., /home/../ISIC-Archive-Downloader/Data/]: ";

/// Uses `arg` when given, otherwise asks for the data root on stdin.
pub fn data_root(arg: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = arg {
        return Ok(path.to_path_buf());
    }

    print!("{DATA_ROOT_PROMPT}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read the data path")?;

    let trimmed = line.trim().trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        anyhow::bail!("No data path given");
    }
    Ok(PathBuf::from(trimmed))
}

/// Loads `path` when given, otherwise starts from `preset`.
pub fn dataset_config(path: Option<&Path>, preset: DatasetConfig) -> Result<DatasetConfig> {
    match path {
        Some(path) => DatasetConfig::load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {:?}", path.display(), e)),
        None => Ok(preset),
    }
}

pub fn load_labels(layout: &DataLayout, config: &DatasetConfig) -> Result<LabelMap> {
    let file = config.label_file.as_deref().unwrap_or(TRAINING_LABEL_FILE);
    let path = layout.label_file(file);

    LabelMap::load(&path).with_context(|| format!("Failed to load labels from {}", path.display()))
}
