use std::path::PathBuf;

use anyhow::{Context, Result};
use burn_lesion::dataset::{DataLayout, DatasetConfig, assemble, split};
use clap::Args;

#[derive(Args)]
pub struct AssembleArgs {
    /// Data root holding Descriptions/, Images/, Segmentation/ and Labels/.
    /// Prompted for when omitted.
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Dataset configuration file written by `write-config`.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub image_size: Option<u32>,

    #[arg(long)]
    pub val_fraction: Option<f64>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Ground-truth file name under Labels/.
    #[arg(long)]
    pub label_file: Option<String>,
}

pub fn apply_overrides(
    mut config: DatasetConfig,
    image_size: Option<u32>,
    val_fraction: Option<f64>,
    seed: Option<u64>,
    label_file: Option<&str>,
) -> DatasetConfig {
    if let Some(size) = image_size {
        config.image_size = [size, size];
    }
    if let Some(fraction) = val_fraction {
        config.val_fraction = fraction;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    if let Some(file) = label_file {
        config.label_file = Some(file.to_string());
    }
    config
}

pub fn run(args: &AssembleArgs) -> Result<()> {
    let root = super::data_root(args.data_dir.as_deref())?;
    let config = apply_overrides(
        super::dataset_config(args.config.as_deref(), DatasetConfig::segmentation())?,
        args.image_size,
        args.val_fraction,
        args.seed,
        args.label_file.as_deref(),
    );

    let layout = DataLayout::new(&root)?;
    let labels = super::load_labels(&layout, &config)?;
    println!("Loaded {} labels", labels.len());

    let assembly = assemble(&layout, &labels, &config).context("Failed to assemble dataset")?;
    println!("Total images loaded: {}", assembly.entries.len());
    if !assembly.skipped.is_empty() {
        println!("Skipped {} identifiers:", assembly.skipped.len());
        for skip in &assembly.skipped {
            println!("  {skip}");
        }
    }

    let split = split(assembly.entries, config.val_fraction, config.seed)?;
    println!(
        "Split into {} training and {} validation entries",
        split.train.len(),
        split.val.len()
    );

    Ok(())
}
