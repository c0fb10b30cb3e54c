use std::path::PathBuf;

use anyhow::{Context, Result};
use burn_lesion::dataset::materialize::DEFAULT_OUTPUT_DIR;
use burn_lesion::dataset::{
    DataLayout, DatasetConfig, collect_labeled_images, materialize, split,
};
use clap::Args;

use super::assemble::apply_overrides;

#[derive(Args)]
pub struct PrepareArgs {
    /// Data root holding Images/ and Labels/. Prompted for when omitted.
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

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

pub fn run(args: &PrepareArgs) -> Result<()> {
    let root = super::data_root(args.data_dir.as_deref())?;
    let config = apply_overrides(
        super::dataset_config(args.config.as_deref(), DatasetConfig::classification())?,
        args.image_size,
        args.val_fraction,
        args.seed,
        args.label_file.as_deref(),
    );

    let layout = DataLayout::new(&root)?;
    let labels = super::load_labels(&layout, &config)?;
    println!("Loaded {} labels", labels.len());

    let assembly = collect_labeled_images(&layout, &labels, &config)
        .context("Failed to collect labeled images")?;
    println!("Loaded {} images", assembly.entries.len());

    let split = split(assembly.entries, config.val_fraction, config.seed)?;
    let summary = materialize(&split, &args.output_dir).with_context(|| {
        format!(
            "Failed to write classification dataset to {}",
            args.output_dir.display()
        )
    })?;

    for (subset, count) in &summary.written {
        println!("  {subset}: {count} images");
    }
    println!("Images saved in {}", args.output_dir.display());
    Ok(())
}
