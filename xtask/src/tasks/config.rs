use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::config::Config;
use burn_lesion::InferenceConfig;
use burn_lesion::dataset::DatasetConfig;
use clap::{Args, ValueEnum};

#[derive(Clone, Copy, ValueEnum)]
pub enum ConfigKind {
    Segmentation,
    Classification,
    SegmentationInference,
    ClassificationInference,
}

#[derive(Args)]
pub struct WriteConfigArgs {
    #[arg(value_enum)]
    pub kind: ConfigKind,

    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn run(args: &WriteConfigArgs) -> Result<()> {
    let saved = match args.kind {
        ConfigKind::Segmentation => DatasetConfig::segmentation().save(&args.output),
        ConfigKind::Classification => DatasetConfig::classification().save(&args.output),
        ConfigKind::SegmentationInference => InferenceConfig::segmentation().save(&args.output),
        ConfigKind::ClassificationInference => {
            InferenceConfig::classification().save(&args.output)
        }
    };
    saved.with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Wrote {}", args.output.display());
    Ok(())
}
