use std::path::PathBuf;

use anyhow::{Context, Result};
use burn_lesion::LabelMap;
use burn_lesion::dataset::DataLayout;
use clap::Args;

#[derive(Args)]
pub struct LabelsArgs {
    /// Ground-truth CSV with `image_id`, `melanoma` and `seborrheic_keratosis` columns.
    #[arg(short, long, required_unless_present = "descriptions")]
    pub csv: Option<PathBuf>,

    /// Data root whose Descriptions/ records carry `benign_malignant`.
    #[arg(long, conflicts_with = "csv")]
    pub descriptions: Option<PathBuf>,

    /// Print every image id with its label.
    #[arg(long, default_value_t = false)]
    pub list: bool,
}

pub fn run(args: &LabelsArgs) -> Result<()> {
    let labels = match (&args.csv, &args.descriptions) {
        (Some(csv), _) => LabelMap::load(csv)
            .with_context(|| format!("Failed to load labels from {}", csv.display()))?,
        (None, Some(root)) => {
            let layout = DataLayout::new(root)?;
            LabelMap::from_descriptions(&layout.index_descriptions()?)
        }
        (None, None) => anyhow::bail!("Either --csv or --descriptions is required"),
    };

    println!("Loaded {} labels", labels.len());
    for (label, count) in labels.counts() {
        println!("  {label}: {count}");
    }

    if args.list {
        for (image_id, label) in labels.iter() {
            println!("{image_id},{label}");
        }
    }

    Ok(())
}
