use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

#[derive(Args)]
pub struct ExportArgs {
    /// Challenge metadata CSV, one row per image.
    #[arg(short, long)]
    pub csv: PathBuf,

    #[arg(short, long, default_value = "Descriptions_JSON")]
    pub output_dir: PathBuf,
}

pub fn run(args: &ExportArgs) -> Result<()> {
    let written = burn_lesion::export_metadata(&args.csv, &args.output_dir)
        .with_context(|| format!("Failed to export {}", args.csv.display()))?;

    println!(
        "Wrote {} metadata records to {}",
        written,
        args.output_dir.display()
    );
    Ok(())
}
