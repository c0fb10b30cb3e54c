use anyhow::Result;
use clap::{Parser, Subcommand};

mod tasks;

#[derive(Parser)]
#[command(
    name = "lesion",
    about = "Skin lesion dataset preparation toolkit",
    author,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve ground-truth labels and print a summary.
    Labels(tasks::labels::LabelsArgs),
    /// Write one JSON metadata record per CSV row.
    ExportMetadata(tasks::metadata::ExportArgs),
    /// Join descriptions, images and masks into a segmentation dataset.
    Assemble(tasks::assemble::AssembleArgs),
    /// Split labeled images and write a classification image folder.
    PrepareClassification(tasks::prepare::PrepareArgs),
    /// Write a default configuration file.
    WriteConfig(tasks::config::WriteConfigArgs),
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();

    match &cli.command {
        Commands::Labels(args) => tasks::labels::run(args),
        Commands::ExportMetadata(args) => tasks::metadata::run(args),
        Commands::Assemble(args) => tasks::assemble::run(args),
        Commands::PrepareClassification(args) => tasks::prepare::run(args),
        Commands::WriteConfig(args) => tasks::config::run(args),
    }
}
