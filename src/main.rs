// src/main.rs
mod batch;
mod config;
mod extractors;
mod loader;
mod merge;
mod render;
mod storage;
mod utils;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use batch::{collect_inputs, AreaBatch, SOURCE_EXTENSIONS, SWARM_OUTPUT_FILE};
use config::{ExtractConfig, DEFAULT_BASE_PATH, DEFAULT_BASE_URL};
use loader::SniffingDetector;
use storage::StorageManager;
use utils::AppError;

/// Turns scraped location pages into standalone area tables with an editable notes column
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Site origin prepended to relative image sources
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Site directory used for document-relative image sources
    #[arg(long, global = true, default_value = DEFAULT_BASE_PATH)]
    base_path: String,

    /// Also write a <page>_meta.json sidecar for every generated page
    #[arg(long, global = true)]
    metadata: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract per-area tables from location pages (files or directories of .html/.shtml)
    Areas {
        /// Source pages or directories
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output directory for generated pages
        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,
    },

    /// Extract the site-wide swarm table
    Swarm {
        /// The swarm source page
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long, default_value = SWARM_OUTPUT_FILE)]
        output: PathBuf,
    },

    /// Merge generated pages into one document
    Merge {
        /// Generated pages or directories of them
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "merged.html")]
        output: PathBuf,
    },
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    let config = ExtractConfig::new(&args.base_url, &args.base_path).with_metadata(args.metadata);
    let detector = SniffingDetector;

    match args.command {
        Command::Areas { input, output_dir } => {
            let storage = StorageManager::new(&output_dir)?;
            let inputs = collect_inputs(&input, SOURCE_EXTENSIONS);
            if inputs.is_empty() {
                tracing::warn!("No .html/.shtml inputs found");
            }
            AreaBatch::new(&storage, &config, Some(&detector)).run(&inputs);
        }
        Command::Swarm { input, output } => {
            let file_name = output
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| AppError::Config(format!("Not a file path: {}", output.display())))?;
            let parent = output.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let storage = StorageManager::new(parent)?;

            if let Err(e) = batch::run_swarm(&input, &storage, &file_name, &config, Some(&detector)) {
                tracing::error!("Skipping {}: {}", input.display(), e);
            }
        }
        Command::Merge { input, output } => {
            tracing::info!("Merging HTML files...");
            let inputs = merge::collect_merge_inputs(&input, &output);
            let report = merge::merge_files(&inputs, &output)?;
            if !report.skipped.is_empty() {
                tracing::warn!("{} inputs were skipped", report.skipped.len());
            }
        }
    }

    Ok(())
}
