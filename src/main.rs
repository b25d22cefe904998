//! CLI entry point for featex.

use anyhow::{bail, Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use featex::batch::run_batch;

/// Batch gene feature extraction tool.
///
/// Selects the genes positive for each requested feature column of a
/// tab-separated feature matrix and intersects them with genomic windows
/// from an annotation file.
#[derive(Parser, Debug)]
#[command(name = "featex")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tab-separated feature matrix with a header containing an 'ensg' column
    feature_file: PathBuf,

    /// Comma-separated list of 0-based feature column indices
    feature_columns: String,

    /// Four-column annotation file (chrom, start, end, gene_id), no header
    annotation_file: PathBuf,

    /// Output directory root
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Argument errors exit 1 like every other fatal error; help and
    // version requests still exit 0.
    let args = Args::try_parse().unwrap_or_else(|err| {
        let _ = err.print();
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => std::process::exit(0),
            _ => std::process::exit(1),
        }
    });

    if !args.feature_file.exists() {
        bail!("Feature file not found: {}", args.feature_file.display());
    }
    if !args.annotation_file.exists() {
        bail!(
            "Annotation file not found: {}",
            args.annotation_file.display()
        );
    }

    let feature_indices = parse_column_list(&args.feature_columns)?;
    info!("Processing {} features", feature_indices.len());

    run_batch(
        &args.feature_file,
        &feature_indices,
        &args.annotation_file,
        &args.output_dir,
    )?;

    Ok(())
}

/// Parse the comma-separated column index list.
fn parse_column_list(list: &str) -> Result<Vec<usize>> {
    list.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<usize>()
                .with_context(|| format!("Invalid column index: '{}'", part))
        })
        .collect()
}
