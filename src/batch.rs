//! Batch orchestration across feature columns.
//!
//! Loads both input tables once, then processes each requested column to
//! completion before the next. Per-feature failures are contained: the
//! batch always runs to the end and always writes the manifest.

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ahash::AHashSet;
use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};

use crate::config::SelectorConfig;
use crate::joiner::join_gene_windows;
use crate::output::{
    normalize_feature_name, write_feature_tsv, write_gene_windows, write_manifest,
};
use crate::parser::{parse_annotation_file, parse_feature_file};
use crate::selector::select_genes;
use crate::types::{AnnotationTable, FeatureColumn, FeatureTable, JoinedRow, ManifestEntry};

/// File name of the batch manifest, under the output root.
pub const MANIFEST_FILE: &str = "batch_manifest.json";

/// Why a feature produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No selected gene had a window in the annotation table.
    NoMatch,
}

/// Terminal state of one feature in the batch.
#[derive(Debug)]
pub enum FeatureOutcome {
    /// Both artifacts written and a manifest entry recorded.
    Written(ManifestEntry),
    Skipped(SkipReason),
    Failed(anyhow::Error),
}

/// Run the whole batch.
///
/// Only input loading, output-root creation, and manifest writing can fail
/// the batch; everything per-feature is recorded in the returned outcomes
/// (one per requested column, in request order).
pub fn run_batch(
    feature_file: &Path,
    feature_indices: &[usize],
    annotation_file: &Path,
    output_dir: &Path,
) -> Result<Vec<FeatureOutcome>> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    info!("Reading feature file: {}", feature_file.display());
    let features = parse_feature_file(feature_file, feature_indices)?;
    info!("Feature data read. Found {} genes.", features.num_rows());

    info!("Reading annotation file: {}", annotation_file.display());
    let annotations = parse_annotation_file(annotation_file)?;
    info!("Annotation data read. Found {} entries.", annotations.len());

    let config = SelectorConfig::default();
    let mut outcomes = Vec::with_capacity(feature_indices.len());
    let mut manifest: Vec<ManifestEntry> = Vec::new();
    let mut seen_names: AHashSet<String> = AHashSet::new();

    for &index in feature_indices {
        let outcome = match features.column_by_index(index) {
            Some(column) => {
                let name = normalize_feature_name(&column.name);
                if !seen_names.insert(name.clone()) {
                    warn!(
                        "Normalized feature name '{}' repeats; the earlier output directory will be overwritten",
                        name
                    );
                }
                info!("Processing feature {}: {} -> {}", index, column.name, name);
                process_feature(&features, column, &name, &annotations, output_dir, &config)
            }
            // Unreachable after header validation; kept as an outcome so a
            // bad index can never abort the rest of the batch.
            None => FeatureOutcome::Failed(anyhow!("column index {} was not loaded", index)),
        };

        match &outcome {
            FeatureOutcome::Written(entry) => {
                info!(
                    "Feature {} written: {} gene windows",
                    entry.feature_name, entry.num_genes
                );
                manifest.push(entry.clone());
            }
            FeatureOutcome::Skipped(SkipReason::NoMatch) => {
                warn!("No matching genes found for feature column {}", index);
            }
            FeatureOutcome::Failed(err) => {
                error!("Failed to process feature column {}: {:#}", index, err);
            }
        }
        outcomes.push(outcome);
    }

    let manifest_path = output_dir.join(MANIFEST_FILE);
    let file = File::create(&manifest_path).with_context(|| {
        format!("Failed to create manifest file: {}", manifest_path.display())
    })?;
    let mut writer = BufWriter::new(file);
    write_manifest(&mut writer, &manifest)?;
    writer.flush()?;

    info!(
        "Batch processing complete. Processed {} of {} features. Manifest written to: {}",
        manifest.len(),
        feature_indices.len(),
        manifest_path.display()
    );

    Ok(outcomes)
}

/// Take one feature through selection, join, and output writing.
fn process_feature(
    features: &FeatureTable,
    column: &FeatureColumn,
    name: &str,
    annotations: &AnnotationTable,
    output_dir: &Path,
    config: &SelectorConfig,
) -> FeatureOutcome {
    let selection = match select_genes(features, column, config) {
        Ok(selection) => selection,
        Err(err) => return FeatureOutcome::Failed(err.into()),
    };

    let Some(joined) = join_gene_windows(&selection, annotations) else {
        return FeatureOutcome::Skipped(SkipReason::NoMatch);
    };

    match write_feature_outputs(output_dir, name, column.index, selection.is_binary, &joined) {
        Ok(entry) => FeatureOutcome::Written(entry),
        Err(err) => FeatureOutcome::Failed(err),
    }
}

/// Write both artifacts under the per-feature directory and build the
/// manifest entry.
fn write_feature_outputs(
    output_dir: &Path,
    name: &str,
    column: usize,
    is_binary: bool,
    joined: &[JoinedRow],
) -> Result<ManifestEntry> {
    let feature_dir = output_dir.join(name);
    fs::create_dir_all(&feature_dir).with_context(|| {
        format!("Failed to create feature directory: {}", feature_dir.display())
    })?;

    let windows_path = feature_dir.join(format!("{}_gene_windows.bed", name));
    let file = File::create(&windows_path).with_context(|| {
        format!("Failed to create gene windows file: {}", windows_path.display())
    })?;
    let mut writer = BufWriter::new(file);
    write_gene_windows(&mut writer, joined)?;
    writer.flush()?;

    let feature_path = feature_dir.join(format!("{}_feature.tsv", name));
    let file = File::create(&feature_path).with_context(|| {
        format!("Failed to create feature file: {}", feature_path.display())
    })?;
    let mut writer = BufWriter::new(file);
    write_feature_tsv(&mut writer, name, joined)?;
    writer.flush()?;

    Ok(ManifestEntry {
        column,
        feature_name: name.to_string(),
        gene_windows_file: windows_path.to_string_lossy().into_owned(),
        num_genes: joined.len(),
        is_binary,
    })
}
