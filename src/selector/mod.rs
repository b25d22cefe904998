//! Feature classification and gene selection.
//!
//! Decides, for one feature column, which genes are positive: exact binary
//! matching when the value encoding allows it, otherwise an adaptive
//! quantile search with a ranked fallback.

pub mod quantile;

use log::{debug, info};

use crate::config::SelectorConfig;
use crate::types::{
    ColumnData, FeatureColumn, FeatureSelection, FeatureTable, SelectError, SelectedGene,
};

pub use quantile::{quantile_value, top_k_by_value};

/// Select the genes positive for `column`.
///
/// Missing values are dropped first; the remaining rows are classified as
/// binary or continuous and filtered accordingly. An empty column selects
/// nothing, which is not an error; a malformed column is.
pub fn select_genes(
    table: &FeatureTable,
    column: &FeatureColumn,
    config: &SelectorConfig,
) -> Result<FeatureSelection, SelectError> {
    let values = match &column.data {
        ColumnData::Numeric(values) => values,
        ColumnData::Malformed { token, row } => {
            return Err(SelectError {
                column: column.name.clone(),
                token: token.clone(),
                row: *row,
            });
        }
    };

    // Drop rows with missing values
    let rows: Vec<SelectedGene> = table
        .ensg
        .iter()
        .zip(values)
        .filter_map(|(ensg, value)| {
            value.map(|value| SelectedGene {
                ensg: ensg.clone(),
                value,
            })
        })
        .collect();

    let distinct = distinct_values(&rows);
    debug!(
        "column '{}': {} rows after dropping missing values, {} distinct values",
        column.name,
        rows.len(),
        distinct.len()
    );

    if is_binary_encoding(&distinct, config) {
        Ok(select_binary(rows, &column.name))
    } else {
        Ok(select_continuous(rows, &column.name, config))
    }
}

/// Distinct non-missing values, ascending.
fn distinct_values(rows: &[SelectedGene]) -> Vec<f64> {
    let mut values: Vec<f64> = rows.iter().map(|r| r.value).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
    values
}

/// Binary means the distinct values are a subset of {0, 1}, or exactly two
/// values forming a subset of {-1, 1}. Any other low-cardinality set (for
/// example {2, 5, 7}) is treated as continuous.
fn is_binary_encoding(distinct: &[f64], config: &SelectorConfig) -> bool {
    if distinct.len() > config.binary_max_distinct {
        return false;
    }
    if distinct.iter().all(|&v| v == 0.0 || v == 1.0) {
        return true;
    }
    distinct.len() == 2 && distinct.iter().all(|&v| v == -1.0 || v == 1.0)
}

/// The positive class of a binary feature is the maximum value present: 1
/// in both the {0,1} and {-1,1} encodings.
fn select_binary(rows: Vec<SelectedGene>, name: &str) -> FeatureSelection {
    let positive = rows
        .iter()
        .map(|r| r.value)
        .fold(f64::NEG_INFINITY, f64::max);
    let genes: Vec<SelectedGene> = rows.into_iter().filter(|r| r.value == positive).collect();

    info!(
        "column '{}': binary feature, {} genes in the positive class",
        name,
        genes.len()
    );
    FeatureSelection {
        genes,
        is_binary: true,
        quantile: None,
    }
}

/// Walk the quantile ladder down until a threshold retains enough rows;
/// fall back to the top-ranked rows when none does.
fn select_continuous(
    rows: Vec<SelectedGene>,
    name: &str,
    config: &SelectorConfig,
) -> FeatureSelection {
    if rows.is_empty() {
        return FeatureSelection {
            genes: Vec::new(),
            is_binary: false,
            quantile: None,
        };
    }

    let min_required = config.min_required(rows.len());

    let mut sorted: Vec<f64> = rows.iter().map(|r| r.value).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut accepted = None;
    for q in config.quantile_ladder() {
        let threshold = quantile_value(&sorted, q);
        let count = rows.iter().filter(|r| r.value >= threshold).count();
        if count >= min_required {
            accepted = Some((q, threshold));
            break;
        }
    }

    match accepted {
        Some((q, threshold)) => {
            let genes: Vec<SelectedGene> =
                rows.into_iter().filter(|r| r.value >= threshold).collect();
            info!(
                "column '{}': selected {} genes at quantile {:.2}",
                name,
                genes.len(),
                q
            );
            FeatureSelection {
                genes,
                is_binary: false,
                quantile: Some(q),
            }
        }
        None => {
            let genes = top_k_by_value(&rows, min_required);
            info!(
                "column '{}': quantile search exhausted, selected top {} genes by value",
                name,
                genes.len()
            );
            FeatureSelection {
                genes,
                is_binary: false,
                quantile: None,
            }
        }
    }
}
