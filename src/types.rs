//! Core data structures for featex.
//!
//! This module contains the fundamental types used throughout the batch
//! feature extraction process.

use std::fmt;

use ahash::AHashMap;
use serde::Serialize;

/// How a feature column's cells were typed at load time.
///
/// Typing is resolved once when the feature matrix is read: a column is
/// numeric (with missing cells recorded as `None`) or malformed, in which
/// case selecting it fails for that feature only.
#[derive(Debug, Clone)]
pub enum ColumnData {
    /// All non-missing cells parsed as numbers.
    Numeric(Vec<Option<f64>>),
    /// A non-missing cell failed numeric parsing.
    Malformed {
        /// The first offending cell value.
        token: String,
        /// 0-based data row of the offending cell.
        row: usize,
    },
}

/// One requested column of the feature matrix.
#[derive(Debug, Clone)]
pub struct FeatureColumn {
    /// 0-based position in the source header.
    pub index: usize,
    /// Original header name.
    pub name: String,
    pub data: ColumnData,
}

/// The feature matrix: one identifier per row plus the requested columns.
///
/// Built once from the input file; read-only for the duration of the batch.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    /// Gene identifiers, one per data row, in file order.
    pub ensg: Vec<String>,
    pub columns: Vec<FeatureColumn>,
}

impl FeatureTable {
    /// Number of data rows.
    pub fn num_rows(&self) -> usize {
        self.ensg.len()
    }

    /// Look up a loaded column by its source header position.
    pub fn column_by_index(&self, index: usize) -> Option<&FeatureColumn> {
        self.columns.iter().find(|c| c.index == index)
    }
}

/// One row of the gene-annotation table.
#[derive(Debug, Clone)]
pub struct AnnotationRow {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    /// Full gene identifier as present in the file.
    pub gene_id: String,
    /// `ENSG` + digits token extracted from `gene_id`, if any.
    /// Rows without one are retained but never join.
    pub ensg: Option<String>,
}

/// The annotation table with a join index from extracted identifier to
/// row positions.
#[derive(Debug, Clone)]
pub struct AnnotationTable {
    /// Rows in file order.
    pub rows: Vec<AnnotationRow>,
    /// Extracted identifier -> row indices, in file order.
    pub by_ensg: AHashMap<String, Vec<usize>>,
}

impl AnnotationTable {
    /// Build the table and its join index from parsed rows.
    pub fn new(rows: Vec<AnnotationRow>) -> Self {
        let mut by_ensg: AHashMap<String, Vec<usize>> = AHashMap::new();
        for (i, row) in rows.iter().enumerate() {
            if let Some(ensg) = &row.ensg {
                by_ensg.entry(ensg.clone()).or_default().push(i);
            }
        }
        AnnotationTable { rows, by_ensg }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A gene retained by the selector for one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedGene {
    pub ensg: String,
    pub value: f64,
}

/// The selector's result for one feature: the retained genes and how the
/// feature was classified.
#[derive(Debug, Clone)]
pub struct FeatureSelection {
    /// Retained (identifier, value) rows, in selection order.
    pub genes: Vec<SelectedGene>,
    /// Whether the feature was classified as binary.
    pub is_binary: bool,
    /// Quantile accepted by the continuous search, when one was.
    /// `None` for binary features and for the ranked fallback.
    pub quantile: Option<f64>,
}

impl FeatureSelection {
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// One joined (selected gene x annotation row) pair, ready for output.
#[derive(Debug, Clone)]
pub struct JoinedRow {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub gene_id: String,
    pub ensg: String,
    pub value: f64,
}

/// Manifest record for one successfully written feature.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    /// 0-based source column index.
    pub column: usize,
    /// Normalized feature name.
    pub feature_name: String,
    /// Path of the written gene-windows file.
    pub gene_windows_file: String,
    /// Number of joined rows written.
    pub num_genes: usize,
    pub is_binary: bool,
}

/// Error raised when selection needs numeric values a column cannot provide.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectError {
    /// Original header name of the offending column.
    pub column: String,
    /// The first cell value that failed numeric parsing.
    pub token: String,
    /// 0-based data row of that cell.
    pub row: usize,
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column '{}' is not numeric: value '{}' at row {}",
            self.column, self.token, self.row
        )
    }
}

impl std::error::Error for SelectError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_index() {
        let rows = vec![
            AnnotationRow {
                chrom: "chr1".to_string(),
                start: 100,
                end: 200,
                gene_id: "ENSG00000000001.5".to_string(),
                ensg: Some("ENSG00000000001".to_string()),
            },
            AnnotationRow {
                chrom: "chr2".to_string(),
                start: 300,
                end: 400,
                gene_id: "no_token_here".to_string(),
                ensg: None,
            },
            AnnotationRow {
                chrom: "chr3".to_string(),
                start: 500,
                end: 600,
                gene_id: "ENSG00000000001.7".to_string(),
                ensg: Some("ENSG00000000001".to_string()),
            },
        ];

        let table = AnnotationTable::new(rows);
        assert_eq!(table.len(), 3);
        assert_eq!(table.by_ensg.len(), 1);
        assert_eq!(table.by_ensg["ENSG00000000001"], vec![0, 2]);
    }

    #[test]
    fn test_column_by_index() {
        let table = FeatureTable {
            ensg: vec!["ENSG00000000001".to_string()],
            columns: vec![FeatureColumn {
                index: 4,
                name: "expr".to_string(),
                data: ColumnData::Numeric(vec![Some(1.0)]),
            }],
        };

        assert!(table.column_by_index(4).is_some());
        assert!(table.column_by_index(0).is_none());
        assert_eq!(table.num_rows(), 1);
    }

    #[test]
    fn test_select_error_display() {
        let err = SelectError {
            column: "tissue".to_string(),
            token: "liver".to_string(),
            row: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("tissue"));
        assert!(msg.contains("liver"));
        assert!(msg.contains("12"));
    }
}
