//! Gene-window join.
//!
//! Inner join of a feature selection against the annotation table on the
//! extracted gene identifier.

use crate::types::{AnnotationTable, FeatureSelection, JoinedRow};

/// Join selected genes with their annotation windows.
///
/// Every annotation row sharing the identifier produces its own output row
/// (duplicate identifiers expand cardinality, intentionally). The outer
/// order is selection order, the inner order annotation file order.
/// Returns `None` when nothing joins.
pub fn join_gene_windows(
    selection: &FeatureSelection,
    annotations: &AnnotationTable,
) -> Option<Vec<JoinedRow>> {
    let mut joined = Vec::new();

    for gene in &selection.genes {
        if let Some(indices) = annotations.by_ensg.get(&gene.ensg) {
            for &i in indices {
                let row = &annotations.rows[i];
                joined.push(JoinedRow {
                    chrom: row.chrom.clone(),
                    start: row.start,
                    end: row.end,
                    gene_id: row.gene_id.clone(),
                    ensg: gene.ensg.clone(),
                    value: gene.value,
                });
            }
        }
    }

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
