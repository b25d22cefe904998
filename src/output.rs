//! Output writers for featex artifacts.
//!
//! This module handles the two per-feature projections and the batch
//! manifest.

use anyhow::Result;

use std::io::Write;

use crate::types::{JoinedRow, ManifestEntry};

/// Make a feature name filesystem-safe.
///
/// Replaces ':', '/', '\' and space with '_'. Distinct headers can
/// normalize to the same name; the caller decides what to do about that.
pub fn normalize_feature_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' => '_',
            other => other,
        })
        .collect()
}

/// Write the gene-windows projection: headerless, tab-separated
/// (chrom, start, end, gene_id), one row per joined match.
pub fn write_gene_windows<W: Write>(writer: &mut W, rows: &[JoinedRow]) -> Result<()> {
    for row in rows {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            row.chrom, row.start, row.end, row.gene_id
        )?;
    }
    Ok(())
}

/// Write the feature projection: header `ensg\t<name>`, then one
/// (identifier, value) row per joined match.
pub fn write_feature_tsv<W: Write>(writer: &mut W, name: &str, rows: &[JoinedRow]) -> Result<()> {
    writeln!(writer, "ensg\t{}", name)?;
    for row in rows {
        writeln!(writer, "{}\t{}", row.ensg, row.value)?;
    }
    Ok(())
}

/// Write the batch manifest as a pretty-printed JSON array.
pub fn write_manifest<W: Write>(writer: &mut W, entries: &[ManifestEntry]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, entries)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined_row(chrom: &str, start: i64, end: i64, gene_id: &str, value: f64) -> JoinedRow {
        JoinedRow {
            chrom: chrom.to_string(),
            start,
            end,
            gene_id: gene_id.to_string(),
            ensg: "ENSG00000000001".to_string(),
            value,
        }
    }

    #[test]
    fn test_normalize_feature_name() {
        assert_eq!(normalize_feature_name("H3K27ac:liver"), "H3K27ac_liver");
        assert_eq!(normalize_feature_name("a/b"), "a_b");
        assert_eq!(normalize_feature_name("a\\b c"), "a_b_c");
        assert_eq!(normalize_feature_name("plain"), "plain");
    }

    #[test]
    fn test_normalize_collision() {
        // Two distinct headers can collapse onto the same name
        assert_eq!(
            normalize_feature_name("a:b"),
            normalize_feature_name("a/b")
        );
    }

    #[test]
    fn test_write_gene_windows() {
        let rows = vec![
            joined_row("chr1", 100, 200, "ENSG00000000001.5", 1.0),
            joined_row("chr2", 300, 400, "ENSG00000000001.7", 1.0),
        ];

        let mut output = Vec::new();
        write_gene_windows(&mut output, &rows).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert_eq!(
            text,
            "chr1\t100\t200\tENSG00000000001.5\nchr2\t300\t400\tENSG00000000001.7\n"
        );
    }

    #[test]
    fn test_write_feature_tsv() {
        let rows = vec![joined_row("chr1", 100, 200, "ENSG00000000001.5", 2.5)];

        let mut output = Vec::new();
        write_feature_tsv(&mut output, "H3K27ac_liver", &rows).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.starts_with("ensg\tH3K27ac_liver\n"));
        assert!(text.contains("ENSG00000000001\t2.5\n"));
    }

    #[test]
    fn test_write_manifest() {
        let entries = vec![ManifestEntry {
            column: 4,
            feature_name: "H3K27ac_liver".to_string(),
            gene_windows_file: "out/H3K27ac_liver/H3K27ac_liver_gene_windows.bed".to_string(),
            num_genes: 123,
            is_binary: false,
        }];

        let mut output = Vec::new();
        write_manifest(&mut output, &entries).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(parsed[0]["column"], 4);
        assert_eq!(parsed[0]["feature_name"], "H3K27ac_liver");
        assert_eq!(parsed[0]["num_genes"], 123);
        assert_eq!(parsed[0]["is_binary"], false);
    }

    #[test]
    fn test_write_manifest_empty() {
        let mut output = Vec::new();
        write_manifest(&mut output, &[]).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(parsed, serde_json::json!([]));
    }
}
