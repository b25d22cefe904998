//! Gene-annotation table parser.
//!
//! Reads the four-column, headerless annotation file (chrom, start, end,
//! gene_id) and extracts the `ENSG` + digits identifier embedded in the
//! gene_id field.

use anyhow::{bail, Context, Result};
use std::io::BufRead;
use std::path::Path;

use crate::parser::util::open_table_reader;
use crate::types::{AnnotationRow, AnnotationTable};

/// Parse an annotation file and build the table with its join index.
///
/// Supports both plain text and gzip-compressed files.
pub fn parse_annotation_file(path: &Path) -> Result<AnnotationTable> {
    let reader = open_table_reader(path)?;
    parse_annotation_reader(reader)
        .with_context(|| format!("Failed to read annotation file: {}", path.display()))
}

/// Parse annotation data from a reader.
pub fn parse_annotation_reader<R: BufRead>(reader: R) -> Result<AnnotationTable> {
    let mut rows = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.context("Failed to read annotation line")?;

        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            bail!(
                "Annotation line {} has {} columns, expected 4",
                line_num + 1,
                fields.len()
            );
        }

        let start: i64 = fields[1].parse().with_context(|| {
            format!("Failed to parse start coordinate on line {}", line_num + 1)
        })?;
        let end: i64 = fields[2].parse().with_context(|| {
            format!("Failed to parse end coordinate on line {}", line_num + 1)
        })?;

        let gene_id = fields[3].to_string();
        let ensg = extract_ensg(&gene_id);

        rows.push(AnnotationRow {
            chrom: fields[0].to_string(),
            start,
            end,
            gene_id,
            ensg,
        });
    }

    Ok(AnnotationTable::new(rows))
}

/// Extract the first `ENSG` + digits token from a gene identifier.
///
/// The token is the literal `ENSG` followed by the longest run of digits;
/// an `ENSG` occurrence with no digit after it does not count.
pub fn extract_ensg(gene_id: &str) -> Option<String> {
    for (pos, _) in gene_id.match_indices("ENSG") {
        let digits: &str = {
            let rest = &gene_id[pos + 4..];
            let len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
            &rest[..len]
        };
        if !digits.is_empty() {
            return Some(format!("ENSG{}", digits));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn test_extract_ensg() {
        assert_eq!(
            extract_ensg("ENSG00000279493.1"),
            Some("ENSG00000279493".to_string())
        );
        assert_eq!(
            extract_ensg("gene:ENSG00000141510;tag"),
            Some("ENSG00000141510".to_string())
        );
        assert_eq!(extract_ensg("ENST00000624081.1"), None);
        assert_eq!(extract_ensg("ENSG"), None);
        assert_eq!(extract_ensg(""), None);
    }

    #[test]
    fn test_extract_ensg_first_match_wins() {
        assert_eq!(
            extract_ensg("ENSGX_ENSG123_ENSG456"),
            Some("ENSG123".to_string())
        );
    }

    #[test]
    fn test_parse_annotation_basic() {
        let content = "chr1\t100\t200\tENSG00000000001.5\n\
                       chr2\t300\t400\tENSG00000000002.1\n";

        let reader = BufReader::new(content.as_bytes());
        let table = parse_annotation_reader(reader).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].chrom, "chr1");
        assert_eq!(table.rows[0].start, 100);
        assert_eq!(table.rows[0].end, 200);
        assert_eq!(table.rows[0].gene_id, "ENSG00000000001.5");
        assert_eq!(table.rows[0].ensg, Some("ENSG00000000001".to_string()));
        assert!(table.by_ensg.contains_key("ENSG00000000002"));
    }

    #[test]
    fn test_parse_annotation_unmatched_rows_retained() {
        let content = "chr1\t100\t200\tENSG00000000001.5\n\
                       chr1\t300\t400\tno_identifier\n";

        let reader = BufReader::new(content.as_bytes());
        let table = parse_annotation_reader(reader).unwrap();

        // Row kept in the table but absent from the join index
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].ensg, None);
        assert_eq!(table.by_ensg.len(), 1);
    }

    #[test]
    fn test_parse_annotation_bad_coordinate() {
        let content = "chr1\tstart\t200\tENSG00000000001\n";

        let reader = BufReader::new(content.as_bytes());
        let result = parse_annotation_reader(reader);

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("line 1"));
    }

    #[test]
    fn test_parse_annotation_too_few_columns() {
        let content = "chr1\t100\t200\n";

        let reader = BufReader::new(content.as_bytes());
        assert!(parse_annotation_reader(reader).is_err());
    }

    #[test]
    fn test_parse_annotation_duplicate_identifiers() {
        let content = "chr1\t100\t200\tENSG00000000001.1\n\
                       chr1\t500\t600\tENSG00000000001.2\n";

        let reader = BufReader::new(content.as_bytes());
        let table = parse_annotation_reader(reader).unwrap();

        assert_eq!(table.by_ensg["ENSG00000000001"], vec![0, 1]);
    }
}
