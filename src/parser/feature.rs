//! Feature-matrix parser.
//!
//! Reads the tab-separated feature file in a single pass: the header line is
//! validated first (required identifier column, requested indices in
//! bounds), then only the identifier column and the requested feature
//! columns are materialized.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use std::io::BufRead;
use std::path::Path;

use crate::parser::util::open_table_reader;
use crate::types::{ColumnData, FeatureColumn, FeatureTable};

/// Column name that must be present in the feature file header.
pub const ENSG_COLUMN: &str = "ensg";

/// Cell values treated as missing.
const MISSING_TOKENS: [&str; 6] = ["", "NA", "N/A", "NaN", "nan", "null"];

/// Parse a feature file, materializing the identifier column plus the
/// requested columns.
///
/// Supports both plain text and gzip-compressed files.
pub fn parse_feature_file(path: &Path, requested: &[usize]) -> Result<FeatureTable> {
    let reader = open_table_reader(path)?;
    parse_feature_reader(reader, requested)
        .with_context(|| format!("Failed to read feature file: {}", path.display()))
}

/// Parse feature data from a reader.
///
/// The header is read and validated before any data row is touched, so
/// structural problems fail without scanning the file.
pub fn parse_feature_reader<R: BufRead>(mut reader: R, requested: &[usize]) -> Result<FeatureTable> {
    let mut line = String::new();
    let bytes_read = reader
        .read_line(&mut line)
        .context("Failed to read feature file header")?;
    if bytes_read == 0 {
        bail!("Feature file is empty");
    }

    let names: Vec<String> = line
        .trim_end_matches(['\n', '\r'])
        .split('\t')
        .map(|s| s.to_string())
        .collect();
    let header = parse_header(&names);
    let ensg_pos = validate_header(&header, names.len(), requested)?;

    let mut ensg: Vec<String> = Vec::new();
    let mut cells: Vec<Vec<Option<f64>>> = requested.iter().map(|_| Vec::new()).collect();
    let mut malformed: Vec<Option<(String, usize)>> = vec![None; requested.len()];

    let mut row = 0;
    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .context("Failed to read feature file line")?;
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split('\t').collect();

        // Rows shorter than the header are padded with missing cells
        ensg.push(fields.get(ensg_pos).unwrap_or(&"").to_string());

        for (slot, &col) in requested.iter().enumerate() {
            if malformed[slot].is_some() {
                continue;
            }
            let token = fields.get(col).copied().unwrap_or("");
            match parse_cell(token) {
                Ok(value) => cells[slot].push(value),
                Err(()) => malformed[slot] = Some((token.to_string(), row)),
            }
        }

        row += 1;
    }

    let columns = requested
        .iter()
        .enumerate()
        .map(|(slot, &col)| {
            let data = match malformed[slot].take() {
                Some((token, row)) => ColumnData::Malformed { token, row },
                None => ColumnData::Numeric(std::mem::take(&mut cells[slot])),
            };
            FeatureColumn {
                index: col,
                name: names[col].clone(),
                data,
            }
        })
        .collect();

    Ok(FeatureTable { ensg, columns })
}

/// Build a name -> position map from the header fields, file order
/// preserved. A repeated name keeps its first position.
fn parse_header(names: &[String]) -> IndexMap<String, usize> {
    let mut header = IndexMap::new();
    for (pos, name) in names.iter().enumerate() {
        header.entry(name.clone()).or_insert(pos);
    }
    header
}

/// Check that the identifier column exists and every requested index is in
/// bounds. Returns the identifier column's position.
fn validate_header(
    header: &IndexMap<String, usize>,
    num_columns: usize,
    requested: &[usize],
) -> Result<usize> {
    let Some(&ensg_pos) = header.get(ENSG_COLUMN) else {
        bail!("Required '{}' column not found in the feature file", ENSG_COLUMN);
    };

    for &col in requested {
        if col >= num_columns {
            bail!(
                "Column index {} is out of range. Header has {} columns.",
                col,
                num_columns
            );
        }
    }

    Ok(ensg_pos)
}

/// Parse one cell: `Ok(None)` for missing, `Ok(Some(v))` for numeric,
/// `Err(())` for anything else.
fn parse_cell(token: &str) -> Result<Option<f64>, ()> {
    if MISSING_TOKENS.contains(&token) {
        return Ok(None);
    }
    token.parse::<f64>().map(Some).map_err(|_| ())
}
