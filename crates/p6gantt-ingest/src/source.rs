//! Row sources.
//!
//! Delimited text is read with the `csv` crate, keeping every cell as text
//! (leading spaces included, since they carry the outline level). JSON input
//! is an array of objects; key order is preserved.

use std::collections::HashSet;
use std::io::Read;

use serde_json::Value;

use p6gantt_core::{CellValue, Row};

use crate::IngestError;

const BOM: char = '\u{feff}';

/// Read delimited rows; the first record is the header
///
/// Short records are padded with empty cells, extra fields are dropped.
/// A repeated header keeps its first column under its own name; later ones
/// become `Name_1`, `Name_2`...
pub fn rows_from_csv<R: Read>(reader: R, delimiter: u8) -> Result<Vec<Row>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches(BOM).to_string()
            } else {
                h.to_string()
            }
        })
        .collect();
    let headers = unique_headers(headers);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.as_str(), record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    headers
        .into_iter()
        .map(|header| {
            let mut name = header.clone();
            let mut suffix = 0;
            while seen.contains(&name) {
                suffix += 1;
                name = format!("{header}_{suffix}");
            }
            if suffix > 0 {
                tracing::debug!(header = %header, renamed = %name, "repeated column header");
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

/// Read rows from a JSON array of objects
pub fn rows_from_json(input: &str) -> Result<Vec<Row>, IngestError> {
    let value: Value = serde_json::from_str(input)?;
    let Value::Array(items) = value else {
        return Err(IngestError::InvalidRow {
            row: 0,
            message: "expected a JSON array of row objects".into(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(fields
                .into_iter()
                .map(|(key, value)| (key, json_cell(value)))
                .collect::<Row>()),
            other => Err(IngestError::InvalidRow {
                row: index + 1,
                message: format!("expected an object, found {other}"),
            }),
        })
        .collect()
}

fn json_cell(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
        Value::String(s) => CellValue::from(s),
        other => CellValue::Text(other.to_string()),
    }
}
