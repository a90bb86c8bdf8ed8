use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

use crate::data::datatable::{ColumnDescriptor, DataRow, DataValue};

/// Rows loaded from a file together with the columns they were read with
#[derive(Debug, Clone, Default)]
pub struct LoadedRows {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<DataRow>,
}

impl LoadedRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load a CSV or JSON file, picked by extension
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<LoadedRows> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => load_csv_rows(path),
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json_rows(path),
        _ => bail!("Unsupported file type: {:?} (expected .csv or .json)", path),
    }
}

/// Load a CSV file; headers become searchable columns and each field's
/// type is inferred from its text
pub fn load_csv_rows<P: AsRef<Path>>(path: P) -> Result<LoadedRows> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;
    read_csv_rows(file)
        .with_context(|| format!("Failed to read CSV file: {:?}", path.as_ref()))
}

pub fn read_csv_rows<Rd: Read>(reader: Rd) -> Result<LoadedRows> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: DataRow = headers
            .iter()
            .zip(record.iter())
            .map(|(name, field)| (name.clone(), DataValue::from_string(field)))
            .collect();
        rows.push(row);
    }

    let columns = headers
        .iter()
        .map(|h| ColumnDescriptor::new(h, h).searchable())
        .collect();

    info!(target: "system", "loaded {} CSV rows", rows.len());
    Ok(LoadedRows { columns, rows })
}

/// Load a JSON file holding either an array of objects or a
/// `{ "rows": [...] }` envelope
pub fn load_json_rows<P: AsRef<Path>>(path: P) -> Result<LoadedRows> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open JSON file: {:?}", path.as_ref()))?;
    let json: JsonValue = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON file: {:?}", path.as_ref()))?;
    rows_from_json(&json)
}

pub fn rows_from_json(json: &JsonValue) -> Result<LoadedRows> {
    let items = match json {
        JsonValue::Array(items) => items,
        JsonValue::Object(obj) => obj
            .get("rows")
            .and_then(JsonValue::as_array)
            .context("JSON object must carry a \"rows\" array")?,
        _ => bail!("JSON data must be an array of objects"),
    };

    // Keys within one object are sorted; keys new in later objects are appended
    let mut seen = BTreeSet::new();
    let mut columns = Vec::new();
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let obj = item
            .as_object()
            .context("JSON data must be an array of objects")?;
        for key in obj.keys() {
            if seen.insert(key.clone()) {
                columns.push(ColumnDescriptor::new(key, key).searchable());
            }
        }
        rows.push(DataRow::from_json_object(item));
    }

    info!(target: "system", "loaded {} JSON rows", rows.len());
    Ok(LoadedRows { columns, rows })
}
