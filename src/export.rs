//! CSV rendering of endpoint results.
//!
//! The header is the union of field names across all rows, in the order
//! they are first seen. Nested values are written as JSON text and missing
//! fields as empty cells.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{DashboardError, Result};

/// Body of `POST /api/export/csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    /// Route path of the endpoint to replay, e.g. `/api/pax/by-department`.
    pub endpoint: String,
    /// Query parameters for the replayed endpoint. Numbers and booleans are
    /// accepted and stringified; nulls are dropped.
    #[serde(default, deserialize_with = "scalar_params")]
    pub params: BTreeMap<String, String>,
}

fn scalar_params<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    let mut params = BTreeMap::new();
    for (key, value) in raw {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(serde::de::Error::custom(format!(
                    "parameter '{}' must be a string, number or boolean",
                    key
                )))
            }
        };
        params.insert(key, text);
    }
    Ok(params)
}

pub const EXPORT_FILENAME: &str = "export.csv";

/// Render an endpoint's `data` payload as CSV bytes.
///
/// Arrays become one line per element; a single object becomes one line.
pub fn to_csv(data: &Value) -> Result<Vec<u8>> {
    let rows: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![data],
        _ => {
            return Err(DashboardError::InvalidArgument(
                "only list or object results can be exported".into(),
            ))
        }
    };

    let mut header: Vec<String> = Vec::new();
    for row in &rows {
        if let Value::Object(fields) = row {
            for key in fields.keys() {
                if !header.iter().any(|h| h == key) {
                    header.push(key.clone());
                }
            }
        }
    }
    if header.is_empty() && !rows.is_empty() {
        header.push("value".to_string());
    }

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    if !header.is_empty() {
        writer.write_record(&header)?;
    }
    for row in &rows {
        let record: Vec<String> = match row {
            Value::Object(fields) => header
                .iter()
                .map(|h| fields.get(h).map(cell).unwrap_or_default())
                .collect(),
            other => vec![cell(other)],
        };
        writer.write_record(&record)?;
    }
    writer
        .into_inner()
        .map_err(|e| DashboardError::Io(e.into_error()))
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}
