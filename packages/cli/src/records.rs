//! CSV parsing of raw occupancy exports.
//!
//! The export carries `zone_code`, `active_count`, and `closed_count`
//! columns, optional `field_label`/`description` naming columns, and
//! any number of extra columns that become filterable attributes.
//! Attribute values that parse as integers become numeric so range
//! filters work on them. Malformed rows are reported per record with
//! the offending code; whether they abort the run is the caller's
//! policy.

use std::collections::BTreeMap;
use std::path::Path;

use factory_map_occupancy_models::{AttrValue, OccupancyRecord};

/// Column names with dedicated record fields.
const ZONE_CODE: &str = "zone_code";
const ACTIVE_COUNT: &str = "active_count";
const CLOSED_COUNT: &str = "closed_count";
const FIELD_LABEL: &str = "field_label";
const DESCRIPTION: &str = "description";

/// One row that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    /// 1-based CSV line of the row (excluding the header).
    pub line: usize,
    /// Zone code of the row, when one was present.
    pub code: String,
    /// What was wrong.
    pub message: String,
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {} (zone {:?}): {}", self.line, self.code, self.message)
    }
}

/// Result of reading an export: parsed records plus per-row errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecords {
    /// Successfully parsed records, in file order.
    pub records: Vec<OccupancyRecord>,
    /// Rows that failed to parse, in file order.
    pub errors: Vec<RecordError>,
}

/// Reads an occupancy CSV export from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is missing the
/// required columns; individual bad rows are reported in
/// [`ParsedRecords::errors`] instead.
pub fn read_csv(path: &Path) -> Result<ParsedRecords, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    for required in [ZONE_CODE, ACTIVE_COUNT, CLOSED_COUNT] {
        if !headers.iter().any(|h| h == required) {
            return Err(format!("missing required column {required:?}").into());
        }
    }

    let mut parsed = ParsedRecords::default();
    for (index, row) in reader.records().enumerate() {
        let line = index + 1;
        let row = match row {
            Ok(row) => row,
            Err(error) => {
                parsed.errors.push(RecordError {
                    line,
                    code: String::new(),
                    message: error.to_string(),
                });
                continue;
            }
        };
        match parse_row(&headers, &row) {
            Ok(record) => parsed.records.push(record),
            Err((code, message)) => parsed.errors.push(RecordError { line, code, message }),
        }
    }

    Ok(parsed)
}

/// Parses one CSV row into a record. Errors carry the row's zone code
/// (when present) and a description.
fn parse_row(
    headers: &[String],
    row: &csv::StringRecord,
) -> Result<OccupancyRecord, (String, String)> {
    let get = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| row.get(i))
            .map(str::trim)
    };

    let code = get(ZONE_CODE).unwrap_or_default().to_string();
    if code.is_empty() {
        return Err((code, "empty zone_code".to_string()));
    }

    let count = |name: &str| -> Result<u64, (String, String)> {
        let raw = get(name).unwrap_or_default();
        raw.parse::<u64>().map_err(|_| {
            (
                code.clone(),
                format!("{name} {raw:?} is not a non-negative integer"),
            )
        })
    };
    let active_count = count(ACTIVE_COUNT)?;
    let closed_count = count(CLOSED_COUNT)?;

    let optional = |name: &str| get(name).filter(|v| !v.is_empty()).map(str::to_string);

    let mut attributes = BTreeMap::new();
    for (header, value) in headers.iter().zip(row.iter()) {
        if matches!(
            header.as_str(),
            ZONE_CODE | ACTIVE_COUNT | CLOSED_COUNT | FIELD_LABEL | DESCRIPTION
        ) {
            continue;
        }
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let attr = value
            .parse::<i64>()
            .map_or_else(|_| AttrValue::from(value), AttrValue::Number);
        attributes.insert(header.clone(), attr);
    }

    Ok(OccupancyRecord {
        zone_code: code,
        active_count,
        closed_count,
        field_label: optional(FIELD_LABEL),
        description: optional(DESCRIPTION),
        attributes,
    })
}
