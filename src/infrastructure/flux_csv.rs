// Decoder for InfluxDB v2 query results (CSV dialect with header rows)
use crate::application::error::FetchError;
use crate::application::sensor_repository::FluxRecord;
use csv::StringRecord;
use std::collections::HashMap;

/// Columns every Flux table carries that are not sensor data
const SYSTEM_COLUMNS: [&str; 6] = ["", "result", "table", "_start", "_stop", "_measurement"];

/// Decode a CSV query response into records.
///
/// The body may hold several tables separated by blank lines, each starting
/// with its own header row. An in-band error table becomes `FetchError::Query`.
pub fn decode(body: &str) -> Result<Vec<FluxRecord>, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    let mut header: Option<StringRecord> = None;
    let mut error_table = false;

    for row in reader.records() {
        let row = row.map_err(|e| FetchError::Query(format!("Malformed query response: {}", e)))?;

        if row.iter().all(|cell| cell.trim().is_empty()) {
            header = None;
            error_table = false;
            continue;
        }

        if is_table_header(&row) {
            header = Some(row);
            error_table = false;
            continue;
        }

        if header.is_none() && is_error_header(&row) {
            header = Some(row);
            error_table = true;
            continue;
        }

        let Some(columns) = header.as_ref() else {
            tracing::warn!("Skipping query result row without a header: {:?}", row);
            continue;
        };

        if error_table {
            let message = columns
                .iter()
                .position(|c| c == "error")
                .and_then(|idx| row.get(idx))
                .unwrap_or("unknown error")
                .to_string();
            return Err(FetchError::Query(message));
        }

        let values: HashMap<String, String> = columns
            .iter()
            .zip(row.iter())
            .filter(|(column, _)| !SYSTEM_COLUMNS.iter().any(|s| s == column))
            .map(|(column, cell)| (column.to_string(), cell.to_string()))
            .collect();

        records.push(FluxRecord::new(values));
    }

    Ok(records)
}

fn is_table_header(row: &StringRecord) -> bool {
    row.get(1) == Some("result") && row.get(2) == Some("table")
}

/// In-band failures come as a table with only `error` and `reference` columns
fn is_error_header(row: &StringRecord) -> bool {
    let has = |name: &str| row.iter().any(|c| c == name);
    has("error") && has("reference")
}
