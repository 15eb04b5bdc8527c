use crate::error::{DashboardError, Result};
use crate::types::{RawRecord, Record};
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub missing_production: usize,
    pub missing_yield_or_area: usize,
}

impl LoadReport {
    fn from_records(records: &[Record], total_rows: usize, parse_errors: usize) -> Self {
        LoadReport {
            total_rows,
            loaded_rows: records.len(),
            parse_errors,
            missing_production: records.iter().filter(|r| !r.production.is_present()).count(),
            missing_yield_or_area: records
                .iter()
                .filter(|r| !(r.crop_yield.is_present() && r.cultivation_area.is_present()))
                .count(),
        }
    }
}

/// Load the dataset at `path`, picking the parser from the file extension.
pub fn load_dataset(path: &str) -> Result<(Vec<Record>, LoadReport)> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("json") => {
            tracing::debug!(path, "reading JSON dataset");
            let text = fs::read_to_string(path)?;
            load_records_from_str(&text)
        }
        Some("csv") => {
            tracing::debug!(path, "reading CSV dataset");
            load_csv(path)
        }
        _ => Err(DashboardError::UnsupportedFormat {
            path: path.to_string(),
        }),
    }
}

/// Parse a JSON array of dataset rows. A malformed document fails as a whole.
pub fn load_records_from_str(json: &str) -> Result<(Vec<Record>, LoadReport)> {
    let raw: Vec<RawRecord> = serde_json::from_str(json)?;
    let total_rows = raw.len();
    let records: Vec<Record> = raw.into_iter().map(Record::from).collect();
    let report = LoadReport::from_records(&records, total_rows, 0);
    Ok((records, report))
}

fn load_csv(path: &str) -> Result<(Vec<Record>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<Record> = Vec::new();

    for result in rdr.deserialize::<RawRecord>() {
        total_rows += 1;
        match result {
            Ok(row) => records.push(Record::from(row)),
            Err(e) => {
                tracing::warn!(row = total_rows, error = %e, "skipping unreadable CSV row");
                parse_errors += 1;
            }
        }
    }

    let report = LoadReport::from_records(&records, total_rows, parse_errors);
    Ok((records, report))
}
