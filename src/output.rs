use crate::error::Result;
use crate::types::Overview;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Write `rows` as CSV. An empty table still gets its header line.
pub fn write_csv<T: Serialize + Tabled>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        let headers = T::headers();
        wtr.write_record(headers.iter().map(|h| h.as_bytes()))?;
    }
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Console form of the overview, built from the same serialization as
/// `summary.json`.
pub fn summary_line(overview: &Overview) -> serde_json::Value {
    serde_json::json!({
        "financial_years": overview.financial_years,
        "crops_analyzed": overview.crops_analyzed,
        "period_start": overview.period_start,
        "period_end": overview.period_end,
    })
}

/// Markdown rendering of every row, or `(no rows)`.
pub fn render_table<T: Tabled + Clone>(rows: &[T]) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let shown = &rows[..rows.len().min(max_rows)];
    println!("{}\n", render_table(shown));
    if rows.len() > shown.len() {
        println!("... {} more rows\n", rows.len() - shown.len());
    }
}
