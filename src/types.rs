use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

use crate::util::parse_number_lenient;

/// One row of the bundled dataset, using the source column names verbatim.
///
/// Cells may arrive as JSON strings, JSON numbers or `null`; all of them are
/// normalised to text here so the presence check in [`Measure::from_cell`]
/// sees exactly what the dataset carried.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Year", default, deserialize_with = "cell")]
    pub year: String,
    #[serde(rename = "Crop Name", default, deserialize_with = "cell")]
    pub crop_name: String,
    #[serde(
        rename = "Crop Production (UOM:t(Tonnes))",
        default,
        deserialize_with = "cell"
    )]
    pub production: String,
    #[serde(
        rename = "Yield Of Crops (UOM:Kg/Ha(KilogramperHectare))",
        default,
        deserialize_with = "cell"
    )]
    pub crop_yield: String,
    #[serde(
        rename = "Area Under Cultivation (UOM:Ha(Hectares))",
        default,
        deserialize_with = "cell"
    )]
    pub cultivation_area: String,
}

struct CellVisitor;

impl<'de> Visitor<'de> for CellVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, a number or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(if v { "1" } else { "0" }.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}

fn cell<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(CellVisitor)
}

/// A numeric cell that is either absent (empty in the source) or carries a
/// value. Non-empty text that does not parse is a `Value(0.0)`, not `Absent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Absent,
    Value(f64),
}

impl Measure {
    pub fn from_cell(cell: &str) -> Self {
        if cell.is_empty() {
            Measure::Absent
        } else {
            Measure::Value(parse_number_lenient(cell))
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Measure::Absent => None,
            Measure::Value(v) => Some(v),
        }
    }

    pub fn is_present(self) -> bool {
        matches!(self, Measure::Value(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub year: String,
    pub crop_name: String,
    pub production: Measure,
    pub crop_yield: Measure,
    pub cultivation_area: Measure,
}

impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        Record {
            production: Measure::from_cell(&raw.production),
            crop_yield: Measure::from_cell(&raw.crop_yield),
            cultivation_area: Measure::from_cell(&raw.cultivation_area),
            year: raw.year,
            crop_name: raw.crop_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropProduction {
    pub name: String,
    pub production: f64,
}

impl CropProduction {
    pub fn placeholder() -> Self {
        CropProduction {
            name: "N/A".to_string(),
            production: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlySummary {
    pub year: String,
    pub max_crop: CropProduction,
    pub min_crop: CropProduction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropSummary {
    pub crop_name: String,
    pub average_yield: f64,
    pub average_cultivation: f64,
}

/// Headline numbers shown above the two tables and written to `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub total_records: usize,
    pub financial_years: usize,
    pub crops_analyzed: usize,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YearlyRow {
    #[serde(rename = "FinancialYear")]
    #[tabled(rename = "FinancialYear")]
    pub financial_year: String,
    #[serde(rename = "HighestCrop")]
    #[tabled(rename = "HighestCrop")]
    pub highest_crop: String,
    #[serde(rename = "HighestProduction")]
    #[tabled(rename = "HighestProduction")]
    pub highest_production: String,
    #[serde(rename = "LowestCrop")]
    #[tabled(rename = "LowestCrop")]
    pub lowest_crop: String,
    #[serde(rename = "LowestProduction")]
    #[tabled(rename = "LowestProduction")]
    pub lowest_production: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CropRow {
    #[serde(rename = "CropName")]
    #[tabled(rename = "CropName")]
    pub crop_name: String,
    #[serde(rename = "AverageYield")]
    #[tabled(rename = "AverageYield")]
    pub average_yield: String,
    #[serde(rename = "AverageCultivation")]
    #[tabled(rename = "AverageCultivation")]
    pub average_cultivation: String,
}
