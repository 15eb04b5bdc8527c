use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported dataset format: {path} (expected .json or .csv)")]
    UnsupportedFormat { path: String },

    #[error("No data loaded. Please load the dataset first (option 1).")]
    NoData,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
