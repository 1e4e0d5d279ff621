//! Error type shared by the loader, renderers and configuration.

use thiserror::Error;

/// Errors that can occur while loading data or producing report output.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
    #[error("Invalid year '{value}' on line {line}")]
    InvalidYear { value: String, line: u64 },
    #[error("Year {year} on line {line} does not follow {previous}")]
    NonIncreasingYear { year: i32, previous: i32, line: u64 },
    #[error("Table contains no rows")]
    EmptyTable,
    #[error("Malformed table: {0}")]
    TableShape(String),
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
    #[error("Plotting error: {0}")]
    Plot(String),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
