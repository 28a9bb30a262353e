//! Error types for the student wellbeing pipeline

use thiserror::Error;

use crate::types::QualityIssue;

/// Errors that can occur while loading, scoring, or writing a dataset
#[derive(Debug, Error)]
pub enum WellbeingError {
    #[error("Cannot read input: {0}")]
    Input(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Data quality error in row {row}: {}", format_issues(.issues))]
    DataQuality { row: usize, issues: Vec<QualityIssue> },

    #[error("Cannot write output: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn format_issues(issues: &[QualityIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
