use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovrankError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Formatting error")]
    Fmt(#[from] std::fmt::Error),

    #[error("Invalid weights '{0}': expected three comma-separated non-negative numbers (branches,functions,lines)")]
    InvalidWeights(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("No coverage report found under {root}. Searched: {}", searched.join(", "))]
    ReportNotFound { root: PathBuf, searched: Vec<String> },

    #[error("Coverage report {0} contains no complete records (expected SF:...end_of_record blocks)")]
    EmptyReport(PathBuf),

    #[error("Config file already exists: {0} (use --force to overwrite)")]
    ConfigExists(PathBuf),

    #[error("File not found in coverage report: {0}")]
    FileNotInReport(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CovrankError>;
