use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum LocalJobError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("License upload failed. Please check the license file and try again.")]
    LicenseUnavailable,

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Job submission failed: {0}")]
    Submit(#[source] ApiError),

    #[error("Job did not complete successfully: {0}")]
    Poll(#[source] ApiError),

    #[error("Job did not complete after {0} status checks")]
    PollLimit(u32),

    #[error("Failed to fetch job result: {0}")]
    FetchResult(#[source] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
