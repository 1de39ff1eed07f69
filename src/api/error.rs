//! Error types for the job API client.
//!
//! [`ApiError`] separates transport failures from errors the server reports
//! inside the `{isError, errorMessage, data}` envelope.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the job API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx HTTP response. Carries the status code and the response body.
    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// The envelope had `isError: true`.
    #[error("API reported an error: {0}")]
    Rejected(String),

    /// Job creation answered with a status other than `Created`.
    #[error("Job Failed: {0}")]
    JobNotCreated(String),

    /// The job was created but the response carried no id.
    #[error("job was created but the response has no job id")]
    MissingJobId,

    /// The response body was not the expected JSON.
    #[error("invalid response body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// A file to upload could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Underlying network failure (DNS, connection refused, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// True when a file to upload does not exist, as opposed to any other
    /// read or transport failure.
    pub fn is_not_found_file(&self) -> bool {
        matches!(self, ApiError::File { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
