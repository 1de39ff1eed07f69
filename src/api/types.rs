//! Wire types for the job API.
//!
//! Every endpoint answers with the same envelope:
//! `{"isError": bool, "errorMessage": string|null, "data": ...}`.
//! Fields are optional on the wire, so they are optional here too.

use serde::Deserialize;
use serde_json::Value;

use crate::job::JobStatus;

/// Prefix the license endpoint puts in `data` when a license is installed.
pub const LICENSED_PREFIX: &str = "Licensed To:";

/// Response envelope shared by all endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub is_error: Option<bool>,
    pub error_message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// A missing `isError` is read as "no error".
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// `errorMessage`, or `fallback` when the server sent none.
    pub fn error_message_or(&self, fallback: &str) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// The `data` object of the job creation and status endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    pub id: Option<Value>,
    pub status: Option<String>,
    pub error_message: Option<String>,
}

impl JobData {
    /// Parsed `status`; [`JobStatus::Unknown`] when absent.
    pub fn status(&self) -> JobStatus {
        JobStatus::parse(self.status.as_deref())
    }

    /// The id as a path segment. Numeric ids are accepted as well as strings.
    pub fn id(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Outcome of a license check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseStatus {
    /// Installed and accepted; holds the `Licensed To: ...` text.
    Valid(String),
    Invalid,
}

impl LicenseStatus {
    /// A license is valid only when `data` starts with [`LICENSED_PREFIX`],
    /// `isError` is explicitly `false` and no `errorMessage` is set.
    pub fn from_envelope(envelope: &Envelope<Value>) -> Self {
        let holder = envelope.data.as_ref().and_then(Value::as_str);
        match holder {
            Some(text)
                if text.starts_with(LICENSED_PREFIX)
                    && envelope.is_error == Some(false)
                    && envelope.error_message.is_none() =>
            {
                LicenseStatus::Valid(text.to_string())
            }
            _ => LicenseStatus::Invalid,
        }
    }
}

/// What the license upload endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

/// Static form fields sent with every job, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JobForm {
    pub mime_type: String,
    pub mappings: String,
    pub output_mappings: String,
    pub pipeline: String,
    pub callback_url: String,
}

impl Default for JobForm {
    fn default() -> Self {
        Self {
            mime_type: "text/csv; header=present".to_string(),
            mappings: String::new(),
            output_mappings: String::new(),
            pipeline: String::new(),
            callback_url: String::new(),
        }
    }
}

impl JobForm {
    /// Multipart field names and values, in the order the server documents them.
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("Pipeline", self.pipeline.as_str()),
            ("Mappings", self.mappings.as_str()),
            ("OutputMappings", self.output_mappings.as_str()),
            ("CallbackUrl", self.callback_url.as_str()),
            ("MimeType", self.mime_type.as_str()),
        ]
    }
}
