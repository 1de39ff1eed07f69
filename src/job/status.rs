use std::fmt;

/// Status of a job as reported by the server.
///
/// Only `Created` and `Complete` drive client behavior; every other value is
/// kept verbatim so it can be shown to the user while polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Created,
    Complete,
    Other(String),
    /// The server sent no status at all.
    Unknown,
}

impl JobStatus {
    /// Map the server's `status` text; matching is case-sensitive.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("Created") => JobStatus::Created,
            Some("Complete") => JobStatus::Complete,
            Some(other) => JobStatus::Other(other.to_string()),
            None => JobStatus::Unknown,
        }
    }

    /// `Complete` is the only terminal success state.
    pub fn is_complete(&self) -> bool {
        matches!(self, JobStatus::Complete)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Created => write!(f, "Created"),
            JobStatus::Complete => write!(f, "Complete"),
            JobStatus::Other(s) => write!(f, "{s}"),
            JobStatus::Unknown => write!(f, "Unknown"),
        }
    }
}
