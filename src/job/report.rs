use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::stage::Stage;

/// Collects what happened during a run until the job id is known and the
/// run has finished.
#[derive(Debug, Clone)]
pub struct RunTrace {
    started_at: DateTime<Utc>,
    stages: Vec<Stage>,
    license_uploaded: bool,
    polls: u32,
}

impl RunTrace {
    /// Begin a trace stamped with the current time.
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            stages: Vec::new(),
            license_uploaded: false,
            polls: 0,
        }
    }

    /// Record entry into `stage`. Entering `LicenseUpload` marks the run as
    /// having uploaded a license.
    pub fn enter(&mut self, stage: Stage) {
        if stage == Stage::LicenseUpload {
            self.license_uploaded = true;
        }
        self.stages.push(stage);
    }

    /// Number of status checks made before the job completed.
    pub fn record_polls(&mut self, polls: u32) {
        self.polls = polls;
    }

    /// Stages entered so far, in order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Close the trace and produce the report for the finished job.
    pub fn finish(mut self, job_id: &str, input: &Path) -> RunReport {
        self.stages.push(Stage::Done);
        let now = Utc::now();
        RunReport {
            job_id: job_id.to_string(),
            input: input.to_path_buf(),
            stages: self.stages,
            license_uploaded: self.license_uploaded,
            polls: self.polls,
            started_at: self.started_at,
            completed_at: now,
            duration_ms: (now - self.started_at).num_milliseconds(),
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub job_id: String,
    pub input: PathBuf,
    pub stages: Vec<Stage>,
    pub license_uploaded: bool,
    pub polls: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}
