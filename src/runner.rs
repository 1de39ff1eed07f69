use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::api::{JobApi, JobForm, LicenseStatus};
use crate::error::LocalJobError;
use crate::job::{RunReport, RunTrace, Stage};
use crate::ui::RunProgress;

/// Options for a single run, resolved from config and CLI flags.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Uploaded when the server reports no valid license.
    pub license_file: PathBuf,
    /// Fixed pause between status checks.
    pub poll_interval: Duration,
    /// Upper bound on status checks; `None` polls until a terminal answer.
    pub max_polls: Option<u32>,
    /// Form fields sent with the job.
    pub form: JobForm,
    /// Where to also write the result JSON.
    pub output: Option<PathBuf>,
}

/// Sequences license check, submission, polling and result retrieval
/// against a [`JobApi`].
pub struct JobRunner<A> {
    api: A,
    settings: RunSettings,
    progress: RunProgress,
}

impl<A: JobApi> JobRunner<A> {
    /// Create a runner over `api` with terminal output enabled.
    pub fn new(api: A, settings: RunSettings) -> Self {
        Self {
            api,
            settings,
            progress: RunProgress::new(),
        }
    }

    /// Run every step in order and return a report of the finished job.
    pub async fn run(&self, input: &Path) -> Result<RunReport, LocalJobError> {
        let mut trace = RunTrace::start();

        self.ensure_license(&mut trace).await?;

        trace.enter(Stage::Submit);
        let job_id = self.submit(input).await?;

        trace.enter(Stage::Poll);
        let polls = self.poll_until_complete(&job_id).await?;
        trace.record_polls(polls);

        trace.enter(Stage::Result);
        self.fetch_result(&job_id).await?;

        debug!(stages = ?trace.stages(), "run finished");
        Ok(trace.finish(&job_id, input))
    }

    /// Check the license; if missing, upload the license file and check once more.
    ///
    /// Upload failures are reported but do not abort: the second check decides.
    pub async fn ensure_license(&self, trace: &mut RunTrace) -> Result<(), LocalJobError> {
        trace.enter(Stage::LicenseCheck);
        if self.license_is_valid().await {
            return Ok(());
        }

        trace.enter(Stage::LicenseUpload);
        let license_file = &self.settings.license_file;
        match self.api.upload_license(license_file).await {
            Ok(receipt) => {
                info!(status = receipt.status, "license uploaded");
                self.progress.license_uploaded(receipt.status, &receipt.body);
            }
            Err(e) if e.is_not_found_file() => {
                warn!(file = %license_file.display(), "license file missing");
                self.progress.license_upload_failed(&format!(
                    "File {} not found.",
                    license_file.display()
                ));
            }
            Err(e) => {
                warn!(error = %e, "license upload failed");
                self.progress.license_upload_failed(&format!(
                    "An error occurred while uploading the file: {e}"
                ));
            }
        }

        trace.enter(Stage::LicenseCheck);
        if self.license_is_valid().await {
            Ok(())
        } else {
            Err(LocalJobError::LicenseUnavailable)
        }
    }

    async fn license_is_valid(&self) -> bool {
        match self.api.check_license().await {
            Ok(LicenseStatus::Valid(holder)) => {
                self.progress.license_valid(&holder);
                true
            }
            Ok(LicenseStatus::Invalid) => {
                self.progress.license_missing(None);
                false
            }
            Err(e) => {
                warn!(error = %e, "license check failed");
                self.progress.license_missing(Some(e.to_string().as_str()));
                false
            }
        }
    }

    /// Submit the input file and return the job id.
    pub async fn submit(&self, input: &Path) -> Result<String, LocalJobError> {
        if !input.is_file() {
            return Err(LocalJobError::InputNotFound(input.to_path_buf()));
        }
        let job_id = self
            .api
            .create_job(input, &self.settings.form)
            .await
            .map_err(LocalJobError::Submit)?;
        self.progress.job_id(&job_id);
        Ok(job_id)
    }

    /// Poll the job status at the fixed interval until it reports `Complete`.
    /// Returns the number of status checks made.
    pub async fn poll_until_complete(&self, job_id: &str) -> Result<u32, LocalJobError> {
        let interval = self.settings.poll_interval;
        let mut polls = 0;
        loop {
            if let Some(max) = self.settings.max_polls
                && polls >= max
            {
                return Err(LocalJobError::PollLimit(max));
            }
            polls += 1;

            let status = self
                .api
                .job_status(job_id)
                .await
                .map_err(LocalJobError::Poll)?;
            debug!(job_id, %status, poll = polls, "job status");

            if status.is_complete() {
                self.progress.job_completed();
                return Ok(polls);
            }

            self.progress.job_status(&status, interval);
            self.wait(interval).await;
        }
    }

    async fn wait(&self, interval: Duration) {
        if interval.is_zero() {
            return;
        }
        let pb = self.progress.waiting(interval);
        sleep(interval).await;
        pb.finish_and_clear();
    }

    /// Fetch the result, print it and write it to the output file if one is set.
    pub async fn fetch_result(&self, job_id: &str) -> Result<Value, LocalJobError> {
        let result = self
            .api
            .job_result(job_id)
            .await
            .map_err(LocalJobError::FetchResult)?;
        self.progress.result(&result);

        if let Some(output) = &self.settings.output {
            let json = serde_json::to_string_pretty(&result)?;
            tokio::fs::write(output, json).await?;
            info!(file = %output.display(), "result written");
        }
        Ok(result)
    }
}
