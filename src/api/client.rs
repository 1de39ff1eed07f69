use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::error::ApiError;
use super::types::{Envelope, JobData, JobForm, LicenseStatus, UploadReceipt};
use crate::job::JobStatus;

pub const DEFAULT_API_URL: &str = "http://localhost:9090/";

const LICENSE_PATH: &str = "api/license";
const LICENSE_UPLOAD_PATH: &str = "api/license/file";
const CREATE_JOB_PATH: &str = "data/add-job";
const STATUS_PATH: &str = "data/status";
const RESULT_PATH: &str = "data/result/json";

/// Operations the runner needs from the job API.
///
/// Implemented by [`ApiClient`] for real HTTP calls; tests drive the runner
/// with an in-memory fake instead.
#[allow(async_fn_in_trait)]
pub trait JobApi {
    /// Ask the server whether a valid license is installed.
    async fn check_license(&self) -> Result<LicenseStatus, ApiError>;

    /// Upload `license_file` as the `License` multipart part.
    async fn upload_license(&self, license_file: &Path) -> Result<UploadReceipt, ApiError>;

    /// Submit `input` with the static form fields and return the new job id.
    async fn create_job(&self, input: &Path, form: &JobForm) -> Result<String, ApiError>;

    /// Current status of a job; an envelope error is returned as [`ApiError::Rejected`].
    async fn job_status(&self, job_id: &str) -> Result<JobStatus, ApiError>;

    /// The finished job's result as raw JSON.
    async fn job_result(&self, job_id: &str) -> Result<Value, ApiError>;
}

/// HTTP implementation of [`JobApi`] rooted at a base URL.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url`; a trailing slash is optional.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without the trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

/// Read a file into a multipart part named after the file.
async fn file_part(path: &Path) -> Result<Part, ApiError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Part::bytes(bytes).file_name(file_name))
}

/// Fail on non-2xx, otherwise decode the body as JSON.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

impl JobApi for ApiClient {
    async fn check_license(&self) -> Result<LicenseStatus, ApiError> {
        let url = self.url(LICENSE_PATH);
        debug!(%url, "checking license");
        let response = self.client.get(&url).send().await?;
        let envelope: Envelope<Value> = read_json(response).await?;
        Ok(LicenseStatus::from_envelope(&envelope))
    }

    async fn upload_license(&self, license_file: &Path) -> Result<UploadReceipt, ApiError> {
        let url = self.url(LICENSE_UPLOAD_PATH);
        debug!(%url, file = %license_file.display(), "uploading license");
        let form = Form::new().part("License", file_part(license_file).await?);
        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(UploadReceipt {
            status: status.as_u16(),
            body,
        })
    }

    async fn create_job(&self, input: &Path, form: &JobForm) -> Result<String, ApiError> {
        let url = self.url(CREATE_JOB_PATH);
        debug!(%url, input = %input.display(), "creating job");
        let mut multipart = Form::new().part("File", file_part(input).await?);
        for (name, value) in form.fields() {
            multipart = multipart.text(name, value.to_string());
        }
        let response = self.client.post(&url).multipart(multipart).send().await?;
        let envelope: Envelope<JobData> = read_json(response).await?;

        if envelope.is_error() {
            return Err(ApiError::Rejected(
                envelope.error_message_or("No error message provided"),
            ));
        }
        let data = envelope.data.unwrap_or_default();
        if data.status() != JobStatus::Created {
            return Err(ApiError::JobNotCreated(
                data.error_message
                    .unwrap_or_else(|| "No error message provided".to_string()),
            ));
        }
        data.id().ok_or(ApiError::MissingJobId)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus, ApiError> {
        let url = self.url(&format!("{STATUS_PATH}/{job_id}"));
        debug!(%url, "checking job status");
        let response = self.client.get(&url).send().await?;
        let envelope: Envelope<JobData> = read_json(response).await?;

        if envelope.is_error() {
            return Err(ApiError::Rejected(
                envelope.error_message_or("No error message provided"),
            ));
        }
        Ok(envelope.data.unwrap_or_default().status())
    }

    async fn job_result(&self, job_id: &str) -> Result<Value, ApiError> {
        let url = self.url(&format!("{RESULT_PATH}/{job_id}"));
        debug!(%url, "fetching job result");
        let response = self.client.get(&url).send().await?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn input_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new(DEFAULT_API_URL).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9090");
        assert_eq!(
            client.url(LICENSE_PATH),
            "http://localhost:9090/api/license"
        );
    }

    #[tokio::test]
    async fn check_license_valid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/license"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isError": false,
                "errorMessage": null,
                "data": "Licensed To: ACME Corp"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let status = client.check_license().await.unwrap();
        assert_eq!(status, LicenseStatus::Valid("Licensed To: ACME Corp".into()));
    }

    #[tokio::test]
    async fn check_license_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/license"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isError": true,
                "errorMessage": "No license found",
                "data": null
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        assert_eq!(client.check_license().await.unwrap(), LicenseStatus::Invalid);
    }

    #[tokio::test]
    async fn check_license_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/license"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.check_license().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn check_license_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/license"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.check_license().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn upload_license_sends_license_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/license/file"))
            .and(body_string_contains("name=\"License\""))
            .and(body_string_contains("LICENSE-BYTES"))
            .respond_with(ResponseTemplate::new(200).set_body_string("uploaded"))
            .expect(1)
            .mount(&server)
            .await;

        let license = input_file("LICENSE-BYTES");
        let client = ApiClient::new(&server.uri()).unwrap();
        let receipt = client.upload_license(license.path()).await.unwrap();
        assert_eq!(receipt.status, 200);
        assert_eq!(receipt.body, "uploaded");
    }

    #[tokio::test]
    async fn upload_license_missing_file() {
        let server = MockServer::start().await;
        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client
            .upload_license(Path::new("/nonexistent/license.gai_key"))
            .await
            .unwrap_err();
        assert!(err.is_not_found_file());
    }

    #[tokio::test]
    async fn create_job_sends_file_and_form_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/data/add-job"))
            .and(body_string_contains("name=\"File\""))
            .and(body_string_contains("a,b\n1,2"))
            .and(body_string_contains("name=\"MimeType\""))
            .and(body_string_contains("text/csv; header=present"))
            .and(body_string_contains("name=\"Pipeline\""))
            .and(body_string_contains("name=\"CallbackUrl\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isError": false,
                "errorMessage": null,
                "data": {"id": "job-123", "status": "Created", "errorMessage": null}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let input = input_file("a,b\n1,2");
        let client = ApiClient::new(&server.uri()).unwrap();
        let id = client
            .create_job(input.path(), &JobForm::default())
            .await
            .unwrap();
        assert_eq!(id, "job-123");
    }

    #[tokio::test]
    async fn create_job_reports_envelope_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/data/add-job"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isError": true,
                "errorMessage": "Unsupported mime type",
                "data": null
            })))
            .mount(&server)
            .await;

        let input = input_file("x");
        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client
            .create_job(input.path(), &JobForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "Unsupported mime type"));
    }

    #[tokio::test]
    async fn create_job_not_created_uses_data_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/data/add-job"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isError": false,
                "data": {"id": "job-9", "status": "Failed", "errorMessage": "bad pipeline"}
            })))
            .mount(&server)
            .await;

        let input = input_file("x");
        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client
            .create_job(input.path(), &JobForm::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Job Failed: bad pipeline");
    }

    #[tokio::test]
    async fn create_job_not_created_without_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/data/add-job"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isError": false,
                "data": {"status": "Rejected"}
            })))
            .mount(&server)
            .await;

        let input = input_file("x");
        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client
            .create_job(input.path(), &JobForm::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Job Failed: No error message provided");
    }

    #[tokio::test]
    async fn create_job_http_error_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/data/add-job"))
            .respond_with(ResponseTemplate::new(400).set_body_string("missing File"))
            .mount(&server)
            .await;

        let input = input_file("x");
        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client
            .create_job(input.path(), &JobForm::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API error (status 400): missing File");
    }

    #[tokio::test]
    async fn job_status_parses_data_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/status/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isError": false,
                "data": {"id": "job-1", "status": "Processing"}
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let status = client.job_status("job-1").await.unwrap();
        assert_eq!(status, JobStatus::Other("Processing".into()));
    }

    #[tokio::test]
    async fn job_status_missing_data_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/status/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"isError": false})))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        assert_eq!(client.job_status("job-1").await.unwrap(), JobStatus::Unknown);
    }

    #[tokio::test]
    async fn job_status_error_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/status/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isError": true,
                "errorMessage": "Job crashed"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.job_status("job-1").await.unwrap_err();
        assert_eq!(err.to_string(), "API reported an error: Job crashed");
    }

    #[tokio::test]
    async fn job_result_returns_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/result/json/job-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"rows": [{"a": 1}]})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let result = client.job_result("job-1").await.unwrap();
        assert_eq!(result["rows"][0]["a"], 1);
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        // Bind and drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = ApiClient::new(&format!("http://127.0.0.1:{port}")).unwrap();
        let err = client.check_license().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
