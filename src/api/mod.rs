pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiClient, DEFAULT_API_URL, JobApi};
pub use error::ApiError;
pub use types::{JobForm, LicenseStatus};
