//! Error taxonomy for the workflow core and the service transport layer.
//!
//! [`WorkflowError`] covers everything a user action can fail with; every
//! variant is recovered at the component that raised it and leaves the
//! session in its last known-good state. [`ServiceError`] is the lower
//! transport/payload layer wrapped by the check-phase variants.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected response payload: {0}")]
    Payload(String),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("'{0}' is not a CSV file")]
    NotCsv(String),
    #[error("could not parse preview rows: {0}")]
    PreviewParse(#[source] csv::Error),
    #[error("invalid schema JSON: {0}")]
    InvalidJson(String),
    #[error("upload failed: {0}")]
    UploadFailed(#[source] ServiceError),
    #[error("check run failed: {0}")]
    CheckFailed(#[source] ServiceError),
    #[error("schema check failed: {0}")]
    SchemaCheckFailed(#[source] ServiceError),
    #[error("null fill failed: {0}")]
    FillFailed(#[source] ServiceError),
}

pub type Result<T, E = WorkflowError> = std::result::Result<T, E>;
