//! Remote checking-service boundary.
//!
//! [`CheckService`] is the seam every remote concern flows through; the
//! orchestrator is its only caller. [`HttpCheckService`] is the production
//! implementation over the service's HTTP API; tests substitute in-process
//! fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    anomalies::AnomalyScore,
    error::ServiceError,
    nulls::{FillValueMap, NullRateMap},
    rows::Row,
    schema::{SchemaMap, ValidationEntry},
};

pub type ServiceResult<T> = Result<T, ServiceError>;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Response of the fill-nulls call. A missing download reference in an
/// otherwise successful response is treated as a failed remediation.
#[derive(Debug, Clone, Deserialize)]
pub struct FillResponse {
    #[serde(default)]
    pub download: Option<String>,
}

#[derive(Serialize)]
struct SchemaCheckRequest<'a> {
    user_schema: &'a SchemaMap,
}

#[derive(Serialize)]
struct FillRequest<'a> {
    fill_values: &'a FillValueMap,
}

/// The remote profiling/validation service, one method per endpoint.
#[async_trait]
pub trait CheckService {
    /// `GET /api/health` connectivity probe.
    async fn health(&self) -> ServiceResult<()>;
    /// `POST /api/upload`, multipart field `file`.
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> ServiceResult<()>;
    /// `POST /api/run-checks`: (re)compute profiling on the uploaded file.
    async fn run_checks(&self) -> ServiceResult<()>;
    /// `GET /api/snapshot`: representative sample rows.
    async fn snapshot(&self) -> ServiceResult<Vec<Row>>;
    /// `GET /api/null-rates`: per-column missing-value fractions.
    async fn null_rates(&self) -> ServiceResult<NullRateMap>;
    /// `GET /api/anomalies`: flagged rows.
    async fn anomalies(&self) -> ServiceResult<Vec<Row>>;
    /// `GET /api/detect-schema`: inferred column types.
    async fn detect_schema(&self) -> ServiceResult<SchemaMap>;
    /// `POST /api/schema-check`: per-column verdicts for an expected schema.
    async fn schema_check(&self, expected: &SchemaMap) -> ServiceResult<Vec<ValidationEntry>>;
    /// `POST /api/fill-nulls`: remediate missing values, returning a
    /// download reference for the cleaned file.
    async fn fill_nulls(&self, fill_values: &FillValueMap) -> ServiceResult<FillResponse>;
    /// `GET /api/anomaly-scores`: per-row isolation scores.
    async fn anomaly_scores(&self) -> ServiceResult<Vec<AnomalyScore>>;
    /// Fetches a server-relative download reference as raw bytes.
    async fn download(&self, reference: &str) -> ServiceResult<Vec<u8>>;
}

/// HTTP client for the checking service.
pub struct HttpCheckService {
    client: Client,
    base_url: String,
}

impl HttpCheckService {
    pub fn new(base_url: &str) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute form of a server-relative reference, e.g. the fill-nulls
    /// download path. Already-absolute references pass through unchanged.
    pub fn absolute_url(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            self.url(reference)
        }
    }

    fn ensure_ok(response: Response) -> ServiceResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ServiceError::Status(status))
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> ServiceResult<T> {
        let body = Self::ensure_ok(response)?.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| ServiceError::Payload(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::read_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::read_json(response).await
    }
}

#[async_trait]
impl CheckService for HttpCheckService {
    async fn health(&self) -> ServiceResult<()> {
        let response = self.client.get(self.url("/api/health")).send().await?;
        Self::ensure_ok(response).map(|_| ())
    }

    async fn upload(&self, name: &str, bytes: Vec<u8>) -> ServiceResult<()> {
        let part = multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await?;
        Self::ensure_ok(response).map(|_| ())
    }

    async fn run_checks(&self) -> ServiceResult<()> {
        let response = self.client.post(self.url("/api/run-checks")).send().await?;
        Self::ensure_ok(response).map(|_| ())
    }

    async fn snapshot(&self) -> ServiceResult<Vec<Row>> {
        self.get_json("/api/snapshot").await
    }

    async fn null_rates(&self) -> ServiceResult<NullRateMap> {
        self.get_json("/api/null-rates").await
    }

    async fn anomalies(&self) -> ServiceResult<Vec<Row>> {
        self.get_json("/api/anomalies").await
    }

    async fn detect_schema(&self) -> ServiceResult<SchemaMap> {
        self.get_json("/api/detect-schema").await
    }

    async fn schema_check(&self, expected: &SchemaMap) -> ServiceResult<Vec<ValidationEntry>> {
        self.post_json(
            "/api/schema-check",
            &SchemaCheckRequest {
                user_schema: expected,
            },
        )
        .await
    }

    async fn fill_nulls(&self, fill_values: &FillValueMap) -> ServiceResult<FillResponse> {
        self.post_json("/api/fill-nulls", &FillRequest { fill_values })
            .await
    }

    async fn anomaly_scores(&self) -> ServiceResult<Vec<AnomalyScore>> {
        self.get_json("/api/anomaly-scores").await
    }

    async fn download(&self, reference: &str) -> ServiceResult<Vec<u8>> {
        let response = self.client.get(self.absolute_url(reference)).send().await?;
        let body = Self::ensure_ok(response)?.bytes().await?;
        Ok(body.to_vec())
    }
}
