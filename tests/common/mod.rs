#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use tempfile::{tempdir, TempDir};

use dq_workbench::{
    anomalies::AnomalyScore,
    error::ServiceError,
    nulls::{FillValueMap, NullRateMap},
    rows::{Cell, Row},
    schema::{ColumnKind, SchemaMap, ValidationEntry},
    service::{CheckService, FillResponse, ServiceResult},
};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn row(pairs: &[(&str, Cell)]) -> Row {
    pairs
        .iter()
        .map(|(name, cell)| (name.to_string(), cell.clone()))
        .collect()
}

pub fn schema(pairs: &[(&str, ColumnKind)]) -> SchemaMap {
    pairs
        .iter()
        .map(|(name, kind)| (name.to_string(), *kind))
        .collect()
}

pub fn rates(pairs: &[(&str, f64)]) -> NullRateMap {
    pairs
        .iter()
        .map(|(name, rate)| (name.to_string(), *rate))
        .collect()
}

fn scripted_failure() -> ServiceError {
    ServiceError::Payload("scripted failure".to_string())
}

/// Scriptable state behind [`FakeService`]. Tests keep an `Arc` clone so
/// responses and failure switches can change between calls.
#[derive(Default)]
pub struct FakeState {
    pub snapshot: Mutex<Vec<Row>>,
    pub null_rates: Mutex<NullRateMap>,
    pub anomalies: Mutex<Vec<Row>>,
    pub detected: Mutex<SchemaMap>,
    pub scores: Mutex<Vec<AnomalyScore>>,
    pub download_reference: Mutex<Option<String>>,

    pub fail_upload: AtomicBool,
    pub fail_run_checks: AtomicBool,
    pub fail_detect_schema: AtomicBool,
    pub fail_schema_check: AtomicBool,
    pub fail_fill: AtomicBool,

    pub check_runs: AtomicUsize,
    pub uploads: Mutex<Vec<String>>,
    pub schema_checks: Mutex<Vec<SchemaMap>>,
    pub fills: Mutex<Vec<FillValueMap>>,
}

/// In-process stand-in for the remote checking service.
#[derive(Default, Clone)]
pub struct FakeService(pub Arc<FakeState>);

impl FakeService {
    pub fn state(&self) -> Arc<FakeState> {
        Arc::clone(&self.0)
    }
}

#[async_trait]
impl CheckService for FakeService {
    async fn health(&self) -> ServiceResult<()> {
        Ok(())
    }

    async fn upload(&self, name: &str, _bytes: Vec<u8>) -> ServiceResult<()> {
        if self.0.fail_upload.load(Ordering::SeqCst) {
            return Err(scripted_failure());
        }
        self.0.uploads.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn run_checks(&self) -> ServiceResult<()> {
        if self.0.fail_run_checks.load(Ordering::SeqCst) {
            return Err(scripted_failure());
        }
        self.0.check_runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn snapshot(&self) -> ServiceResult<Vec<Row>> {
        Ok(self.0.snapshot.lock().unwrap().clone())
    }

    async fn null_rates(&self) -> ServiceResult<NullRateMap> {
        Ok(self.0.null_rates.lock().unwrap().clone())
    }

    async fn anomalies(&self) -> ServiceResult<Vec<Row>> {
        Ok(self.0.anomalies.lock().unwrap().clone())
    }

    async fn detect_schema(&self) -> ServiceResult<SchemaMap> {
        if self.0.fail_detect_schema.load(Ordering::SeqCst) {
            return Err(scripted_failure());
        }
        Ok(self.0.detected.lock().unwrap().clone())
    }

    async fn schema_check(&self, expected: &SchemaMap) -> ServiceResult<Vec<ValidationEntry>> {
        if self.0.fail_schema_check.load(Ordering::SeqCst) {
            return Err(scripted_failure());
        }
        self.0.schema_checks.lock().unwrap().push(expected.clone());
        let detected = self.0.detected.lock().unwrap();
        // Mirrors the service's comparison semantics: existence first, then
        // an exact type-tag match.
        Ok(expected
            .iter()
            .map(|(column, kind)| {
                let found = detected.get(column);
                ValidationEntry {
                    column: column.clone(),
                    exists: found.is_some(),
                    type_ok: found == Some(kind),
                }
            })
            .collect())
    }

    async fn fill_nulls(&self, fill_values: &FillValueMap) -> ServiceResult<FillResponse> {
        if self.0.fail_fill.load(Ordering::SeqCst) {
            return Err(scripted_failure());
        }
        self.0.fills.lock().unwrap().push(fill_values.clone());
        Ok(FillResponse {
            download: self.0.download_reference.lock().unwrap().clone(),
        })
    }

    async fn anomaly_scores(&self) -> ServiceResult<Vec<AnomalyScore>> {
        Ok(self.0.scores.lock().unwrap().clone())
    }

    async fn download(&self, _reference: &str) -> ServiceResult<Vec<u8>> {
        Ok(b"id,age\n1,0\n".to_vec())
    }
}
