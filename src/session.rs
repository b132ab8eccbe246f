//! Session aggregate and the workflow state machine driving it.
//!
//! [`Session`] is the single aggregate holding every slice of workflow
//! state; each slice is owned by exactly one component and read-only to
//! everyone else. [`SessionOrchestrator`] sequences the workflow (stage a
//! file, upload it, run the check pass, explore results) and is the only
//! code that talks to the [`CheckService`] boundary.
//!
//! The check pass fans out into four concurrent fetches whose results are
//! committed in one step: either every slice updates or none does, and
//! `checks_run` flips true only on full success.

use log::{debug, info};

use crate::{
    anomalies::{AnomalyPager, AnomalyScore},
    error::{Result, ServiceError, WorkflowError},
    ingest::{IngestionStage, Preview},
    nulls::{NullRateMap, NullRemediationTracker},
    rows::Row,
    schema::{SchemaMap, SchemaReconciler, ValidationEntry},
    service::CheckService,
};

/// The four fetch results of a check pass, gathered before any state
/// changes so the commit is all-or-nothing.
#[derive(Debug)]
pub struct CheckResults {
    pub snapshot: Vec<Row>,
    pub null_rates: NullRateMap,
    pub anomalies: Vec<Row>,
    pub detected_schema: SchemaMap,
}

/// All client-side workflow state for one process lifetime. Never
/// persisted; created empty and torn down with the process.
#[derive(Debug, Default)]
pub struct Session {
    ingest: IngestionStage,
    reconciler: SchemaReconciler,
    nulls: NullRemediationTracker,
    anomalies: AnomalyPager,
    snapshot: Vec<Row>,
    uploaded: bool,
    checks_run: bool,
}

impl Session {
    pub fn ingest(&self) -> &IngestionStage {
        &self.ingest
    }

    pub fn reconciler(&self) -> &SchemaReconciler {
        &self.reconciler
    }

    pub fn nulls(&self) -> &NullRemediationTracker {
        &self.nulls
    }

    pub fn anomalies(&self) -> &AnomalyPager {
        &self.anomalies
    }

    pub fn snapshot(&self) -> &[Row] {
        &self.snapshot
    }

    pub fn uploaded(&self) -> bool {
        self.uploaded
    }

    /// Gates every derived view (schema display, validation, null chart,
    /// remediation, anomaly table). Flips true only after a fully
    /// successful check round-trip.
    pub fn checks_run(&self) -> bool {
        self.checks_run
    }

    /// Replaces all four derived slices as one unit and reseeds the
    /// dependent editors (expected schema, fill values, reveal window).
    fn commit(&mut self, results: CheckResults) {
        self.snapshot = results.snapshot;
        self.nulls.replace_rates(results.null_rates);
        self.anomalies.replace(results.anomalies);
        self.reconciler.seed_detected(results.detected_schema);
        self.checks_run = true;
    }

    /// Drops everything derived from a check pass, keeping the staged file.
    fn clear_derived(&mut self) {
        self.snapshot.clear();
        self.nulls.clear();
        self.anomalies.clear();
        self.reconciler.clear();
        self.checks_run = false;
    }
}

/// Top-level state machine. Owns the session and the service handle.
pub struct SessionOrchestrator<S: CheckService> {
    service: S,
    session: Session,
}

impl<S: CheckService> SessionOrchestrator<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Connectivity probe against the service before a workflow run.
    pub async fn health(&self) -> Result<()> {
        self.service
            .health()
            .await
            .map_err(WorkflowError::CheckFailed)
    }

    // ---- ingestion -------------------------------------------------------

    /// Stages a local file and recomputes the preview. `delimiter`
    /// overrides the extension-resolved default.
    pub fn select_file(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        delimiter: Option<u8>,
    ) -> Result<&Preview> {
        self.session.ingest.select_file(name, bytes, delimiter)
    }

    /// Full rollback to the empty session: file, preview, and every derived
    /// slice.
    pub fn reset_upload(&mut self) {
        self.session.ingest.reset_upload();
        self.session.clear_derived();
        self.session.uploaded = false;
        info!("upload reset, session back to empty state");
    }

    /// Sends the staged file to the service. Success clears stale derived
    /// state but deliberately leaves `checks_run` false; running checks is a
    /// separate action. No staged file makes this a no-op.
    pub async fn upload(&mut self) -> Result<()> {
        let Some(staged) = self.session.ingest.staged() else {
            debug!("upload requested with no staged file, ignoring");
            return Ok(());
        };
        let (name, bytes) = (staged.name.clone(), staged.bytes.clone());
        self.service
            .upload(&name, bytes)
            .await
            .map_err(WorkflowError::UploadFailed)?;
        self.session.clear_derived();
        self.session.uploaded = true;
        info!("uploaded '{name}', checks not yet run");
        Ok(())
    }

    // ---- check pass ------------------------------------------------------

    /// Triggers the remote check pass and fans its four results out into
    /// the session in one atomic commit. A failure in any of the five calls
    /// leaves every slice untouched.
    ///
    /// Check passes are serialized by exclusive access: holding `&mut self`
    /// for the whole round-trip means a second pass cannot start, let alone
    /// commit, while one is still awaiting.
    pub async fn run_checks(&mut self) -> Result<()> {
        if !self.session.uploaded {
            debug!("run_checks requested before any upload, ignoring");
            return Ok(());
        }

        let results = self.fetch_results().await?;
        info!(
            "check pass complete: {} snapshot row(s), {} column(s), {} anomaly row(s)",
            results.snapshot.len(),
            results.detected_schema.len(),
            results.anomalies.len()
        );
        self.session.commit(results);
        Ok(())
    }

    async fn fetch_results(&self) -> Result<CheckResults> {
        self.service
            .run_checks()
            .await
            .map_err(WorkflowError::CheckFailed)?;
        let (snapshot, null_rates, anomalies, detected_schema) = tokio::try_join!(
            self.service.snapshot(),
            self.service.null_rates(),
            self.service.anomalies(),
            self.service.detect_schema(),
        )
        .map_err(WorkflowError::CheckFailed)?;
        Ok(CheckResults {
            snapshot,
            null_rates,
            anomalies,
            detected_schema,
        })
    }

    // ---- schema sub-workflow --------------------------------------------

    pub fn load_schema_text(&mut self, text: &str) -> Result<&SchemaMap> {
        self.session.reconciler.load_from_text(text)
    }

    pub fn load_schema_file(&mut self, bytes: &[u8]) -> Result<&SchemaMap> {
        self.session.reconciler.load_from_file(bytes)
    }

    pub fn reset_schema_to_detected(&mut self) -> &SchemaMap {
        self.session.reconciler.reset_to_detected()
    }

    /// Submits the expected schema for remote validation and stores the
    /// verdicts. Repeatable; does not re-trigger the check pass.
    pub async fn validate_schema(&mut self) -> Result<&[ValidationEntry]> {
        let entries = self
            .service
            .schema_check(self.session.reconciler.expected())
            .await
            .map_err(WorkflowError::SchemaCheckFailed)?;
        self.session.reconciler.set_validation(entries);
        Ok(self.session.reconciler.validation())
    }

    // ---- null remediation sub-workflow ----------------------------------

    pub fn set_null_replacement(&mut self, column: &str, value: &str) -> bool {
        self.session.nulls.set_replacement(column, value)
    }

    /// Submits the full fill-value map (empty strings included) and returns
    /// the download reference for the remediated file. A success response
    /// without a reference is a failed fill.
    pub async fn fill_nulls(&mut self) -> Result<&str> {
        let response = self
            .service
            .fill_nulls(self.session.nulls.fill_values())
            .await
            .map_err(WorkflowError::FillFailed)?;
        let reference = response.download.ok_or_else(|| {
            WorkflowError::FillFailed(ServiceError::Payload(
                "response did not include a download reference".to_string(),
            ))
        })?;
        Ok(self.session.nulls.set_download(reference))
    }

    /// Fetches the remediated file behind a download reference.
    pub async fn download(&self, reference: &str) -> Result<Vec<u8>> {
        self.service
            .download(reference)
            .await
            .map_err(WorkflowError::FillFailed)
    }

    // ---- anomaly paging --------------------------------------------------

    pub fn reveal_anomalies(&mut self) -> usize {
        self.session.anomalies.reveal()
    }

    /// Per-row anomaly scores, fetched on demand rather than as part of the
    /// check pass.
    pub async fn anomaly_scores(&self) -> Result<Vec<AnomalyScore>> {
        self.service
            .anomaly_scores()
            .await
            .map_err(WorkflowError::CheckFailed)
    }
}
