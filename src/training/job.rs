//! Training job state as observed by API callers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of a training job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, waiting for a worker.
    Queued,
    /// A worker is fitting models.
    Running,
    /// At least one model was fitted and installed.
    Completed,
    /// No model could be produced.
    Failed,
}

/// Holdout accuracy of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelMetrics {
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute percentage error.
    pub mape: f64,
    /// Coefficient of determination.
    pub r2: f64,
}

/// Per-model result inside a job: metrics on success, the error otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelOutcome {
    /// The model was fitted.
    Trained {
        /// Holdout accuracy.
        metrics: ModelMetrics,
    },
    /// Fitting failed.
    Failed {
        /// What went wrong.
        error: String,
    },
}

/// Snapshot of one dispenser's training job.
///
/// Progress is monotone: late, out-of-order updates can never move it
/// backwards.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingJob {
    dispenser_id: u32,
    models: Vec<String>,
    status: JobStatus,
    progress: u8,
    message: String,
    outcomes: BTreeMap<String, ModelOutcome>,
    requested_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl TrainingJob {
    /// Creates a freshly queued job for the given model set.
    pub fn new(dispenser_id: u32, models: Vec<String>) -> Self {
        Self {
            dispenser_id,
            models,
            status: JobStatus::Queued,
            progress: 0,
            message: "queued".to_string(),
            outcomes: BTreeMap::new(),
            requested_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Dispenser this job trains models for.
    pub fn dispenser_id(&self) -> u32 {
        self.dispenser_id
    }

    /// Names of the models this job was asked to fit.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Current lifecycle state.
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Progress in percent, 0 through 100.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Human-readable stage description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Per-model outcomes, keyed by model name.
    pub fn outcomes(&self) -> &BTreeMap<String, ModelOutcome> {
        &self.outcomes
    }

    /// When the job was accepted.
    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    /// When a worker picked the job up, if it has.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns `true` while the job is queued or running.
    pub fn is_active(&self) -> bool {
        matches!(self.status, JobStatus::Queued | JobStatus::Running)
    }

    /// Wall-clock seconds from start to completion, once both are known.
    pub fn duration_seconds(&self) -> Option<f64> {
        let started = self.started_at?;
        let completed = self.completed_at?;
        Some((completed - started).num_milliseconds() as f64 / 1000.0)
    }

    pub(crate) fn mark_running(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
        self.message = message.into();
    }

    /// Raises progress, never lowers it, and caps it at 100.
    pub(crate) fn set_progress(&mut self, progress: u8) {
        self.progress = self.progress.max(progress.min(100));
    }

    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub(crate) fn record_outcome(&mut self, model: impl Into<String>, outcome: ModelOutcome) {
        self.outcomes.insert(model.into(), outcome);
    }

    pub(crate) fn mark_completed(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.message = message.into();
        self.completed_at = Some(Utc::now());
    }

    pub(crate) fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.message = message.into();
        self.completed_at = Some(Utc::now());
    }
}
