//! Background model training over a bounded worker pool.
//!
//! Jobs are queued on an mpsc channel and drained by a fixed set of worker
//! threads, so a burst of training requests can never exhaust the process.
//! The job table and the one-active-job-per-dispenser rule live under a
//! single mutex: duplicate submissions observe the existing job instead of
//! spawning a second one.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::forecast::{EnsemblePredictor, ForecasterRegistry, Predictor};
use crate::models::{daily_series, Dispenser, ProfileFingerprint, Transaction};

use super::job::{ModelMetrics, ModelOutcome, TrainingJob};
use super::ledger::ProfileLedger;
use super::retry::retry_with_backoff;

/// Minimum distinct days of history a dispenser needs before training.
pub const MIN_TRAINING_DAYS: usize = 7;

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 2;

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

/// Why a model could not be fitted.
#[derive(Debug, Error)]
pub enum TrainError {
    /// The dispenser's history is too short to train on.
    #[error("need at least {need} days of history, have {have}")]
    InsufficientData {
        /// Distinct days available.
        have: usize,
        /// Days required.
        need: usize,
    },
    /// The fitting procedure itself failed.
    #[error("fitting failed: {0}")]
    Fit(String),
}

/// A fitted model plus its holdout accuracy.
pub struct FittedModel {
    /// The predictor ready for installation.
    pub predictor: Arc<dyn Predictor>,
    /// Accuracy on held-out history.
    pub metrics: ModelMetrics,
}

/// Fits one model family to a daily demand series.
pub trait ModelFitter: Send + Sync {
    /// Model family name, used as the outcome key in job snapshots.
    fn name(&self) -> &str;

    /// Fits the model to the series (oldest day first).
    fn fit(&self, series: &[f64]) -> Result<FittedModel, TrainError>;
}

/// A persistence write of fitted models failed.
#[derive(Debug, Error)]
#[error("artifact store write failed: {0}")]
pub struct StoreError(pub String);

/// Where completed training runs persist their predictor.
pub trait ArtifactStore: Send + Sync {
    /// Installs the predictor for a dispenser, replacing any existing one.
    fn install(&self, dispenser_id: u32, predictor: Arc<dyn Predictor>) -> Result<(), StoreError>;
}

/// The in-process registry is the default artifact store and cannot fail.
impl ArtifactStore for ForecasterRegistry {
    fn install(&self, dispenser_id: u32, predictor: Arc<dyn Predictor>) -> Result<(), StoreError> {
        ForecasterRegistry::install(self, dispenser_id, predictor);
        Ok(())
    }
}

struct WorkItem {
    dispenser_id: u32,
    fingerprint: ProfileFingerprint,
    series: Vec<f64>,
}

/// Accepts training requests and runs them on the worker pool.
///
/// Dropping the trainer closes the queue and joins the workers; queued jobs
/// finish first.
pub struct Trainer {
    jobs: Arc<Mutex<HashMap<u32, TrainingJob>>>,
    queue: Option<Sender<WorkItem>>,
    workers: Vec<thread::JoinHandle<()>>,
    model_names: Vec<String>,
}

// A poisoned lock only means another worker panicked mid-update; the job
// table itself is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn with_job(jobs: &Mutex<HashMap<u32, TrainingJob>>, id: u32, f: impl FnOnce(&mut TrainingJob)) {
    let mut guard = lock(jobs);
    if let Some(job) = guard.get_mut(&id) {
        f(job);
    }
}

impl Trainer {
    /// Creates a trainer running `num_workers` threads (at least one).
    pub fn new(
        fitters: Vec<Arc<dyn ModelFitter>>,
        store: Arc<dyn ArtifactStore>,
        ledger: Arc<ProfileLedger>,
        num_workers: usize,
    ) -> Self {
        let model_names = fitters.iter().map(|f| f.name().to_string()).collect();
        let (tx, rx) = mpsc::channel::<WorkItem>();
        let rx = Arc::new(Mutex::new(rx));
        let jobs: Arc<Mutex<HashMap<u32, TrainingJob>>> = Arc::new(Mutex::new(HashMap::new()));

        let workers = (0..num_workers.max(1))
            .map(|_| {
                let rx = Arc::clone(&rx);
                let jobs = Arc::clone(&jobs);
                let fitters = fitters.clone();
                let store = Arc::clone(&store);
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || worker_loop(&rx, &jobs, &fitters, &store, &ledger))
            })
            .collect();

        Self {
            jobs,
            queue: Some(tx),
            workers,
            model_names,
        }
    }

    /// Requests training for a dispenser.
    ///
    /// If a job for this dispenser is already queued or running, that job's
    /// snapshot is returned instead of starting another. A finished job
    /// (completed or failed) can be superseded by a new submission.
    pub fn submit(&self, dispenser: &Dispenser, transactions: &[Transaction]) -> TrainingJob {
        let id = dispenser.id();
        let job = {
            let mut jobs = lock(&self.jobs);
            if let Some(existing) = jobs.get(&id) {
                if existing.is_active() {
                    info!(dispenser = id, "training already in progress");
                    return existing.clone();
                }
            }
            let job = TrainingJob::new(id, self.model_names.clone());
            jobs.insert(id, job.clone());
            job
        };

        let item = WorkItem {
            dispenser_id: id,
            fingerprint: dispenser.fingerprint(),
            series: daily_series(transactions),
        };

        let sent = self
            .queue
            .as_ref()
            .is_some_and(|queue| queue.send(item).is_ok());
        if !sent {
            with_job(&self.jobs, id, |j| j.mark_failed("worker pool shut down"));
            return self.job(id).unwrap_or(job);
        }
        job
    }

    /// Snapshot of a dispenser's most recent job.
    pub fn job(&self, dispenser_id: u32) -> Option<TrainingJob> {
        lock(&self.jobs).get(&dispenser_id).cloned()
    }

    /// Snapshots of all known jobs, ordered by dispenser ID.
    pub fn jobs(&self) -> Vec<TrainingJob> {
        let mut all: Vec<TrainingJob> = lock(&self.jobs).values().cloned().collect();
        all.sort_by_key(TrainingJob::dispenser_id);
        all
    }
}

impl Drop for Trainer {
    fn drop(&mut self) {
        // Closing the channel lets each worker drain and exit.
        self.queue.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(
    rx: &Mutex<Receiver<WorkItem>>,
    jobs: &Mutex<HashMap<u32, TrainingJob>>,
    fitters: &[Arc<dyn ModelFitter>],
    store: &Arc<dyn ArtifactStore>,
    ledger: &ProfileLedger,
) {
    loop {
        let item = {
            let guard = lock(rx);
            guard.recv()
        };
        let Ok(item) = item else { break };
        run_job(&item, jobs, fitters, store.as_ref(), ledger);
    }
}

fn run_job(
    item: &WorkItem,
    jobs: &Mutex<HashMap<u32, TrainingJob>>,
    fitters: &[Arc<dyn ModelFitter>],
    store: &dyn ArtifactStore,
    ledger: &ProfileLedger,
) {
    let id = item.dispenser_id;
    with_job(jobs, id, |j| {
        j.mark_running("validating history");
        j.set_progress(5);
    });

    if item.series.len() < MIN_TRAINING_DAYS {
        let err = TrainError::InsufficientData {
            have: item.series.len(),
            need: MIN_TRAINING_DAYS,
        };
        warn!(dispenser = id, %err, "training rejected");
        with_job(jobs, id, |j| j.mark_failed(err.to_string()));
        return;
    }

    let mut fitted: Vec<Arc<dyn Predictor>> = Vec::new();
    let mut last_error: Option<TrainError> = None;
    let total = fitters.len().max(1);

    for (i, fitter) in fitters.iter().enumerate() {
        let name = fitter.name().to_string();
        with_job(jobs, id, |j| j.set_message(format!("fitting {name}")));

        match fitter.fit(&item.series) {
            Ok(model) => {
                with_job(jobs, id, |j| {
                    j.record_outcome(&name, ModelOutcome::Trained { metrics: model.metrics })
                });
                fitted.push(model.predictor);
            }
            Err(err) => {
                warn!(dispenser = id, model = %name, %err, "model fit failed");
                with_job(jobs, id, |j| {
                    j.record_outcome(&name, ModelOutcome::Failed { error: err.to_string() })
                });
                last_error = Some(err);
            }
        }

        let progress = (5 + 90 * (i + 1) / total) as u8;
        with_job(jobs, id, |j| j.set_progress(progress));
    }

    if fitted.is_empty() {
        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no model fitters configured".to_string());
        with_job(jobs, id, |j| j.mark_failed(message));
        return;
    }

    let num_fitted = fitted.len();
    let predictor: Arc<dyn Predictor> = if num_fitted == 1 {
        fitted.remove(0)
    } else {
        Arc::new(EnsemblePredictor::new(fitted))
    };

    with_job(jobs, id, |j| j.set_message("installing fitted models"));
    let installed = retry_with_backoff(RETRY_ATTEMPTS, RETRY_BASE_DELAY, || {
        store.install(id, Arc::clone(&predictor))
    });

    match installed {
        Ok(()) => {
            ledger.record(id, item.fingerprint, Utc::now());
            info!(dispenser = id, models = num_fitted, "training completed");
            with_job(jobs, id, |j| {
                j.mark_completed(format!("{num_fitted} of {} models fitted", fitters.len()))
            });
        }
        Err(err) => {
            error!(dispenser = id, %err, "could not persist fitted models");
            with_job(jobs, id, |j| j.mark_failed(err.to_string()));
        }
    }
}
