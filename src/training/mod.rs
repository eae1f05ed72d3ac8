//! Background model training: the bounded worker pool, per-model job
//! outcomes, persistence retry, and the profile ledger behind staleness
//! checks.

mod job;
mod ledger;
mod retry;
mod trainer;

pub use job::{JobStatus, ModelMetrics, ModelOutcome, TrainingJob};
pub use ledger::{LedgerEntry, ProfileLedger};
pub use retry::retry_with_backoff;
pub use trainer::{
    ArtifactStore, FittedModel, ModelFitter, StoreError, TrainError, Trainer, DEFAULT_WORKERS,
    MIN_TRAINING_DAYS,
};
