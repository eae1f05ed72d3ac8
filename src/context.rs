//! Process-wide wiring of the planning core.

use std::sync::Arc;

use chrono::NaiveDate;
use rand::Rng;

use crate::forecast::ForecasterRegistry;
use crate::models::{Dispenser, NetworkSnapshot, Transaction};
use crate::planning::{plan_cycle, PlanError, PlanningRequest, PlanningResponse};
use crate::training::{ArtifactStore, ModelFitter, ProfileLedger, Trainer, TrainingJob};

/// Owns the long-lived pieces of the planning core: the model registry, the
/// training worker pool, and the profile ledger.
///
/// One context per process, passed explicitly to whatever embeds the core.
/// Dropping it shuts the worker pool down.
///
/// # Examples
///
/// ```
/// use cash_replen::context::PlanningContext;
///
/// let ctx = PlanningContext::new(vec![], 2);
/// assert!(ctx.registry().is_empty());
/// ```
pub struct PlanningContext {
    registry: Arc<ForecasterRegistry>,
    ledger: Arc<ProfileLedger>,
    trainer: Trainer,
}

impl PlanningContext {
    /// Creates a context with the given model fitters and worker count.
    pub fn new(fitters: Vec<Arc<dyn ModelFitter>>, num_workers: usize) -> Self {
        let registry = Arc::new(ForecasterRegistry::new());
        let ledger = Arc::new(ProfileLedger::new());
        let trainer = Trainer::new(
            fitters,
            Arc::clone(&registry) as Arc<dyn ArtifactStore>,
            Arc::clone(&ledger),
            num_workers,
        );
        Self {
            registry,
            ledger,
            trainer,
        }
    }

    /// The shared registry of fitted predictors.
    pub fn registry(&self) -> &ForecasterRegistry {
        &self.registry
    }

    /// The training ledger used for staleness checks.
    pub fn ledger(&self) -> &ProfileLedger {
        &self.ledger
    }

    /// The background trainer.
    pub fn trainer(&self) -> &Trainer {
        &self.trainer
    }

    /// Runs one planning cycle against a snapshot.
    pub fn plan<R: Rng>(
        &self,
        snapshot: &NetworkSnapshot,
        request: &PlanningRequest,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<PlanningResponse, PlanError> {
        plan_cycle(snapshot, &self.registry, request, today, rng)
    }

    /// Queues model training for a dispenser.
    pub fn train(&self, dispenser: &Dispenser, transactions: &[Transaction]) -> TrainingJob {
        self.trainer.submit(dispenser, transactions)
    }
}
