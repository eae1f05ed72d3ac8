//! The opaque predictor contract and ensemble combination.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

/// Why a predictor could not produce a forecast.
#[derive(Debug, Error)]
pub enum PredictError {
    /// A windowed method was given less history than its window requires.
    #[error("predictor needs {needed} recent points, only {available} available")]
    WindowUnsatisfied {
        /// Window length the method requires.
        needed: usize,
        /// History points actually supplied.
        available: usize,
    },
    /// The underlying method failed.
    #[error("prediction failed: {0}")]
    Failed(String),
    /// No ensemble member produced a usable prediction.
    #[error("all ensemble members failed")]
    AllMembersFailed,
}

/// A fitted forecasting model, treated as opaque by the core.
///
/// Window-based methods report their required history length via
/// [`window`](Predictor::window) and receive it through `recent_history`;
/// non-windowed methods ignore the argument.
pub trait Predictor: Send + Sync {
    /// Algorithm name, used as the artifact key and in job results.
    fn name(&self) -> &str;

    /// Required recent-history length, or `None` for non-windowed methods.
    fn window(&self) -> Option<usize> {
        None
    }

    /// Produces `steps` per-day demand predictions.
    fn predict(&self, steps: usize, recent_history: Option<&[f64]>) -> Result<Vec<f64>, PredictError>;
}

/// Combines several fitted predictors by weighted summation.
///
/// Members that error are skipped; if every member fails the ensemble fails.
/// Output is clamped to non-negative values.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cash_replen::forecast::{EnsemblePredictor, PredictError, Predictor};
///
/// struct Flat(f64);
/// impl Predictor for Flat {
///     fn name(&self) -> &str { "flat" }
///     fn predict(&self, steps: usize, _: Option<&[f64]>) -> Result<Vec<f64>, PredictError> {
///         Ok(vec![self.0; steps])
///     }
/// }
///
/// let ens = EnsemblePredictor::new(vec![Arc::new(Flat(100.0)), Arc::new(Flat(200.0))]);
/// let out = ens.predict(3, None).unwrap();
/// assert_eq!(out, vec![150.0, 150.0, 150.0]); // equal weights
/// ```
pub struct EnsemblePredictor {
    members: Vec<Arc<dyn Predictor>>,
    weights: Vec<f64>,
}

impl EnsemblePredictor {
    /// Creates an ensemble with equal member weights.
    pub fn new(members: Vec<Arc<dyn Predictor>>) -> Self {
        let n = members.len().max(1);
        let weights = vec![1.0 / n as f64; members.len()];
        Self { members, weights }
    }

    /// Creates an ensemble with explicit weights.
    ///
    /// Returns `None` if the weight count doesn't match the member count.
    pub fn with_weights(members: Vec<Arc<dyn Predictor>>, weights: Vec<f64>) -> Option<Self> {
        if members.len() != weights.len() {
            return None;
        }
        Some(Self { members, weights })
    }

    /// Number of member predictors.
    pub fn num_members(&self) -> usize {
        self.members.len()
    }
}

impl Predictor for EnsemblePredictor {
    fn name(&self) -> &str {
        "ensemble"
    }

    /// The largest window any member requires, so callers can supply enough
    /// history for every windowed member.
    fn window(&self) -> Option<usize> {
        self.members.iter().filter_map(|m| m.window()).max()
    }

    fn predict(&self, steps: usize, recent_history: Option<&[f64]>) -> Result<Vec<f64>, PredictError> {
        let mut combined = vec![0.0; steps];
        let mut any = false;

        for (member, &weight) in self.members.iter().zip(&self.weights) {
            match member.predict(steps, recent_history) {
                Ok(values) if values.len() == steps => {
                    for (acc, v) in combined.iter_mut().zip(&values) {
                        *acc += v * weight;
                    }
                    any = true;
                }
                Ok(values) => {
                    warn!(member = member.name(), got = values.len(), want = steps,
                        "ensemble member returned wrong horizon, skipping");
                }
                Err(err) => {
                    warn!(member = member.name(), %err, "ensemble member failed, skipping");
                }
            }
        }

        if !any {
            return Err(PredictError::AllMembersFailed);
        }
        Ok(combined.into_iter().map(|v| v.max(0.0)).collect())
    }
}
