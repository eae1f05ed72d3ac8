//! Demand forecasting: the predictor contract, the shared registry of
//! fitted models, and the resolution cascade that always yields an estimate.

mod predictor;
mod registry;
mod resolver;

pub use predictor::{EnsemblePredictor, PredictError, Predictor};
pub use registry::ForecasterRegistry;
pub use resolver::ForecastResolver;
