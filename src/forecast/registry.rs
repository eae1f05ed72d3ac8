//! Shared registry of fitted predictors.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::Predictor;

/// Holds the fitted predictor for each dispenser, keyed by dispenser ID.
///
/// Read concurrently by forecast resolution and written by completed
/// training jobs. An install replaces the whole entry under the write lock,
/// so a reader never observes a partially constructed model.
#[derive(Default)]
pub struct ForecasterRegistry {
    models: RwLock<HashMap<u32, Arc<dyn Predictor>>>,
}

impl ForecasterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a fitted predictor exists for the dispenser.
    pub fn has_model(&self, dispenser_id: u32) -> bool {
        self.models
            .read()
            .map(|m| m.contains_key(&dispenser_id))
            .unwrap_or(false)
    }

    /// The fitted predictor for a dispenser, if any.
    pub fn get(&self, dispenser_id: u32) -> Option<Arc<dyn Predictor>> {
        self.models.read().ok()?.get(&dispenser_id).cloned()
    }

    /// Atomically installs (or replaces) the predictor for a dispenser.
    pub fn install(&self, dispenser_id: u32, predictor: Arc<dyn Predictor>) {
        if let Ok(mut models) = self.models.write() {
            models.insert(dispenser_id, predictor);
        }
    }

    /// Removes the predictor for a dispenser, returning it if present.
    pub fn remove(&self, dispenser_id: u32) -> Option<Arc<dyn Predictor>> {
        self.models.write().ok()?.remove(&dispenser_id)
    }

    /// IDs of all dispensers that currently have a fitted predictor.
    pub fn modeled_ids(&self) -> Vec<u32> {
        self.models
            .read()
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Number of fitted predictors.
    pub fn len(&self) -> usize {
        self.models.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if no predictor is installed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::PredictError;

    struct Flat(f64);

    impl Predictor for Flat {
        fn name(&self) -> &str {
            "flat"
        }
        fn predict(&self, steps: usize, _: Option<&[f64]>) -> Result<Vec<f64>, PredictError> {
            Ok(vec![self.0; steps])
        }
    }

    #[test]
    fn test_install_and_get() {
        let reg = ForecasterRegistry::new();
        assert!(reg.is_empty());
        assert!(!reg.has_model(1));

        reg.install(1, Arc::new(Flat(100.0)));
        assert!(reg.has_model(1));
        assert_eq!(reg.len(), 1);

        let p = reg.get(1).expect("installed");
        assert_eq!(p.predict(1, None).expect("ok"), vec![100.0]);
    }

    #[test]
    fn test_install_replaces() {
        let reg = ForecasterRegistry::new();
        reg.install(1, Arc::new(Flat(100.0)));
        reg.install(1, Arc::new(Flat(200.0)));
        assert_eq!(reg.len(), 1);
        let p = reg.get(1).expect("installed");
        assert_eq!(p.predict(1, None).expect("ok"), vec![200.0]);
    }

    #[test]
    fn test_remove() {
        let reg = ForecasterRegistry::new();
        reg.install(3, Arc::new(Flat(1.0)));
        assert!(reg.remove(3).is_some());
        assert!(!reg.has_model(3));
        assert!(reg.remove(3).is_none());
    }

    #[test]
    fn test_modeled_ids() {
        let reg = ForecasterRegistry::new();
        reg.install(2, Arc::new(Flat(1.0)));
        reg.install(5, Arc::new(Flat(1.0)));
        let mut ids = reg.modeled_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![2, 5]);
    }
}
