// Detector Registry
// Named detector set, built once at startup and read-only afterwards

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::{CopyleaksDetector, Detector, GptZeroDetector, OriginalityDetector};
use crate::services::config_store::Settings;

#[derive(Default)]
pub struct DetectorRegistry {
    detectors: Vec<Arc<dyn Detector>>,
    index: HashMap<String, usize>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry with every built-in provider.
    ///
    /// This order is the default fan-out order when a request names no
    /// detectors.
    pub fn with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GptZeroDetector::new(settings.gptzero.clone())));
        registry.register(Arc::new(OriginalityDetector::new(settings.originality.clone())));
        registry.register(Arc::new(CopyleaksDetector::new(settings.copyleaks.clone())));
        registry
    }

    /// Register a detector under its name. Re-registering a name replaces the
    /// previous instance in place.
    pub fn register(&mut self, detector: Arc<dyn Detector>) {
        let name = detector.name().to_string();
        info!(
            name = %name,
            available = detector.is_available(),
            "Registered detector"
        );

        match self.index.get(&name) {
            Some(&slot) => self.detectors[slot] = detector,
            None => {
                self.index.insert(name, self.detectors.len());
                self.detectors.push(detector);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Detector>> {
        self.index.get(name).map(|&slot| self.detectors[slot].clone())
    }

    /// Detectors whose credentials are configured, in registration order.
    pub fn get_available(&self) -> Vec<Arc<dyn Detector>> {
        self.detectors
            .iter()
            .filter(|d| d.is_available())
            .cloned()
            .collect()
    }

    /// Every registered detector, in registration order.
    pub fn get_all(&self) -> Vec<Arc<dyn Detector>> {
        self.detectors.clone()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}
