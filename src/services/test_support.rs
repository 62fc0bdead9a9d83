// Scripted detectors for service tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::models::DetectorResult;
use crate::services::detectors::{Detector, DetectorRegistry};
use crate::services::transport::HttpTransport;

pub(crate) enum Behavior {
    Score(f64),
    Fail(&'static str),
    Panic(&'static str),
    /// Sleep for the given milliseconds, then score.
    Sleep(u64, f64),
}

pub(crate) struct ScriptedDetector {
    name: &'static str,
    display: &'static str,
    available: bool,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(name: &'static str, available: bool, behavior: Behavior) -> Arc<Self> {
        Self::named(name, name, available, behavior)
    }

    pub fn named(
        name: &'static str,
        display: &'static str,
        available: bool,
        behavior: Behavior,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            display,
            available,
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    fn name(&self) -> &str {
        self.name
    }

    fn display_name(&self) -> &str {
        self.display
    }

    fn description(&self) -> &str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn detect(&self, _transport: &HttpTransport, _text: &str) -> DetectorResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Score(score) => DetectorResult::success(self.name, score, None),
            Behavior::Fail(msg) => DetectorResult::failure(self.name, msg),
            Behavior::Panic(msg) => panic!("{}", msg),
            Behavior::Sleep(ms, score) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                DetectorResult::success(self.name, score, None)
            }
        }
    }
}

pub(crate) fn registry_of(detectors: &[Arc<ScriptedDetector>]) -> DetectorRegistry {
    let mut registry = DetectorRegistry::new();
    for d in detectors {
        registry.register(d.clone());
    }
    registry
}

pub(crate) fn names(detectors: &[Arc<dyn Detector>]) -> Vec<String> {
    detectors.iter().map(|d| d.name().to_string()).collect()
}
