// Application surface
// Entry points a hosting layer (HTTP server, CLI) calls into

use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{
    DetectRequest, DetectResponse, DetectorInfo, DetectorListResponse, HealthResponse,
};
use crate::services::{run_detection, DetectError, DetectorRegistry, HttpTransport, Settings};

/// Process-wide state: the detector registry and the shared transport.
///
/// Built once at startup. Cloning is cheap and every clone shares the same
/// detectors and connection pool.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<DetectorRegistry>,
    transport: HttpTransport,
}

impl AppState {
    pub fn new(registry: DetectorRegistry, transport: HttpTransport) -> Self {
        Self {
            registry: Arc::new(registry),
            transport,
        }
    }

    /// Build the default registry and transport from resolved settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let transport = match settings.proxy.as_deref() {
            Some(proxy) => HttpTransport::with_proxy(proxy).unwrap_or_else(|e| {
                warn!(error = %e, "Invalid proxy, falling back to direct connections");
                HttpTransport::new()
            }),
            None => HttpTransport::new(),
        };

        let registry = DetectorRegistry::with_defaults(settings);
        info!(
            available = registry.get_available().len(),
            total = registry.len(),
            "Detector registry initialized"
        );

        Self::new(registry, transport)
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }

    pub async fn detect_text(&self, request: DetectRequest) -> Result<DetectResponse, DetectError> {
        run_detection(&self.registry, &self.transport, &request)
            .await
            .inspect_err(|e| warn!(error = %e, "Detect request rejected"))
    }

    pub fn list_detectors(&self) -> DetectorListResponse {
        let detectors = self
            .registry
            .get_all()
            .iter()
            .map(|d| DetectorInfo {
                name: d.name().to_string(),
                display_name: d.display_name().to_string(),
                available: d.is_available(),
                description: d.description().to_string(),
            })
            .collect();
        DetectorListResponse { detectors }
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            detectors_available: self.registry.get_available().len(),
            detectors_total: self.registry.len(),
        }
    }
}
