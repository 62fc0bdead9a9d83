// Result Aggregator
// Wraps one fan-out batch in the response envelope with wall-clock timing

use std::time::Instant;
use tracing::info;

use crate::models::{DetectRequest, DetectResponse};
use crate::services::detectors::DetectorRegistry;
use crate::services::fanout::{dispatch, resolve, validate_text, DetectError};
use crate::services::transport::HttpTransport;

/// Validate, resolve, fan out and time one detection request.
///
/// Validation failures return before any provider is contacted. Once the
/// batch starts, the response always carries one result per resolved
/// detector.
pub async fn run_detection(
    registry: &DetectorRegistry,
    transport: &HttpTransport,
    request: &DetectRequest,
) -> Result<DetectResponse, DetectError> {
    validate_text(&request.text)?;
    let detectors = resolve(registry, request.detectors.as_deref())?;

    let batch_id = uuid::Uuid::new_v4();
    let names: Vec<&str> = detectors.iter().map(|d| d.name()).collect();
    info!(
        batch_id = %batch_id,
        detectors = ?names,
        text_chars = request.text.chars().count(),
        "[FANOUT] batch started"
    );

    let started = Instant::now();
    let results = dispatch(&detectors, transport, &request.text).await;
    let processing_time_ms = started.elapsed().as_millis() as u64;

    let failed = results.iter().filter(|r| !r.is_success()).count();
    info!(
        batch_id = %batch_id,
        total = results.len(),
        failed,
        processing_time_ms,
        "[FANOUT] batch finished"
    );

    Ok(DetectResponse {
        results,
        processing_time_ms,
    })
}
