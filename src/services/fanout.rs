// Fan-Out Dispatcher
// Resolves a detector selection against the registry and runs every resolved
// detector concurrently, one tokio task each, joined as a barrier.

use futures::future::join_all;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::models::{DetectorResult, MAX_TEXT_CHARS};
use crate::services::detectors::{Detector, DetectorRegistry};
use crate::services::transport::HttpTransport;

/// Request-level rejection. Raised before any detector is invoked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    #[error("Text must not be empty")]
    EmptyText,
    #[error("Text is too long: {actual} characters (maximum {max})")]
    TextTooLong { actual: usize, max: usize },
    #[error("Unknown detector: {0}")]
    UnknownDetector(String),
    #[error("Detector not available (API key not configured): {0}")]
    DetectorUnavailable(String),
    #[error("No detectors available. Configure at least one detector API key (GPTZERO_API_KEY, ORIGINALITY_API_KEY or COPYLEAKS_API_KEY).")]
    NoDetectorsAvailable,
}

impl DetectError {
    /// HTTP status a hosting framework should answer with.
    pub fn status_code(&self) -> u16 {
        400
    }
}

pub fn validate_text(text: &str) -> Result<(), DetectError> {
    if text.is_empty() {
        return Err(DetectError::EmptyText);
    }
    let actual = text.chars().count();
    if actual > MAX_TEXT_CHARS {
        return Err(DetectError::TextTooLong {
            actual,
            max: MAX_TEXT_CHARS,
        });
    }
    Ok(())
}

/// Turn a caller selection into the ordered detector list for one batch.
///
/// `None` or an empty list selects every available detector in registry
/// order. Otherwise every name must be registered and available; repeated
/// names keep their first position.
pub fn resolve(
    registry: &DetectorRegistry,
    selection: Option<&[String]>,
) -> Result<Vec<Arc<dyn Detector>>, DetectError> {
    let resolved = match selection {
        Some(names) if !names.is_empty() => {
            let mut resolved: Vec<Arc<dyn Detector>> = Vec::with_capacity(names.len());
            for name in names {
                let detector = registry
                    .get(name)
                    .ok_or_else(|| DetectError::UnknownDetector(name.clone()))?;
                if !detector.is_available() {
                    return Err(DetectError::DetectorUnavailable(name.clone()));
                }
                if resolved.iter().any(|d| d.name() == detector.name()) {
                    continue;
                }
                resolved.push(detector);
            }
            resolved
        }
        _ => registry.get_available(),
    };

    if resolved.is_empty() {
        return Err(DetectError::NoDetectorsAvailable);
    }
    Ok(resolved)
}

/// Run every detector against `text` and return one result per detector,
/// index-aligned with `detectors`.
///
/// All calls start together and the function returns once the last one
/// settles. A task that panics still yields a failure result at its slot.
pub async fn dispatch(
    detectors: &[Arc<dyn Detector>],
    transport: &HttpTransport,
    text: &str,
) -> Vec<DetectorResult> {
    let text: Arc<str> = Arc::from(text);

    let handles: Vec<_> = detectors
        .iter()
        .map(|detector| {
            let detector = Arc::clone(detector);
            let transport = transport.clone();
            let text = Arc::clone(&text);
            tokio::spawn(async move { detector.detect(&transport, &text).await })
        })
        .collect();

    let joined = join_all(handles).await;

    detectors
        .iter()
        .zip(joined)
        .map(|(detector, outcome)| match outcome {
            Ok(result) => {
                match (result.score, result.label) {
                    (Some(score), Some(label)) => {
                        info!(
                            detector = detector.name(),
                            score,
                            label = label.as_str(),
                            "detector.ok"
                        )
                    }
                    _ => warn!(detector = detector.name(), error = ?result.error, "detector.failed"),
                }
                result
            }
            Err(e) => {
                let message = join_error_message(e);
                warn!(detector = detector.name(), error = %message, "detector.faulted");
                DetectorResult::failure(detector.name(), format!("Unexpected error: {}", message))
            }
        })
        .collect()
}

fn join_error_message(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        err.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "detector task panicked".to_string()
    }
}
