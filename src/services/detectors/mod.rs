// Detector Backends
// One implementation per external AI-content-detection provider:
// - gptzero: GPTZero predict API
// - originality: Originality.ai scan API
// - copyleaks: Copyleaks writer detector (login, then scan)
// - registry: named detector set built at startup

pub mod copyleaks;
pub mod gptzero;
pub mod originality;
pub mod registry;

pub use copyleaks::CopyleaksDetector;
pub use gptzero::GptZeroDetector;
pub use originality::OriginalityDetector;
pub use registry::DetectorRegistry;

use async_trait::async_trait;
use thiserror::Error;
use tracing::error;

use crate::models::DetectorResult;
use crate::services::transport::{HttpTransport, TransportError};

/// A pluggable AI-content detector.
///
/// Implementations are built once from settings and shared read-only across
/// requests. `detect` must not panic on provider failures; every failure is
/// reported through the returned [`DetectorResult`].
#[async_trait]
pub trait Detector: Send + Sync {
    /// Stable machine identifier, unique within a registry.
    fn name(&self) -> &str;

    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    /// Cheap check against static configuration. Never performs I/O.
    fn is_available(&self) -> bool;

    async fn detect(&self, transport: &HttpTransport, text: &str) -> DetectorResult;
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("missing field `{0}` in response")]
    MissingField(&'static str),
    #[error("malformed field `{0}` in response")]
    Malformed(&'static str),
    #[error("score {0} is outside [0, 1]")]
    ScoreOutOfRange(f64),
    #[error("{0}")]
    Config(String),
}

impl ProviderError {
    /// Status code when the provider answered with a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

/// Successful provider call: raw probability plus provider-specific details.
pub(crate) struct Verdict {
    pub score: f64,
    pub details: serde_json::Value,
}

impl Verdict {
    pub fn new(score: f64, details: serde_json::Value) -> Result<Self, ProviderError> {
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(ProviderError::ScoreOutOfRange(score));
        }
        Ok(Self { score, details })
    }
}

/// Convert a provider call outcome into the uniform result record.
///
/// Non-2xx answers become `"<Provider> API returned <status>"`, configuration
/// problems `"<Provider> configuration error: ..."`, and everything else
/// `"<Provider> detection failed: ..."`.
pub(crate) fn into_result(
    name: &str,
    provider: &str,
    outcome: Result<Verdict, ProviderError>,
) -> DetectorResult {
    match outcome {
        Ok(verdict) => DetectorResult::success(name, verdict.score, Some(verdict.details)),
        Err(ProviderError::Config(message)) => {
            error!(detector = name, error = %message, "{} misconfigured", provider);
            DetectorResult::failure(name, format!("{} configuration error: {}", provider, message))
        }
        Err(e) => match e.status() {
            Some(status) => {
                error!(detector = name, status, error = ?e, "{} API error", provider);
                DetectorResult::failure(name, format!("{} API returned {}", provider, status))
            }
            None => {
                error!(detector = name, error = %e, "{} detection failed", provider);
                DetectorResult::failure(name, format!("{} detection failed: {}", provider, e))
            }
        },
    }
}

/// Read a probability from a JSON pointer inside a provider payload.
pub(crate) fn probability_at(
    data: &serde_json::Value,
    pointer: &'static str,
) -> Result<f64, ProviderError> {
    data.pointer(pointer)
        .and_then(|v| v.as_f64())
        .ok_or(ProviderError::MissingField(pointer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_error_message() {
        let outcome = Err(ProviderError::Transport(TransportError::Status {
            status: 429,
            body: String::new(),
        }));
        let result = into_result("gptzero", "GPTZero", outcome);
        assert_eq!(result.error.as_deref(), Some("GPTZero API returned 429"));
        assert!(result.score.is_none());
    }

    #[test]
    fn test_status_only_for_non_2xx_answers() {
        let rejected = ProviderError::Transport(TransportError::Status {
            status: 503,
            body: "busy".to_string(),
        });
        assert_eq!(rejected.status(), Some(503));
        assert_eq!(ProviderError::MissingField("/score/ai").status(), None);
        assert_eq!(
            ProviderError::Transport(TransportError::Json("eof".to_string())).status(),
            None
        );
    }

    #[test]
    fn test_generic_error_message() {
        let outcome = Err(ProviderError::MissingField("/score/ai"));
        let result = into_result("originality", "Originality", outcome);
        assert_eq!(
            result.error.as_deref(),
            Some("Originality detection failed: missing field `/score/ai` in response")
        );
    }

    #[test]
    fn test_malformed_field_message() {
        let outcome = Err(ProviderError::Malformed("summary"));
        let result = into_result("copyleaks", "Copyleaks", outcome);
        assert_eq!(
            result.error.as_deref(),
            Some("Copyleaks detection failed: malformed field `summary` in response")
        );
    }

    #[test]
    fn test_verdict_rejects_out_of_range() {
        assert!(matches!(
            Verdict::new(1.5, json!({})),
            Err(ProviderError::ScoreOutOfRange(_))
        ));
        assert!(Verdict::new(f64::NAN, json!({})).is_err());
        assert!(Verdict::new(0.0, json!({})).is_ok());
        assert!(Verdict::new(1.0, json!({})).is_ok());
    }

    #[test]
    fn test_probability_at() {
        let data = json!({"documents": [{"completely_generated_prob": 0.42}]});
        assert_eq!(
            probability_at(&data, "/documents/0/completely_generated_prob").unwrap(),
            0.42
        );
        assert!(probability_at(&data, "/documents/1/completely_generated_prob").is_err());
    }
}
