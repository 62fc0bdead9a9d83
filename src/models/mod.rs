// detector-hub Data Models
// Wire types shared by the fan-out engine and the api surface

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on submitted text, counted in Unicode scalars.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Scores strictly above this are labelled `ai`.
pub const AI_LABEL_THRESHOLD: f64 = 0.5;

// ============ Detection Request ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
    pub text: String,
    #[serde(default)]
    pub detectors: Option<Vec<String>>,
}

// ============ Detector Result ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Ai,
    Human,
}

impl Label {
    pub fn from_score(score: f64) -> Self {
        if score > AI_LABEL_THRESHOLD {
            Label::Ai
        } else {
            Label::Human
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Ai => "ai",
            Label::Human => "human",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome of one detector for one text.
///
/// Either `score`/`label`/`details` are set (success) or `error` is set
/// (failure), never both. Build values through [`DetectorResult::success`]
/// and [`DetectorResult::failure`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorResult {
    pub detector: String,
    pub score: Option<f64>,
    pub label: Option<Label>,
    pub details: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl DetectorResult {
    /// Successful verdict. The score is rounded to 4 decimals and the label
    /// is derived from the rounded value.
    pub fn success(
        detector: impl Into<String>,
        score: f64,
        details: Option<serde_json::Value>,
    ) -> Self {
        let score = round_score(score);
        Self {
            detector: detector.into(),
            score: Some(score),
            label: Some(Label::from_score(score)),
            details,
            error: None,
        }
    }

    pub fn failure(detector: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            detector: detector.into(),
            score: None,
            label: None,
            details: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

// ============ Detection Response ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub results: Vec<DetectorResult>,
    pub processing_time_ms: u64,
}

// ============ Registry Introspection ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorInfo {
    pub name: String,
    pub display_name: String,
    pub available: bool,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorListResponse {
    pub detectors: Vec<DetectorInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub detectors_available: usize,
    pub detectors_total: usize,
}
