// GPTZero Detector

use async_trait::async_trait;
use serde_json::json;

use super::{into_result, probability_at, Detector, ProviderError, Verdict};
use crate::models::DetectorResult;
use crate::services::config_store::{ProviderSettings, GPTZERO};
use crate::services::transport::HttpTransport;

pub const GPTZERO_API_URL: &str = "https://api.gptzero.me/v2/predict/text";

pub struct GptZeroDetector {
    settings: ProviderSettings,
}

impl GptZeroDetector {
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }

    fn url(&self) -> &str {
        self.settings.base_url.as_deref().unwrap_or(GPTZERO_API_URL)
    }

    async fn predict(&self, transport: &HttpTransport, text: &str) -> Result<Verdict, ProviderError> {
        let data = transport
            .post_json(
                self.url(),
                &[
                    ("x-api-key", self.settings.api_key.clone()),
                    ("Content-Type", "application/json".to_string()),
                ],
                &json!({ "document": text }),
                self.settings.timeout(),
            )
            .await?;

        let score = probability_at(&data, "/documents/0/completely_generated_prob")?;
        let class_probabilities = data
            .pointer("/documents/0/class_probabilities")
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        Verdict::new(
            score,
            json!({
                "completely_generated_prob": score,
                "class_probabilities": class_probabilities,
            }),
        )
    }
}

#[async_trait]
impl Detector for GptZeroDetector {
    fn name(&self) -> &str {
        GPTZERO
    }

    fn display_name(&self) -> &str {
        "GPTZero"
    }

    fn description(&self) -> &str {
        "GPTZero AI content detector"
    }

    fn is_available(&self) -> bool {
        !self.settings.api_key.is_empty()
    }

    async fn detect(&self, transport: &HttpTransport, text: &str) -> DetectorResult {
        let outcome = self.predict(transport, text).await;
        into_result(GPTZERO, "GPTZero", outcome)
    }
}
