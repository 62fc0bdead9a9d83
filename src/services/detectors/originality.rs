// Originality.ai Detector

use async_trait::async_trait;
use serde_json::json;

use super::{into_result, probability_at, Detector, ProviderError, Verdict};
use crate::models::DetectorResult;
use crate::services::config_store::{ProviderSettings, ORIGINALITY};
use crate::services::transport::HttpTransport;

pub const ORIGINALITY_API_URL: &str = "https://api.originality.ai/api/v1/scan/ai";

pub struct OriginalityDetector {
    settings: ProviderSettings,
}

impl OriginalityDetector {
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }

    async fn scan(&self, transport: &HttpTransport, text: &str) -> Result<Verdict, ProviderError> {
        let url = self.settings.base_url.as_deref().unwrap_or(ORIGINALITY_API_URL);
        let data = transport
            .post_json(
                url,
                &[
                    ("X-OAI-API-KEY", self.settings.api_key.clone()),
                    ("Content-Type", "application/json".to_string()),
                ],
                &json!({ "content": text }),
                self.settings.timeout(),
            )
            .await?;

        let score = probability_at(&data, "/score/ai")?;
        let original = data
            .pointer("/score/original")
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        Verdict::new(
            score,
            json!({
                "ai_score": score,
                "original_score": original,
            }),
        )
    }
}

#[async_trait]
impl Detector for OriginalityDetector {
    fn name(&self) -> &str {
        ORIGINALITY
    }

    fn display_name(&self) -> &str {
        "Originality.ai"
    }

    fn description(&self) -> &str {
        "Originality.ai AI content detector"
    }

    fn is_available(&self) -> bool {
        !self.settings.api_key.is_empty()
    }

    async fn detect(&self, transport: &HttpTransport, text: &str) -> DetectorResult {
        let outcome = self.scan(transport, text).await;
        into_result(ORIGINALITY, "Originality", outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Label;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn detector_for(server: &MockServer) -> OriginalityDetector {
        OriginalityDetector::new(ProviderSettings {
            base_url: Some(server.uri()),
            ..ProviderSettings::with_key("test-key")
        })
    }

    #[test]
    fn test_availability_follows_key() {
        assert!(OriginalityDetector::new(ProviderSettings::with_key("k")).is_available());
        assert!(!OriginalityDetector::new(ProviderSettings::default()).is_available());
    }

    #[tokio::test]
    async fn test_detect_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-OAI-API-KEY", "test-key"))
            .and(body_json(json!({"content": "Some AI text"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"score": {"ai": 0.92, "original": 0.08}})),
            )
            .mount(&server)
            .await;

        let result = detector_for(&server)
            .detect(&HttpTransport::new(), "Some AI text")
            .await;
        assert_eq!(result.detector, "originality");
        assert_eq!(result.score, Some(0.92));
        assert_eq!(result.label, Some(Label::Ai));
        assert!(result.error.is_none());
        assert_eq!(result.details.unwrap()["original_score"], 0.08);
    }

    #[tokio::test]
    async fn test_detect_low_score_is_human() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"score": {"ai": 0.123456}})),
            )
            .mount(&server)
            .await;

        let result = detector_for(&server).detect(&HttpTransport::new(), "text").await;
        assert_eq!(result.score, Some(0.1235));
        assert_eq!(result.label, Some(Label::Human));
        assert!(result.details.unwrap()["original_score"].is_null());
    }

    #[tokio::test]
    async fn test_detect_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = detector_for(&server).detect(&HttpTransport::new(), "text").await;
        assert_eq!(result.error.as_deref(), Some("Originality API returned 503"));
    }
}
