// Copyleaks Detector
// Two-step provider: exchange the account credential for an access token,
// then submit the text to the writer detector under a text-derived scan id.

use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};

use super::{into_result, Detector, ProviderError, Verdict};
use crate::models::DetectorResult;
use crate::services::config_store::{ProviderSettings, COPYLEAKS};
use crate::services::transport::HttpTransport;

pub const COPYLEAKS_AUTH_URL: &str = "https://id.copyleaks.com/v3/account/login/api";
pub const COPYLEAKS_SCAN_URL: &str = "https://api.copyleaks.com/v2/writer-detector/{scan_id}/check";

const CREDENTIAL_FORMAT: &str = "identifier:secret";
const SCAN_ID_LEN: usize = 16;

pub struct CopyleaksDetector {
    settings: ProviderSettings,
}

/// `email:api_key`, split on the first colon.
#[derive(Debug, PartialEq, Eq)]
struct Credential<'a> {
    email: &'a str,
    key: &'a str,
}

fn parse_credential(raw: &str) -> Result<Credential<'_>, ProviderError> {
    raw.split_once(':')
        .map(|(email, key)| Credential { email, key })
        .ok_or_else(|| {
            ProviderError::Config(format!(
                "COPYLEAKS_API_KEY must be in format '{}' (email:api_key)",
                CREDENTIAL_FORMAT
            ))
        })
}

/// First 16 hex chars of the SHA-256 of the text.
pub fn scan_id(text: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(text.as_bytes()));
    digest[..SCAN_ID_LEN].to_string()
}

impl CopyleaksDetector {
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }

    async fn authenticate(
        &self,
        transport: &HttpTransport,
        credential: &Credential<'_>,
    ) -> Result<String, ProviderError> {
        let url = self.settings.auth_url.as_deref().unwrap_or(COPYLEAKS_AUTH_URL);
        let data = transport
            .post_json(
                url,
                &[],
                &json!({ "email": credential.email, "key": credential.key }),
                self.settings.timeout(),
            )
            .await?;

        data.get("access_token")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(ProviderError::MissingField("access_token"))
    }

    async fn scan(&self, transport: &HttpTransport, text: &str) -> Result<Verdict, ProviderError> {
        // A malformed credential must not cost a login round trip.
        let credential = parse_credential(&self.settings.api_key)?;
        let access_token = self.authenticate(transport, &credential).await?;

        let template = self.settings.base_url.as_deref().unwrap_or(COPYLEAKS_SCAN_URL);
        let url = template.replace("{scan_id}", &scan_id(text));

        let data = transport
            .post_json(
                &url,
                &[
                    ("Authorization", format!("Bearer {}", access_token)),
                    ("Content-Type", "application/json".to_string()),
                ],
                &json!({ "text": text }),
                self.settings.timeout(),
            )
            .await?;

        // An absent summary or ai score counts as 0.0; a present but mistyped one does not.
        let summary = match data.get("summary") {
            None => json!({}),
            Some(summary) if summary.is_object() => summary.clone(),
            Some(_) => return Err(ProviderError::Malformed("summary")),
        };
        let score = match summary.get("ai") {
            None => 0.0,
            Some(ai) => ai.as_f64().ok_or(ProviderError::Malformed("summary.ai"))?,
        };

        Verdict::new(score, json!({ "summary": summary }))
    }
}

#[async_trait]
impl Detector for CopyleaksDetector {
    fn name(&self) -> &str {
        COPYLEAKS
    }

    fn display_name(&self) -> &str {
        "Copyleaks"
    }

    fn description(&self) -> &str {
        "Copyleaks AI content detector"
    }

    fn is_available(&self) -> bool {
        !self.settings.api_key.is_empty()
    }

    async fn detect(&self, transport: &HttpTransport, text: &str) -> DetectorResult {
        let outcome = self.scan(transport, text).await;
        into_result(COPYLEAKS, "Copyleaks", outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Label;
    use wiremock::matchers::{any, body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn detector_for(server: &MockServer, key: &str) -> CopyleaksDetector {
        CopyleaksDetector::new(ProviderSettings {
            auth_url: Some(format!("{}/v3/account/login/api", server.uri())),
            base_url: Some(format!("{}/v2/writer-detector/{{scan_id}}/check", server.uri())),
            ..ProviderSettings::with_key(key)
        })
    }

    #[test]
    fn test_parse_credential_splits_on_first_colon() {
        let cred = parse_credential("user@email.com:api:key").unwrap();
        assert_eq!(cred.email, "user@email.com");
        assert_eq!(cred.key, "api:key");
        assert!(parse_credential("no-colon-here").is_err());
    }

    #[test]
    fn test_scan_id_is_deterministic() {
        let a = scan_id("hello world");
        assert_eq!(a.len(), 16);
        assert_eq!(a, scan_id("hello world"));
        assert_ne!(a, scan_id("hello world!"));
        // sha256("hello world") = b94d27b9934d3e08...
        assert_eq!(a, "b94d27b9934d3e08");
    }

    #[test]
    fn test_available_with_any_non_empty_key() {
        let d = CopyleaksDetector::new(ProviderSettings::with_key("user@email.com:apikey123"));
        assert!(d.is_available());
        assert!(!CopyleaksDetector::new(ProviderSettings::default()).is_available());
    }

    #[tokio::test]
    async fn test_detect_success() {
        let server = MockServer::start().await;
        let text = "Some AI text";
        Mock::given(method("POST"))
            .and(path("/v3/account/login/api"))
            .and(body_json(json!({"email": "user@email.com", "key": "apikey123"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "fake-token"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/v2/writer-detector/{}/check", scan_id(text))))
            .and(header("Authorization", "Bearer fake-token"))
            .and(body_json(json!({"text": text})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"summary": {"ai": 0.78, "human": 0.22}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = detector_for(&server, "user@email.com:apikey123")
            .detect(&HttpTransport::new(), text)
            .await;
        assert_eq!(result.detector, "copyleaks");
        assert_eq!(result.score, Some(0.78));
        assert_eq!(result.label, Some(Label::Ai));
        assert!(result.error.is_none());
        assert_eq!(result.details.unwrap()["summary"]["human"], 0.22);
    }

    #[tokio::test]
    async fn test_bad_key_format_makes_no_network_call() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = detector_for(&server, "no-colon-here")
            .detect(&HttpTransport::new(), "Some text")
            .await;
        assert_eq!(result.detector, "copyleaks");
        assert!(result.score.is_none());
        let error = result.error.unwrap();
        assert!(error.contains("identifier:secret"), "{error}");
        assert!(error.contains("email:api_key"), "{error}");
    }

    #[tokio::test]
    async fn test_auth_failure_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/account/login/api"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = detector_for(&server, "a@b.c:k")
            .detect(&HttpTransport::new(), "text")
            .await;
        assert_eq!(result.error.as_deref(), Some("Copyleaks API returned 401"));
    }

    async fn detect_with_scan_body(body: serde_json::Value) -> DetectorResult {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/account/login/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/v2/writer-detector/{}/check", scan_id("text"))))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        detector_for(&server, "a@b.c:k")
            .detect(&HttpTransport::new(), "text")
            .await
    }

    #[tokio::test]
    async fn test_missing_summary_scores_zero() {
        for body in [json!({}), json!({"summary": {"human": 1.0}})] {
            let result = detect_with_scan_body(body).await;
            assert_eq!(result.score, Some(0.0));
            assert_eq!(result.label, Some(Label::Human));
            assert!(result.error.is_none());
        }
    }

    #[tokio::test]
    async fn test_mistyped_summary_is_a_failure() {
        let cases = [
            (json!({"summary": {"ai": "high"}}), "summary.ai"),
            (json!({"summary": null}), "summary"),
            (json!({"summary": "oops"}), "summary"),
        ];
        for (body, field) in cases {
            let result = detect_with_scan_body(body).await;
            assert!(result.score.is_none());
            assert!(result.label.is_none());
            assert_eq!(
                result.error,
                Some(format!(
                    "Copyleaks detection failed: malformed field `{}` in response",
                    field
                ))
            );
        }
    }
}
