//! Translation service client.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use timeline_shared::{Result, TimelineError, TranslationConfig};

/// Version header required by the Messages API.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// User-Agent string for translation requests.
const USER_AGENT: &str = concat!("TimelineBuilder/", env!("CARGO_PKG_VERSION"));

/// A text-generation service that turns a prompt into a reply.
///
/// Implementations report throttling as [`TimelineError::RateLimited`] so
/// the pipeline can back off instead of failing the batch outright.
pub trait Translator: Send + Sync {
    fn translate(
        &self,
        system: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// AnthropicTranslator
// ---------------------------------------------------------------------------

/// [`Translator`] backed by the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicTranslator {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicTranslator {
    pub fn new(config: &TranslationConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TimelineError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Translator for AnthropicTranslator {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn translate(&self, system: &str, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| TimelineError::Translation(format!("request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TimelineError::RateLimited(format!(
                "translation service returned HTTP {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TimelineError::Translation(format!("HTTP {status}: {body}")));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| TimelineError::Translation(format!("invalid response body: {e}")))?;

        let text = parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| TimelineError::Translation("response has no text content".into()))?;

        debug!(chars = text.len(), "translation received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn translator(server: &MockServer) -> AnthropicTranslator {
        let config = TranslationConfig {
            api_url: format!("{}/v1/messages", server.uri()),
            ..TranslationConfig::default()
        };
        AnthropicTranslator::new(&config, "test-key").unwrap()
    }

    #[tokio::test]
    async fn sends_headers_and_returns_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "system": "be precise",
                "messages": [{"role": "user", "content": "translate me"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "01/01/2020,Event A,http://x,1"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = translator(&server)
            .translate("be precise", "translate me")
            .await
            .unwrap();
        assert_eq!(text, "01/01/2020,Event A,http://x,1");
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = translator(&server).translate("s", "p").await.unwrap_err();
        assert!(matches!(err, TimelineError::RateLimited(_)));
    }

    #[tokio::test]
    async fn server_error_is_translation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = translator(&server).translate("s", "p").await.unwrap_err();
        assert!(matches!(err, TimelineError::Translation(ref m) if m.contains("overloaded")));
    }

    #[tokio::test]
    async fn missing_text_block_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "content": [] })),
            )
            .mount(&server)
            .await;

        let err = translator(&server).translate("s", "p").await.unwrap_err();
        assert!(matches!(err, TimelineError::Translation(_)));
    }
}
