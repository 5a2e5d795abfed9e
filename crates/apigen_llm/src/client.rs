//! Messages API client used for request parsing and documentation answers.

use crate::error::{Error, Result};
use crate::extractor::ParsedRequest;
use crate::prompt::{question_prompt, PromptBuilder, CONSULTANT_SYSTEM_PROMPT, PARSER_SYSTEM_PROMPT};
use crate::response::MessageResponse;
use serde::Serialize;
use tracing::{debug, info, warn};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

/// Sampling temperature for structured parsing.
const TEMPERATURE_PRECISE: f32 = 0.1;
/// Sampling temperature for free-form answers.
const TEMPERATURE_CREATIVE: f32 = 0.7;

/// Messages API client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct Client {
    api_key: String,
    api_url: String,
    http: reqwest::Client,
    model: String,
}

/// Configuration for the Claude client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Model to use (default: claude-sonnet-4-20250514).
    pub model: String,
    /// Messages endpoint.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_url: API_URL.to_string(),
            timeout_seconds: 60,
        }
    }
}

/// Messages API request body.
#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// One conversation turn.
#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

impl Client {
    /// Creates a new Claude client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::InvalidApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            api_key: config.api_key,
            api_url: config.api_url,
            http,
            model: config.model,
        })
    }

    /// Model this client talks to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Asks the model to parse a proxy request into structured fields.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - API request fails
    /// - Response does not contain a JSON object
    pub async fn parse_request(&self, request: &str) -> Result<ParsedRequest> {
        info!("Parsing proxy request with {}", self.model);

        let prompt = PromptBuilder::new().with_request(request).build();
        debug!("Built prompt with {} chars", prompt.len());

        let response = self
            .complete(PARSER_SYSTEM_PROMPT, &prompt, TEMPERATURE_PRECISE)
            .await?;
        ParsedRequest::from_response(&response)
    }

    /// Answers a free-form Apigee question.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the reply is empty.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let response = self
            .complete(
                CONSULTANT_SYSTEM_PROMPT,
                &question_prompt(question),
                TEMPERATURE_CREATIVE,
            )
            .await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(Error::ParseError("empty answer".to_string()));
        }
        Ok(text)
    }

    /// Sends one user message and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, rate limiting, a rejected key,
    /// any other non-success status, or an undecodable body.
    pub async fn complete(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<MessageResponse> {
        let request = MessageRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            system: Some(system.to_string()),
            temperature: Some(temperature),
        };

        debug!(model = %self.model, temperature, "calling Messages API");

        let response = self
            .http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!("Received response with status: {}", status);

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(Error::RateLimited {
                retry_after_seconds: retry_after,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::ApiError(format!(
                "API request failed with status {status}: {error_text}"
            )));
        }

        let msg_response: MessageResponse = response
            .json()
            .await
            .map_err(|e| Error::ParseError(format!("undecodable API response: {e}")))?;

        debug!(
            input_tokens = msg_response.usage.input_tokens,
            output_tokens = msg_response.usage.output_tokens,
            "model call finished"
        );
        if msg_response.is_truncated() {
            warn!("model reply hit the {MAX_TOKENS} token limit");
        }

        Ok(msg_response)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Claude-shaped response body whose single text block is `text`.
    pub(crate) fn reply_body(text: &str) -> String {
        serde_json::json!({
            "id": "msg_123",
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": 100, "output_tokens": 50}
        })
        .to_string()
    }

    pub(crate) fn client_for(server: &mockito::Server) -> Client {
        Client::new(ClientConfig {
            api_key: "test-key".to_string(),
            api_url: format!("{}/v1/messages", server.url()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn client_rejects_empty_api_key() {
        let config = ClientConfig::default();
        assert!(matches!(Client::new(config), Err(Error::InvalidApiKey)));
    }

    #[test]
    fn client_accepts_valid_config() {
        let config = ClientConfig {
            api_key: "test-key".to_string(),
            ..Default::default()
        };
        assert!(Client::new(config).is_ok());
    }

    #[tokio::test]
    async fn parse_request_sends_key_and_reads_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", API_VERSION)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply_body(
                r#"{"proxy_name": "orders", "target_url": "https://orders.example.com", "policies": ["CORS"]}"#,
            ))
            .create_async()
            .await;

        let parsed = client_for(&server).parse_request("orders proxy").await.unwrap();
        assert_eq!(parsed.proxy_name.as_deref(), Some("orders"));
        assert_eq!(parsed.policies, vec!["CORS".to_string()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limit_reports_retry_after() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(429)
            .with_header("retry-after", "17")
            .create_async()
            .await;

        let result = client_for(&server).answer("hi").await;
        assert!(matches!(
            result,
            Err(Error::RateLimited {
                retry_after_seconds: 17
            })
        ));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_invalid_key() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .create_async()
            .await;

        let result = client_for(&server).answer("hi").await;
        assert!(matches!(result, Err(Error::InvalidApiKey)));
    }

    #[tokio::test]
    async fn server_error_carries_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        match client_for(&server).answer("hi").await {
            Err(Error::ApiError(message)) => assert!(message.contains("overloaded")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn answer_returns_reply_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(reply_body("Use a VerifyAPIKey policy in the request PreFlow."))
            .create_async()
            .await;

        let answer = client_for(&server)
            .answer("How do I require API keys?")
            .await
            .unwrap();
        assert!(answer.contains("VerifyAPIKey"));
    }
}
