use async_trait::async_trait;
use pulse_application::{LlmClient, LlmRequest};
use pulse_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Default messages model.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Completion client for the Anthropic messages API.
#[derive(Clone)]
pub struct AnthropicLlmClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicLlmClient {
    /// Creates a client using `model` unless a request overrides it.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Points the client at a compatible endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

fn messages_request<'a>(request: &'a LlmRequest, default_model: &'a str) -> MessagesRequest<'a> {
    MessagesRequest {
        model: request.model.as_deref().unwrap_or(default_model),
        system: request.system_prompt.as_str(),
        messages: [UserMessage {
            role: "user",
            content: request.prompt.as_str(),
        }],
        max_tokens: MAX_TOKENS,
        temperature: request.temperature,
    }
}

fn first_text(response: MessagesResponse) -> String {
    response
        .content
        .into_iter()
        .next()
        .filter(|block| block.kind == "text")
        .and_then(|block| block.text)
        .unwrap_or_default()
}

#[async_trait]
impl LlmClient for AnthropicLlmClient {
    fn provider(&self) -> &str {
        "anthropic"
    }

    fn default_model(&self) -> &str {
        self.model.as_str()
    }

    async fn complete(&self, request: LlmRequest) -> AppResult<String> {
        let body = messages_request(&request, self.model.as_str());
        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.as_str())
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("anthropic transport error: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "anthropic completion failed with status {status}: {body}"
            )));
        }

        let message = response.json::<MessagesResponse>().await.map_err(|error| {
            AppError::Internal(format!("failed to decode anthropic message: {error}"))
        })?;

        Ok(first_text(message))
    }
}
