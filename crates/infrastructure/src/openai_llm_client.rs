use async_trait::async_trait;
use pulse_application::{LlmClient, LlmRequest};
use pulse_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Default chat model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Completion client for the OpenAI chat completions API.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiLlmClient {
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
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn completion_request<'a>(
    request: &'a LlmRequest,
    default_model: &'a str,
) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model: request.model.as_deref().unwrap_or(default_model),
        messages: [
            ChatMessage {
                role: "system",
                content: request.system_prompt.as_str(),
            },
            ChatMessage {
                role: "user",
                content: request.prompt.as_str(),
            },
        ],
        temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
    }
}

#[async_trait]
impl LlmClient for OpenAiLlmClient {
    fn provider(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        self.model.as_str()
    }

    async fn complete(&self, request: LlmRequest) -> AppResult<String> {
        let body = completion_request(&request, self.model.as_str());
        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|error| AppError::Unavailable(format!("openai transport error: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "openai completion failed with status {status}: {body}"
            )));
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to decode openai completion: {error}"))
            })?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}
