use async_trait::async_trait;
use pulse_application::{LlmClient, LlmRequest};
use pulse_core::{AppError, AppResult};

/// Stand-in used when neither OpenAI nor Anthropic keys are set.
pub struct UnconfiguredLlmClient;

#[async_trait]
impl LlmClient for UnconfiguredLlmClient {
    fn provider(&self) -> &str {
        "none"
    }

    fn default_model(&self) -> &str {
        "none"
    }

    async fn complete(&self, _request: LlmRequest) -> AppResult<String> {
        Err(AppError::Unavailable(
            "no llm provider configured; set OPENAI_API_KEY or ANTHROPIC_API_KEY".to_owned(),
        ))
    }
}
