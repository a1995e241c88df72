use async_trait::async_trait;
use pulse_core::AppResult;

/// One single-turn completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    /// System instructions.
    pub system_prompt: String,
    /// User prompt.
    pub prompt: String,
    /// Model override; adapters use their configured default when unset.
    pub model: Option<String>,
    /// Sampling temperature override.
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Creates a request using adapter defaults for model and temperature.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            model: None,
            temperature: None,
        }
    }

    /// Sets the model override.
    #[must_use]
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Port for text completion providers.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the provider label used in traces.
    fn provider(&self) -> &str;

    /// Returns the model used when a request carries no override.
    fn default_model(&self) -> &str;

    /// Returns the completion text.
    async fn complete(&self, request: LlmRequest) -> AppResult<String>;
}
