use std::sync::Arc;

use async_trait::async_trait;
use pulse_core::AppResult;
use tracing::warn;

use crate::insight_ports::{LlmClient, LlmRequest};

/// Completion client that retries once on a secondary provider.
///
/// Model overrides only apply to the primary provider; the secondary always
/// runs its own default model.
#[derive(Clone)]
pub struct FallbackLlmClient {
    primary: Arc<dyn LlmClient>,
    secondary: Option<Arc<dyn LlmClient>>,
}

impl FallbackLlmClient {
    /// Creates a client without a secondary provider.
    #[must_use]
    pub fn new(primary: Arc<dyn LlmClient>) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Sets the provider used when the primary one fails.
    #[must_use]
    pub fn with_secondary(mut self, secondary: Option<Arc<dyn LlmClient>>) -> Self {
        self.secondary = secondary;
        self
    }
}

#[async_trait]
impl LlmClient for FallbackLlmClient {
    fn provider(&self) -> &str {
        self.primary.provider()
    }

    fn default_model(&self) -> &str {
        self.primary.default_model()
    }

    async fn complete(&self, request: LlmRequest) -> AppResult<String> {
        let Some(secondary) = &self.secondary else {
            return self.primary.complete(request).await;
        };

        match self.primary.complete(request.clone()).await {
            Ok(response) => Ok(response),
            Err(error) => {
                warn!(
                    primary = self.primary.provider(),
                    secondary = secondary.provider(),
                    error = %error,
                    "primary llm provider failed, falling back"
                );
                secondary.complete(request.with_model(None)).await
            }
        }
    }
}
