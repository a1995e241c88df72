use async_trait::async_trait;
use pulse_core::AppResult;

/// One recorded LLM generation.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmTrace {
    /// Trace identifier returned to API callers.
    pub trace_id: String,
    /// Requesting user.
    pub user_id: String,
    /// Workspace the insight was requested for.
    pub workspace_id: String,
    /// Operation label such as `pdr` or `sql_evaluation`.
    pub operation: String,
    /// Provider label.
    pub provider: String,
    /// Model name.
    pub model: String,
    /// System instructions sent.
    pub system_prompt: String,
    /// User prompt sent.
    pub prompt: String,
    /// Completion text, if the call succeeded.
    pub output: Option<String>,
}

/// Port for LLM observability backends.
#[async_trait]
pub trait LlmTraceRecorder: Send + Sync {
    /// Records one generation.
    async fn record_generation(&self, trace: LlmTrace) -> AppResult<()>;

    /// Attaches a named numeric score to a trace.
    async fn record_score(&self, trace_id: &str, name: &str, value: f64) -> AppResult<()>;
}
