use async_trait::async_trait;
use pulse_application::{LlmTrace, LlmTraceRecorder};
use pulse_core::AppResult;

/// Trace recorder used when no observability backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTraceRecorder;

#[async_trait]
impl LlmTraceRecorder for NoopTraceRecorder {
    async fn record_generation(&self, _trace: LlmTrace) -> AppResult<()> {
        Ok(())
    }

    async fn record_score(&self, _trace_id: &str, _name: &str, _value: f64) -> AppResult<()> {
        Ok(())
    }
}
