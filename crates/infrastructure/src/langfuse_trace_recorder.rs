use async_trait::async_trait;
use chrono::Utc;
use pulse_application::{LlmTrace, LlmTraceRecorder};
use pulse_core::{AppError, AppResult};
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

/// Default Langfuse cloud host.
pub const DEFAULT_LANGFUSE_HOST: &str = "https://cloud.langfuse.com";

/// LLM trace recorder using the Langfuse batch ingestion API.
#[derive(Clone)]
pub struct LangfuseTraceRecorder {
    http_client: reqwest::Client,
    ingestion_url: String,
    public_key: String,
    secret_key: String,
}

impl LangfuseTraceRecorder {
    /// Creates a recorder posting to `host`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        host: &str,
        public_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            ingestion_url: format!("{}/api/public/ingestion", host.trim_end_matches('/')),
            public_key: public_key.into(),
            secret_key: secret_key.into(),
        }
    }

    async fn ingest(&self, batch: Vec<Value>) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.ingestion_url.as_str())
            .basic_auth(self.public_key.as_str(), Some(self.secret_key.as_str()))
            .json(&json!({ "batch": batch }))
            .send()
            .await
            .map_err(|error| AppError::Unavailable(format!("langfuse transport error: {error}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        Err(AppError::Internal(format!(
            "langfuse ingestion failed with status {status}: {body}"
        )))
    }
}

fn ingestion_event(kind: &str, body: Value) -> Value {
    json!({
        "id": Uuid::new_v4().to_string(),
        "timestamp": Utc::now().to_rfc3339(),
        "type": kind,
        "body": body,
    })
}

fn generation_batch(trace: &LlmTrace) -> Vec<Value> {
    let output = trace
        .output
        .as_ref()
        .map(|output| json!([{ "role": "assistant", "content": output }]));
    let level = if trace.output.is_some() { "DEFAULT" } else { "ERROR" };

    vec![
        ingestion_event(
            "trace-create",
            json!({
                "id": trace.trace_id,
                "name": trace.operation,
                "userId": trace.user_id,
                "metadata": {
                    "workspace_id": trace.workspace_id,
                    "operation": trace.operation,
                    "provider": trace.provider,
                    "model": trace.model,
                },
            }),
        ),
        ingestion_event(
            "generation-create",
            json!({
                "id": Uuid::new_v4().to_string(),
                "traceId": trace.trace_id,
                "name": trace.operation,
                "model": trace.model,
                "input": [
                    { "role": "system", "content": trace.system_prompt },
                    { "role": "user", "content": trace.prompt },
                ],
                "output": output,
                "level": level,
            }),
        ),
    ]
}

fn score_batch(trace_id: &str, name: &str, value: f64) -> Vec<Value> {
    vec![ingestion_event(
        "score-create",
        json!({
            "id": Uuid::new_v4().to_string(),
            "traceId": trace_id,
            "name": name,
            "value": value,
        }),
    )]
}

#[async_trait]
impl LlmTraceRecorder for LangfuseTraceRecorder {
    async fn record_generation(&self, trace: LlmTrace) -> AppResult<()> {
        debug!(
            trace_id = %trace.trace_id,
            operation = %trace.operation,
            "recording llm generation"
        );
        self.ingest(generation_batch(&trace)).await
    }

    async fn record_score(&self, trace_id: &str, name: &str, value: f64) -> AppResult<()> {
        self.ingest(score_batch(trace_id, name, value)).await
    }
}
