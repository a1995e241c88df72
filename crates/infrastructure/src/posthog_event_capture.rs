use async_trait::async_trait;
use chrono::Utc;
use pulse_application::{CaptureEvent, EventCapture, GroupIdentify, WORKSPACE_GROUP_TYPE};
use pulse_core::{AppError, AppResult};
use serde_json::{Map, Value, json};
use tracing::debug;

const GROUP_IDENTIFY_EVENT: &str = "$groupidentify";

/// Event capture through the PostHog `/capture/` endpoint.
#[derive(Clone)]
pub struct PostHogEventCapture {
    http_client: reqwest::Client,
    capture_url: String,
    api_key: String,
}

impl PostHogEventCapture {
    /// Creates an adapter posting to `host`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, host: &str, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            capture_url: format!("{}/capture/", host.trim_end_matches('/')),
            api_key: api_key.into(),
        }
    }

    async fn send(&self, payload: Value, label: &str) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.capture_url.as_str())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("posthog transport error for '{label}': {error}"))
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(event = label, "posthog accepted event");
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        Err(AppError::Internal(format!(
            "posthog rejected '{label}' with status {status}: {body}"
        )))
    }
}

fn capture_payload(api_key: &str, event: &CaptureEvent) -> Value {
    let mut properties = event.properties.clone();
    properties.insert(
        "$groups".to_owned(),
        json!({ WORKSPACE_GROUP_TYPE: event.workspace_id.as_str() }),
    );

    json!({
        "api_key": api_key,
        "event": event.event.as_str(),
        "distinct_id": event.distinct_id.as_str(),
        "properties": properties,
        "timestamp": Utc::now().to_rfc3339(),
    })
}

fn group_identify_payload(api_key: &str, group: &GroupIdentify) -> Value {
    let mut group_set: Map<String, Value> = group.properties.clone();
    group_set.insert("name".to_owned(), json!(group.name));
    group_set.insert("created_by".to_owned(), json!(group.distinct_id.as_str()));
    group_set.insert("created_at".to_owned(), json!(Utc::now().to_rfc3339()));

    json!({
        "api_key": api_key,
        "event": GROUP_IDENTIFY_EVENT,
        "distinct_id": group.distinct_id.as_str(),
        "properties": {
            "$group_type": WORKSPACE_GROUP_TYPE,
            "$group_key": group.workspace_id.as_str(),
            "$group_set": group_set,
        },
    })
}

#[async_trait]
impl EventCapture for PostHogEventCapture {
    async fn capture(&self, event: CaptureEvent) -> AppResult<()> {
        let payload = capture_payload(self.api_key.as_str(), &event);
        self.send(payload, event.event.as_str()).await
    }

    async fn group_identify(&self, group: GroupIdentify) -> AppResult<()> {
        let payload = group_identify_payload(self.api_key.as_str(), &group);
        self.send(payload, GROUP_IDENTIFY_EVENT).await
    }
}
