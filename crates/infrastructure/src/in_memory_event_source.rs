use async_trait::async_trait;
use chrono::Utc;
use pulse_application::{CaptureEvent, EventCapture, EventSource, GroupIdentify};
use pulse_core::{AppResult, WorkspaceId};
use pulse_domain::{AnalyticsEvent, EventName};
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local event log.
///
/// Doubles as an [`EventCapture`] sink so that locally tracked events become
/// visible to the aggregator without an external warehouse.
pub struct InMemoryEventSource {
    name: String,
    events: RwLock<Vec<AnalyticsEvent>>,
}

impl InMemoryEventSource {
    /// Creates an empty log.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: RwLock::new(Vec::new()),
        }
    }

    /// Creates a log holding `events`.
    #[must_use]
    pub fn with_events(name: impl Into<String>, events: Vec<AnalyticsEvent>) -> Self {
        Self {
            name: name.into(),
            events: RwLock::new(events),
        }
    }

    /// Appends one event.
    pub async fn append(&self, event: AnalyticsEvent) {
        self.events.write().await.push(event);
    }

    /// Returns the number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    async fn fetch_workspace_created_events(&self) -> AppResult<Vec<AnalyticsEvent>> {
        let mut created: Vec<AnalyticsEvent> = self
            .events
            .read()
            .await
            .iter()
            .filter(|event| event.name() == &EventName::WorkspaceCreated)
            .cloned()
            .collect();
        created.sort_by_key(AnalyticsEvent::timestamp);

        Ok(created)
    }

    async fn fetch_events_for_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<Vec<AnalyticsEvent>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|event| event.resolved_workspace_id().as_ref() == Some(workspace_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EventCapture for InMemoryEventSource {
    async fn capture(&self, event: CaptureEvent) -> AppResult<()> {
        debug!(event = %event.event, workspace_id = %event.workspace_id, "recording event locally");
        let recorded = AnalyticsEvent::new(event.event, Utc::now())
            .with_workspace_id(event.workspace_id)
            .with_actor_id(Some(event.distinct_id))
            .with_properties(event.properties);
        self.append(recorded).await;

        Ok(())
    }

    async fn group_identify(&self, _group: GroupIdentify) -> AppResult<()> {
        Ok(())
    }
}
