use async_trait::async_trait;
use pulse_core::{AppResult, WorkspaceId};
use pulse_domain::AnalyticsEvent;

/// Read port over one queryable analytics event log.
///
/// Implementations decide how a workspace identifier is matched: some logs
/// store it as a dedicated column, others only inside the property bag.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Returns a stable name used in logs.
    fn name(&self) -> &str;

    /// Returns every `workspace_created` event, oldest first.
    async fn fetch_workspace_created_events(&self) -> AppResult<Vec<AnalyticsEvent>>;

    /// Returns every event attributed to one workspace.
    async fn fetch_events_for_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<Vec<AnalyticsEvent>>;
}
