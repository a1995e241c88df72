use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{ActorId, AppResult, WorkspaceId};
use pulse_domain::{DEFAULT_WORKSPACE_NAME, WorkspaceSummary};

/// Partial update applied to a stored workspace summary.
///
/// Unset fields keep their stored value; when the workspace is not stored yet
/// they fall back to the summary defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryUpdate {
    /// Target workspace.
    pub workspace_id: WorkspaceId,
    /// New display name.
    pub workspace_name: Option<String>,
    /// Creation time, only honoured for new entries.
    pub created_at: Option<DateTime<Utc>>,
    /// Creating actor, only honoured for new entries.
    pub actor_id: Option<ActorId>,
    /// Project flag.
    pub has_project: Option<bool>,
    /// Absolute completed task count.
    pub task_count: Option<u32>,
    /// Invite-sent flag.
    pub invite_sent: Option<bool>,
    /// Invite-accepted flag.
    pub invite_accepted: Option<bool>,
}

impl SummaryUpdate {
    /// Creates an update that changes nothing.
    #[must_use]
    pub fn new(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            workspace_name: None,
            created_at: None,
            actor_id: None,
            has_project: None,
            task_count: None,
            invite_sent: None,
            invite_accepted: None,
        }
    }

    /// Applies the update to an existing summary, or creates one.
    #[must_use]
    pub fn apply(
        &self,
        existing: Option<WorkspaceSummary>,
        now: DateTime<Utc>,
    ) -> WorkspaceSummary {
        let mut summary = existing.unwrap_or_else(|| {
            WorkspaceSummary::new(
                self.workspace_id.clone(),
                self.workspace_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_WORKSPACE_NAME.to_owned()),
                self.created_at.unwrap_or(now),
                self.actor_id.clone(),
            )
        });

        if let Some(workspace_name) = &self.workspace_name {
            summary.rename(workspace_name.as_str());
        }
        if let Some(has_project) = self.has_project {
            summary.set_has_project(has_project);
        }
        if let Some(task_count) = self.task_count {
            summary.set_task_count(task_count);
        }
        if let Some(invite_sent) = self.invite_sent {
            summary.set_invite_sent(invite_sent);
        }
        if let Some(invite_accepted) = self.invite_accepted {
            summary.set_invite_accepted(invite_accepted);
        }

        summary
    }
}

/// Best-effort store of incrementally maintained workspace summaries.
///
/// Serves the dashboard while the event log has not caught up yet.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Returns one stored summary.
    async fn find_summary(&self, workspace_id: &WorkspaceId) -> AppResult<Option<WorkspaceSummary>>;

    /// Returns every stored summary in creation order.
    async fn list_summaries(&self) -> AppResult<Vec<WorkspaceSummary>>;

    /// Creates or updates one summary and returns the stored value.
    async fn upsert_summary(&self, update: SummaryUpdate) -> AppResult<WorkspaceSummary>;

    /// Adds one completed task, creating the summary when missing.
    async fn increment_task_count(&self, workspace_id: &WorkspaceId)
    -> AppResult<WorkspaceSummary>;
}
