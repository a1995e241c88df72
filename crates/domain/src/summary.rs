use chrono::{DateTime, Utc};
use pulse_core::{ActorId, WorkspaceId};
use serde::Serialize;

use crate::event::{AnalyticsEvent, EventName, WORKSPACE_NAME_PROPERTY};

/// Completed tasks required, together with a project, for activation.
pub const ACTIVATION_TASK_THRESHOLD: u32 = 3;

/// Display name used when a workspace was announced without one.
pub const DEFAULT_WORKSPACE_NAME: &str = "Untitled Workspace";

/// Derived per-workspace funnel progress.
///
/// `is_activated` is never stored independently: every constructor and
/// mutator recomputes it from `has_project` and `task_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceSummary {
    workspace_id: WorkspaceId,
    workspace_name: String,
    created_at: DateTime<Utc>,
    actor_id: Option<ActorId>,
    has_project: bool,
    task_count: u32,
    invite_sent: bool,
    invite_accepted: bool,
    is_activated: bool,
}

impl WorkspaceSummary {
    /// Creates a summary with no funnel progress.
    #[must_use]
    pub fn new(
        workspace_id: WorkspaceId,
        workspace_name: impl Into<String>,
        created_at: DateTime<Utc>,
        actor_id: Option<ActorId>,
    ) -> Self {
        let workspace_name = workspace_name.into();
        let workspace_name = if workspace_name.trim().is_empty() {
            DEFAULT_WORKSPACE_NAME.to_owned()
        } else {
            workspace_name
        };

        Self {
            workspace_id,
            workspace_name,
            created_at,
            actor_id,
            has_project: false,
            task_count: 0,
            invite_sent: false,
            invite_accepted: false,
            is_activated: false,
        }
    }

    /// Builds a summary from the first `workspace_created` event and the full
    /// event set of that workspace.
    ///
    /// Task completions are counted per event, not per distinct task id.
    #[must_use]
    pub fn from_events(
        workspace_id: WorkspaceId,
        created_event: &AnalyticsEvent,
        events: &[AnalyticsEvent],
    ) -> Self {
        let workspace_name = created_event
            .property_str(WORKSPACE_NAME_PROPERTY)
            .unwrap_or(DEFAULT_WORKSPACE_NAME);

        let mut summary = Self::new(
            workspace_id,
            workspace_name,
            created_event.timestamp(),
            created_event.actor_id().cloned(),
        );

        let task_count = events
            .iter()
            .filter(|event| *event.name() == EventName::TaskCompleted)
            .count();

        summary.has_project = events
            .iter()
            .any(|event| *event.name() == EventName::ProjectCreated);
        summary.task_count = u32::try_from(task_count).unwrap_or(u32::MAX);
        summary.invite_sent = events
            .iter()
            .any(|event| *event.name() == EventName::InviteSent);
        summary.invite_accepted = events
            .iter()
            .any(|event| *event.name() == EventName::InviteAccepted);
        summary.refresh_activation();
        summary
    }

    /// Overrides every funnel counter at once.
    #[must_use]
    pub fn with_progress(
        mut self,
        has_project: bool,
        task_count: u32,
        invite_sent: bool,
        invite_accepted: bool,
    ) -> Self {
        self.has_project = has_project;
        self.task_count = task_count;
        self.invite_sent = invite_sent;
        self.invite_accepted = invite_accepted;
        self.refresh_activation();
        self
    }

    /// Replaces the workspace display name.
    pub fn rename(&mut self, workspace_name: impl Into<String>) {
        let workspace_name = workspace_name.into();
        if !workspace_name.trim().is_empty() {
            self.workspace_name = workspace_name;
        }
    }

    /// Sets whether the workspace has a project.
    pub fn set_has_project(&mut self, has_project: bool) {
        self.has_project = has_project;
        self.refresh_activation();
    }

    /// Sets the number of completed tasks.
    pub fn set_task_count(&mut self, task_count: u32) {
        self.task_count = task_count;
        self.refresh_activation();
    }

    /// Records one more completed task.
    pub fn record_task_completed(&mut self) {
        self.set_task_count(self.task_count.saturating_add(1));
    }

    /// Sets the invite-sent flag.
    pub fn set_invite_sent(&mut self, invite_sent: bool) {
        self.invite_sent = invite_sent;
    }

    /// Sets the invite-accepted flag.
    pub fn set_invite_accepted(&mut self, invite_accepted: bool) {
        self.invite_accepted = invite_accepted;
    }

    fn refresh_activation(&mut self) {
        self.is_activated = is_activated(self.has_project, self.task_count);
    }

    /// Returns the workspace identifier.
    #[must_use]
    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    /// Returns the workspace display name.
    #[must_use]
    pub fn workspace_name(&self) -> &str {
        self.workspace_name.as_str()
    }

    /// Returns when the workspace was first announced.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the actor that created the workspace.
    #[must_use]
    pub fn actor_id(&self) -> Option<&ActorId> {
        self.actor_id.as_ref()
    }

    /// Returns whether any project was created.
    #[must_use]
    pub fn has_project(&self) -> bool {
        self.has_project
    }

    /// Returns the number of `task_completed` events.
    #[must_use]
    pub fn task_count(&self) -> u32 {
        self.task_count
    }

    /// Returns whether an invite was sent.
    #[must_use]
    pub fn invite_sent(&self) -> bool {
        self.invite_sent
    }

    /// Returns whether an invite was accepted.
    #[must_use]
    pub fn invite_accepted(&self) -> bool {
        self.invite_accepted
    }

    /// Returns whether the workspace meets the activation threshold.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.is_activated
    }
}

/// Activation rule: at least one project and three completed tasks.
#[must_use]
pub fn is_activated(has_project: bool, task_count: u32) -> bool {
    has_project && task_count >= ACTIVATION_TASK_THRESHOLD
}

/// Aggregate activation figures over a set of workspace summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationSnapshot {
    workspaces: Vec<WorkspaceSummary>,
    total_workspaces: usize,
    activated_count: usize,
    activation_rate: f64,
}

impl ActivationSnapshot {
    /// Computes totals for the provided summaries.
    #[must_use]
    pub fn from_summaries(workspaces: Vec<WorkspaceSummary>) -> Self {
        let total_workspaces = workspaces.len();
        let activated_count = workspaces
            .iter()
            .filter(|summary| summary.is_activated())
            .count();
        let activation_rate = if total_workspaces > 0 {
            activated_count as f64 / total_workspaces as f64
        } else {
            0.0
        };

        Self {
            workspaces,
            total_workspaces,
            activated_count,
            activation_rate,
        }
    }

    /// Returns the summaries the snapshot was computed from.
    #[must_use]
    pub fn workspaces(&self) -> &[WorkspaceSummary] {
        &self.workspaces
    }

    /// Consumes the snapshot and returns its summaries.
    #[must_use]
    pub fn into_workspaces(self) -> Vec<WorkspaceSummary> {
        self.workspaces
    }

    /// Returns the number of workspaces.
    #[must_use]
    pub fn total_workspaces(&self) -> usize {
        self.total_workspaces
    }

    /// Returns the number of activated workspaces.
    #[must_use]
    pub fn activated_count(&self) -> usize {
        self.activated_count
    }

    /// Returns `activated / total`, or `0.0` for an empty snapshot.
    #[must_use]
    pub fn activation_rate(&self) -> f64 {
        self.activation_rate
    }

    /// Returns whether the activation rate is strictly below `threshold`.
    #[must_use]
    pub fn is_below(&self, threshold: f64) -> bool {
        self.activation_rate < threshold
    }
}
