use chrono::SecondsFormat;
use pulse_domain::{ActivationSnapshot, WorkspaceSummary};

use super::types::{DashboardStatsResponse, WorkspaceSummaryResponse};

impl From<WorkspaceSummary> for WorkspaceSummaryResponse {
    fn from(summary: WorkspaceSummary) -> Self {
        Self {
            workspace_id: summary.workspace_id().to_string(),
            workspace_name: summary.workspace_name().to_owned(),
            created_at: summary
                .created_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            user_id: summary.actor_id().map(ToString::to_string),
            has_project: summary.has_project(),
            task_count: summary.task_count(),
            is_activated: summary.is_activated(),
            invite_sent: summary.invite_sent(),
            invite_accepted: summary.invite_accepted(),
        }
    }
}

impl From<ActivationSnapshot> for DashboardStatsResponse {
    fn from(snapshot: ActivationSnapshot) -> Self {
        let total_workspaces = snapshot.total_workspaces();
        let activated_count = snapshot.activated_count();
        let activation_rate = snapshot.activation_rate();

        Self {
            workspaces: snapshot
                .into_workspaces()
                .into_iter()
                .map(WorkspaceSummaryResponse::from)
                .collect(),
            total_workspaces,
            activated_count,
            activation_rate,
        }
    }
}
