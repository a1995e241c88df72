use serde::Serialize;
use ts_rs::TS;

/// Dashboard row for one workspace.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/workspace-summary-response.ts"
)]
pub struct WorkspaceSummaryResponse {
    pub workspace_id: String,
    pub workspace_name: String,
    /// RFC 3339 timestamp of the workspace creation.
    pub created_at: String,
    pub user_id: Option<String>,
    pub has_project: bool,
    pub task_count: u32,
    pub is_activated: bool,
    pub invite_sent: bool,
    pub invite_accepted: bool,
}

/// Activation figures behind the dashboard.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/dashboard-stats-response.ts"
)]
pub struct DashboardStatsResponse {
    pub workspaces: Vec<WorkspaceSummaryResponse>,
    pub total_workspaces: usize,
    pub activated_count: usize,
    pub activation_rate: f64,
}
