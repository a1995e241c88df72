mod common;
mod dashboard;
mod insights;
mod tracking;

pub use common::{HealthResponse, OkResponse};
pub use dashboard::{DashboardStatsResponse, WorkspaceSummaryResponse};
pub use insights::{
    AnomalyRequest, AnomalyResponse, EvaluationResponse, PdrRequest, PdrResponse,
    SqlRejectedResponse, SqlRequest, SqlResponse,
};
pub use tracking::{
    CreateWorkspaceRequest, CreateWorkspaceResponse, TrackEventRequest, WorkspaceIdRequest,
};
