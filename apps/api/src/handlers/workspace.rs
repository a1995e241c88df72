use axum::Json;
use axum::extract::State;

use crate::dto::{CreateWorkspaceRequest, CreateWorkspaceResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_workspace_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkspaceRequest>,
) -> ApiResult<Json<CreateWorkspaceResponse>> {
    let workspace_id = state
        .tracking_service
        .create_workspace(payload.into())
        .await?;

    Ok(Json(CreateWorkspaceResponse {
        workspace_id: workspace_id.to_string(),
        success: true,
        message: "Workspace group created and workspace_created event tracked".to_owned(),
    }))
}
