use axum::Json;
use axum::extract::State;

use crate::dto::{OkResponse, TrackEventRequest, WorkspaceIdRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn track_event_handler(
    State(state): State<AppState>,
    Json(payload): Json<TrackEventRequest>,
) -> ApiResult<Json<OkResponse>> {
    state.tracking_service.track_event(payload.into()).await?;

    Ok(Json(OkResponse::ok()))
}

pub async fn track_invite_handler(
    State(state): State<AppState>,
    Json(payload): Json<TrackEventRequest>,
) -> ApiResult<Json<OkResponse>> {
    state.tracking_service.track_invite(payload.into()).await?;

    Ok(Json(OkResponse::ok()))
}

pub async fn track_project_handler(
    State(state): State<AppState>,
    Json(payload): Json<WorkspaceIdRequest>,
) -> ApiResult<Json<OkResponse>> {
    state
        .tracking_service
        .record_project(payload.workspace_id)
        .await?;

    Ok(Json(OkResponse::ok()))
}

pub async fn track_task_handler(
    State(state): State<AppState>,
    Json(payload): Json<WorkspaceIdRequest>,
) -> ApiResult<Json<OkResponse>> {
    state.tracking_service.record_task(payload.workspace_id).await?;

    Ok(Json(OkResponse::ok()))
}
