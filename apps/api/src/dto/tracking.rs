use pulse_application::{CreateWorkspaceInput, TrackEventInput};
use pulse_domain::SegmentSelection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// Incoming payload for workspace creation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-workspace-request.ts"
)]
pub struct CreateWorkspaceRequest {
    pub name: Option<String>,
    pub user_id: Option<String>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    #[ts(type = "{ plan: string, region: string, channel: string, variant: string } | null")]
    pub segment: Option<SegmentSelection>,
}

impl From<CreateWorkspaceRequest> for CreateWorkspaceInput {
    fn from(request: CreateWorkspaceRequest) -> Self {
        Self {
            name: request.name,
            user_id: request.user_id,
            properties: request.properties.unwrap_or_default(),
            segment: request.segment,
        }
    }
}

/// Workspace creation result.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-workspace-response.ts"
)]
pub struct CreateWorkspaceResponse {
    pub workspace_id: String,
    pub success: bool,
    pub message: String,
}

/// Incoming payload for one funnel event.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/track-event-request.ts"
)]
pub struct TrackEventRequest {
    pub event: Option<String>,
    pub distinct_id: Option<String>,
    pub workspace_id: Option<String>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    #[ts(type = "{ plan: string, region: string, channel: string, variant: string } | null")]
    pub segment: Option<SegmentSelection>,
}

impl From<TrackEventRequest> for TrackEventInput {
    fn from(request: TrackEventRequest) -> Self {
        Self {
            event: request.event,
            distinct_id: request.distinct_id,
            workspace_id: request.workspace_id,
            properties: request.properties.unwrap_or_default(),
            segment: request.segment,
        }
    }
}

/// Payload naming a single workspace.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/workspace-id-request.ts"
)]
pub struct WorkspaceIdRequest {
    pub workspace_id: Option<String>,
}
