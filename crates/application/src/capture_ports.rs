use async_trait::async_trait;
use pulse_core::{ActorId, AppResult, WorkspaceId};
use pulse_domain::EventName;
use serde_json::{Map, Value};

/// Group type under which workspaces are registered with the analytics vendor.
pub const WORKSPACE_GROUP_TYPE: &str = "workspace";

/// One event forwarded to the analytics vendor.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureEvent {
    /// Event name.
    pub event: EventName,
    /// Originating user or session.
    pub distinct_id: ActorId,
    /// Workspace group the event is attributed to.
    pub workspace_id: WorkspaceId,
    /// Event properties, already containing `workspace_id`.
    pub properties: Map<String, Value>,
}

/// Registration of a workspace group with its display properties.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupIdentify {
    /// Workspace group key.
    pub workspace_id: WorkspaceId,
    /// Creating user.
    pub distinct_id: ActorId,
    /// Display name shown by the vendor UI.
    pub name: String,
    /// Additional group properties.
    pub properties: Map<String, Value>,
}

/// Port for forwarding funnel events to an event-capture backend.
#[async_trait]
pub trait EventCapture: Send + Sync {
    /// Forwards one event.
    async fn capture(&self, event: CaptureEvent) -> AppResult<()>;

    /// Creates or updates a workspace group.
    async fn group_identify(&self, group: GroupIdentify) -> AppResult<()>;
}
