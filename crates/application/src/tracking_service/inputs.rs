use pulse_domain::SegmentSelection;
use serde_json::{Map, Value};

/// Input for workspace creation.
///
/// Fields are optional so missing values surface as validation errors.
#[derive(Debug, Clone, Default)]
pub struct CreateWorkspaceInput {
    /// Workspace display name.
    pub name: Option<String>,
    /// Creating user.
    pub user_id: Option<String>,
    /// Extra properties copied onto the group and the event.
    pub properties: Map<String, Value>,
    /// Optional segment attribution.
    pub segment: Option<SegmentSelection>,
}

/// Input for tracking one funnel event.
#[derive(Debug, Clone, Default)]
pub struct TrackEventInput {
    /// Event name.
    pub event: Option<String>,
    /// Originating user or session.
    pub distinct_id: Option<String>,
    /// Workspace the event belongs to.
    pub workspace_id: Option<String>,
    /// Event properties.
    pub properties: Map<String, Value>,
    /// Optional segment attribution.
    pub segment: Option<SegmentSelection>,
}
