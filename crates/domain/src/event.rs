use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use pulse_core::{ActorId, WorkspaceId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property key carrying the workspace identifier inside event payloads.
pub const WORKSPACE_ID_PROPERTY: &str = "workspace_id";

/// Property key carrying the workspace display name.
pub const WORKSPACE_NAME_PROPERTY: &str = "workspace_name";

/// Names of the events emitted by the activation funnel and the AI features.
///
/// Unknown names are preserved verbatim in [`EventName::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventName {
    /// A workspace was created.
    WorkspaceCreated,
    /// A project was created inside a workspace.
    ProjectCreated,
    /// A task was completed inside a workspace project.
    TaskCompleted,
    /// A workspace member sent an invite.
    InviteSent,
    /// An invite into the workspace was accepted.
    InviteAccepted,
    /// An AI PDR card draft was generated.
    AiPdrDraftCreated,
    /// An AI SQL query was generated.
    AiSqlGenerated,
    /// An AI suggestion was displayed.
    AiSuggestionShown,
    /// An AI suggestion was accepted or dismissed.
    AiSuggestionAccepted,
    /// An AI anomaly alert fired.
    AiAnomalyAlerted,
    /// Any other event name.
    Other(String),
}

impl EventName {
    /// Parses a stored event name.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "workspace_created" => Self::WorkspaceCreated,
            "project_created" => Self::ProjectCreated,
            "task_completed" => Self::TaskCompleted,
            "invite_sent" => Self::InviteSent,
            "invite_accepted" => Self::InviteAccepted,
            "ai_pdr_draft_created" => Self::AiPdrDraftCreated,
            "ai_sql_generated" => Self::AiSqlGenerated,
            "ai_suggestion_shown" => Self::AiSuggestionShown,
            "ai_suggestion_accepted" => Self::AiSuggestionAccepted,
            "ai_anomaly_alerted" => Self::AiAnomalyAlerted,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns the stable wire value for this event name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::WorkspaceCreated => "workspace_created",
            Self::ProjectCreated => "project_created",
            Self::TaskCompleted => "task_completed",
            Self::InviteSent => "invite_sent",
            Self::InviteAccepted => "invite_accepted",
            Self::AiPdrDraftCreated => "ai_pdr_draft_created",
            Self::AiSqlGenerated => "ai_sql_generated",
            Self::AiSuggestionShown => "ai_suggestion_shown",
            Self::AiSuggestionAccepted => "ai_suggestion_accepted",
            Self::AiAnomalyAlerted => "ai_anomaly_alerted",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Returns whether this event is one of the invite events.
    #[must_use]
    pub fn is_invite(&self) -> bool {
        matches!(self, Self::InviteSent | Self::InviteAccepted)
    }

    /// Returns whether this event is emitted by the AI insight features.
    #[must_use]
    pub fn is_ai_event(&self) -> bool {
        matches!(
            self,
            Self::AiPdrDraftCreated
                | Self::AiSqlGenerated
                | Self::AiSuggestionShown
                | Self::AiSuggestionAccepted
                | Self::AiAnomalyAlerted
        )
    }
}

impl From<String> for EventName {
    fn from(value: String) -> Self {
        Self::parse(value.as_str())
    }
}

impl From<EventName> for String {
    fn from(value: EventName) -> Self {
        value.as_str().to_owned()
    }
}

impl Display for EventName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One immutable row of the append-only analytics event log.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsEvent {
    name: EventName,
    workspace_id: Option<WorkspaceId>,
    actor_id: Option<ActorId>,
    timestamp: DateTime<Utc>,
    properties: Map<String, Value>,
}

impl AnalyticsEvent {
    /// Creates an event without workspace, actor or properties.
    #[must_use]
    pub fn new(name: EventName, timestamp: DateTime<Utc>) -> Self {
        Self {
            name,
            workspace_id: None,
            actor_id: None,
            timestamp,
            properties: Map::new(),
        }
    }

    /// Sets the top-level workspace identifier.
    #[must_use]
    pub fn with_workspace_id(mut self, workspace_id: WorkspaceId) -> Self {
        self.workspace_id = Some(workspace_id);
        self
    }

    /// Sets the originating actor.
    #[must_use]
    pub fn with_actor_id(mut self, actor_id: Option<ActorId>) -> Self {
        self.actor_id = actor_id;
        self
    }

    /// Replaces the free-form property bag.
    #[must_use]
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    /// Returns the event name.
    #[must_use]
    pub fn name(&self) -> &EventName {
        &self.name
    }

    /// Returns the top-level workspace identifier, if the source stores one.
    #[must_use]
    pub fn workspace_id(&self) -> Option<&WorkspaceId> {
        self.workspace_id.as_ref()
    }

    /// Returns the originating actor.
    #[must_use]
    pub fn actor_id(&self) -> Option<&ActorId> {
        self.actor_id.as_ref()
    }

    /// Returns the time the event was recorded.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the free-form property bag.
    #[must_use]
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Returns one string property.
    #[must_use]
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// Resolves the workspace this event belongs to.
    ///
    /// The top-level identifier wins; otherwise `properties.workspace_id` is
    /// used when it is a non-empty string.
    #[must_use]
    pub fn resolved_workspace_id(&self) -> Option<WorkspaceId> {
        if let Some(workspace_id) = &self.workspace_id {
            return Some(workspace_id.clone());
        }

        self.property_str(WORKSPACE_ID_PROPERTY)
            .and_then(|value| WorkspaceId::new(value).ok())
    }
}
