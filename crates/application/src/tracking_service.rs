use std::sync::Arc;

use chrono::Utc;
use pulse_core::{ActorId, AppError, AppResult, NonEmptyString, WorkspaceId};
use pulse_domain::{
    EventName, SegmentSelection, WORKSPACE_ID_PROPERTY, WORKSPACE_NAME_PROPERTY,
    WorkspaceSummary, validate_event_properties,
};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::activation_ports::{SummaryStore, SummaryUpdate};
use crate::capture_ports::{CaptureEvent, EventCapture, GroupIdentify};

mod inputs;

pub use inputs::{CreateWorkspaceInput, TrackEventInput};

/// Funnel tracking: forwards events to the capture backend and keeps the
/// summary store in step.
#[derive(Clone)]
pub struct TrackingService {
    event_capture: Arc<dyn EventCapture>,
    summary_store: Arc<dyn SummaryStore>,
}

impl TrackingService {
    /// Creates a tracking service.
    #[must_use]
    pub fn new(event_capture: Arc<dyn EventCapture>, summary_store: Arc<dyn SummaryStore>) -> Self {
        Self {
            event_capture,
            summary_store,
        }
    }

    /// Creates a workspace group and announces it with `workspace_created`.
    pub async fn create_workspace(&self, input: CreateWorkspaceInput) -> AppResult<WorkspaceId> {
        let (Some(name), Some(user_id)) = (input.name, input.user_id) else {
            return Err(AppError::Validation("missing name or userId".to_owned()));
        };
        let name = NonEmptyString::new(name)
            .map_err(|_| AppError::Validation("missing name or userId".to_owned()))?;
        let distinct_id = ActorId::new(user_id)
            .map_err(|_| AppError::Validation("missing name or userId".to_owned()))?;

        let workspace_id = WorkspaceId::generate();
        info!(
            workspace_id = %workspace_id,
            distinct_id = %distinct_id,
            "creating workspace group"
        );

        self.event_capture
            .group_identify(GroupIdentify {
                workspace_id: workspace_id.clone(),
                distinct_id: distinct_id.clone(),
                name: name.as_str().to_owned(),
                properties: input.properties.clone(),
            })
            .await?;

        let mut properties = input.properties;
        if let Some(segment) = input.segment {
            properties.extend(segment.to_properties());
        }
        properties.insert(
            WORKSPACE_ID_PROPERTY.to_owned(),
            json!(workspace_id.as_str()),
        );
        properties.insert(WORKSPACE_NAME_PROPERTY.to_owned(), json!(name.as_str()));
        validate_event_properties(&EventName::WorkspaceCreated, &properties)?;

        self.event_capture
            .capture(CaptureEvent {
                event: EventName::WorkspaceCreated,
                distinct_id: distinct_id.clone(),
                workspace_id: workspace_id.clone(),
                properties,
            })
            .await?;

        let mut update = SummaryUpdate::new(workspace_id.clone());
        update.workspace_name = Some(name.into());
        update.created_at = Some(Utc::now());
        update.actor_id = Some(distinct_id);
        update.has_project = Some(false);
        update.task_count = Some(0);
        update.invite_sent = Some(false);
        update.invite_accepted = Some(false);
        self.update_store_best_effort(update).await;

        Ok(workspace_id)
    }

    /// Validates and forwards one funnel event.
    pub async fn track_event(&self, input: TrackEventInput) -> AppResult<()> {
        let (Some(event), Some(distinct_id), Some(workspace_id)) =
            (input.event, input.distinct_id, input.workspace_id)
        else {
            return Err(AppError::Validation(
                "missing event/distinctId/workspaceId".to_owned(),
            ));
        };
        if event.trim().is_empty() {
            return Err(AppError::Validation(
                "missing event/distinctId/workspaceId".to_owned(),
            ));
        }
        let event = EventName::parse(event.trim());
        let distinct_id = ActorId::new(distinct_id)?;
        let workspace_id = WorkspaceId::new(workspace_id)?;

        let properties = build_event_properties(&workspace_id, input.properties, input.segment);
        validate_event_properties(&event, &properties)?;

        info!(
            event = %event,
            distinct_id = %distinct_id,
            workspace_id = %workspace_id,
            "tracking event"
        );

        self.event_capture
            .capture(CaptureEvent {
                event: event.clone(),
                distinct_id,
                workspace_id: workspace_id.clone(),
                properties,
            })
            .await?;

        self.apply_store_side_effects(&event, &workspace_id).await;
        Ok(())
    }

    /// Tracks an invite event; other event names are rejected.
    pub async fn track_invite(&self, input: TrackEventInput) -> AppResult<()> {
        let is_invite = input
            .event
            .as_deref()
            .is_some_and(|event| EventName::parse(event.trim()).is_invite());
        if input.event.is_some() && !is_invite {
            return Err(AppError::Validation(
                "event must be invite_sent or invite_accepted".to_owned(),
            ));
        }

        self.track_event(input).await
    }

    /// Marks a workspace as having a project in the summary store.
    pub async fn record_project(
        &self,
        workspace_id: Option<String>,
    ) -> AppResult<WorkspaceSummary> {
        let workspace_id = required_workspace_id(workspace_id)?;
        let mut update = SummaryUpdate::new(workspace_id);
        update.has_project = Some(true);
        self.summary_store.upsert_summary(update).await
    }

    /// Adds one completed task to a workspace in the summary store.
    pub async fn record_task(&self, workspace_id: Option<String>) -> AppResult<WorkspaceSummary> {
        let workspace_id = required_workspace_id(workspace_id)?;
        self.summary_store.increment_task_count(&workspace_id).await
    }

    async fn apply_store_side_effects(&self, event: &EventName, workspace_id: &WorkspaceId) {
        let mut update = SummaryUpdate::new(workspace_id.clone());
        match event {
            EventName::ProjectCreated => update.has_project = Some(true),
            EventName::InviteSent => update.invite_sent = Some(true),
            EventName::InviteAccepted => update.invite_accepted = Some(true),
            EventName::TaskCompleted => {
                if let Err(error) = self.summary_store.increment_task_count(workspace_id).await {
                    warn!(
                        workspace_id = %workspace_id,
                        error = %error,
                        "failed to update stored task count"
                    );
                }
                return;
            }
            _ => return,
        }

        self.update_store_best_effort(update).await;
    }

    async fn update_store_best_effort(&self, update: SummaryUpdate) {
        let workspace_id = update.workspace_id.clone();
        if let Err(error) = self.summary_store.upsert_summary(update).await {
            warn!(
                workspace_id = %workspace_id,
                error = %error,
                "failed to update stored workspace summary"
            );
        }
    }
}

fn required_workspace_id(workspace_id: Option<String>) -> AppResult<WorkspaceId> {
    workspace_id
        .map(WorkspaceId::new)
        .transpose()
        .ok()
        .flatten()
        .ok_or_else(|| AppError::Validation("missing workspaceId".to_owned()))
}

/// Merges caller properties, segment attribution and the workspace id.
///
/// The workspace id always matches the group the event is attributed to.
fn build_event_properties(
    workspace_id: &WorkspaceId,
    properties: Map<String, Value>,
    segment: Option<SegmentSelection>,
) -> Map<String, Value> {
    let mut merged = properties;
    if let Some(segment) = segment {
        merged.extend(segment.to_properties());
    }
    merged.insert(
        WORKSPACE_ID_PROPERTY.to_owned(),
        json!(workspace_id.as_str()),
    );
    merged
}

#[cfg(test)]
mod tests;
