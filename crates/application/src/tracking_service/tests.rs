use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, json};
use tokio::sync::Mutex;

use pulse_core::{AppError, AppResult, WorkspaceId};
use pulse_domain::{EventName, SegmentPlan, SegmentSelection, WorkspaceSummary};

use crate::activation_ports::{SummaryStore, SummaryUpdate};
use crate::capture_ports::{CaptureEvent, EventCapture, GroupIdentify};

use super::{CreateWorkspaceInput, TrackEventInput, TrackingService};

#[derive(Default)]
struct RecordingCapture {
    events: Mutex<Vec<CaptureEvent>>,
    groups: Mutex<Vec<GroupIdentify>>,
    failing: bool,
}

#[async_trait]
impl EventCapture for RecordingCapture {
    async fn capture(&self, event: CaptureEvent) -> AppResult<()> {
        if self.failing {
            return Err(AppError::Internal("posthog rejected event".to_owned()));
        }
        self.events.lock().await.push(event);
        Ok(())
    }

    async fn group_identify(&self, group: GroupIdentify) -> AppResult<()> {
        if self.failing {
            return Err(AppError::Internal("posthog rejected group".to_owned()));
        }
        self.groups.lock().await.push(group);
        Ok(())
    }
}

#[derive(Default)]
struct FakeSummaryStore {
    summaries: Mutex<HashMap<WorkspaceId, WorkspaceSummary>>,
    broken: bool,
}

impl FakeSummaryStore {
    async fn get(&self, workspace_id: &str) -> Option<WorkspaceSummary> {
        let workspace_id = WorkspaceId::new(workspace_id).unwrap_or_else(|_| unreachable!());
        self.summaries.lock().await.get(&workspace_id).cloned()
    }
}

#[async_trait]
impl SummaryStore for FakeSummaryStore {
    async fn find_summary(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<Option<WorkspaceSummary>> {
        Ok(self.summaries.lock().await.get(workspace_id).cloned())
    }

    async fn list_summaries(&self) -> AppResult<Vec<WorkspaceSummary>> {
        Ok(self.summaries.lock().await.values().cloned().collect())
    }

    async fn upsert_summary(&self, update: SummaryUpdate) -> AppResult<WorkspaceSummary> {
        if self.broken {
            return Err(AppError::Unavailable("store offline".to_owned()));
        }
        let mut summaries = self.summaries.lock().await;
        let existing = summaries.remove(&update.workspace_id);
        let summary = update.apply(existing, Utc::now());
        summaries.insert(update.workspace_id.clone(), summary.clone());
        Ok(summary)
    }

    async fn increment_task_count(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<WorkspaceSummary> {
        if self.broken {
            return Err(AppError::Unavailable("store offline".to_owned()));
        }
        let mut summaries = self.summaries.lock().await;
        let existing = summaries.remove(workspace_id);
        let mut summary = SummaryUpdate::new(workspace_id.clone()).apply(existing, Utc::now());
        summary.record_task_completed();
        summaries.insert(workspace_id.clone(), summary.clone());
        Ok(summary)
    }
}

fn service(capture: &Arc<RecordingCapture>, store: &Arc<FakeSummaryStore>) -> TrackingService {
    TrackingService::new(capture.clone(), store.clone())
}

fn track(event: &str, properties: Map<String, serde_json::Value>) -> TrackEventInput {
    TrackEventInput {
        event: Some(event.to_owned()),
        distinct_id: Some("user_1".to_owned()),
        workspace_id: Some("ws_1".to_owned()),
        properties,
        segment: None,
    }
}

fn task_properties() -> Map<String, serde_json::Value> {
    let mut properties = Map::new();
    properties.insert("task_id".to_owned(), json!("task_1"));
    properties.insert("project_id".to_owned(), json!("proj_1"));
    properties
}

#[tokio::test]
async fn create_workspace_identifies_group_captures_and_stores() {
    let capture = Arc::new(RecordingCapture::default());
    let store = Arc::new(FakeSummaryStore::default());
    let mut properties = Map::new();
    properties.insert("workspace_id".to_owned(), json!("caller_value"));
    properties.insert("source".to_owned(), json!("signup"));

    let workspace_id = service(&capture, &store)
        .create_workspace(CreateWorkspaceInput {
            name: Some("Acme".to_owned()),
            user_id: Some("user_1".to_owned()),
            properties,
            segment: None,
        })
        .await
        .unwrap_or_else(|_| unreachable!());

    let groups = capture.groups.lock().await;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].workspace_id, workspace_id);
    assert_eq!(groups[0].name, "Acme");

    let events = capture.events.lock().await;
    assert_eq!(events[0].event, EventName::WorkspaceCreated);
    assert_eq!(
        events[0].properties.get("workspace_id"),
        Some(&json!(workspace_id.as_str()))
    );
    assert_eq!(events[0].properties.get("workspace_name"), Some(&json!("Acme")));
    assert_eq!(events[0].properties.get("source"), Some(&json!("signup")));

    let stored = store.get(workspace_id.as_str()).await;
    let Some(stored) = stored else {
        panic!("workspace should be stored");
    };
    assert_eq!(stored.workspace_name(), "Acme");
    assert!(!stored.is_activated());
}

#[tokio::test]
async fn create_workspace_requires_name_and_user() {
    let capture = Arc::new(RecordingCapture::default());
    let store = Arc::new(FakeSummaryStore::default());

    let result = service(&capture, &store)
        .create_workspace(CreateWorkspaceInput {
            name: Some("  ".to_owned()),
            user_id: Some("user_1".to_owned()),
            ..CreateWorkspaceInput::default()
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(capture.groups.lock().await.is_empty());
}

#[tokio::test]
async fn create_workspace_survives_store_failure() {
    let capture = Arc::new(RecordingCapture::default());
    let store = Arc::new(FakeSummaryStore {
        broken: true,
        ..FakeSummaryStore::default()
    });

    let result = service(&capture, &store)
        .create_workspace(CreateWorkspaceInput {
            name: Some("Acme".to_owned()),
            user_id: Some("user_1".to_owned()),
            ..CreateWorkspaceInput::default()
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(capture.events.lock().await.len(), 1);
}

#[tokio::test]
async fn track_event_requires_identifiers() {
    let capture = Arc::new(RecordingCapture::default());
    let store = Arc::new(FakeSummaryStore::default());

    let result = service(&capture, &store)
        .track_event(TrackEventInput {
            event: Some("project_created".to_owned()),
            distinct_id: Some("user_1".to_owned()),
            ..TrackEventInput::default()
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn track_event_rejects_missing_schema_properties() {
    let capture = Arc::new(RecordingCapture::default());
    let store = Arc::new(FakeSummaryStore::default());

    let result = service(&capture, &store)
        .track_event(track("task_completed", Map::new()))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(capture.events.lock().await.is_empty());
}

#[tokio::test]
async fn track_event_attributes_workspace_and_segment() {
    let capture = Arc::new(RecordingCapture::default());
    let store = Arc::new(FakeSummaryStore::default());
    let mut properties = Map::new();
    properties.insert("workspace_id".to_owned(), json!("spoofed"));

    service(&capture, &store)
        .track_event(TrackEventInput {
            segment: Some(SegmentSelection {
                plan: SegmentPlan::Pro,
                ..SegmentSelection::default()
            }),
            ..track("invite_sent", properties)
        })
        .await
        .unwrap_or_else(|_| unreachable!());

    let events = capture.events.lock().await;
    assert_eq!(events[0].workspace_id.as_str(), "ws_1");
    assert_eq!(events[0].properties.get("workspace_id"), Some(&json!("ws_1")));
    assert_eq!(events[0].properties.get("segment_plan"), Some(&json!("pro")));

    let stored = store.get("ws_1").await;
    assert!(stored.is_some_and(|summary| summary.invite_sent()));
}

#[tokio::test]
async fn tracked_project_and_tasks_activate_stored_workspace() {
    let capture = Arc::new(RecordingCapture::default());
    let store = Arc::new(FakeSummaryStore::default());
    let tracking = service(&capture, &store);
    let mut project = Map::new();
    project.insert("project_id".to_owned(), json!("proj_1"));

    tracking
        .track_event(track("project_created", project))
        .await
        .unwrap_or_else(|_| unreachable!());
    for _ in 0..3 {
        tracking
            .track_event(track("task_completed", task_properties()))
            .await
            .unwrap_or_else(|_| unreachable!());
    }

    let Some(stored) = store.get("ws_1").await else {
        panic!("workspace should be stored");
    };
    assert!(stored.has_project());
    assert_eq!(stored.task_count(), 3);
    assert!(stored.is_activated());
}

#[tokio::test]
async fn unknown_events_are_forwarded_without_store_changes() {
    let capture = Arc::new(RecordingCapture::default());
    let store = Arc::new(FakeSummaryStore::default());

    service(&capture, &store)
        .track_event(track("page_viewed", Map::new()))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(
        capture.events.lock().await[0].event,
        EventName::Other("page_viewed".to_owned())
    );
    assert!(store.get("ws_1").await.is_none());
}

#[tokio::test]
async fn capture_failure_is_returned_and_store_untouched() {
    let capture = Arc::new(RecordingCapture {
        failing: true,
        ..RecordingCapture::default()
    });
    let store = Arc::new(FakeSummaryStore::default());

    let result = service(&capture, &store)
        .track_event(track("invite_accepted", Map::new()))
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert!(store.get("ws_1").await.is_none());
}

#[tokio::test]
async fn track_invite_rejects_other_events() {
    let capture = Arc::new(RecordingCapture::default());
    let store = Arc::new(FakeSummaryStore::default());
    let tracking = service(&capture, &store);

    let rejected = tracking
        .track_invite(track("task_completed", task_properties()))
        .await;
    let accepted = tracking.track_invite(track("invite_accepted", Map::new())).await;

    assert!(matches!(rejected, Err(AppError::Validation(_))));
    assert!(accepted.is_ok());
    assert_eq!(capture.events.lock().await.len(), 1);
}

#[tokio::test]
async fn record_endpoints_update_store_only() {
    let capture = Arc::new(RecordingCapture::default());
    let store = Arc::new(FakeSummaryStore::default());
    let tracking = service(&capture, &store);

    tracking
        .record_project(Some("ws_9".to_owned()))
        .await
        .unwrap_or_else(|_| unreachable!());
    let summary = tracking
        .record_task(Some("ws_9".to_owned()))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(summary.has_project());
    assert_eq!(summary.task_count(), 1);
    assert!(capture.events.lock().await.is_empty());
    assert!(matches!(
        tracking.record_task(None).await,
        Err(AppError::Validation(_))
    ));
}
