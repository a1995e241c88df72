//! Workspace activation aggregation over prioritized event sources.
//!
//! Summaries are recomputed from the raw event log on every call. Sources are
//! tried in order and the first one announcing at least one workspace wins;
//! results from different sources are never merged.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use pulse_core::WorkspaceId;
use pulse_domain::{AnalyticsEvent, EventName, WorkspaceSummary};
use tracing::{debug, info, warn};

use crate::activation_ports::EventSource;

/// Stateless activation aggregator.
#[derive(Clone)]
pub struct ActivationService {
    sources: Vec<Arc<dyn EventSource>>,
    deadline: Option<Duration>,
}

impl ActivationService {
    /// Creates an aggregator over sources listed in priority order.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn EventSource>>) -> Self {
        Self {
            sources,
            deadline: None,
        }
    }

    /// Bounds the whole aggregation call; on expiry it yields no summaries.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns the configured source names in priority order.
    #[must_use]
    pub fn source_names(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|source| source.name().to_owned())
            .collect()
    }

    /// Computes one summary per distinct workspace.
    ///
    /// Never fails: unreachable sources are skipped, workspaces whose events
    /// cannot be fetched are dropped, and no data yields an empty list.
    pub async fn compute_workspace_summaries(&self) -> Vec<WorkspaceSummary> {
        let Some(deadline) = self.deadline else {
            return self.aggregate().await;
        };

        match tokio::time::timeout(deadline, self.aggregate()).await {
            Ok(summaries) => summaries,
            Err(_) => {
                warn!(
                    deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                    "activation aggregation exceeded deadline"
                );
                Vec::new()
            }
        }
    }

    async fn aggregate(&self) -> Vec<WorkspaceSummary> {
        for source in &self.sources {
            let created_events = match source.fetch_workspace_created_events().await {
                Ok(events) => events,
                Err(error) => {
                    warn!(
                        source = source.name(),
                        error = %error,
                        "event source unavailable, trying next source"
                    );
                    continue;
                }
            };

            if created_events.is_empty() {
                debug!(source = source.name(), "event source has no workspaces");
                continue;
            }

            let summaries = summarize_source(source.as_ref(), created_events).await;
            info!(
                source = source.name(),
                workspace_count = summaries.len(),
                "computed workspace summaries"
            );
            return summaries;
        }

        Vec::new()
    }
}

async fn summarize_source(
    source: &dyn EventSource,
    created_events: Vec<AnalyticsEvent>,
) -> Vec<WorkspaceSummary> {
    let announcements = first_announcements(created_events);

    let summaries = announcements
        .iter()
        .map(|(workspace_id, created_event)| async move {
            match source.fetch_events_for_workspace(workspace_id).await {
                Ok(events) => Some(WorkspaceSummary::from_events(
                    workspace_id.clone(),
                    created_event,
                    &events,
                )),
                Err(error) => {
                    warn!(
                        source = source.name(),
                        workspace_id = %workspace_id,
                        error = %error,
                        "failed to fetch workspace events, skipping workspace"
                    );
                    None
                }
            }
        });

    join_all(summaries).await.into_iter().flatten().collect()
}

/// Keeps the earliest `workspace_created` event of every workspace, in order
/// of first appearance.
fn first_announcements(
    mut created_events: Vec<AnalyticsEvent>,
) -> Vec<(WorkspaceId, AnalyticsEvent)> {
    created_events.sort_by_key(AnalyticsEvent::timestamp);

    let mut seen = HashSet::new();
    created_events
        .into_iter()
        .filter(|event| *event.name() == EventName::WorkspaceCreated)
        .filter_map(|event| {
            let workspace_id = event.resolved_workspace_id()?;
            seen.insert(workspace_id.clone()).then_some((workspace_id, event))
        })
        .collect()
}
