use async_trait::async_trait;
use chrono::Utc;
use pulse_application::{SummaryStore, SummaryUpdate};
use pulse_core::{AppResult, WorkspaceId};
use pulse_domain::WorkspaceSummary;
use tokio::sync::RwLock;

/// Process-local summary store keeping insertion order.
#[derive(Default)]
pub struct InMemorySummaryStore {
    summaries: RwLock<Vec<WorkspaceSummary>>,
}

impl InMemorySummaryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SummaryStore for InMemorySummaryStore {
    async fn find_summary(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<Option<WorkspaceSummary>> {
        Ok(self
            .summaries
            .read()
            .await
            .iter()
            .find(|summary| summary.workspace_id() == workspace_id)
            .cloned())
    }

    async fn list_summaries(&self) -> AppResult<Vec<WorkspaceSummary>> {
        Ok(self.summaries.read().await.clone())
    }

    async fn upsert_summary(&self, update: SummaryUpdate) -> AppResult<WorkspaceSummary> {
        let mut summaries = self.summaries.write().await;
        let position = summaries
            .iter()
            .position(|summary| summary.workspace_id() == &update.workspace_id);

        let summary = match position {
            Some(index) => {
                let updated = update.apply(Some(summaries[index].clone()), Utc::now());
                summaries[index] = updated.clone();
                updated
            }
            None => {
                let created = update.apply(None, Utc::now());
                summaries.push(created.clone());
                created
            }
        };

        Ok(summary)
    }

    async fn increment_task_count(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<WorkspaceSummary> {
        let mut summaries = self.summaries.write().await;
        let position = summaries
            .iter()
            .position(|summary| summary.workspace_id() == workspace_id);

        let summary = match position {
            Some(index) => {
                summaries[index].record_task_completed();
                summaries[index].clone()
            }
            None => {
                let mut created = SummaryUpdate::new(workspace_id.clone()).apply(None, Utc::now());
                created.record_task_completed();
                summaries.push(created.clone());
                created
            }
        };

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pulse_application::{SummaryStore, SummaryUpdate};
    use pulse_core::WorkspaceId;
    use pulse_domain::DEFAULT_WORKSPACE_NAME;

    use super::InMemorySummaryStore;

    fn workspace_id(value: &str) -> WorkspaceId {
        WorkspaceId::new(value).unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn upsert_of_unknown_workspace_creates_defaults() {
        let store = InMemorySummaryStore::new();

        let summary = store
            .upsert_summary(SummaryUpdate::new(workspace_id("ws_1")))
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(summary.workspace_name(), DEFAULT_WORKSPACE_NAME);
        assert!(!summary.has_project());
        assert_eq!(summary.task_count(), 0);
        assert!(!summary.is_activated());
    }

    #[tokio::test]
    async fn partial_updates_keep_other_fields_and_recompute_activation() {
        let store = InMemorySummaryStore::new();
        let mut named = SummaryUpdate::new(workspace_id("ws_1"));
        named.workspace_name = Some("Acme".to_owned());
        named.task_count = Some(3);
        let _ = store.upsert_summary(named).await;

        let mut project = SummaryUpdate::new(workspace_id("ws_1"));
        project.has_project = Some(true);
        let summary = store
            .upsert_summary(project)
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(summary.workspace_name(), "Acme");
        assert!(summary.is_activated());
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = InMemorySummaryStore::new();
        for id in ["ws_b", "ws_a", "ws_c"] {
            let _ = store.upsert_summary(SummaryUpdate::new(workspace_id(id))).await;
        }
        let _ = store.increment_task_count(&workspace_id("ws_a")).await;

        let ids: Vec<String> = store
            .list_summaries()
            .await
            .unwrap_or_else(|_| unreachable!())
            .iter()
            .map(|summary| summary.workspace_id().to_string())
            .collect();

        assert_eq!(ids, vec!["ws_b", "ws_a", "ws_c"]);
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemorySummaryStore::new());
        let handles: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment_task_count(&workspace_id("ws_1")).await })
            })
            .collect();
        for handle in handles {
            assert!(matches!(handle.await, Ok(Ok(_))));
        }

        let summary = store
            .find_summary(&workspace_id("ws_1"))
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(summary.map(|summary| summary.task_count()), Some(20));
    }
}
