use pulse_application::{SummaryStore, SummaryUpdate};
use pulse_core::{ActorId, WorkspaceId};
use pulse_domain::DEFAULT_WORKSPACE_NAME;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresSummaryStore;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres summary store tests: {error}");
    }

    Some(pool)
}

fn unique_workspace() -> WorkspaceId {
    WorkspaceId::new(format!("ws_{}", Uuid::new_v4().simple())).unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn upsert_creates_then_patches_summary() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresSummaryStore::new(pool);
    let workspace_id = unique_workspace();

    let mut created = SummaryUpdate::new(workspace_id.clone());
    created.workspace_name = Some("Acme".to_owned());
    created.actor_id = Some(ActorId::new("user_1").unwrap_or_else(|_| unreachable!()));
    created.task_count = Some(3);
    let first = store.upsert_summary(created).await;
    assert!(first.as_ref().is_ok_and(|summary| !summary.is_activated()));

    let mut project = SummaryUpdate::new(workspace_id.clone());
    project.has_project = Some(true);
    let Ok(patched) = store.upsert_summary(project).await else {
        panic!("patch should succeed");
    };

    assert_eq!(patched.workspace_name(), "Acme");
    assert_eq!(patched.actor_id().map(ActorId::as_str), Some("user_1"));
    assert!(patched.is_activated());
}

#[tokio::test]
async fn increment_creates_missing_workspace_with_defaults() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresSummaryStore::new(pool);
    let workspace_id = unique_workspace();

    let _ = store.increment_task_count(&workspace_id).await;
    let Ok(summary) = store.increment_task_count(&workspace_id).await else {
        panic!("increment should succeed");
    };

    assert_eq!(summary.workspace_name(), DEFAULT_WORKSPACE_NAME);
    assert_eq!(summary.task_count(), 2);
    assert!(!summary.has_project());
}

#[tokio::test]
async fn find_returns_none_for_unknown_workspace() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresSummaryStore::new(pool);

    let found = store.find_summary(&unique_workspace()).await;

    assert!(matches!(found, Ok(None)));
}
