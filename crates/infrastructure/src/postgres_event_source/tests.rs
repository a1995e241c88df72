use pulse_application::EventSource;
use pulse_core::WorkspaceId;
use pulse_domain::EventName;
use serde_json::json;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{EventTableLayout, PostgresEventSource, default_event_sources};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres event source tests: {error}");
    }

    Some(pool)
}

fn unique_workspace() -> String {
    format!("ws_{}", Uuid::new_v4().simple())
}

async fn insert_nested(pool: &PgPool, event: &str, workspace: &str, minutes_ago: i32) {
    let insert = sqlx::query(
        r#"
        INSERT INTO events_d7_new (event, distinct_id, timestamp, properties)
        VALUES ($1, 'user_test', now() - make_interval(mins => $2), $3)
        "#,
    )
    .bind(event)
    .bind(minutes_ago)
    .bind(json!({ "workspace_id": workspace, "workspace_name": "Nested" }))
    .execute(pool)
    .await;

    assert!(insert.is_ok());
}

#[tokio::test]
async fn default_sources_follow_lookup_priority() {
    let pool = match PgPoolOptions::new().connect_lazy("postgres://localhost/pulse") {
        Ok(pool) => pool,
        Err(error) => panic!("lazy pool should build: {error}"),
    };

    let names: Vec<String> = default_event_sources(pool)
        .iter()
        .map(|source| source.name().to_owned())
        .collect();

    assert_eq!(names, vec!["events_d7_new", "events_d7", "posthog_events"]);
}

#[tokio::test]
async fn nested_layout_reads_created_events_in_timestamp_order() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let source =
        PostgresEventSource::new(pool.clone(), "events_d7_new", EventTableLayout::NestedProperties);
    let later = unique_workspace();
    let earlier = unique_workspace();
    insert_nested(&pool, "workspace_created", &later, 1).await;
    insert_nested(&pool, "workspace_created", &earlier, 10).await;

    let created = source.fetch_workspace_created_events().await;
    let Ok(created) = created else {
        panic!("created events should load");
    };

    let ours: Vec<String> = created
        .iter()
        .filter_map(|event| event.resolved_workspace_id())
        .map(|workspace_id| workspace_id.to_string())
        .filter(|workspace_id| workspace_id == &later || workspace_id == &earlier)
        .collect();
    assert_eq!(ours, vec![earlier, later]);
}

#[tokio::test]
async fn nested_layout_filters_by_property() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let source =
        PostgresEventSource::new(pool.clone(), "events_d7_new", EventTableLayout::NestedProperties);
    let workspace = unique_workspace();
    insert_nested(&pool, "workspace_created", &workspace, 5).await;
    insert_nested(&pool, "task_completed", &workspace, 4).await;
    insert_nested(&pool, "task_completed", &unique_workspace(), 3).await;

    let workspace_id = WorkspaceId::new(workspace.as_str()).unwrap_or_else(|_| unreachable!());
    let events = source.fetch_events_for_workspace(&workspace_id).await;
    let Ok(events) = events else {
        panic!("workspace events should load");
    };

    assert_eq!(events.len(), 2);
    assert_eq!(events[1].name(), &EventName::TaskCompleted);
    assert_eq!(
        events[0].actor_id().map(|actor| actor.as_str()),
        Some("user_test")
    );
}

#[tokio::test]
async fn column_layout_uses_top_level_workspace_id() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let source =
        PostgresEventSource::new(pool.clone(), "events_d7", EventTableLayout::WorkspaceColumn);
    let workspace = unique_workspace();
    let insert = sqlx::query(
        r#"
        INSERT INTO events_d7 (event, distinct_id, workspace_id, properties)
        VALUES ('project_created', 'user_test', $1, '{}'::jsonb)
        "#,
    )
    .bind(workspace.as_str())
    .execute(&pool)
    .await;
    assert!(insert.is_ok());

    let workspace_id = WorkspaceId::new(workspace.as_str()).unwrap_or_else(|_| unreachable!());
    let events = source.fetch_events_for_workspace(&workspace_id).await;
    let Ok(events) = events else {
        panic!("workspace events should load");
    };

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].workspace_id(), Some(&workspace_id));
}

#[tokio::test]
async fn missing_table_is_reported_as_unavailable() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let source =
        PostgresEventSource::new(pool, "events_missing", EventTableLayout::NestedProperties);

    let result = source.fetch_workspace_created_events().await;

    assert!(matches!(result, Err(pulse_core::AppError::Unavailable(_))));
}
