use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_application::EventSource;
use pulse_core::{ActorId, AppError, AppResult, WorkspaceId};
use pulse_domain::{AnalyticsEvent, EventName};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::debug;

/// How a table exposes the workspace identifier of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTableLayout {
    /// Identifier nested at `properties->>'workspace_id'`.
    NestedProperties,
    /// Identifier stored in a top-level `workspace_id` column.
    WorkspaceColumn,
}

impl EventTableLayout {
    fn workspace_column(self) -> &'static str {
        match self {
            Self::NestedProperties => "NULL::text",
            Self::WorkspaceColumn => "workspace_id",
        }
    }

    fn workspace_predicate(self) -> &'static str {
        match self {
            Self::NestedProperties => "properties->>'workspace_id' = $1",
            Self::WorkspaceColumn => "workspace_id = $1",
        }
    }
}

/// PostgreSQL-backed event log table.
#[derive(Clone)]
pub struct PostgresEventSource {
    pool: PgPool,
    table: &'static str,
    layout: EventTableLayout,
}

impl PostgresEventSource {
    /// Creates a source reading `table` with the given layout.
    #[must_use]
    pub fn new(pool: PgPool, table: &'static str, layout: EventTableLayout) -> Self {
        Self {
            pool,
            table,
            layout,
        }
    }

    fn select_clause(&self) -> String {
        format!(
            "SELECT event, distinct_id, timestamp, properties, {} AS workspace_id FROM {}",
            self.layout.workspace_column(),
            self.table
        )
    }
}

/// Returns the event log tables in lookup priority order.
#[must_use]
pub fn default_event_sources(pool: PgPool) -> Vec<Arc<dyn EventSource>> {
    vec![
        Arc::new(PostgresEventSource::new(
            pool.clone(),
            "events_d7_new",
            EventTableLayout::NestedProperties,
        )),
        Arc::new(PostgresEventSource::new(
            pool.clone(),
            "events_d7",
            EventTableLayout::WorkspaceColumn,
        )),
        Arc::new(PostgresEventSource::new(
            pool,
            "posthog_events",
            EventTableLayout::NestedProperties,
        )),
    ]
}

#[derive(Debug, FromRow)]
struct EventRow {
    event: String,
    distinct_id: Option<String>,
    timestamp: DateTime<Utc>,
    properties: Option<Json<Value>>,
    workspace_id: Option<String>,
}

impl EventRow {
    fn into_event(self) -> AnalyticsEvent {
        let properties = match self.properties {
            Some(Json(Value::Object(properties))) => properties,
            _ => Map::new(),
        };
        let actor_id = self
            .distinct_id
            .and_then(|distinct_id| ActorId::new(distinct_id).ok());
        let event = AnalyticsEvent::new(EventName::parse(self.event.as_str()), self.timestamp)
            .with_actor_id(actor_id)
            .with_properties(properties);

        match self
            .workspace_id
            .and_then(|workspace_id| WorkspaceId::new(workspace_id).ok())
        {
            Some(workspace_id) => event.with_workspace_id(workspace_id),
            None => event,
        }
    }
}

#[async_trait]
impl EventSource for PostgresEventSource {
    fn name(&self) -> &str {
        self.table
    }

    async fn fetch_workspace_created_events(&self) -> AppResult<Vec<AnalyticsEvent>> {
        let query = format!(
            "{} WHERE event = $1 ORDER BY timestamp ASC",
            self.select_clause()
        );
        let rows = sqlx::query_as::<_, EventRow>(query.as_str())
            .bind(EventName::WorkspaceCreated.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Unavailable(format!(
                    "failed to list workspace_created events from '{}': {error}",
                    self.table
                ))
            })?;

        debug!(
            table = self.table,
            row_count = rows.len(),
            "fetched workspace_created events"
        );
        Ok(rows.into_iter().map(EventRow::into_event).collect())
    }

    async fn fetch_events_for_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<Vec<AnalyticsEvent>> {
        let query = format!(
            "{} WHERE {} ORDER BY timestamp ASC",
            self.select_clause(),
            self.layout.workspace_predicate()
        );
        let rows = sqlx::query_as::<_, EventRow>(query.as_str())
            .bind(workspace_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to list events for workspace '{workspace_id}' from '{}': {error}",
                    self.table
                ))
            })?;

        Ok(rows.into_iter().map(EventRow::into_event).collect())
    }
}

#[cfg(test)]
mod tests;
