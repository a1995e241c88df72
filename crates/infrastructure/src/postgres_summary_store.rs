use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_application::{SummaryStore, SummaryUpdate};
use pulse_core::{ActorId, AppError, AppResult, WorkspaceId};
use pulse_domain::{DEFAULT_WORKSPACE_NAME, WorkspaceSummary};
use sqlx::{FromRow, PgPool};

const SUMMARY_COLUMNS: &str = "workspace_id, workspace_name, created_at, actor_id, has_project, \
                               task_count, invite_sent, invite_accepted";

/// PostgreSQL-backed workspace summary store.
///
/// Activation is derived on read and never stored.
#[derive(Clone)]
pub struct PostgresSummaryStore {
    pool: PgPool,
}

impl PostgresSummaryStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    workspace_id: String,
    workspace_name: String,
    created_at: DateTime<Utc>,
    actor_id: Option<String>,
    has_project: bool,
    task_count: i32,
    invite_sent: bool,
    invite_accepted: bool,
}

impl TryFrom<SummaryRow> for WorkspaceSummary {
    type Error = AppError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        let workspace_id = WorkspaceId::new(row.workspace_id)?;
        let task_count = u32::try_from(row.task_count).map_err(|error| {
            AppError::Internal(format!(
                "stored task count for workspace '{workspace_id}' is invalid: {error}"
            ))
        })?;
        let actor_id = row.actor_id.and_then(|actor_id| ActorId::new(actor_id).ok());

        Ok(
            WorkspaceSummary::new(workspace_id, row.workspace_name, row.created_at, actor_id)
                .with_progress(
                    row.has_project,
                    task_count,
                    row.invite_sent,
                    row.invite_accepted,
                ),
        )
    }
}

#[async_trait]
impl SummaryStore for PostgresSummaryStore {
    async fn find_summary(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<Option<WorkspaceSummary>> {
        let query =
            format!("SELECT {SUMMARY_COLUMNS} FROM workspace_summaries WHERE workspace_id = $1");
        let row = sqlx::query_as::<_, SummaryRow>(query.as_str())
            .bind(workspace_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to find summary for workspace '{workspace_id}': {error}"
                ))
            })?;

        row.map(WorkspaceSummary::try_from).transpose()
    }

    async fn list_summaries(&self) -> AppResult<Vec<WorkspaceSummary>> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM workspace_summaries ORDER BY created_at ASC, workspace_id ASC"
        );
        let rows = sqlx::query_as::<_, SummaryRow>(query.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list workspace summaries: {error}"))
            })?;

        rows.into_iter().map(WorkspaceSummary::try_from).collect()
    }

    async fn upsert_summary(&self, update: SummaryUpdate) -> AppResult<WorkspaceSummary> {
        let task_count = update
            .task_count
            .map(i32::try_from)
            .transpose()
            .map_err(|error| AppError::Validation(format!("task count out of range: {error}")))?;

        let query = format!(
            r#"
            INSERT INTO workspace_summaries (
                workspace_id,
                workspace_name,
                created_at,
                actor_id,
                has_project,
                task_count,
                invite_sent,
                invite_accepted
            )
            VALUES (
                $1,
                COALESCE(NULLIF(btrim($2), ''), $9),
                COALESCE($3, now()),
                $4,
                COALESCE($5, FALSE),
                COALESCE($6, 0),
                COALESCE($7, FALSE),
                COALESCE($8, FALSE)
            )
            ON CONFLICT (workspace_id) DO UPDATE SET
                workspace_name = COALESCE(NULLIF(btrim($2), ''), workspace_summaries.workspace_name),
                has_project = COALESCE($5, workspace_summaries.has_project),
                task_count = COALESCE($6, workspace_summaries.task_count),
                invite_sent = COALESCE($7, workspace_summaries.invite_sent),
                invite_accepted = COALESCE($8, workspace_summaries.invite_accepted),
                updated_at = now()
            RETURNING {SUMMARY_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, SummaryRow>(query.as_str())
            .bind(update.workspace_id.as_str())
            .bind(update.workspace_name.as_deref())
            .bind(update.created_at)
            .bind(update.actor_id.as_ref().map(ActorId::as_str))
            .bind(update.has_project)
            .bind(task_count)
            .bind(update.invite_sent)
            .bind(update.invite_accepted)
            .bind(DEFAULT_WORKSPACE_NAME)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to upsert summary for workspace '{}': {error}",
                    update.workspace_id
                ))
            })?;

        WorkspaceSummary::try_from(row)
    }

    async fn increment_task_count(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<WorkspaceSummary> {
        let query = format!(
            r#"
            INSERT INTO workspace_summaries (workspace_id, workspace_name, task_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (workspace_id) DO UPDATE SET
                task_count = workspace_summaries.task_count + 1,
                updated_at = now()
            RETURNING {SUMMARY_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, SummaryRow>(query.as_str())
            .bind(workspace_id.as_str())
            .bind(DEFAULT_WORKSPACE_NAME)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to increment task count for workspace '{workspace_id}': {error}"
                ))
            })?;

        WorkspaceSummary::try_from(row)
    }
}

#[cfg(test)]
mod tests;
