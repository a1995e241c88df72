use std::sync::Arc;

use pulse_core::{ActorId, AppError, AppResult, WorkspaceId};
use pulse_domain::{
    ActivationSnapshot, AnomalyMetric, EventName, InsightOperation, SqlQueryType,
    WORKSPACE_ID_PROPERTY, assess_generated_sql, validate_event_properties,
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::capture_ports::{CaptureEvent, EventCapture};
use crate::dashboard_service::DashboardService;
use crate::insight_ports::{LlmClient, LlmRequest, LlmTrace, LlmTraceRecorder};

mod evaluation;
mod prompts;

pub use evaluation::{EvaluationResult, EvaluationSubject, InsightEvaluator};

/// Activation rate under which an anomaly alert is raised by default.
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 0.5;

/// Message returned when activation is at or above the threshold.
pub const WITHIN_RANGE_MESSAGE: &str = "D7 metrics within normal range";

const SUCCESS_SCORE: &str = "success";

/// Per-operation model overrides. Unset entries use the client default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsightModels {
    /// Model for anomaly analysis.
    pub anomaly: Option<String>,
    /// Model for SQL generation.
    pub sql: Option<String>,
    /// Model for PDR drafting.
    pub pdr: Option<String>,
}

impl InsightModels {
    fn for_operation(&self, operation: InsightOperation) -> Option<String> {
        match operation {
            InsightOperation::Anomaly => self.anomaly.clone(),
            InsightOperation::Sql => self.sql.clone(),
            InsightOperation::Pdr => self.pdr.clone(),
        }
    }
}

/// Who an insight is generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightRequester {
    user_id: ActorId,
    workspace_id: WorkspaceId,
}

impl InsightRequester {
    /// Validates the requesting user and workspace.
    pub fn new(user_id: Option<String>, workspace_id: Option<String>) -> AppResult<Self> {
        let missing = || AppError::Validation("missing userId or workspaceId".to_owned());
        let user_id = ActorId::new(user_id.ok_or_else(missing)?).map_err(|_| missing())?;
        let workspace_id =
            WorkspaceId::new(workspace_id.ok_or_else(missing)?).map_err(|_| missing())?;

        Ok(Self {
            user_id,
            workspace_id,
        })
    }

    /// Returns the requesting user.
    #[must_use]
    pub fn user_id(&self) -> &ActorId {
        &self.user_id
    }

    /// Returns the workspace the insight is attributed to.
    #[must_use]
    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }
}

/// Result of an anomaly check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    /// Whether activation fell below the threshold.
    pub alert: bool,
    /// Current activation rate.
    pub activation_rate: f64,
    /// Threshold the rate was compared to.
    pub threshold: f64,
    /// Root-cause analysis, or the within-range message.
    pub message: String,
    /// Trace of the analysis call, when one was made.
    pub trace_id: Option<String>,
    /// Judge verdict, when evaluation is enabled.
    pub evaluation: Option<EvaluationResult>,
}

/// Generated SQL and its guard outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSql {
    /// Query text as returned by the model.
    pub sql: String,
    /// Trace of the generation call.
    pub trace_id: String,
    /// Whether the query is free of dangerous keywords.
    pub validated: bool,
    /// Whether the query was refused.
    pub rejected: bool,
    /// Judge verdict, when evaluation is enabled.
    pub evaluation: Option<EvaluationResult>,
}

/// Drafted PDR card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdrCard {
    /// Card text.
    pub pdr: String,
    /// Trace of the drafting call.
    pub trace_id: String,
    /// Activation rate the card was drafted from.
    pub omtm_score: f64,
    /// Judge verdict, when evaluation is enabled.
    pub evaluation: Option<EvaluationResult>,
}

/// LLM-backed insights over activation metrics.
#[derive(Clone)]
pub struct InsightService {
    dashboard_service: DashboardService,
    llm_client: Arc<dyn LlmClient>,
    event_capture: Arc<dyn EventCapture>,
    trace_recorder: Arc<dyn LlmTraceRecorder>,
    evaluator: Option<InsightEvaluator>,
    models: InsightModels,
}

impl InsightService {
    /// Creates an insight service without evaluation.
    #[must_use]
    pub fn new(
        dashboard_service: DashboardService,
        llm_client: Arc<dyn LlmClient>,
        event_capture: Arc<dyn EventCapture>,
        trace_recorder: Arc<dyn LlmTraceRecorder>,
    ) -> Self {
        Self {
            dashboard_service,
            llm_client,
            event_capture,
            trace_recorder,
            evaluator: None,
            models: InsightModels::default(),
        }
    }

    /// Enables LLM-as-judge evaluation of every generated insight.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Option<InsightEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Sets per-operation model overrides.
    #[must_use]
    pub fn with_models(mut self, models: InsightModels) -> Self {
        self.models = models;
        self
    }

    /// Compares activation against `threshold` and explains a drop.
    pub async fn detect_anomaly(
        &self,
        requester: &InsightRequester,
        threshold: Option<f64>,
    ) -> AppResult<AnomalyReport> {
        let threshold = threshold.unwrap_or(DEFAULT_ANOMALY_THRESHOLD);
        if !threshold.is_finite() {
            return Err(AppError::Validation(
                "threshold must be a finite number".to_owned(),
            ));
        }

        let snapshot = self.dashboard_service.activation_snapshot().await;
        let activation_rate = snapshot.activation_rate();
        if !snapshot.is_below(threshold) {
            return Ok(AnomalyReport {
                alert: false,
                activation_rate,
                threshold,
                message: WITHIN_RANGE_MESSAGE.to_owned(),
                trace_id: None,
                evaluation: None,
            });
        }

        let (analysis, trace_id) = self
            .call_llm(
                requester,
                InsightOperation::Anomaly,
                prompts::ANOMALY_SYSTEM_PROMPT.to_owned(),
                prompts::anomaly_prompt(&snapshot, threshold),
            )
            .await?;

        let mut properties = Map::new();
        properties.insert("metric".to_owned(), json!(AnomalyMetric::D7Activation.as_str()));
        properties.insert("threshold".to_owned(), json!(threshold));
        properties.insert("actual_value".to_owned(), json!(activation_rate));
        properties.insert("suggested_action".to_owned(), json!(analysis));
        self.capture_insight(EventName::AiAnomalyAlerted, requester, &trace_id, properties)
            .await?;

        let evaluation = self
            .evaluate(
                EvaluationSubject::Anomaly {
                    analysis: &analysis,
                    activation_rate,
                    threshold,
                },
                &trace_id,
                requester,
            )
            .await;

        Ok(AnomalyReport {
            alert: true,
            activation_rate,
            threshold,
            message: analysis,
            trace_id: Some(trace_id),
            evaluation,
        })
    }

    /// Turns a natural-language question into read-only SQL.
    ///
    /// Rejected queries are returned with `rejected` set and are not captured.
    pub async fn generate_sql(
        &self,
        requester: &InsightRequester,
        natural_language_query: Option<String>,
        query_type: Option<String>,
    ) -> AppResult<GeneratedSql> {
        let natural_language_query = natural_language_query
            .filter(|query| !query.trim().is_empty())
            .ok_or_else(|| AppError::Validation("missing naturalLanguageQuery".to_owned()))?;
        let query_type = match query_type {
            Some(value) => value.parse::<SqlQueryType>()?,
            None => SqlQueryType::Custom,
        };

        let (sql, trace_id) = self
            .call_llm(
                requester,
                InsightOperation::Sql,
                prompts::sql_system_prompt(),
                natural_language_query.clone(),
            )
            .await?;

        let assessment = assess_generated_sql(&sql);
        if assessment.rejected {
            warn!(
                trace_id = %trace_id,
                workspace_id = %requester.workspace_id,
                "generated sql rejected by keyword guard"
            );
            return Ok(GeneratedSql {
                sql,
                trace_id,
                validated: false,
                rejected: true,
                evaluation: None,
            });
        }

        let mut properties = Map::new();
        properties.insert("query_type".to_owned(), json!(query_type.as_str()));
        properties.insert("query_validated".to_owned(), json!(assessment.validated()));
        self.capture_insight(EventName::AiSqlGenerated, requester, &trace_id, properties)
            .await?;

        let evaluation = self
            .evaluate(
                EvaluationSubject::Sql {
                    sql: &sql,
                    natural_language_query: &natural_language_query,
                },
                &trace_id,
                requester,
            )
            .await;

        Ok(GeneratedSql {
            sql,
            trace_id,
            validated: assessment.validated(),
            rejected: false,
            evaluation,
        })
    }

    /// Drafts a PDR card from current activation figures.
    pub async fn generate_pdr(&self, requester: &InsightRequester) -> AppResult<PdrCard> {
        let snapshot = self.dashboard_service.activation_snapshot().await;
        let (pdr, trace_id) = self
            .call_llm(
                requester,
                InsightOperation::Pdr,
                prompts::PDR_SYSTEM_PROMPT.to_owned(),
                prompts::pdr_prompt(&snapshot),
            )
            .await?;

        let omtm_score = snapshot.activation_rate();
        let mut properties = Map::new();
        properties.insert("omtm_score".to_owned(), json!(omtm_score));
        self.capture_insight(EventName::AiPdrDraftCreated, requester, &trace_id, properties)
            .await?;

        let evaluation = self
            .evaluate(pdr_subject(&pdr, &snapshot), &trace_id, requester)
            .await;

        Ok(PdrCard {
            pdr,
            trace_id,
            omtm_score,
            evaluation,
        })
    }

    async fn call_llm(
        &self,
        requester: &InsightRequester,
        operation: InsightOperation,
        system_prompt: String,
        prompt: String,
    ) -> AppResult<(String, String)> {
        let trace_id = Uuid::new_v4().to_string();
        let model = self.models.for_operation(operation);
        let trace = LlmTrace {
            trace_id: trace_id.clone(),
            user_id: requester.user_id.to_string(),
            workspace_id: requester.workspace_id.to_string(),
            operation: operation.as_str().to_owned(),
            provider: self.llm_client.provider().to_owned(),
            model: model
                .clone()
                .unwrap_or_else(|| self.llm_client.default_model().to_owned()),
            system_prompt: system_prompt.clone(),
            prompt: prompt.clone(),
            output: None,
        };

        let request = LlmRequest::new(system_prompt, prompt).with_model(model);
        let result = self.llm_client.complete(request).await;
        let success = if result.is_ok() { 1.0 } else { 0.0 };

        if let Err(error) = self
            .trace_recorder
            .record_generation(LlmTrace {
                output: result.as_ref().ok().cloned(),
                ..trace
            })
            .await
        {
            warn!(trace_id = %trace_id, error = %error, "failed to record llm generation");
        }
        if let Err(error) = self
            .trace_recorder
            .record_score(&trace_id, SUCCESS_SCORE, success)
            .await
        {
            warn!(trace_id = %trace_id, error = %error, "failed to record llm success score");
        }

        match result {
            Ok(response) => {
                info!(
                    trace_id = %trace_id,
                    operation = operation.as_str(),
                    workspace_id = %requester.workspace_id,
                    "llm call completed"
                );
                Ok((response, trace_id))
            }
            Err(error) => {
                warn!(
                    trace_id = %trace_id,
                    operation = operation.as_str(),
                    error = %error,
                    "llm call failed"
                );
                Err(AppError::Internal(format!("LLM call failed: {error}")))
            }
        }
    }

    async fn capture_insight(
        &self,
        event: EventName,
        requester: &InsightRequester,
        trace_id: &str,
        extra: Map<String, Value>,
    ) -> AppResult<()> {
        let mut properties = extra;
        properties.insert("trace_id".to_owned(), json!(trace_id));
        properties.insert("user_id".to_owned(), json!(requester.user_id.as_str()));
        properties.insert(
            WORKSPACE_ID_PROPERTY.to_owned(),
            json!(requester.workspace_id.as_str()),
        );
        validate_event_properties(&event, &properties)?;

        let event_name = event.to_string();
        if let Err(error) = self
            .event_capture
            .capture(CaptureEvent {
                event,
                distinct_id: requester.user_id.clone(),
                workspace_id: requester.workspace_id.clone(),
                properties,
            })
            .await
        {
            warn!(
                trace_id = %trace_id,
                event = %event_name,
                error = %error,
                "failed to capture insight event"
            );
        }

        Ok(())
    }

    async fn evaluate(
        &self,
        subject: EvaluationSubject<'_>,
        trace_id: &str,
        requester: &InsightRequester,
    ) -> Option<EvaluationResult> {
        let evaluator = self.evaluator.as_ref()?;
        evaluator
            .evaluate(
                subject,
                trace_id,
                requester.user_id.as_str(),
                requester.workspace_id.as_str(),
            )
            .await
    }
}

fn pdr_subject<'a>(pdr: &'a str, snapshot: &ActivationSnapshot) -> EvaluationSubject<'a> {
    EvaluationSubject::Pdr {
        content: pdr,
        activation_rate: snapshot.activation_rate(),
        total: snapshot.total_workspaces(),
        activated: snapshot.activated_count(),
    }
}

#[cfg(test)]
mod tests;
