use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, json};
use tokio::sync::Mutex;

use pulse_core::{AppError, AppResult, WorkspaceId};
use pulse_domain::{AnalyticsEvent, EventName, WorkspaceSummary};

use crate::activation_ports::{EventSource, SummaryStore, SummaryUpdate};
use crate::activation_service::ActivationService;
use crate::capture_ports::{CaptureEvent, EventCapture, GroupIdentify};
use crate::dashboard_service::DashboardService;
use crate::insight_ports::{LlmClient, LlmRequest, LlmTrace, LlmTraceRecorder};

use super::{
    InsightEvaluator, InsightModels, InsightRequester, InsightService, WITHIN_RANGE_MESSAGE,
};

struct LogEventSource {
    events: Vec<AnalyticsEvent>,
}

#[async_trait]
impl EventSource for LogEventSource {
    fn name(&self) -> &str {
        "log"
    }

    async fn fetch_workspace_created_events(&self) -> AppResult<Vec<AnalyticsEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|event| event.name() == &EventName::WorkspaceCreated)
            .cloned()
            .collect())
    }

    async fn fetch_events_for_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<Vec<AnalyticsEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|event| event.resolved_workspace_id().as_ref() == Some(workspace_id))
            .cloned()
            .collect())
    }
}

struct EmptySummaryStore;

#[async_trait]
impl SummaryStore for EmptySummaryStore {
    async fn find_summary(
        &self,
        _workspace_id: &WorkspaceId,
    ) -> AppResult<Option<WorkspaceSummary>> {
        Ok(None)
    }

    async fn list_summaries(&self) -> AppResult<Vec<WorkspaceSummary>> {
        Ok(Vec::new())
    }

    async fn upsert_summary(&self, update: SummaryUpdate) -> AppResult<WorkspaceSummary> {
        Ok(update.apply(None, Utc::now()))
    }

    async fn increment_task_count(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<WorkspaceSummary> {
        Err(AppError::NotFound(workspace_id.to_string()))
    }
}

#[derive(Default)]
struct ScriptedLlmClient {
    responses: Mutex<VecDeque<AppResult<String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlmClient {
    fn answering(responses: Vec<AppResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    fn provider(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: LlmRequest) -> AppResult<String> {
        self.requests.lock().await.push(request);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Unavailable("no scripted response".to_owned())))
    }
}

#[derive(Default)]
struct RecordingCapture {
    events: Mutex<Vec<CaptureEvent>>,
    broken: bool,
}

#[async_trait]
impl EventCapture for RecordingCapture {
    async fn capture(&self, event: CaptureEvent) -> AppResult<()> {
        if self.broken {
            return Err(AppError::Unavailable("posthog down".to_owned()));
        }
        self.events.lock().await.push(event);
        Ok(())
    }

    async fn group_identify(&self, _group: GroupIdentify) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingTraces {
    generations: Mutex<Vec<LlmTrace>>,
    scores: Mutex<Vec<(String, String, f64)>>,
    broken: bool,
}

#[async_trait]
impl LlmTraceRecorder for RecordingTraces {
    async fn record_generation(&self, trace: LlmTrace) -> AppResult<()> {
        if self.broken {
            return Err(AppError::Unavailable("langfuse offline".to_owned()));
        }
        self.generations.lock().await.push(trace);
        Ok(())
    }

    async fn record_score(&self, trace_id: &str, name: &str, value: f64) -> AppResult<()> {
        if self.broken {
            return Err(AppError::Unavailable("langfuse offline".to_owned()));
        }
        self.scores
            .lock()
            .await
            .push((trace_id.to_owned(), name.to_owned(), value));
        Ok(())
    }
}

fn event(name: EventName, workspace: &str) -> AnalyticsEvent {
    let mut properties = Map::new();
    properties.insert("workspace_id".to_owned(), json!(workspace));
    AnalyticsEvent::new(name, Utc::now()).with_properties(properties)
}

/// One activated and three idle workspaces: a 25% activation rate.
fn quarter_activated_log() -> Vec<AnalyticsEvent> {
    let mut events = vec![
        event(EventName::WorkspaceCreated, "ws_a"),
        event(EventName::ProjectCreated, "ws_a"),
    ];
    events.extend((0..3).map(|_| event(EventName::TaskCompleted, "ws_a")));
    events.extend(
        ["ws_b", "ws_c", "ws_d"]
            .into_iter()
            .map(|workspace| event(EventName::WorkspaceCreated, workspace)),
    );
    events
}

struct Harness {
    service: InsightService,
    llm: Arc<ScriptedLlmClient>,
    capture: Arc<RecordingCapture>,
    traces: Arc<RecordingTraces>,
}

fn harness(log: Vec<AnalyticsEvent>, responses: Vec<AppResult<String>>) -> Harness {
    harness_with_traces(log, responses, RecordingTraces::default())
}

fn harness_with_traces(
    log: Vec<AnalyticsEvent>,
    responses: Vec<AppResult<String>>,
    traces: RecordingTraces,
) -> Harness {
    harness_with_ports(log, responses, RecordingCapture::default(), traces)
}

fn harness_with_ports(
    log: Vec<AnalyticsEvent>,
    responses: Vec<AppResult<String>>,
    capture: RecordingCapture,
    traces: RecordingTraces,
) -> Harness {
    let llm = ScriptedLlmClient::answering(responses);
    let capture = Arc::new(capture);
    let traces = Arc::new(traces);
    let dashboard = DashboardService::new(
        ActivationService::new(vec![Arc::new(LogEventSource { events: log })]),
        Arc::new(EmptySummaryStore),
    );
    let service = InsightService::new(dashboard, llm.clone(), capture.clone(), traces.clone());

    Harness {
        service,
        llm,
        capture,
        traces,
    }
}

fn requester() -> InsightRequester {
    InsightRequester::new(Some("user_1".to_owned()), Some("ws_a".to_owned()))
        .unwrap_or_else(|_| unreachable!())
}

#[test]
fn requester_requires_user_and_workspace() {
    assert!(matches!(
        InsightRequester::new(None, Some("ws_a".to_owned())),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        InsightRequester::new(Some("user_1".to_owned()), Some("  ".to_owned())),
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn anomaly_within_range_skips_llm() {
    let harness = harness(quarter_activated_log(), Vec::new());

    let report = harness
        .service
        .detect_anomaly(&requester(), Some(0.2))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(!report.alert);
    assert_eq!(report.message, WITHIN_RANGE_MESSAGE);
    assert!(report.trace_id.is_none());
    assert!(harness.llm.requests.lock().await.is_empty());
    assert!(harness.capture.events.lock().await.is_empty());
}

#[tokio::test]
async fn anomaly_rate_equal_to_threshold_is_not_alerted() {
    let harness = harness(quarter_activated_log(), Vec::new());

    let report = harness
        .service
        .detect_anomaly(&requester(), Some(0.25))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(!report.alert);
}

#[tokio::test]
async fn anomaly_below_default_threshold_is_explained_and_captured() {
    let harness = harness(
        quarter_activated_log(),
        vec![Ok("Onboarding drop-off → shorter checklist → +10pp".to_owned())],
    );

    let report = harness
        .service
        .detect_anomaly(&requester(), None)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(report.alert);
    assert!((report.activation_rate - 0.25).abs() < f64::EPSILON);
    assert!((report.threshold - 0.5).abs() < f64::EPSILON);
    let Some(trace_id) = report.trace_id else {
        panic!("alert should carry a trace id");
    };

    let captured = harness.capture.events.lock().await;
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].event, EventName::AiAnomalyAlerted);
    assert_eq!(captured[0].distinct_id.as_str(), "user_1");
    assert_eq!(captured[0].properties.get("metric"), Some(&json!("d7_activation")));
    assert_eq!(captured[0].properties.get("trace_id"), Some(&json!(trace_id)));
    assert_eq!(
        captured[0].properties.get("suggested_action"),
        Some(&json!(report.message))
    );

    let prompts = harness.llm.requests.lock().await;
    assert!(prompts[0].prompt.contains("dropped to 25.0%"));
}

#[tokio::test]
async fn llm_failure_maps_to_internal_error_and_scores_zero() {
    let harness = harness(
        quarter_activated_log(),
        vec![Err(AppError::Unavailable("provider down".to_owned()))],
    );

    let result = harness.service.detect_anomaly(&requester(), None).await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert!(harness.capture.events.lock().await.is_empty());
    let generations = harness.traces.generations.lock().await;
    assert_eq!(generations.len(), 1);
    assert_eq!(generations[0].output, None);
    let scores = harness.traces.scores.lock().await;
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].1, "success");
    assert!(scores[0].2.abs() < f64::EPSILON);
}

#[tokio::test]
async fn sql_generation_is_traced_and_captured() {
    let harness = harness(
        Vec::new(),
        vec![Ok("SELECT count(*) FROM events_d7_new WHERE event = 'workspace_created'".to_owned())],
    );

    let generated = harness
        .service
        .generate_sql(
            &requester(),
            Some("How many workspaces were created?".to_owned()),
            Some("d7_metrics".to_owned()),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(generated.validated);
    assert!(!generated.rejected);

    let captured = harness.capture.events.lock().await;
    assert_eq!(captured[0].event, EventName::AiSqlGenerated);
    assert_eq!(captured[0].properties.get("query_type"), Some(&json!("d7_metrics")));
    assert_eq!(captured[0].properties.get("query_validated"), Some(&json!(true)));

    let generations = harness.traces.generations.lock().await;
    assert_eq!(generations.len(), 1);
    assert_eq!(generations[0].trace_id, generated.trace_id);
    assert_eq!(generations[0].operation, "sql");
    assert_eq!(generations[0].model, "scripted-model");
}

#[tokio::test]
async fn dangerous_sql_is_rejected_without_capture() {
    let harness = harness(
        Vec::new(),
        vec![Ok("DROP TABLE events_d7_new;".to_owned())],
    );

    let generated = harness
        .service
        .generate_sql(&requester(), Some("clean up".to_owned()), None)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(generated.rejected);
    assert!(!generated.validated);
    assert_eq!(generated.sql, "DROP TABLE events_d7_new;");
    assert!(harness.capture.events.lock().await.is_empty());
}

#[tokio::test]
async fn dangerous_sql_with_comment_on_is_allowed_but_not_validated() {
    let harness = harness(
        Vec::new(),
        vec![Ok("COMMENT ON TABLE t IS 'no delete here'; SELECT 1".to_owned())],
    );

    let generated = harness
        .service
        .generate_sql(&requester(), Some("annotate".to_owned()), None)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(!generated.rejected);
    assert!(!generated.validated);
    let captured = harness.capture.events.lock().await;
    assert_eq!(captured[0].properties.get("query_type"), Some(&json!("custom")));
    assert_eq!(captured[0].properties.get("query_validated"), Some(&json!(false)));
}

#[tokio::test]
async fn sql_requires_a_question_and_known_query_type() {
    let harness = harness(Vec::new(), Vec::new());

    let missing = harness
        .service
        .generate_sql(&requester(), Some("   ".to_owned()), None)
        .await;
    let unknown = harness
        .service
        .generate_sql(&requester(), Some("count".to_owned()), Some("funnel".to_owned()))
        .await;

    assert!(matches!(missing, Err(AppError::Validation(_))));
    assert!(matches!(unknown, Err(AppError::Validation(_))));
    assert!(harness.llm.requests.lock().await.is_empty());
}

#[tokio::test]
async fn pdr_uses_operation_model_and_reports_omtm_score() {
    let harness = harness(
        quarter_activated_log(),
        vec![Ok("OMTM: D7 activation".to_owned())],
    );
    let service = harness.service.clone().with_models(InsightModels {
        pdr: Some("gpt-4-turbo-preview".to_owned()),
        ..InsightModels::default()
    });

    let card = service
        .generate_pdr(&requester())
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(card.pdr, "OMTM: D7 activation");
    assert!((card.omtm_score - 0.25).abs() < f64::EPSILON);
    assert!(card.evaluation.is_none());

    let requests = harness.llm.requests.lock().await;
    assert_eq!(requests[0].model.as_deref(), Some("gpt-4-turbo-preview"));
    let captured = harness.capture.events.lock().await;
    assert_eq!(captured[0].event, EventName::AiPdrDraftCreated);
    assert_eq!(captured[0].properties.get("omtm_score"), Some(&json!(0.25)));
}

#[tokio::test]
async fn broken_trace_recorder_does_not_fail_insight() {
    let harness = harness_with_traces(
        Vec::new(),
        vec![Ok("OMTM: D7 activation".to_owned())],
        RecordingTraces {
            broken: true,
            ..RecordingTraces::default()
        },
    );

    let card = harness.service.generate_pdr(&requester()).await;

    assert!(card.is_ok());
}

#[tokio::test]
async fn capture_outage_keeps_generated_insights() {
    let harness = harness_with_ports(
        quarter_activated_log(),
        vec![
            Ok("analysis".to_owned()),
            Ok("SELECT count(*) FROM events_d7_new;".to_owned()),
        ],
        RecordingCapture {
            broken: true,
            ..RecordingCapture::default()
        },
        RecordingTraces::default(),
    );

    let report = harness
        .service
        .detect_anomaly(&requester(), None)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(report.alert);
    assert_eq!(report.message, "analysis");
    assert!(report.trace_id.is_some());

    let generated = harness
        .service
        .generate_sql(&requester(), Some("how many events".to_owned()), None)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(generated.validated);
    assert!(harness.capture.events.lock().await.is_empty());
    assert_eq!(harness.traces.generations.lock().await.len(), 2);
}

#[tokio::test]
async fn enabled_evaluation_scores_the_eval_trace() {
    let harness = harness(
        quarter_activated_log(),
        vec![
            Ok("OMTM: D7 activation".to_owned()),
            Ok(r#"{"format_valid": 1, "data_driven": 1, "actionable": 0, "overall_score": 0.67}"#
                .to_owned()),
        ],
    );
    let evaluator = InsightEvaluator::new(harness.llm.clone(), harness.traces.clone());
    let service = harness.service.clone().with_evaluator(Some(evaluator));

    let card = service
        .generate_pdr(&requester())
        .await
        .unwrap_or_else(|_| unreachable!());

    let Some(evaluation) = card.evaluation else {
        panic!("evaluation should be attached");
    };
    assert_eq!(evaluation.criteria.get("actionable"), Some(&false));

    let requests = harness.llm.requests.lock().await;
    assert_eq!(requests[1].temperature, Some(0.2));

    let eval_trace = format!("{}-eval", card.trace_id);
    let scores = harness.traces.scores.lock().await;
    let eval_scores: Vec<&str> = scores
        .iter()
        .filter(|(trace_id, _, _)| trace_id == &eval_trace)
        .map(|(_, name, _)| name.as_str())
        .collect();
    assert_eq!(
        eval_scores,
        vec!["actionable", "data_driven", "format_valid", "overall_score"]
    );
}

#[tokio::test]
async fn unreadable_verdict_leaves_evaluation_empty() {
    let harness = harness(
        Vec::new(),
        vec![
            Ok("SELECT 1".to_owned()),
            Ok("I think it is fine".to_owned()),
        ],
    );
    let evaluator = InsightEvaluator::new(harness.llm.clone(), harness.traces.clone());
    let service = harness.service.clone().with_evaluator(Some(evaluator));

    let generated = service
        .generate_sql(&requester(), Some("anything".to_owned()), None)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(generated.evaluation.is_none());
    assert!(generated.validated);
}
