//! Application services and ports.

#![forbid(unsafe_code)]

mod activation_ports;
mod activation_service;
mod capture_ports;
mod dashboard_service;
mod insight_ports;
mod insight_service;
mod llm_fallback;
mod tracking_service;

pub use activation_ports::{EventSource, SummaryStore, SummaryUpdate};
pub use activation_service::ActivationService;
pub use capture_ports::{CaptureEvent, EventCapture, GroupIdentify, WORKSPACE_GROUP_TYPE};
pub use dashboard_service::DashboardService;
pub use insight_ports::{LlmClient, LlmRequest, LlmTrace, LlmTraceRecorder};
pub use insight_service::{
    AnomalyReport, DEFAULT_ANOMALY_THRESHOLD, EvaluationResult, EvaluationSubject, GeneratedSql,
    InsightEvaluator, InsightModels, InsightRequester, InsightService, PdrCard,
    WITHIN_RANGE_MESSAGE,
};
pub use llm_fallback::FallbackLlmClient;
pub use tracking_service::{CreateWorkspaceInput, TrackEventInput, TrackingService};
