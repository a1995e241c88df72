use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for an anomaly check.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/anomaly-request.ts"
)]
pub struct AnomalyRequest {
    pub user_id: Option<String>,
    pub workspace_id: Option<String>,
    /// Activation rate below which an alert is raised, defaults to 0.5.
    pub threshold: Option<f64>,
}

/// Anomaly check result.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/anomaly-response.ts"
)]
pub struct AnomalyResponse {
    pub alert: bool,
    pub activation_rate: f64,
    pub threshold: f64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResponse>,
}

/// Incoming payload for SQL generation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sql-request.ts"
)]
pub struct SqlRequest {
    pub user_id: Option<String>,
    pub workspace_id: Option<String>,
    pub natural_language_query: Option<String>,
    /// One of `d7_metrics`, `cohort_analysis` or `custom` (default).
    pub query_type: Option<String>,
}

/// Accepted SQL generation result.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sql-response.ts"
)]
pub struct SqlResponse {
    pub sql: String,
    pub trace_id: String,
    pub validated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResponse>,
}

/// Body returned with 400 when the generated SQL was refused.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sql-rejected-response.ts"
)]
pub struct SqlRejectedResponse {
    pub message: String,
    pub sql: String,
    pub validated: bool,
}

/// Incoming payload for a PDR draft.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/pdr-request.ts"
)]
pub struct PdrRequest {
    pub user_id: Option<String>,
    pub workspace_id: Option<String>,
}

/// Drafted PDR card.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/pdr-response.ts"
)]
pub struct PdrResponse {
    pub pdr: String,
    pub trace_id: String,
    pub omtm_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResponse>,
}

/// Judge verdict attached to an insight.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/evaluation-response.ts"
)]
pub struct EvaluationResponse {
    pub criteria: BTreeMap<String, bool>,
    pub overall_score: f64,
}
