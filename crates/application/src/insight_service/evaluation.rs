use std::collections::BTreeMap;
use std::sync::Arc;

use pulse_domain::InsightOperation;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::insight_ports::{LlmClient, LlmRequest, LlmTrace, LlmTraceRecorder};

use super::prompts::percent;

const JUDGE_TEMPERATURE: f32 = 0.2;
const OVERALL_SCORE: &str = "overall_score";

/// Judge verdict on one generated insight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Pass/fail per criterion.
    pub criteria: BTreeMap<String, bool>,
    /// Mean criterion score reported by the judge.
    pub overall_score: f64,
}

/// What the judge is asked to grade.
#[derive(Debug, Clone)]
pub enum EvaluationSubject<'a> {
    /// A PDR card and the metrics it was drafted from.
    Pdr {
        /// Card text.
        content: &'a str,
        /// Activation rate between 0 and 1.
        activation_rate: f64,
        /// Total workspaces.
        total: usize,
        /// Activated workspaces.
        activated: usize,
    },
    /// Generated SQL and the request it answers.
    Sql {
        /// Generated query.
        sql: &'a str,
        /// User request.
        natural_language_query: &'a str,
    },
    /// Root-cause analysis of an activation drop.
    Anomaly {
        /// Analysis text.
        analysis: &'a str,
        /// Activation rate between 0 and 1.
        activation_rate: f64,
        /// Alert threshold between 0 and 1.
        threshold: f64,
    },
}

impl EvaluationSubject<'_> {
    fn operation(&self) -> InsightOperation {
        match self {
            Self::Pdr { .. } => InsightOperation::Pdr,
            Self::Sql { .. } => InsightOperation::Sql,
            Self::Anomaly { .. } => InsightOperation::Anomaly,
        }
    }

    fn criteria(&self) -> [&'static str; 3] {
        match self {
            Self::Pdr { .. } => ["format_valid", "data_driven", "actionable"],
            Self::Sql { .. } => ["format_valid", "sql_safe", "sql_relevant"],
            Self::Anomaly { .. } => ["format_valid", "root_cause_quality", "data_driven"],
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            Self::Pdr { .. } => "You are a strict quality evaluator. Return only valid JSON.",
            Self::Sql { .. } => "You are a strict SQL security evaluator. Return only valid JSON.",
            Self::Anomaly { .. } => {
                "You are a strict analytical evaluator. Return only valid JSON."
            }
        }
    }

    fn prompt(&self) -> String {
        let [first, second, third] = self.criteria();
        let answer_format = format!(
            "{{\n  \"{first}\": 0 or 1,\n  \"{second}\": 0 or 1,\n  \"{third}\": 0 or 1,\n  \"{OVERALL_SCORE}\": <average of the three scores>\n}}"
        );

        match self {
            Self::Pdr {
                content,
                activation_rate,
                total,
                activated,
            } => format!(
                "You are an expert product analyst evaluating a PDR (Progress/Decision/Review) card.

Evaluate the following PDR content based on these criteria:
1. **Format Valid** (0-1): Does it follow the PDR structure (OMTM, Guardrails, Decision)?
2. **Data-Driven** (0-1): Are insights grounded in the metrics provided?
3. **Actionable** (0-1): Does it provide clear, specific next steps?

Context:
- D7 Activation Rate: {rate:.1}%
- Total Workspaces: {total}
- Activated: {activated}

PDR Content:
{content}

Return ONLY a JSON object with:
{answer_format}",
                rate = percent(*activation_rate),
            ),
            Self::Sql {
                sql,
                natural_language_query,
            } => format!(
                "You are a SQL expert evaluating a generated query.

Evaluate the SQL query based on:
1. **Format Valid** (0-1): Is it syntactically valid SQL?
2. **SQL Safe** (0-1): Does it avoid DROP/DELETE/TRUNCATE/UPDATE without safeguards?
3. **SQL Relevant** (0-1): Does it match the user's intent?

Original Request: \"{natural_language_query}\"

SQL Query:
```sql
{sql}
```

Return ONLY a JSON object:
{answer_format}"
            ),
            Self::Anomaly {
                analysis,
                activation_rate,
                threshold,
            } => format!(
                "You are a data science analyst evaluating anomaly detection insights.

Evaluate the anomaly analysis based on:
1. **Format Valid** (0-1): Is the response coherent and structured?
2. **Root Cause Quality** (0-1): Does it identify plausible root causes?
3. **Data-Driven** (0-1): Are recommendations based on actual metrics?

Context:
- Activation Rate: {rate:.1}%
- Threshold: {threshold:.1}%
- Gap: {gap:.1}%

Anomaly Analysis:
{analysis}

Return ONLY a JSON object:
{answer_format}",
                rate = percent(*activation_rate),
                threshold = percent(*threshold),
                gap = percent(activation_rate - threshold),
            ),
        }
    }
}

/// LLM-as-judge grading of generated insights.
#[derive(Clone)]
pub struct InsightEvaluator {
    llm_client: Arc<dyn LlmClient>,
    trace_recorder: Arc<dyn LlmTraceRecorder>,
    model: Option<String>,
}

impl InsightEvaluator {
    /// Creates an evaluator judging with the client's default model.
    #[must_use]
    pub fn new(llm_client: Arc<dyn LlmClient>, trace_recorder: Arc<dyn LlmTraceRecorder>) -> Self {
        Self {
            llm_client,
            trace_recorder,
            model: None,
        }
    }

    /// Overrides the judge model.
    #[must_use]
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Grades one insight and attaches the scores to `{trace_id}-eval`.
    ///
    /// Returns `None` when the judge call fails or its answer cannot be read.
    pub async fn evaluate(
        &self,
        subject: EvaluationSubject<'_>,
        trace_id: &str,
        user_id: &str,
        workspace_id: &str,
    ) -> Option<EvaluationResult> {
        let operation = subject.operation();
        let eval_trace_id = format!("{trace_id}-eval");
        let request = LlmRequest::new(subject.system_prompt(), subject.prompt())
            .with_model(self.model.clone())
            .with_temperature(JUDGE_TEMPERATURE);
        let trace = LlmTrace {
            trace_id: eval_trace_id.clone(),
            user_id: user_id.to_owned(),
            workspace_id: workspace_id.to_owned(),
            operation: format!("{}_evaluation", operation.as_str()),
            provider: self.llm_client.provider().to_owned(),
            model: self
                .model
                .clone()
                .unwrap_or_else(|| self.llm_client.default_model().to_owned()),
            system_prompt: request.system_prompt.clone(),
            prompt: request.prompt.clone(),
            output: None,
        };

        let response = match self.llm_client.complete(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    operation = operation.as_str(),
                    trace_id,
                    error = %error,
                    "insight evaluation call failed"
                );
                return None;
            }
        };

        if let Err(error) = self
            .trace_recorder
            .record_generation(LlmTrace {
                output: Some(response.clone()),
                ..trace
            })
            .await
        {
            warn!(trace_id = %eval_trace_id, error = %error, "failed to record evaluation trace");
        }

        let Some(result) = parse_verdict(&response, &subject.criteria()) else {
            warn!(
                operation = operation.as_str(),
                trace_id,
                "insight evaluation returned an unreadable verdict"
            );
            return None;
        };

        for (name, passed) in &result.criteria {
            self.record_score(&eval_trace_id, name, if *passed { 1.0 } else { 0.0 })
                .await;
        }
        self.record_score(&eval_trace_id, OVERALL_SCORE, result.overall_score)
            .await;

        info!(
            operation = operation.as_str(),
            trace_id,
            overall_score = result.overall_score,
            "insight evaluated"
        );
        Some(result)
    }

    async fn record_score(&self, trace_id: &str, name: &str, value: f64) {
        if let Err(error) = self.trace_recorder.record_score(trace_id, name, value).await {
            warn!(trace_id, score = name, error = %error, "failed to record evaluation score");
        }
    }
}

/// Reads the judge's JSON answer, tolerating a surrounding code fence.
fn parse_verdict(response: &str, criteria: &[&str]) -> Option<EvaluationResult> {
    let trimmed = response.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    let verdict: Map<String, Value> = serde_json::from_str(body).ok()?;

    let mut scores = BTreeMap::new();
    for criterion in criteria {
        let passed = match verdict.get(*criterion)? {
            Value::Bool(value) => *value,
            Value::Number(value) => value.as_f64()? >= 1.0,
            _ => return None,
        };
        scores.insert((*criterion).to_owned(), passed);
    }

    let overall_score = match verdict.get(OVERALL_SCORE).and_then(Value::as_f64) {
        Some(score) => score,
        None => {
            let passed = scores.values().filter(|passed| **passed).count();
            passed as f64 / scores.len() as f64
        }
    };

    Some(EvaluationResult {
        criteria: scores,
        overall_score,
    })
}
