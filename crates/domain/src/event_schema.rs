use pulse_core::{AppError, AppResult};
use serde_json::{Map, Value};

use crate::event::EventName;
use crate::insight::{AnomalyMetric, SuggestionType};

#[derive(Debug, Clone, Copy)]
enum PropertyKind {
    String,
    Number,
    Boolean,
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
struct PropertyRule {
    key: &'static str,
    kind: PropertyKind,
    required: bool,
}

const fn required(key: &'static str, kind: PropertyKind) -> PropertyRule {
    PropertyRule {
        key,
        kind,
        required: true,
    }
}

const fn optional(key: &'static str, kind: PropertyKind) -> PropertyRule {
    PropertyRule {
        key,
        kind,
        required: false,
    }
}

const QUERY_TYPES: &[&str] = &["d7_metrics", "cohort_analysis", "custom"];

const WORKSPACE_CREATED: &[PropertyRule] = &[
    required("workspace_id", PropertyKind::String),
    required("workspace_name", PropertyKind::String),
];
const PROJECT_CREATED: &[PropertyRule] = &[
    required("workspace_id", PropertyKind::String),
    required("project_id", PropertyKind::String),
    optional("template_id", PropertyKind::String),
];
const TASK_COMPLETED: &[PropertyRule] = &[
    required("workspace_id", PropertyKind::String),
    required("task_id", PropertyKind::String),
    required("project_id", PropertyKind::String),
];
const INVITE: &[PropertyRule] = &[required("workspace_id", PropertyKind::String)];
const AI_BASE: &[PropertyRule] = &[
    required("workspace_id", PropertyKind::String),
    required("user_id", PropertyKind::String),
    required("trace_id", PropertyKind::String),
];
const AI_PDR: &[PropertyRule] = &[optional("omtm_score", PropertyKind::Number)];
const AI_SQL: &[PropertyRule] = &[
    required("query_type", PropertyKind::OneOf(QUERY_TYPES)),
    required("query_validated", PropertyKind::Boolean),
];
const AI_SUGGESTION_SHOWN: &[PropertyRule] = &[
    required("suggestion_type", PropertyKind::OneOf(&SuggestionType::VALUES)),
    required("context", PropertyKind::String),
];
const AI_SUGGESTION_ACCEPTED: &[PropertyRule] = &[
    required("suggestion_type", PropertyKind::OneOf(&SuggestionType::VALUES)),
    required("accepted", PropertyKind::Boolean),
];
const AI_ANOMALY: &[PropertyRule] = &[
    required("metric", PropertyKind::OneOf(&AnomalyMetric::VALUES)),
    required("threshold", PropertyKind::Number),
    required("actual_value", PropertyKind::Number),
    required("suggested_action", PropertyKind::String),
];

fn rules_for(name: &EventName) -> Vec<&'static [PropertyRule]> {
    match name {
        EventName::WorkspaceCreated => vec![WORKSPACE_CREATED],
        EventName::ProjectCreated => vec![PROJECT_CREATED],
        EventName::TaskCompleted => vec![TASK_COMPLETED],
        EventName::InviteSent | EventName::InviteAccepted => vec![INVITE],
        EventName::AiPdrDraftCreated => vec![AI_BASE, AI_PDR],
        EventName::AiSqlGenerated => vec![AI_BASE, AI_SQL],
        EventName::AiSuggestionShown => vec![AI_BASE, AI_SUGGESTION_SHOWN],
        EventName::AiSuggestionAccepted => vec![AI_BASE, AI_SUGGESTION_ACCEPTED],
        EventName::AiAnomalyAlerted => vec![AI_BASE, AI_ANOMALY],
        EventName::Other(_) => Vec::new(),
    }
}

/// Validates the property bag of an outgoing event.
///
/// Known events must carry their required properties with the expected JSON
/// types. Additional properties are always allowed and unknown event names
/// are not checked.
pub fn validate_event_properties(
    name: &EventName,
    properties: &Map<String, Value>,
) -> AppResult<()> {
    for rule in rules_for(name).into_iter().flatten() {
        match properties.get(rule.key) {
            None | Some(Value::Null) if rule.required => {
                return Err(AppError::Validation(format!(
                    "{name} requires property '{}'",
                    rule.key
                )));
            }
            None | Some(Value::Null) => {}
            Some(value) => check_kind(name, rule, value)?,
        }
    }

    Ok(())
}

fn check_kind(name: &EventName, rule: &PropertyRule, value: &Value) -> AppResult<()> {
    let valid = match rule.kind {
        PropertyKind::String => value.is_string(),
        PropertyKind::Number => value.is_number(),
        PropertyKind::Boolean => value.is_boolean(),
        PropertyKind::OneOf(allowed) => value
            .as_str()
            .is_some_and(|candidate| allowed.contains(&candidate)),
    };

    if valid {
        return Ok(());
    }

    let expected = match rule.kind {
        PropertyKind::String => "a string".to_owned(),
        PropertyKind::Number => "a number".to_owned(),
        PropertyKind::Boolean => "a boolean".to_owned(),
        PropertyKind::OneOf(allowed) => format!("one of {}", allowed.join(", ")),
    };

    Err(AppError::Validation(format!(
        "{name} property '{}' must be {expected}",
        rule.key
    )))
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use super::validate_event_properties;
    use crate::event::EventName;

    fn properties(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn task_completed_requires_task_and_project() {
        let result = validate_event_properties(
            &EventName::TaskCompleted,
            &properties(json!({ "workspace_id": "ws_1", "task_id": "t1" })),
        );
        assert!(result.is_err());
    }

    #[test]
    fn extra_properties_are_allowed() {
        let result = validate_event_properties(
            &EventName::ProjectCreated,
            &properties(json!({
                "workspace_id": "ws_1",
                "project_id": "pr_1",
                "segment_plan": "pro",
            })),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn optional_properties_are_type_checked() {
        let result = validate_event_properties(
            &EventName::ProjectCreated,
            &properties(json!({
                "workspace_id": "ws_1",
                "project_id": "pr_1",
                "template_id": 7,
            })),
        );
        assert!(result.is_err());
    }

    #[test]
    fn ai_sql_event_requires_known_query_type() {
        let result = validate_event_properties(
            &EventName::AiSqlGenerated,
            &properties(json!({
                "workspace_id": "ws_1",
                "user_id": "u1",
                "trace_id": "t1",
                "query_type": "revenue",
                "query_validated": true,
            })),
        );
        assert!(result.is_err());
    }

    #[test]
    fn anomaly_event_accepts_numeric_values() {
        let result = validate_event_properties(
            &EventName::AiAnomalyAlerted,
            &properties(json!({
                "workspace_id": "ws_1",
                "user_id": "u1",
                "trace_id": "t1",
                "metric": "d7_activation",
                "threshold": 0.5,
                "actual_value": 0.25,
                "suggested_action": "shorten onboarding",
            })),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn unknown_events_are_not_checked() {
        let result = validate_event_properties(
            &EventName::Other("page_viewed".to_owned()),
            &Map::new(),
        );
        assert!(result.is_ok());
    }
}
