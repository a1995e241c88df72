//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod event;
mod event_schema;
mod insight;
mod segment;
mod summary;

pub use event::{AnalyticsEvent, EventName, WORKSPACE_ID_PROPERTY, WORKSPACE_NAME_PROPERTY};
pub use event_schema::validate_event_properties;
pub use insight::{
    AnomalyMetric, DANGEROUS_SQL_KEYWORDS, InsightOperation, SqlAssessment, SqlQueryType,
    SuggestionType, assess_generated_sql,
};
pub use segment::{
    ExperimentVariant, SegmentChannel, SegmentPlan, SegmentRegion, SegmentSelection,
};
pub use summary::{
    ACTIVATION_TASK_THRESHOLD, ActivationSnapshot, DEFAULT_WORKSPACE_NAME, WorkspaceSummary,
    is_activated,
};
