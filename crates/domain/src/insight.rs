use std::str::FromStr;

use pulse_core::AppError;
use serde::{Deserialize, Serialize};

/// Statement keywords that must not appear in generated read-only SQL.
pub const DANGEROUS_SQL_KEYWORDS: [&str; 7] = [
    "drop", "delete", "truncate", "update", "alter", "grant", "revoke",
];

/// Category of a natural-language SQL request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlQueryType {
    /// D7 activation metrics.
    D7Metrics,
    /// Weekly or segment cohort breakdowns.
    CohortAnalysis,
    /// Anything else.
    Custom,
}

impl SqlQueryType {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::D7Metrics => "d7_metrics",
            Self::CohortAnalysis => "cohort_analysis",
            Self::Custom => "custom",
        }
    }
}

impl FromStr for SqlQueryType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "d7_metrics" => Ok(Self::D7Metrics),
            "cohort_analysis" => Ok(Self::CohortAnalysis),
            "custom" => Ok(Self::Custom),
            _ => Err(AppError::Validation(format!(
                "unknown query_type '{value}'"
            ))),
        }
    }
}

/// Kind of AI suggestion surfaced in the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    /// Copy change nudging the user forward.
    CopyNudge,
    /// Tracking fix proposal.
    EventFix,
    /// Anomaly alert.
    AnomalyAlert,
}

impl SuggestionType {
    /// Accepted storage values.
    pub const VALUES: [&'static str; 3] = ["copy_nudge", "event_fix", "anomaly_alert"];
}

/// Metric watched by anomaly detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyMetric {
    /// Share of workspaces activated.
    D7Activation,
    /// Risk events per 100 workspaces.
    RiskPer100,
    /// Retention.
    Retention,
}

impl AnomalyMetric {
    /// Accepted storage values.
    pub const VALUES: [&'static str; 3] = ["d7_activation", "risk_per_100", "retention"];

    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::D7Activation => "d7_activation",
            Self::RiskPer100 => "risk_per_100",
            Self::Retention => "retention",
        }
    }
}

/// Insight operation, used to label traces and evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightOperation {
    /// PDR card drafting.
    Pdr,
    /// SQL generation.
    Sql,
    /// Anomaly root-cause analysis.
    Anomaly,
}

impl InsightOperation {
    /// Returns the stable label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdr => "pdr",
            Self::Sql => "sql",
            Self::Anomaly => "anomaly",
        }
    }
}

/// Outcome of the keyword guard applied to generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlAssessment {
    /// Whether any dangerous keyword occurs as a whole word.
    pub contains_dangerous_keyword: bool,
    /// Whether the query must be refused.
    pub rejected: bool,
}

impl SqlAssessment {
    /// Returns whether the query passed the guard cleanly.
    #[must_use]
    pub fn validated(&self) -> bool {
        !self.contains_dangerous_keyword
    }
}

/// Checks generated SQL for write or privilege statements.
///
/// Keywords match case-insensitively on word boundaries. A dangerous query is
/// still let through (but not marked validated) when it contains
/// `COMMENT ON`.
#[must_use]
pub fn assess_generated_sql(sql: &str) -> SqlAssessment {
    let lower = sql.to_lowercase();
    let contains_dangerous_keyword = lower
        .split(|character: char| !(character.is_ascii_alphanumeric() || character == '_'))
        .any(|word| DANGEROUS_SQL_KEYWORDS.contains(&word));
    let rejected = contains_dangerous_keyword && !lower.contains("comment on");

    SqlAssessment {
        contains_dangerous_keyword,
        rejected,
    }
}
