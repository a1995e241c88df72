use pulse_application::{AnomalyReport, EvaluationResult, GeneratedSql, PdrCard};

use super::types::{
    AnomalyResponse, EvaluationResponse, PdrResponse, SqlRejectedResponse, SqlResponse,
};

impl From<EvaluationResult> for EvaluationResponse {
    fn from(result: EvaluationResult) -> Self {
        Self {
            criteria: result.criteria,
            overall_score: result.overall_score,
        }
    }
}

impl From<AnomalyReport> for AnomalyResponse {
    fn from(report: AnomalyReport) -> Self {
        Self {
            alert: report.alert,
            activation_rate: report.activation_rate,
            threshold: report.threshold,
            message: report.message,
            trace_id: report.trace_id,
            evaluation: report.evaluation.map(EvaluationResponse::from),
        }
    }
}

impl From<GeneratedSql> for SqlResponse {
    fn from(generated: GeneratedSql) -> Self {
        Self {
            sql: generated.sql,
            trace_id: generated.trace_id,
            validated: generated.validated,
            evaluation: generated.evaluation.map(EvaluationResponse::from),
        }
    }
}

impl SqlRejectedResponse {
    pub fn from_rejected(generated: GeneratedSql) -> Self {
        Self {
            message: "Generated SQL contains dangerous keywords".to_owned(),
            sql: generated.sql,
            validated: false,
        }
    }
}

impl From<PdrCard> for PdrResponse {
    fn from(card: PdrCard) -> Self {
        Self {
            pdr: card.pdr,
            trace_id: card.trace_id,
            omtm_score: card.omtm_score,
            evaluation: card.evaluation.map(EvaluationResponse::from),
        }
    }
}
