use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pulse_application::InsightRequester;

use crate::dto::{
    AnomalyRequest, AnomalyResponse, PdrRequest, PdrResponse, SqlRejectedResponse, SqlRequest,
    SqlResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn anomaly_handler(
    State(state): State<AppState>,
    Json(payload): Json<AnomalyRequest>,
) -> ApiResult<Json<AnomalyResponse>> {
    let requester = InsightRequester::new(payload.user_id, payload.workspace_id)?;
    let report = state
        .insight_service
        .detect_anomaly(&requester, payload.threshold)
        .await?;

    Ok(Json(AnomalyResponse::from(report)))
}

pub async fn sql_handler(
    State(state): State<AppState>,
    Json(payload): Json<SqlRequest>,
) -> ApiResult<Response> {
    let requester = InsightRequester::new(payload.user_id, payload.workspace_id)?;
    let generated = state
        .insight_service
        .generate_sql(&requester, payload.natural_language_query, payload.query_type)
        .await?;

    if generated.rejected {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(SqlRejectedResponse::from_rejected(generated)),
        )
            .into_response());
    }

    Ok(Json(SqlResponse::from(generated)).into_response())
}

pub async fn pdr_handler(
    State(state): State<AppState>,
    Json(payload): Json<PdrRequest>,
) -> ApiResult<Json<PdrResponse>> {
    let requester = InsightRequester::new(payload.user_id, payload.workspace_id)?;
    let card = state.insight_service.generate_pdr(&requester).await?;

    Ok(Json(PdrResponse::from(card)))
}
