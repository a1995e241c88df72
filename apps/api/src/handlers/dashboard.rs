use axum::Json;
use axum::extract::State;

use crate::dto::DashboardStatsResponse;
use crate::state::AppState;

pub async fn dashboard_stats_handler(
    State(state): State<AppState>,
) -> Json<DashboardStatsResponse> {
    let snapshot = state.dashboard_service.activation_snapshot().await;

    Json(DashboardStatsResponse::from(snapshot))
}
