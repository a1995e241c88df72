use axum::Router;
use axum::routing::{get, post};
use pulse_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;

use cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let tracking_routes = Router::new()
        .route("/api/track/event", post(handlers::tracking::track_event_handler))
        .route("/api/track/invite", post(handlers::tracking::track_invite_handler))
        .route("/api/track/project", post(handlers::tracking::track_project_handler))
        .route("/api/track/task", post(handlers::tracking::track_task_handler));

    let insight_routes = Router::new()
        .route("/api/ai/anomaly", post(handlers::insights::anomaly_handler))
        .route("/api/ai/sql", post(handlers::insights::sql_handler))
        .route("/api/ai/pdr", post(handlers::insights::pdr_handler));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/workspace",
            post(handlers::workspace::create_workspace_handler),
        )
        .route(
            "/api/dashboard/stats",
            get(handlers::dashboard::dashboard_stats_handler),
        )
        .merge(tracking_routes)
        .merge(insight_routes)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
