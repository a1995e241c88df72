use pulse_application::{DashboardService, InsightService, TrackingService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub tracking_service: TrackingService,
    pub dashboard_service: DashboardService,
    pub insight_service: InsightService,
}
