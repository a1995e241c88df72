mod conversions;
mod types;

pub use types::{DashboardStatsResponse, WorkspaceSummaryResponse};
