//! Pulse demo data seeder.
//!
//! Sends one workspace per segment combination through the activation funnel
//! to PostHog.

#![forbid(unsafe_code)]

mod seed_plan;
mod seed_runner;
mod seeder_config;

use std::time::Duration;

use pulse_core::AppError;
use pulse_infrastructure::PostHogEventCapture;
use tracing::info;

use crate::seeder_config::{SeederConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = SeederConfig::load()?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let capture = PostHogEventCapture::new(
        http_client,
        config.posthog_host.as_str(),
        config.posthog_server_key.as_str(),
    );

    let plan = seed_plan::build_seed_plan()?;
    info!(
        workspaces = plan.len(),
        posthog_host = %config.posthog_host,
        "seeding workspace combinations"
    );

    let report = seed_runner::run_seed(&capture, plan, config.pause).await;
    info!(
        workspaces = report.workspaces,
        captured = report.captured,
        failed = report.failed,
        "seed complete"
    );

    Ok(())
}
