use std::time::Duration;

use pulse_application::{CaptureEvent, EventCapture, GroupIdentify};
use tracing::{info, warn};

use crate::seed_plan::SeedWorkspace;

/// Counters reported once seeding finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub workspaces: usize,
    pub captured: usize,
    pub failed: usize,
}

/// Sends every planned workspace to `capture`, pausing between workspaces.
///
/// Failed calls are logged and counted; seeding always runs to the end.
pub async fn run_seed(
    capture: &dyn EventCapture,
    plan: Vec<SeedWorkspace>,
    pause: Duration,
) -> SeedReport {
    let mut report = SeedReport::default();

    for workspace in plan {
        report.workspaces += 1;

        if let Err(error) = capture
            .group_identify(GroupIdentify {
                workspace_id: workspace.workspace_id.clone(),
                distinct_id: workspace.user_id.clone(),
                name: workspace.workspace_name.clone(),
                properties: workspace.base_properties.clone(),
            })
            .await
        {
            report.failed += 1;
            warn!(
                workspace_id = %workspace.workspace_id,
                error = %error,
                "group identify failed"
            );
        }

        for step in workspace.steps {
            let event = step.event.clone();
            match capture
                .capture(CaptureEvent {
                    event: step.event,
                    distinct_id: workspace.user_id.clone(),
                    workspace_id: workspace.workspace_id.clone(),
                    properties: step.properties,
                })
                .await
            {
                Ok(()) => report.captured += 1,
                Err(error) => {
                    report.failed += 1;
                    warn!(
                        workspace_id = %workspace.workspace_id,
                        event = %event,
                        error = %error,
                        "seed event capture failed"
                    );
                }
            }
        }

        info!(
            index = workspace.index,
            workspace_id = %workspace.workspace_id,
            segment = %workspace.segment.describe(),
            activates = workspace.activates,
            "seeded workspace"
        );

        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    report
}
