use async_trait::async_trait;
use pulse_application::{CaptureEvent, EventCapture, GroupIdentify};
use pulse_core::AppResult;
use tracing::debug;

/// Event capture used when analytics forwarding is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventCapture;

#[async_trait]
impl EventCapture for NoopEventCapture {
    async fn capture(&self, event: CaptureEvent) -> AppResult<()> {
        debug!(
            event = %event.event,
            workspace_id = %event.workspace_id,
            "analytics disabled, dropping event"
        );
        Ok(())
    }

    async fn group_identify(&self, group: GroupIdentify) -> AppResult<()> {
        debug!(workspace_id = %group.workspace_id, "analytics disabled, dropping group identify");
        Ok(())
    }
}
