use std::sync::Arc;

use pulse_domain::ActivationSnapshot;
use tracing::{info, warn};

use crate::activation_ports::SummaryStore;
use crate::activation_service::ActivationService;

/// Read model behind the activation dashboard.
///
/// Prefers summaries recomputed from the event log and only falls back to the
/// incrementally maintained summary store while the log is still empty. The
/// fallback may serve figures that lag behind the log.
#[derive(Clone)]
pub struct DashboardService {
    activation_service: ActivationService,
    summary_store: Arc<dyn SummaryStore>,
}

impl DashboardService {
    /// Creates a dashboard service.
    #[must_use]
    pub fn new(
        activation_service: ActivationService,
        summary_store: Arc<dyn SummaryStore>,
    ) -> Self {
        Self {
            activation_service,
            summary_store,
        }
    }

    /// Returns current activation figures.
    pub async fn activation_snapshot(&self) -> ActivationSnapshot {
        let summaries = self.activation_service.compute_workspace_summaries().await;
        if !summaries.is_empty() {
            return ActivationSnapshot::from_summaries(summaries);
        }

        match self.summary_store.list_summaries().await {
            Ok(stored) => {
                if !stored.is_empty() {
                    info!(
                        workspace_count = stored.len(),
                        "event log empty, serving stored workspace summaries"
                    );
                }
                ActivationSnapshot::from_summaries(stored)
            }
            Err(error) => {
                warn!(error = %error, "failed to list stored workspace summaries");
                ActivationSnapshot::from_summaries(Vec::new())
            }
        }
    }
}
