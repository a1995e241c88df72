use std::sync::Arc;

use pulse_application::{
    ActivationService, DashboardService, EventCapture, EventSource, FallbackLlmClient,
    InsightEvaluator, InsightService, LlmClient, LlmTraceRecorder, SummaryStore,
    TrackingService,
};
use pulse_infrastructure::{
    AnthropicLlmClient, InMemoryEventSource, InMemorySummaryStore, LangfuseTraceRecorder,
    NoopEventCapture, NoopTraceRecorder, OpenAiLlmClient, PostHogEventCapture,
    PostgresSummaryStore, default_event_sources,
};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::api_config::{AnalyticsProviderConfig, ApiConfig, LlmProviderConfig, SummaryStoreKind};
use crate::state::AppState;

mod unconfigured_llm;

use unconfigured_llm::UnconfiguredLlmClient;

pub fn build_app_state(pool: Option<PgPool>, config: &ApiConfig) -> AppState {
    let http_client = reqwest::Client::new();
    let local_log = Arc::new(InMemoryEventSource::new("memory"));

    let mut event_sources: Vec<Arc<dyn EventSource>> = match &pool {
        Some(pool) => default_event_sources(pool.clone()),
        None => {
            info!("DATABASE_URL not set, aggregating the in-process event log");
            Vec::new()
        }
    };
    if pool.is_none() || config.analytics == AnalyticsProviderConfig::Memory {
        event_sources.push(local_log.clone());
    }

    let summary_store: Arc<dyn SummaryStore> = match (config.summary_store, &pool) {
        (SummaryStoreKind::Postgres, Some(pool)) => {
            Arc::new(PostgresSummaryStore::new(pool.clone()))
        }
        _ => Arc::new(InMemorySummaryStore::new()),
    };

    let event_capture: Arc<dyn EventCapture> = match &config.analytics {
        AnalyticsProviderConfig::Noop => Arc::new(NoopEventCapture),
        AnalyticsProviderConfig::Memory => local_log,
        AnalyticsProviderConfig::PostHog { host, server_key } => Arc::new(PostHogEventCapture::new(
            http_client.clone(),
            host.as_str(),
            server_key.as_str(),
        )),
    };

    let trace_recorder: Arc<dyn LlmTraceRecorder> = match &config.langfuse {
        Some(langfuse) => Arc::new(LangfuseTraceRecorder::new(
            http_client.clone(),
            langfuse.host.as_str(),
            langfuse.public_key.as_str(),
            langfuse.secret_key.as_str(),
        )),
        None => {
            info!("Langfuse keys not set, llm traces are not recorded");
            Arc::new(NoopTraceRecorder)
        }
    };

    let llm_client = build_llm_client(&http_client, config);

    let mut activation_service = ActivationService::new(event_sources);
    if let Some(deadline) = config.aggregation_timeout {
        activation_service = activation_service.with_deadline(deadline);
    }
    info!(sources = ?activation_service.source_names(), "event sources configured");
    let dashboard_service = DashboardService::new(activation_service, summary_store.clone());

    let evaluator = config.ai_evaluation_enabled.then(|| {
        InsightEvaluator::new(llm_client.clone(), trace_recorder.clone())
            .with_model(config.evaluation_model.clone())
    });
    let insight_service = InsightService::new(
        dashboard_service.clone(),
        llm_client,
        event_capture.clone(),
        trace_recorder,
    )
    .with_evaluator(evaluator)
    .with_models(config.insight_models.clone());

    AppState {
        tracking_service: TrackingService::new(event_capture, summary_store),
        dashboard_service,
        insight_service,
    }
}

fn build_llm_client(http_client: &reqwest::Client, config: &ApiConfig) -> Arc<dyn LlmClient> {
    let openai = config
        .openai
        .as_ref()
        .map(|provider| openai_client(http_client, provider));
    let anthropic = config
        .anthropic
        .as_ref()
        .map(|provider| anthropic_client(http_client, provider));

    match (openai, anthropic) {
        (Some(primary), secondary) => {
            Arc::new(FallbackLlmClient::new(primary).with_secondary(secondary))
        }
        (None, Some(anthropic)) => anthropic,
        (None, None) => {
            warn!("no llm provider configured, insight endpoints will fail");
            Arc::new(UnconfiguredLlmClient)
        }
    }
}

fn openai_client(
    http_client: &reqwest::Client,
    provider: &LlmProviderConfig,
) -> Arc<dyn LlmClient> {
    Arc::new(OpenAiLlmClient::new(
        http_client.clone(),
        provider.api_key.as_str(),
        provider.model.as_str(),
    ))
}

fn anthropic_client(
    http_client: &reqwest::Client,
    provider: &LlmProviderConfig,
) -> Arc<dyn LlmClient> {
    Arc::new(AnthropicLlmClient::new(
        http_client.clone(),
        provider.api_key.as_str(),
        provider.model.as_str(),
    ))
}
