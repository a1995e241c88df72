//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod anthropic_llm_client;
mod in_memory_event_source;
mod in_memory_summary_store;
mod langfuse_trace_recorder;
mod noop_event_capture;
mod noop_trace_recorder;
mod openai_llm_client;
mod postgres_event_source;
mod postgres_summary_store;
mod posthog_event_capture;

pub use anthropic_llm_client::{AnthropicLlmClient, DEFAULT_ANTHROPIC_MODEL};
pub use in_memory_event_source::InMemoryEventSource;
pub use in_memory_summary_store::InMemorySummaryStore;
pub use langfuse_trace_recorder::{DEFAULT_LANGFUSE_HOST, LangfuseTraceRecorder};
pub use noop_event_capture::NoopEventCapture;
pub use noop_trace_recorder::NoopTraceRecorder;
pub use openai_llm_client::{DEFAULT_OPENAI_MODEL, OpenAiLlmClient};
pub use postgres_event_source::{EventTableLayout, PostgresEventSource, default_event_sources};
pub use postgres_summary_store::PostgresSummaryStore;
pub use posthog_event_capture::PostHogEventCapture;
