mod llm;
mod trace;

pub use llm::{LlmClient, LlmRequest};
pub use trace::{LlmTrace, LlmTraceRecorder};
