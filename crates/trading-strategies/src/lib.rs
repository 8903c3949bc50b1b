//! Decision source implementations.
//!
//! This crate provides the strategies the engine can consult each step:
//! - LLM-backed decisions over an OpenAI-compatible chat API
//! - Uniform random decisions

mod llm;
mod random;
mod registry;

pub use llm::{
    prompt_for, CompletionClient, LlmConfig, LlmDecisionSource, OpenAiClient, DEFAULT_API_KEY_ENV,
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};
pub use random::RandomDecisionSource;
pub use registry::{DecisionSourceRegistry, SourceInfo};
