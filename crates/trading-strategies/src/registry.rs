//! Decision source registry for picking a source from configuration.

use crate::{LlmConfig, LlmDecisionSource, RandomDecisionSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use trading_core::{error::ConfigError, traits::DecisionSource};
use tracing::info;

/// Information about a registered decision source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Source name
    pub name: String,
    /// Source description
    pub description: String,
}

/// Registry for available decision sources.
pub struct DecisionSourceRegistry {
    sources: HashMap<String, SourceInfo>,
}

impl DecisionSourceRegistry {
    /// Create a new registry with all built-in sources.
    pub fn new() -> Self {
        let mut sources = HashMap::new();

        sources.insert(
            "auto".to_string(),
            SourceInfo {
                name: "auto".to_string(),
                description: "LLM when an API key is configured, random otherwise".to_string(),
            },
        );

        sources.insert(
            "llm".to_string(),
            SourceInfo {
                name: "llm".to_string(),
                description: "Asks a chat-completion model; holds on any unclear answer".to_string(),
            },
        );

        sources.insert(
            "random".to_string(),
            SourceInfo {
                name: "random".to_string(),
                description: "Uniform random buy/sell/hold".to_string(),
            },
        );

        Self { sources }
    }

    /// List all available sources.
    pub fn list(&self) -> Vec<&SourceInfo> {
        let mut list: Vec<_> = self.sources.values().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    /// Check if a source exists.
    pub fn exists(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Create a decision source.
    ///
    /// `llm` is the outcome of loading the model credentials: `llm` needs it,
    /// `auto` falls back to random without it.
    pub fn create(
        &self,
        name: &str,
        llm: Result<LlmConfig, ConfigError>,
    ) -> Result<Arc<dyn DecisionSource>, ConfigError> {
        match name {
            "llm" => Self::llm(llm?),
            "auto" => match llm {
                Ok(config) => Self::llm(config),
                Err(e) => {
                    info!(reason = %e, "No language model configured, using random decisions");
                    Ok(Arc::new(RandomDecisionSource::new()))
                }
            },
            "random" => Ok(Arc::new(RandomDecisionSource::new())),
            _ => Err(ConfigError::UnknownDecisionSource(name.to_string())),
        }
    }

    fn llm(config: LlmConfig) -> Result<Arc<dyn DecisionSource>, ConfigError> {
        info!(model = %config.model, "Using language model decisions");
        let source = LlmDecisionSource::openai(config)
            .map_err(|e| ConfigError::Invalid(format!("decision backend: {e}")))?;
        Ok(Arc::new(source))
    }
}

impl Default for DecisionSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
