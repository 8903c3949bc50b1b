//! LLM-backed decision source.
//!
//! Asks a chat-completion model for a one-word answer at the current price.
//! Anything other than a clean "buy", "sell" or "hold" (including errors and
//! timeouts) becomes a hold.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trading_core::{
    error::{ConfigError, DecisionError},
    traits::DecisionSource,
    types::Decision,
};
use tracing::{debug, warn};

pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the chat-completion backend.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Create a config with default endpoint, model and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the API key from `key_var`; empty counts as missing.
    pub fn from_env(key_var: &str) -> Result<Self, ConfigError> {
        std::env::var(key_var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Self::new)
            .ok_or_else(|| ConfigError::MissingCredential(key_var.to_string()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A free-text completion backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` and return the model's raw reply.
    async fn complete(&self, prompt: &str) -> Result<String, DecisionError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiClient {
    config: LlmConfig,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, DecisionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DecisionError::Backend(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, DecisionError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: 1,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DecisionError::Timeout(self.config.timeout)
                } else {
                    DecisionError::Backend(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DecisionError::Backend(format!("{}: {}", status, text)));
        }

        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| DecisionError::Backend(e.to_string()))?;

        data.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DecisionError::InvalidResponse(String::new()))
    }
}

/// Build the question put to the model.
pub fn prompt_for(last_price: Decimal) -> String {
    format!(
        "The current price of the asset is {}. Should we 'buy', 'sell', or 'hold'?",
        last_price
    )
}

/// Decision source that consults a language model.
pub struct LlmDecisionSource<C> {
    client: C,
    timeout: Duration,
}

impl LlmDecisionSource<OpenAiClient> {
    /// Create a source backed by the OpenAI-compatible client.
    pub fn openai(config: LlmConfig) -> Result<Self, DecisionError> {
        let timeout = config.timeout;
        Ok(Self::new(OpenAiClient::new(config)?, timeout))
    }
}

impl<C: CompletionClient> LlmDecisionSource<C> {
    /// Wrap a completion client; calls slower than `timeout` count as failures.
    pub fn new(client: C, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Ask the model, surfacing why no decision could be read.
    pub async fn try_decide(&self, last_price: Decimal) -> Result<Decision, DecisionError> {
        let prompt = prompt_for(last_price);

        let reply = tokio::time::timeout(self.timeout, self.client.complete(&prompt))
            .await
            .map_err(|_| DecisionError::Timeout(self.timeout))??;

        debug!(reply = %reply.trim(), "Model replied");
        reply
            .parse::<Decision>()
            .map_err(|_| DecisionError::InvalidResponse(reply))
    }
}

#[async_trait]
impl<C: CompletionClient> DecisionSource for LlmDecisionSource<C> {
    async fn decide(&self, last_price: Decimal) -> Decision {
        match self.try_decide(last_price).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(error = %e, price = %last_price, "Decision backend failed, holding");
                Decision::Hold
            }
        }
    }

    fn name(&self) -> &str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Replies with a canned result, optionally after a delay.
    struct CannedClient {
        reply: Result<String, String>,
        delay: Duration,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedClient {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                delay: Duration::ZERO,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                delay: Duration::ZERO,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn slow(text: &str, delay: Duration) -> Self {
            Self {
                delay,
                ..Self::replying(text)
            }
        }
    }

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn complete(&self, prompt: &str) -> Result<String, DecisionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply.clone().map_err(DecisionError::Backend)
        }
    }

    fn source(client: CannedClient) -> LlmDecisionSource<CannedClient> {
        LlmDecisionSource::new(client, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_reply_is_trimmed_and_case_folded() {
        let source = source(CannedClient::replying(" SELL\n"));
        assert_eq!(source.decide(dec!(150.00)).await, Decision::Sell);
    }

    #[tokio::test]
    async fn test_prompt_embeds_price() {
        let source = source(CannedClient::replying("buy"));
        assert_eq!(source.decide(dec!(187.42)).await, Decision::Buy);

        let prompts = source.client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("187.42"));
        assert!(prompts[0].contains("'buy', 'sell', or 'hold'"));
    }

    #[tokio::test]
    async fn test_backend_error_holds() {
        let source = source(CannedClient::failing("connection refused"));
        assert!(matches!(
            source.try_decide(dec!(1)).await,
            Err(DecisionError::Backend(_))
        ));
        assert_eq!(source.decide(dec!(1)).await, Decision::Hold);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_backend_holds() {
        let source = source(CannedClient::slow("buy", Duration::from_secs(30)));
        assert!(matches!(
            source.try_decide(dec!(1)).await,
            Err(DecisionError::Timeout(_))
        ));
        assert_eq!(source.decide(dec!(1)).await, Decision::Hold);
    }

    #[tokio::test]
    async fn test_ambiguous_replies_hold() {
        for reply in ["", "   ", "Buy.", "sell now", "maybe", "BUYSELL", "h"] {
            let source = source(CannedClient::replying(reply));
            assert_eq!(source.decide(dec!(10)).await, Decision::Hold, "reply {reply:?}");
        }
    }

    proptest! {
        #[test]
        fn prop_decide_only_acts_on_exact_words(reply in ".*") {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let source = source(CannedClient::replying(&reply));
            let decision = rt.block_on(source.decide(dec!(42)));

            let expected = match reply.trim().to_lowercase().as_str() {
                "buy" => Decision::Buy,
                "sell" => Decision::Sell,
                _ => Decision::Hold,
            };
            prop_assert_eq!(decision, expected);
        }
    }

    #[tokio::test]
    async fn test_openai_client_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-3.5-turbo", "max_tokens": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "Hold"}, "finish_reason": "length"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = LlmConfig::new("sk-test").with_base_url(server.uri());
        let source = LlmDecisionSource::openai(config).unwrap();
        assert_eq!(source.try_decide(dec!(99.5)).await.unwrap(), Decision::Hold);
    }

    #[tokio::test]
    async fn test_openai_client_http_error_holds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let config = LlmConfig::new("sk-test").with_base_url(server.uri());
        let source = LlmDecisionSource::openai(config).unwrap();
        assert_eq!(source.decide(dec!(99.5)).await, Decision::Hold);
    }

    #[tokio::test]
    async fn test_openai_client_empty_choices_holds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let config = LlmConfig::new("sk-test").with_base_url(server.uri());
        let source = LlmDecisionSource::openai(config).unwrap();
        assert!(matches!(
            source.try_decide(dec!(1)).await,
            Err(DecisionError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("LLM_TEST_KEY_SET", "sk-abc");
        std::env::set_var("LLM_TEST_KEY_EMPTY", "");

        assert_eq!(LlmConfig::from_env("LLM_TEST_KEY_SET").unwrap().api_key, "sk-abc");
        assert_eq!(
            LlmConfig::from_env("LLM_TEST_KEY_EMPTY").unwrap_err(),
            ConfigError::MissingCredential("LLM_TEST_KEY_EMPTY".into())
        );
    }
}
