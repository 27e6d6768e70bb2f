//! OpenAI-compatible chat-completions provider.
//!
//! Works against any endpoint that speaks `POST {base}/chat/completions`
//! (DeepSeek, Moonshot, OpenAI). Auth is a bearer API key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::{PolishError, Result};

use super::{parse_provider_error, ChatOptions, LLMProvider, LLMResponse, Message, Usage};

/// Default API base when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Chat-completions client for OpenAI-compatible APIs.
pub struct OpenAIProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: Client,
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAIProvider {
    /// Build a provider with an explicit key, base URL, model and timeout.
    pub fn new(api_key: &str, base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PolishError::Provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }

    /// Build from config. Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };
        Self::new(
            key,
            &config.base_url,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_body(&self, messages: &[Message], options: &ChatOptions) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(temp) = options.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    /// Pull the assistant text out of a chat-completions response.
    pub fn extract_content(response: &Value) -> Option<String> {
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
    }

    fn extract_usage(response: &Value) -> Option<Usage> {
        let usage = response.get("usage")?;
        let prompt = usage["prompt_tokens"].as_u64()? as u32;
        let completion = usage["completion_tokens"].as_u64()? as u32;
        Some(Usage::new(prompt, completion))
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat(&self, messages: Vec<Message>, options: ChatOptions) -> Result<LLMResponse> {
        let body = self.build_body(&messages, &options);
        debug!(model = %self.model, "Chat completion request");

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PolishError::Provider(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&error_text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(error_text);
            return Err(parse_provider_error(status.as_u16(), &message).into());
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| PolishError::Provider(format!("failed to parse response: {e}")))?;

        let content = Self::extract_content(&json).ok_or_else(|| {
            PolishError::Provider("malformed response: no choices[0].message.content".into())
        })?;

        let mut llm_response = LLMResponse::text(&content);
        if let Some(usage) = Self::extract_usage(&json) {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion usage"
            );
            llm_response = llm_response.with_usage(usage);
        }
        Ok(llm_response)
    }

    fn name(&self) -> String {
        format!("openai-compatible:{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    fn provider(base: &str) -> OpenAIProvider {
        OpenAIProvider::new("sk-test", base, DEFAULT_MODEL, Duration::from_secs(5)).unwrap()
    }

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let p = provider("https://api.deepseek.com/");
        assert_eq!(p.api_url(), "https://api.deepseek.com/chat/completions");
    }

    #[test]
    fn test_build_body_includes_messages_and_temperature() {
        let p = provider(DEFAULT_BASE_URL);
        let messages = vec![Message::system("be classical"), Message::user("666")];
        let body = p.build_body(&messages, &ChatOptions::default().with_temperature(1.0));
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "666");
        assert_eq!(body["temperature"], 1.0);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_extract_content() {
        let resp = json!({"choices": [{"message": {"role": "assistant", "content": "{}"}}]});
        assert_eq!(OpenAIProvider::extract_content(&resp).as_deref(), Some("{}"));
        assert!(OpenAIProvider::extract_content(&json!({"choices": []})).is_none());
    }

    #[test]
    fn test_extract_usage() {
        let resp = json!({"usage": {"prompt_tokens": 12, "completion_tokens": 30}});
        let usage = OpenAIProvider::extract_usage(&resp).unwrap();
        assert_eq!(usage.total_tokens, 42);
        assert!(OpenAIProvider::extract_usage(&json!({})).is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        let p = provider(DEFAULT_BASE_URL);
        let dbg = format!("{p:?}");
        assert!(!dbg.contains("sk-test"));
        assert!(dbg.contains("REDACTED"));
    }

    #[test]
    fn test_from_config_without_key_is_none() {
        let cfg = LlmConfig::default();
        assert!(OpenAIProvider::from_config(&cfg).unwrap().is_none());

        let cfg = LlmConfig {
            api_key: Some(String::new()),
            ..LlmConfig::default()
        };
        assert!(OpenAIProvider::from_config(&cfg).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_chat_success_against_local_upstream() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["messages"][1]["content"], "绝绝子");
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "{\"idiom\":\"妙不可言\"}"}}],
                    "usage": {"prompt_tokens": 5, "completion_tokens": 7}
                }))
            }),
        );
        let base = spawn_upstream(router).await;
        let resp = provider(&base)
            .chat(vec![Message::system("s"), Message::user("绝绝子")], ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(resp.content, "{\"idiom\":\"妙不可言\"}");
        assert_eq!(resp.usage.map(|u| u.total_tokens), Some(12));
    }

    #[tokio::test]
    async fn test_chat_non_success_status_is_provider_error() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "Authentication Fails"}})),
                )
            }),
        );
        let base = spawn_upstream(router).await;
        let err = provider(&base)
            .chat(vec![Message::user("x")], ChatOptions::default())
            .await
            .unwrap_err();
        match err {
            PolishError::Provider(msg) => assert!(msg.contains("Authentication Fails")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_malformed_body_is_provider_error() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({"unexpected": true})) }),
        );
        let base = spawn_upstream(router).await;
        let err = provider(&base)
            .chat(vec![Message::user("x")], ChatOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }

    #[tokio::test]
    async fn test_chat_connection_refused_is_provider_error() {
        // Bind then drop to get a port nobody is listening on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = provider(&format!("http://{addr}"))
            .chat(vec![Message::user("x")], ChatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PolishError::Provider(_)));
    }
}
