//! LLM provider abstraction.
//!
//! [`LLMProvider`] is the seam between the orchestrator and the remote model.
//! Production uses [`OpenAIProvider`]; tests substitute a mock.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{PolishError, Result};

pub use openai::OpenAIProvider;

/// Role of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling options for a chat call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Text returned by a chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

impl LLMResponse {
    pub fn text(content: &str) -> Self {
        Self {
            content: content.to_string(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A chat-completion backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send `messages` and return the assistant's reply text.
    async fn chat(&self, messages: Vec<Message>, options: ChatOptions) -> Result<LLMResponse>;

    /// Provider label for logs.
    fn name(&self) -> String;
}

/// Upstream failure classified by HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },
    #[error("rate limited: {0}")]
    RateLimit(String),
    #[error("upstream server error ({status}): {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid request ({status}): {message}")]
    InvalidRequest { status: u16, message: String },
    #[error("unexpected status {status}: {message}")]
    Other { status: u16, message: String },
}

/// Classify a non-success response.
pub fn parse_provider_error(status: u16, message: &str) -> ProviderError {
    let message = message.to_string();
    match status {
        401 | 403 => ProviderError::Auth { status, message },
        429 => ProviderError::RateLimit(message),
        500..=599 => ProviderError::ServerError { status, message },
        400..=499 => ProviderError::InvalidRequest { status, message },
        _ => ProviderError::Other { status, message },
    }
}

impl From<ProviderError> for PolishError {
    fn from(err: ProviderError) -> Self {
        PolishError::Provider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_error_classes() {
        assert!(matches!(
            parse_provider_error(401, "bad key"),
            ProviderError::Auth { status: 401, .. }
        ));
        assert!(matches!(
            parse_provider_error(429, "slow down"),
            ProviderError::RateLimit(_)
        ));
        assert!(matches!(
            parse_provider_error(503, "overloaded"),
            ProviderError::ServerError { status: 503, .. }
        ));
        assert!(matches!(
            parse_provider_error(422, "bad body"),
            ProviderError::InvalidRequest { .. }
        ));
        assert!(matches!(
            parse_provider_error(302, "moved"),
            ProviderError::Other { .. }
        ));
    }

    #[test]
    fn test_provider_error_into_polish_error() {
        let err: PolishError = parse_provider_error(500, "boom").into();
        match err {
            PolishError::Provider(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_usage_total() {
        let u = Usage::new(10, 5);
        assert_eq!(u.total_tokens, 15);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_value(Message::system("hi")).unwrap();
        assert_eq!(json["role"], "system");
    }
}
