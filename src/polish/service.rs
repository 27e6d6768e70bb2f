//! Request orchestration: cache lookup, model call, repair, persist.
//!
//! Every non-empty input resolves to exactly one [`PolishOutcome`]; the only
//! error [`Polisher::polish`] returns is [`PolishError::InvalidInput`].
//! Requests are independent. Two concurrent misses for the same text may
//! both reach the model, and the later `put` wins.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{digest, IdiomStore};
use crate::config::Config;
use crate::error::{PolishError, Result};
use crate::providers::{ChatOptions, LLMProvider, Message};

use super::document::IdiomDocument;
use super::metrics::PolishMetrics;
use super::prompt::SYSTEM_PROMPT;
use super::repair::{repair, Repaired};

/// Message surfaced for empty input.
pub const NO_TEXT_PROVIDED: &str = "No text provided";

/// Tunables for the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct PolishOptions {
    /// Sampling temperature for the model call.
    pub temperature: f32,
    /// Added to cache hits so hit and miss latency look alike. Zero disables.
    pub cache_hit_delay: Duration,
}

impl Default for PolishOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            cache_hit_delay: Duration::from_millis(500),
        }
    }
}

impl From<&Config> for PolishOptions {
    fn from(config: &Config) -> Self {
        Self {
            temperature: config.llm.temperature,
            cache_hit_delay: Duration::from_millis(config.cache.hit_delay_ms),
        }
    }
}

/// Which path a request took, with the document to return.
#[derive(Debug, Clone, PartialEq)]
pub enum PolishOutcome {
    /// Served from the store.
    CacheHit(Value),
    /// Fresh model answer, now persisted.
    Fresh(Value),
    /// No API key configured; guidance document, not cached.
    NotConfigured(Value),
    /// Model call failed; error document, not cached.
    UpstreamFailed(Value),
    /// Model replied with unparseable output; diagnostic document, not cached.
    Unparseable(Value),
}

impl PolishOutcome {
    pub fn document(&self) -> &Value {
        match self {
            PolishOutcome::CacheHit(v)
            | PolishOutcome::Fresh(v)
            | PolishOutcome::NotConfigured(v)
            | PolishOutcome::UpstreamFailed(v)
            | PolishOutcome::Unparseable(v) => v,
        }
    }

    pub fn into_document(self) -> Value {
        match self {
            PolishOutcome::CacheHit(v)
            | PolishOutcome::Fresh(v)
            | PolishOutcome::NotConfigured(v)
            | PolishOutcome::UpstreamFailed(v)
            | PolishOutcome::Unparseable(v) => v,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            PolishOutcome::CacheHit(_) => "cache_hit",
            PolishOutcome::Fresh(_) => "fresh",
            PolishOutcome::NotConfigured(_) => "not_configured",
            PolishOutcome::UpstreamFailed(_) => "upstream_failed",
            PolishOutcome::Unparseable(_) => "unparseable",
        }
    }
}

/// The polish pipeline with its dependencies.
pub struct Polisher {
    store: IdiomStore,
    provider: Option<Arc<dyn LLMProvider>>,
    options: PolishOptions,
    metrics: Arc<PolishMetrics>,
}

impl Polisher {
    /// `provider = None` means no model credential is configured.
    pub fn new(
        store: IdiomStore,
        provider: Option<Arc<dyn LLMProvider>>,
        options: PolishOptions,
    ) -> Self {
        Self {
            store,
            provider,
            options,
            metrics: Arc::new(PolishMetrics::new()),
        }
    }

    pub fn store(&self) -> &IdiomStore {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<PolishMetrics> {
        &self.metrics
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Resolve `text` to a document.
    pub async fn polish(&self, text: &str) -> Result<PolishOutcome> {
        self.metrics.record_request();
        if text.is_empty() {
            self.metrics.record_invalid_input();
            return Err(PolishError::InvalidInput(NO_TEXT_PROVIDED.to_string()));
        }

        let outcome = self.resolve(text).await;
        self.metrics.record_outcome(&outcome);
        info!(outcome = outcome.label(), chars = text.chars().count(), "Polish request resolved");
        Ok(outcome)
    }

    async fn resolve(&self, text: &str) -> PolishOutcome {
        let key = digest(text);

        if let Some(doc) = self.store.get(key).await {
            debug!(key = %key.short(), "Serving cached idiom");
            if !self.options.cache_hit_delay.is_zero() {
                tokio::time::sleep(self.options.cache_hit_delay).await;
            }
            return PolishOutcome::CacheHit(doc);
        }

        let Some(provider) = self.provider.as_ref() else {
            debug!(key = %key.short(), "No LLM_API_KEY configured, returning guidance");
            return PolishOutcome::NotConfigured(IdiomDocument::not_configured(text).into_value());
        };

        let messages = vec![Message::system(SYSTEM_PROMPT), Message::user(text)];
        let options = ChatOptions::default().with_temperature(self.options.temperature);

        let reply = match provider.chat(messages, options).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(key = %key.short(), provider = %provider.name(), "Model call failed: {}", e);
                let detail = match &e {
                    PolishError::Provider(msg) => msg.clone(),
                    other => other.to_string(),
                };
                return PolishOutcome::UpstreamFailed(
                    IdiomDocument::upstream_failed(text, &detail).into_value(),
                );
            }
        };
        debug!(key = %key.short(), reply_chars = reply.content.chars().count(), "Model replied");

        match repair(&reply.content, text) {
            Repaired::Parsed(doc) => {
                self.store.put(key, text, &doc).await;
                PolishOutcome::Fresh(doc)
            }
            Repaired::Fallback(doc) => {
                warn!(key = %key.short(), "Model reply is not a JSON object, not caching");
                PolishOutcome::Unparseable(doc)
            }
        }
    }
}
