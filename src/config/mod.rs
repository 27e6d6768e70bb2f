//! Runtime configuration.
//!
//! Defaults, then environment (`.env` is loaded by the binary through
//! `dotenvy` before this runs), then CLI flags applied by `main`.
//!
//! | Variable                    | Field                    | Default                    |
//! |-----------------------------|--------------------------|----------------------------|
//! | `LLM_API_KEY`               | `llm.api_key`            | unset (not configured)     |
//! | `LLM_BASE_URL`              | `llm.base_url`           | `https://api.deepseek.com` |
//! | `LLM_MODEL`                 | `llm.model`              | `deepseek-chat`            |
//! | `LLM_TEMPERATURE`           | `llm.temperature`        | `1.0`                      |
//! | `LLM_TIMEOUT_SECS`          | `llm.timeout_secs`       | `120`                      |
//! | `POLISH_BIND`               | `server.bind`            | `127.0.0.1`                |
//! | `POLISH_PORT`               | `server.port`            | `5000`                     |
//! | `POLISH_WORKERS`            | `server.workers`         | tokio default              |
//! | `POLISH_DB_PATH`            | `cache.path`             | `cache.db`                 |
//! | `POLISH_CACHE_HIT_DELAY_MS` | `cache.hit_delay_ms`     | `500`                      |

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::config::ServerConfig;
use crate::error::{PolishError, Result};
use crate::providers::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Remote model settings.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// API key. `None` or empty means the model is not configured.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Chat model identifier.
    pub model: String,
    /// Sampling temperature sent with every request.
    pub temperature: f32,
    /// Client timeout for one model call, in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 1.0,
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Whether a usable API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Idiom cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite database file.
    pub path: PathBuf,
    /// Artificial latency added to cache hits, in milliseconds. 0 disables.
    pub hit_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cache.db"),
            hit_delay_ms: 500,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Overlay values from `lookup` (an environment accessor).
    ///
    /// Empty string values are ignored, except `LLM_API_KEY` where empty
    /// explicitly means "not configured".
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("LLM_API_KEY") {
            let key = key.trim().to_string();
            self.llm.api_key = (!key.is_empty()).then_some(key);
        }
        if let Some(url) = get("LLM_BASE_URL") {
            self.llm.base_url = url.trim().to_string();
        }
        if let Some(model) = get("LLM_MODEL") {
            self.llm.model = model.trim().to_string();
        }
        if let Some(v) = get("LLM_TEMPERATURE") {
            self.llm.temperature = parse_var("LLM_TEMPERATURE", &v)?;
        }
        if let Some(v) = get("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_var("LLM_TIMEOUT_SECS", &v)?;
        }
        if let Some(bind) = get("POLISH_BIND") {
            self.server.bind = bind.trim().to_string();
        }
        if let Some(v) = get("POLISH_PORT") {
            self.server.port = parse_var("POLISH_PORT", &v)?;
        }
        if let Some(v) = get("POLISH_WORKERS") {
            self.server.workers = Some(parse_var("POLISH_WORKERS", &v)?);
        }
        if let Some(path) = get("POLISH_DB_PATH") {
            self.cache.path = PathBuf::from(path.trim());
        }
        if let Some(v) = get("POLISH_CACHE_HIT_DELAY_MS") {
            self.cache.hit_delay_ms = parse_var("POLISH_CACHE_HIT_DELAY_MS", &v)?;
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PolishError::Config(format!("{name} has invalid value '{value}'")))
}
