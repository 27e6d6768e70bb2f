//! Lock-free counters for the polish pipeline.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::info;

use super::service::PolishOutcome;

/// Per-path request counters.
#[derive(Debug, Default)]
pub struct PolishMetrics {
    requests: AtomicU64,
    invalid_input: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    not_configured: AtomicU64,
    model_calls: AtomicU64,
    upstream_failures: AtomicU64,
    parse_failures: AtomicU64,
}

/// Point-in-time copy of [`PolishMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub invalid_input: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub not_configured: u64,
    pub model_calls: u64,
    pub upstream_failures: u64,
    pub parse_failures: u64,
}

impl PolishMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_input(&self) {
        self.invalid_input.fetch_add(1, Ordering::Relaxed);
    }

    /// Count the path a finished request took.
    pub fn record_outcome(&self, outcome: &PolishOutcome) {
        let bump = |c: &AtomicU64| {
            c.fetch_add(1, Ordering::Relaxed);
        };
        match outcome {
            PolishOutcome::CacheHit(_) => bump(&self.cache_hits),
            PolishOutcome::NotConfigured(_) => {
                bump(&self.cache_misses);
                bump(&self.not_configured);
            }
            PolishOutcome::Fresh(_) => {
                bump(&self.cache_misses);
                bump(&self.model_calls);
            }
            PolishOutcome::Unparseable(_) => {
                bump(&self.cache_misses);
                bump(&self.model_calls);
                bump(&self.parse_failures);
            }
            PolishOutcome::UpstreamFailed(_) => {
                bump(&self.cache_misses);
                bump(&self.model_calls);
                bump(&self.upstream_failures);
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            invalid_input: self.invalid_input.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            not_configured: self.not_configured.load(Ordering::Relaxed),
            model_calls: self.model_calls.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
        }
    }

    /// Emit current counters as a structured log line.
    pub fn emit_usage(&self, reason: &str) {
        let s = self.snapshot();
        info!(
            event = "usage_summary",
            reason = reason,
            requests = s.requests,
            cache_hits = s.cache_hits,
            cache_misses = s.cache_misses,
            model_calls = s.model_calls,
            upstream_failures = s.upstream_failures,
            parse_failures = s.parse_failures,
            "Polish metrics"
        );
    }
}
