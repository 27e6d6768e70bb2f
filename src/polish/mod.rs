//! The slang-to-idiom pipeline: repair of model replies, the orchestrator,
//! and its counters.

pub mod document;
pub mod metrics;
pub mod prompt;
pub mod repair;
pub mod service;

pub use document::IdiomDocument;
pub use metrics::{MetricsSnapshot, PolishMetrics};
pub use repair::{repair, Repaired};
pub use service::{PolishOptions, PolishOutcome, Polisher};
