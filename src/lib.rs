//! Slang-to-idiom polishing service.
//!
//! A request carries a piece of internet slang; the service answers with an
//! idiom document produced by an OpenAI-compatible chat model and remembered
//! in a SQLite store keyed by a digest of the text.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod polish;
pub mod providers;

pub use cache::{digest, FixedHash, IdiomStore};
pub use config::Config;
pub use error::{PolishError, Result};
pub use polish::{PolishOptions, PolishOutcome, Polisher};
