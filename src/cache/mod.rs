//! Content-addressed idiom cache: key derivation and SQLite persistence.

pub mod digest;
pub mod store;

pub use digest::{digest, FixedHash};
pub use store::{CacheEntry, IdiomStore};
