//! SQLite-backed artifact store for idiom documents.
//!
//! One row per content key in the `idiom_cache` table. Writes are whole-row
//! upserts (`INSERT OR REPLACE`), so concurrent readers never observe a torn
//! document. The store is a cache: every failure after [`IdiomStore::open`]
//! is logged and swallowed, reads degrade to a miss and writes are dropped.
//!
//! # Example
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use idiom_polish::cache::{digest, IdiomStore};
//! use serde_json::json;
//!
//! let store = IdiomStore::open_in_memory().unwrap();
//! let key = digest("绝绝子");
//! store.put(key, "绝绝子", &json!({"idiom": "妙不可言"})).await;
//! assert_eq!(store.get(key).await, Some(json!({"idiom": "妙不可言"})));
//! # });
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{PolishError, Result};

use super::digest::FixedHash;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS idiom_cache (
    original_text_hash TEXT PRIMARY KEY,
    original_text      TEXT NOT NULL,
    response_json      TEXT NOT NULL,
    created_at         TEXT NOT NULL
)";

/// A single cached document with its bookkeeping columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Content key, `digest(original_text)`.
    pub key: FixedHash,
    /// The user text the document answers.
    pub original_text: String,
    /// The stored document, exactly as it was written.
    pub document: Value,
    /// When this row was last upserted.
    pub created_at: DateTime<Utc>,
}

/// Persistent key → document store.
///
/// Clone is cheap; all clones share one connection behind a mutex. Every
/// operation runs on the blocking pool and holds the lock only for the
/// duration of a single statement.
#[derive(Clone)]
pub struct IdiomStore {
    conn: Arc<Mutex<Connection>>,
    location: String,
}

impl std::fmt::Debug for IdiomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdiomStore")
            .field("location", &self.location)
            .finish()
    }
}

impl IdiomStore {
    /// Open (or create) the store at `path`.
    ///
    /// Creates the parent directory and the table if either is missing, so it
    /// is safe to call on every startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %path.display(), journal_mode = %mode, "Idiom cache opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location: path.display().to_string(),
        })
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location: ":memory:".to_string(),
        })
    }

    /// Where this store lives on disk, or `:memory:`.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Look up the document stored for `key`.
    ///
    /// Returns `None` on a miss and on any storage or decoding failure.
    pub async fn get(&self, key: FixedHash) -> Option<Value> {
        self.entry(key).await.map(|e| e.document)
    }

    /// Look up the full row stored for `key`.
    pub async fn entry(&self, key: FixedHash) -> Option<CacheEntry> {
        let result = self
            .run(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT original_text, response_json, created_at
                         FROM idiom_cache WHERE original_text_hash = ?1",
                        params![key.to_hex()],
                        |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, String>(2)?,
                            ))
                        },
                    )
                    .optional()?;
                let Some((original_text, json, created_at)) = row else {
                    return Ok(None);
                };
                let document: Value = serde_json::from_str(&json)?;
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .map_err(|e| PolishError::Store(format!("bad created_at: {e}")))?
                    .with_timezone(&Utc);
                Ok(Some(CacheEntry {
                    key,
                    original_text,
                    document,
                    created_at,
                }))
            })
            .await;

        match result {
            Ok(Some(entry)) => {
                debug!(key = %key.short(), "Idiom cache hit");
                Some(entry)
            }
            Ok(None) => {
                debug!(key = %key.short(), "Idiom cache miss");
                None
            }
            Err(e) => {
                warn!(key = %key.short(), "Idiom cache read failed, treating as miss: {}", e);
                None
            }
        }
    }

    /// Insert or replace the document for `key`.
    ///
    /// A failed write is logged and dropped; the caller's response is
    /// unaffected.
    pub async fn put(&self, key: FixedHash, original_text: &str, document: &Value) {
        let json = match serde_json::to_string(document) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %key.short(), "Failed to encode document for cache: {}", e);
                return;
            }
        };
        let original_text = original_text.to_string();
        let created_at = Utc::now().to_rfc3339();

        let result = self
            .run(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO idiom_cache
                     (original_text_hash, original_text, response_json, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![key.to_hex(), original_text, json, created_at],
                )?;
                Ok(())
            })
            .await;

        match result {
            Ok(()) => debug!(key = %key.short(), "Idiom cache entry stored"),
            Err(e) => warn!(key = %key.short(), "Idiom cache write failed, dropping: {}", e),
        }
    }

    /// Number of cached documents. Returns 0 if the table cannot be read.
    pub async fn len(&self) -> usize {
        let result = self
            .run(|conn| {
                let n: i64 = conn.query_row("SELECT COUNT(*) FROM idiom_cache", [], |r| r.get(0))?;
                Ok(usize::try_from(n).unwrap_or(0))
            })
            .await;
        result.unwrap_or_else(|e| {
            warn!("Idiom cache count failed: {}", e);
            0
        })
    }

    /// Return `true` if the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // -- private helpers ---------------------------------------------------

    /// Run `op` against the connection on the blocking pool.
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| PolishError::Store(format!("lock error: {e}")))?;
            op(&*conn)
        })
        .await
        .map_err(|e| PolishError::Store(format!("spawn_blocking error: {e}")))?
    }
}
