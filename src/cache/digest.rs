//! Content addressing for cache keys.
//!
//! A [`FixedHash`] is the first 128 bits of the SHA-256 digest of the input
//! text's UTF-8 bytes. It is only ever used as a lookup key, so truncation is
//! harmless at the volumes this service sees.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

/// Width of a cache key in bytes.
pub const HASH_LEN: usize = 16;

/// Fixed-width content fingerprint used as the cache primary key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedHash([u8; HASH_LEN]);

impl FixedHash {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Lowercase hex form, as stored in the database.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters, for log fields.
    pub fn short(&self) -> String {
        let mut s = self.to_hex();
        s.truncate(8);
        s
    }
}

/// Compute the cache key for `text`.
pub fn digest(text: &str) -> FixedHash {
    let full = Sha256::digest(text.as_bytes());
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&full[..HASH_LEN]);
    FixedHash(out)
}

impl fmt::Display for FixedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for FixedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedHash({})", self.to_hex())
    }
}

impl From<[u8; HASH_LEN]> for FixedHash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

/// Error returned when parsing a hex key of the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cache key: {0}")]
pub struct ParseHashError(String);

impl FromStr for FixedHash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ParseHashError(e.to_string()))?;
        let arr: [u8; HASH_LEN] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| ParseHashError(format!("expected {HASH_LEN} bytes, got {}", v.len())))?;
        Ok(Self(arr))
    }
}
