//! # Cache Keys and Version Hashes
//!
//! A [`CacheKey`] is the opaque string a client puts in the request path. The
//! backend disambiguates entries by `(key, version)`, where the version is the
//! SHA-256 of the key bytes rendered as 64 lowercase hex characters.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Caller-supplied cache key, used verbatim on the wire.
///
/// No normalization is applied: case, whitespace and embedded separators are
/// all significant. The only rules are that the key is non-empty and does not
/// start with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Validate and wrap a key.
    pub fn new(key: impl Into<String>) -> Result<Self, CoreError> {
        let key = key.into();
        if key.is_empty() {
            return Err(CoreError::EmptyKey);
        }
        if key.starts_with('/') {
            return Err(CoreError::LeadingSeparator(key));
        }
        Ok(Self(key))
    }

    /// Derive a key from a request path.
    ///
    /// Leading separators are stripped. Returns `None` when nothing is left,
    /// which the dispatcher treats as a liveness probe.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_start_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compute the version hash for this key.
    ///
    /// Recomputed on every call; the result is never cached alongside the key.
    pub fn version(&self) -> VersionHash {
        VersionHash::of(&self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SHA-256 of a cache key, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VersionHash(String);

impl VersionHash {
    /// Hash arbitrary key text. Total: the empty string hashes too.
    pub fn of(key: &str) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        Self(digest.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
