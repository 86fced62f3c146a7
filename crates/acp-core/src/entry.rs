//! Backend-issued handles: reservation ids and archive download locations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle for one in-progress reservation.
///
/// Produced by exactly one reserve call and consumed by exactly one commit.
/// Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheEntryId(i64);

impl CacheEntryId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CacheEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pre-signed URL from which an entry's bytes can be fetched with a plain GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLocation(String);

impl ArchiveLocation {
    /// Wrap a backend-provided location. Empty strings are not locations.
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        if location.is_empty() {
            None
        } else {
            Some(Self(location))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
