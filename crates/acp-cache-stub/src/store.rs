//! In-memory storage backend using DashMap.
//!
//! Entries live in a `DashMap<i64, StubEntry>` keyed by cache id. A second map
//! tracks open reservations per `(key, version)` so a duplicate reservation is
//! detected atomically through the entry API.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// One reserved entry and the bytes uploaded into it so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubEntry {
    pub key: String,
    pub version: String,
    pub data: Vec<u8>,
    pub committed: bool,
}

/// Protocol violations the stub rejects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("cache {0} not found")]
    UnknownEntry(i64),
    #[error("cache {0} is already committed")]
    AlreadyCommitted(i64),
    #[error("range starts at {start} but {expected} bytes are uploaded")]
    OutOfOrder { expected: u64, start: u64 },
    #[error("declared size {declared} does not match {uploaded} uploaded bytes")]
    SizeMismatch { declared: u64, uploaded: u64 },
}

struct Inner {
    entries: DashMap<i64, StubEntry>,
    reservations: DashMap<(String, String), i64>,
    next_id: AtomicI64,
    public_url: String,
}

/// Shared application state holding the in-memory store.
///
/// Cheaply cloneable via `Arc`; all clones share the same data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    /// `public_url` is the externally reachable origin used to build archive
    /// locations, e.g. `http://127.0.0.1:8091`.
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                reservations: DashMap::new(),
                next_id: AtomicI64::new(1),
                public_url: public_url.into().trim_end_matches('/').to_string(),
            }),
        }
    }

    pub fn public_url(&self) -> &str {
        &self.inner.public_url
    }

    pub fn entries(&self) -> &DashMap<i64, StubEntry> {
        &self.inner.entries
    }

    /// Open a reservation. Returns `None` while another upload for the same
    /// key and version is still uncommitted.
    pub fn reserve(&self, key: &str, version: &str) -> Option<i64> {
        match self
            .inner
            .reservations
            .entry((key.to_string(), version.to_string()))
        {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                self.inner.entries.insert(
                    id,
                    StubEntry {
                        key: key.to_string(),
                        version: version.to_string(),
                        data: Vec::new(),
                        committed: false,
                    },
                );
                slot.insert(id);
                Some(id)
            }
        }
    }

    /// Append a chunk at `start`, which must equal the bytes uploaded so far.
    pub fn append(&self, id: i64, start: u64, chunk: &[u8]) -> Result<(), StoreError> {
        let mut guard = self
            .inner
            .entries
            .get_mut(&id)
            .ok_or(StoreError::UnknownEntry(id))?;
        let entry = guard.value_mut();
        if entry.committed {
            return Err(StoreError::AlreadyCommitted(id));
        }
        let expected = entry.data.len() as u64;
        if start != expected {
            return Err(StoreError::OutOfOrder { expected, start });
        }
        entry.data.extend_from_slice(chunk);
        Ok(())
    }

    /// Seal an entry. The declared size must match what was uploaded.
    pub fn commit(&self, id: i64, size: u64) -> Result<(), StoreError> {
        let (key, version) = {
            let mut guard = self
                .inner
                .entries
                .get_mut(&id)
                .ok_or(StoreError::UnknownEntry(id))?;
            let entry = guard.value_mut();
            if entry.committed {
                return Err(StoreError::AlreadyCommitted(id));
            }
            let uploaded = entry.data.len() as u64;
            if size != uploaded {
                return Err(StoreError::SizeMismatch {
                    declared: size,
                    uploaded,
                });
            }
            entry.committed = true;
            (entry.key.clone(), entry.version.clone())
        };
        self.inner.reservations.remove(&(key, version));
        Ok(())
    }

    /// Newest committed entry for `key` and `version`.
    pub fn lookup(&self, key: &str, version: &str) -> Option<i64> {
        self.inner
            .entries
            .iter()
            .filter(|e| {
                let entry = e.value();
                entry.committed && entry.key == key && entry.version == version
            })
            .map(|e| *e.key())
            .max()
    }

    /// Bytes of a committed entry.
    pub fn archive(&self, id: i64) -> Option<Vec<u8>> {
        self.inner
            .entries
            .get(&id)
            .filter(|e| e.value().committed)
            .map(|e| e.value().data.clone())
    }

    pub fn archive_location(&self, id: i64) -> String {
        format!("{}/_artifacts/{id}", self.inner.public_url)
    }
}
