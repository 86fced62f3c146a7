//! # acp-core — Foundational Types for the Artifact Cache Proxy
//!
//! Leaf crate of the workspace. Defines the identifiers and byte-accounting
//! primitives shared by the backend client and the HTTP dispatcher.
//!
//! ## Key Design Principles
//!
//! 1. **Newtypes for every protocol value.** `CacheKey`, `VersionHash`,
//!    `CacheEntryId`, `ArchiveLocation`. No bare strings cross crate
//!    boundaries.
//!
//! 2. **`VersionHash` is derived, never stored.** The only constructor hashes
//!    key bytes; callers recompute it from the `CacheKey` on every operation.
//!
//! 3. **`UploadCursor` only moves forward.** It advances by the exact length
//!    of each acknowledged `ByteRange` and rejects ranges that do not start
//!    at its current position.
//!
//! 4. **Chunking is an explicit loop.** [`chunk::ChunkReader`] turns any
//!    `AsyncRead` into full, fixed-size windows; the caller drives it one
//!    chunk at a time.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `acp-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod chunk;
pub mod cursor;
pub mod entry;
pub mod error;
pub mod key;

pub use chunk::{Chunk, ChunkReader, DEFAULT_CHUNK_SIZE};
pub use cursor::{ByteRange, UploadCursor};
pub use entry::{ArchiveLocation, CacheEntryId};
pub use error::CoreError;
pub use key::{CacheKey, VersionHash};
