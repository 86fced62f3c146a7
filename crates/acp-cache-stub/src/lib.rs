//! # acp-cache-stub — In-memory artifact cache backend
//!
//! Implements the four backend endpoints the proxy calls, plus an archive
//! download route, on top of a DashMap store. Used by the proxy's end-to-end
//! tests and for local development without real backend credentials.
//!
//! Storage is in-memory with no persistence; data is lost on restart.
//!
//! The stub enforces the parts of the protocol the proxy must respect:
//!
//! - API routes require a bearer token (any non-empty value), else 401.
//! - A second reservation of an uncommitted key and version is a 409.
//! - Chunks must arrive in order with a `Content-Range` matching the body, else 400.
//! - The committed size must equal the uploaded byte count, else 400.
//! - Only committed entries are visible to lookups and downloads.

pub mod routes;
pub mod store;

pub use routes::router;
pub use store::{AppState, StoreError, StubEntry};
