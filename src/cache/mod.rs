//! Per-session cache of request/response/info triples
//!
//! Each action a session fetches gets exactly one `ActionRecord`. Records are
//! kept in memory for the life of the session and are never written to disk.

mod store;

pub use store::{ActionRecord, CacheStore};
