//! In-memory store of action records
//!
//! Provides a `CacheStore` mapping action names to the query that was sent,
//! the raw body that came back, and the transport metadata for the exchange.

use std::collections::BTreeMap;

use crate::transport::RequestInfo;

/// The cached triple for one action
///
/// A record starts out empty as a placeholder and is filled in as the fetch
/// progresses: the query first, then the response and info once the
/// transport returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionRecord {
    /// The exact request string sent, including the format marker
    pub query: Option<String>,
    /// Raw response body, `None` if the transport failed
    pub response: Option<String>,
    /// Transport metadata for the exchange
    pub info: Option<RequestInfo>,
}

impl ActionRecord {
    /// True until a query has been recorded
    pub fn is_placeholder(&self) -> bool {
        self.query.is_none() && self.response.is_none() && self.info.is_none()
    }
}

/// Maps action names to their cached records
///
/// Owned by a single session. Entries are created lazily on the first fetch
/// attempt for an action and are never removed.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    records: BTreeMap<String, ActionRecord>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, action: &str) -> bool {
        self.records.contains_key(action)
    }

    pub fn get(&self, action: &str) -> Option<&ActionRecord> {
        self.records.get(action)
    }

    /// Returns the record for `action`, inserting an empty placeholder first
    /// if none exists
    pub fn placeholder(&mut self, action: &str) -> &mut ActionRecord {
        self.records.entry(action.to_string()).or_default()
    }

    /// Names of every action with a record, in lexicographic order
    pub fn actions(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
