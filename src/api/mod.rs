//! Endpoint families
//!
//! Each Wikimedia API family (page, category, RESTBase, Wikidata) supplies a
//! query builder and an extractor for the actions it supports. Sessions are
//! generic over the `Endpoint` trait and never know which family they drive.

pub mod category;
pub mod page;
pub mod restbase;
pub mod wikidata;

pub use category::CategoryApi;
pub use page::PageApi;
pub use restbase::RestbaseApi;
pub use wikidata::WikidataApi;

use serde_json::Value as Json;

use crate::data::AggregateData;
use crate::error::Result;
use crate::params::Params;
use crate::query::QueryBuilder;

/// Query building and data extraction for one API family
pub trait Endpoint: Send {
    /// Short name used in error messages (e.g. "page")
    fn name(&self) -> &'static str;

    /// Actions this endpoint can fetch, in the order a full lookup runs them
    fn actions(&self) -> &'static [&'static str];

    /// Whether `action` has anything to fetch for the current params
    ///
    /// Checked by full lookups between actions, after earlier extractions
    /// have had a chance to fill in params.
    fn applies(&self, _action: &str, _params: &Params) -> bool {
        true
    }

    /// Builds the request URL for `action`
    ///
    /// Implementations should call `QueryBuilder::set_status` so the session
    /// can report what is being fetched.
    fn build_query(&self, action: &str, qb: &mut QueryBuilder, params: &Params) -> Result<String>;

    /// Merges a validated payload for `action` into `data`
    ///
    /// May fill in `params.title`, `params.pageid` or `params.wikibase` once
    /// the payload reveals them.
    fn extract(
        &self,
        action: &str,
        payload: &Json,
        data: &mut AggregateData,
        params: &mut Params,
    ) -> Result<()>;
}

/// Target of a page-oriented request: title if known, else page id
pub(crate) fn page_target(params: &Params) -> String {
    match (&params.title, params.pageid) {
        (Some(title), _) => title.clone(),
        (None, Some(pageid)) => pageid.to_string(),
        (None, None) => String::new(),
    }
}

/// Copies a string field from `payload` into `data` when present
pub(crate) fn copy_text(data: &mut AggregateData, key: &str, payload: &Json, field: &str) {
    if let Some(text) = payload.get(field).and_then(Json::as_str) {
        data.insert(key.to_string(), text.into());
    }
}
