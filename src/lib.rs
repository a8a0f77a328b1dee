//! wptools library
//!
//! Caching sessions over the Wikimedia APIs: fetch page info, parse output,
//! RESTBase summaries and Wikidata entities, validate every response, and
//! keep the request/response/info triple of each action for inspection.

pub mod api;
pub mod cache;
pub mod cli;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod params;
pub mod query;
pub mod session;
pub mod transport;
pub mod validate;

pub use error::FetchError;
pub use params::{Flags, Params};
pub use session::{Inspection, Session};
