//! Request orchestration for one lookup
//!
//! A `Session` owns everything a lookup accumulates: its params and flags,
//! the per-action cache, and the aggregate data extracted so far. It decides
//! for each requested action whether to reuse the cache, skip it, or fetch
//! it, and runs every fetched body through validation and extraction.

use std::time::Duration;

use reqwest::Url;
use serde_json::Value as Json;
use tracing::debug;

use crate::api::Endpoint;
use crate::cache::{ActionRecord, CacheStore};
use crate::data::AggregateData;
use crate::diagnostics::{Diagnostics, Stderr};
use crate::error::Result;
use crate::format;
use crate::params::{Flags, Params};
use crate::query::{strip_format, QueryBuilder};
use crate::transport::{HttpTransport, RequestInfo, RequestOptions, Transport};
use crate::validate::validate;

/// The one action that may be fetched again after it is cached
const REFETCHABLE_ACTION: &str = "imageinfo";

/// Result of an inspector lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Inspection<T> {
    /// The requested field of the named action's record
    Record(T),
    /// No (known) action was named; these are the cached ones
    Actions(Vec<String>),
}

/// Orchestrates fetches for one lookup against one endpoint family
pub struct Session<E, T = HttpTransport> {
    params: Params,
    flags: Flags,
    cache: CacheStore,
    data: AggregateData,
    endpoint: E,
    transport: T,
    sink: Box<dyn Diagnostics>,
}

impl<E: Endpoint> Session<E, HttpTransport> {
    /// Creates a session that talks HTTP and writes diagnostics to stderr
    pub fn new(endpoint: E, params: Params, flags: Flags) -> Self {
        let transport = HttpTransport::new().verbose(flags.verbose);
        Self::with_transport(endpoint, transport, params, flags)
    }
}

impl<E: Endpoint, T: Transport> Session<E, T> {
    /// Creates a session with a custom transport
    pub fn with_transport(endpoint: E, transport: T, params: Params, flags: Flags) -> Self {
        Self {
            params,
            flags,
            cache: CacheStore::new(),
            data: AggregateData::new(),
            endpoint,
            transport,
            sink: Box::new(Stderr),
        }
    }

    /// Replaces the diagnostic channel
    pub fn with_diagnostics(mut self, sink: impl Diagnostics + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn data(&self) -> &AggregateData {
        &self.data
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Writes a status line unless the session is silent
    fn note(&mut self, line: &str) {
        if !self.flags.silent {
            self.sink.emit(line);
        }
    }

    /// Fetches `action` unless it is cached or skipped
    ///
    /// # Arguments
    /// * `action` - Action name, e.g. "query" or "wikidata"
    /// * `show` - Print the aggregate data once the fetch succeeds
    /// * `proxy` - Proxy URL for this request
    /// * `timeout` - Request timeout
    ///
    /// # Returns
    /// * `Ok(())` - Fetched and extracted, or a cache hit, or skipped
    /// * `Err(FetchError)` - Validation or extraction failed
    ///
    /// # Behavior
    /// - A cached action is not fetched again, except "imageinfo"
    /// - A placeholder record is created before anything else happens
    /// - Skipped actions stop after the placeholder
    /// - The query is recorded before the transport is called
    pub async fn fetch(
        &mut self,
        action: &str,
        show: bool,
        proxy: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        if self.cache.contains(action) && action != REFETCHABLE_ACTION {
            self.note(&format!("+ {} results in cache", action));
            return Ok(());
        }
        self.cache.placeholder(action);

        if self.flags.skips(action) {
            self.note(&format!("+ skipping {}", action));
            return Ok(());
        }

        let mut qb = QueryBuilder::for_params(&self.params);
        let query = self.endpoint.build_query(action, &mut qb, &self.params)?;
        self.cache.placeholder(action).query = Some(query.clone());

        let host = Url::parse(&query)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| qb.domain());
        self.note(&format!("{} ({})", host, qb.status()));

        let options = RequestOptions {
            proxy: proxy.map(str::to_string),
            timeout,
        };
        debug!(action, query = %query, "fetching");
        let response = self.transport.get(&query, qb.status(), &options).await;
        {
            let record = self.cache.placeholder(action);
            record.response = response.body;
            record.info = Some(response.info);
        }

        self.set_data(action)?;

        if show {
            self.show();
        }
        Ok(())
    }

    /// Fetches every action the endpoint offers, in order
    ///
    /// Actions with nothing to fetch for the params bound so far are left
    /// out, so a page without a lead image never requests "imageinfo". The
    /// report is shown once, after the last fetch. Stops at the first
    /// failure.
    pub async fn fetch_all(
        &mut self,
        show: bool,
        proxy: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        for action in self.endpoint.actions() {
            if !self.flags.skips(action) && !self.endpoint.applies(action, &self.params) {
                debug!(action, params = %self.params, "nothing to fetch");
                continue;
            }
            self.fetch(action, false, proxy, timeout).await?;
        }
        if show {
            self.show();
        }
        Ok(())
    }

    /// Validates the cached body for `action` and extracts it
    fn set_data(&mut self, action: &str) -> Result<()> {
        let record = self.cache.get(action).cloned().unwrap_or_default();
        let payload = validate(
            action,
            record.query.as_deref().unwrap_or_default(),
            record.response.as_deref(),
            &self.params,
            self.sink.as_mut(),
        )?;
        self.endpoint
            .extract(action, &payload, &mut self.data, &mut self.params)
    }

    /// Renders the aggregate data to the diagnostic channel
    pub fn show(&mut self) {
        let lines = format::render(&self.data, &self.params, &self.flags);
        format::print(&lines, self.sink.as_mut());
    }

    /// Report lines for the aggregate data, without printing them
    pub fn render(&self) -> Vec<String> {
        format::render(&self.data, &self.params, &self.flags)
    }

    /// Cached actions, or `None` when nothing is cached
    fn known_actions<V>(&self) -> Option<Inspection<V>> {
        if self.cache.is_empty() {
            None
        } else {
            Some(Inspection::Actions(self.cache.actions()))
        }
    }

    fn lookup<V>(
        &self,
        action: Option<&str>,
        field: impl FnOnce(&ActionRecord) -> Option<V>,
    ) -> Option<Inspection<V>> {
        match action.and_then(|a| self.cache.get(a)) {
            Some(record) => field(record).map(Inspection::Record),
            None => self.known_actions(),
        }
    }

    /// Transport info for `action`, or the cached action names
    pub fn info(&self, action: Option<&str>) -> Option<Inspection<RequestInfo>> {
        self.lookup(action, |record| record.info.clone())
    }

    /// Query sent for `action` without the format marker, or the cached
    /// action names
    pub fn query(&self, action: Option<&str>) -> Option<Inspection<String>> {
        self.lookup(action, |record| record.query.as_deref().map(strip_format))
    }

    /// Parsed response for `action`, or the cached action names
    pub fn response(&self, action: Option<&str>) -> Option<Inspection<Json>> {
        self.lookup(action, |record| {
            record
                .response
                .as_deref()
                .and_then(|body| serde_json::from_str(body).ok())
        })
    }
}
