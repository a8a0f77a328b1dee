//! RESTBase page endpoints
//!
//! Without a title the `restbase` action lists the `/page/` endpoints the
//! wiki offers; with one it fetches the page summary.

use serde_json::Value as Json;

use super::{copy_text, Endpoint};
use crate::data::{AggregateData, Value};
use crate::error::{FetchError, Result};
use crate::params::Params;
use crate::query::{encode, QueryBuilder};

const ACTIONS: &[&str] = &["restbase"];

#[derive(Debug, Clone, Copy, Default)]
pub struct RestbaseApi;

impl Endpoint for RestbaseApi {
    fn name(&self) -> &'static str {
        "restbase"
    }

    fn actions(&self) -> &'static [&'static str] {
        ACTIONS
    }

    fn build_query(&self, action: &str, qb: &mut QueryBuilder, params: &Params) -> Result<String> {
        if action != "restbase" {
            return Err(FetchError::unimplemented(self.name(), action));
        }
        let (path, target) = match &params.title {
            Some(title) => (format!("/page/summary/{}", encode(title)), title.as_str()),
            None => ("/page/".to_string(), ""),
        };
        qb.set_status(action, target);
        Ok(qb.rest(&path))
    }

    fn extract(
        &self,
        action: &str,
        payload: &Json,
        data: &mut AggregateData,
        params: &mut Params,
    ) -> Result<()> {
        if action != "restbase" {
            return Err(FetchError::unimplemented(self.name(), action));
        }

        if let Some(items) = payload.get("items") {
            data.insert("endpoints".into(), Value::from_json(items));
            return Ok(());
        }

        copy_text(data, "title", payload, "title");
        copy_text(data, "description", payload, "description");
        copy_text(data, "extract", payload, "extract");
        copy_text(data, "wikibase", payload, "wikibase_item");
        if let Some(url) = payload
            .pointer("/content_urls/desktop/page")
            .and_then(Json::as_str)
        {
            data.insert("url".into(), url.into());
        }
        if let Some(pageid) = payload.get("pageid").and_then(Json::as_u64) {
            data.insert("pageid".into(), Value::Int(pageid as i64));
            params.pageid = Some(pageid);
        }
        if let (Some(lat), Some(lon)) = (
            payload.pointer("/coordinates/lat").and_then(Json::as_f64),
            payload.pointer("/coordinates/lon").and_then(Json::as_f64),
        ) {
            data.insert(
                "coordinates".into(),
                Value::Tuple(vec![Value::Float(lat), Value::Float(lon)]),
            );
        }
        if let Some(item) = payload.get("wikibase_item").and_then(Json::as_str) {
            params.wikibase = Some(item.to_string());
        }
        Ok(())
    }
}
