//! Category membership
//!
//! The `category` action lists up to 500 members of a category page.

use serde_json::Value as Json;

use super::Endpoint;
use crate::data::{AggregateData, Value};
use crate::error::{FetchError, Result};
use crate::params::Params;
use crate::query::{encode, QueryBuilder};

const ACTIONS: &[&str] = &["category"];

/// Namespace prefix of category pages
const CATEGORY_PREFIX: &str = "Category:";

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryApi;

impl CategoryApi {
    fn category_title(title: &str) -> String {
        if title.starts_with(CATEGORY_PREFIX) {
            title.to_string()
        } else {
            format!("{}{}", CATEGORY_PREFIX, title)
        }
    }
}

impl Endpoint for CategoryApi {
    fn name(&self) -> &'static str {
        "category"
    }

    fn actions(&self) -> &'static [&'static str] {
        ACTIONS
    }

    fn build_query(&self, action: &str, qb: &mut QueryBuilder, params: &Params) -> Result<String> {
        if action != "category" {
            return Err(FetchError::unimplemented(self.name(), action));
        }
        let selector = match (&params.title, params.pageid) {
            (Some(title), _) => format!("cmtitle={}", encode(&Self::category_title(title))),
            (None, Some(pageid)) => format!("cmpageid={}", pageid),
            (None, None) => "cmtitle=".to_string(),
        };
        qb.set_status(action, &super::page_target(params));
        Ok(qb.api(&format!(
            "action=query&list=categorymembers&cmlimit=500&cmprop=ids|title|type&{}",
            selector
        )))
    }

    fn extract(
        &self,
        action: &str,
        payload: &Json,
        data: &mut AggregateData,
        params: &mut Params,
    ) -> Result<()> {
        if action != "category" {
            return Err(FetchError::unimplemented(self.name(), action));
        }
        let members = payload
            .pointer("/query/categorymembers")
            .and_then(Json::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let (subcats, pages): (Vec<&Json>, Vec<&Json>) = members
            .iter()
            .partition(|m| m.get("type").and_then(Json::as_str) == Some("subcat"));

        let titles = |items: Vec<&Json>| {
            items
                .into_iter()
                .filter_map(|m| m.get("title").and_then(Json::as_str))
                .map(Value::from)
                .collect::<Vec<_>>()
        };

        data.insert("members".into(), Value::List(titles(pages)));
        if !subcats.is_empty() {
            data.insert("subcategories".into(), Value::List(titles(subcats)));
        }
        if let Some(title) = &params.title {
            data.insert("title".into(), Self::category_title(title).into());
        }
        Ok(())
    }
}
