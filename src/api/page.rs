//! MediaWiki Action API pages
//!
//! Supports `query` (page info and properties), `parse` (rendered page
//! metadata), `imageinfo` (file URLs for the page image) and `random`.

use serde_json::Value as Json;

use super::{copy_text, page_target, Endpoint};
use crate::data::{AggregateData, Value};
use crate::error::{FetchError, Result};
use crate::params::Params;
use crate::query::{encode, QueryBuilder};

const ACTIONS: &[&str] = &["query", "parse", "imageinfo"];

/// Page lookups on a language wiki
#[derive(Debug, Clone, Copy, Default)]
pub struct PageApi;

impl PageApi {
    fn title_or_id(params: &Params, title_key: &str, id_key: &str) -> String {
        match (&params.title, params.pageid) {
            (Some(title), _) => format!("{}={}", title_key, encode(title)),
            (None, Some(pageid)) => format!("{}={}", id_key, pageid),
            (None, None) => format!("{}=", title_key),
        }
    }

    /// File page named by the lead image, or the title when it is already a
    /// `File:` page
    fn file_target(params: &Params) -> Option<String> {
        match (&params.image, &params.title) {
            (Some(image), _) => Some(format!("File:{}", image)),
            (None, Some(title)) if title.starts_with("File:") => Some(title.clone()),
            _ => None,
        }
    }
}

impl Endpoint for PageApi {
    fn name(&self) -> &'static str {
        "page"
    }

    fn actions(&self) -> &'static [&'static str] {
        ACTIONS
    }

    fn applies(&self, action: &str, params: &Params) -> bool {
        action != "imageinfo" || Self::file_target(params).is_some()
    }

    fn build_query(&self, action: &str, qb: &mut QueryBuilder, params: &Params) -> Result<String> {
        let query = match action {
            "query" => qb.api(&format!(
                "action=query&prop=info|pageprops|pageimages|extracts&exintro&explaintext\
                 &inprop=url|displaytitle&piprop=name|thumbnail&redirects&{}",
                Self::title_or_id(params, "titles", "pageids")
            )),
            "parse" => qb.api(&format!(
                "action=parse&prop=links|images|iwlinks|displaytitle&redirects&{}",
                Self::title_or_id(params, "page", "pageid")
            )),
            "imageinfo" => {
                let file = Self::file_target(params).ok_or_else(|| {
                    FetchError::NotFound(format!("no page image for {}", page_target(params)))
                })?;
                qb.set_status(action, &file);
                return Ok(qb.api(&format!(
                    "action=query&prop=imageinfo&iiprop=url|size|mime&titles={}",
                    encode(&file)
                )));
            }
            "random" => qb.api("action=query&list=random&rnnamespace=0&rnlimit=1"),
            other => return Err(FetchError::unimplemented(self.name(), other)),
        };
        qb.set_status(action, &page_target(params));
        Ok(query)
    }

    fn extract(
        &self,
        action: &str,
        payload: &Json,
        data: &mut AggregateData,
        params: &mut Params,
    ) -> Result<()> {
        match action {
            "query" => {
                let Some(page) = payload.pointer("/query/pages/0") else {
                    return Ok(());
                };
                copy_text(data, "title", page, "title");
                copy_text(data, "url", page, "fullurl");
                copy_text(data, "extract", page, "extract");
                copy_text(data, "description", page, "description");
                if let Some(pageid) = page.get("pageid").and_then(Json::as_u64) {
                    data.insert("pageid".into(), Value::Int(pageid as i64));
                    params.pageid = Some(pageid);
                }
                if let Some(title) = page.get("title").and_then(Json::as_str) {
                    params.title = Some(title.replace(' ', "_"));
                }
                if let Some(item) = page.pointer("/pageprops/wikibase_item").and_then(Json::as_str) {
                    data.insert("wikibase".into(), item.into());
                    params.wikibase = Some(item.to_string());
                }
                if let Some(image) = page.get("pageimage").and_then(Json::as_str) {
                    data.insert("image".into(), image.into());
                    params.image = Some(image.to_string());
                }
                if let Some(redirects) = payload.pointer("/query/redirects") {
                    data.insert("redirects".into(), Value::from_json(redirects));
                }
            }
            "parse" => {
                let parse = &payload["parse"];
                copy_text(data, "displaytitle", parse, "displaytitle");
                if let Some(pageid) = parse.get("pageid").and_then(Json::as_u64) {
                    params.pageid.get_or_insert(pageid);
                }
                for field in ["links", "images", "iwlinks"] {
                    if let Some(items) = parse.get(field).and_then(Json::as_array) {
                        let titles = items
                            .iter()
                            .map(|item| match item {
                                Json::String(s) => Value::Text(s.clone()),
                                other => other
                                    .get("title")
                                    .and_then(Json::as_str)
                                    .map(Value::from)
                                    .unwrap_or(Value::Null),
                            })
                            .collect();
                        data.insert(field.into(), Value::List(titles));
                    }
                }
            }
            "imageinfo" => {
                let Some(info) = payload.pointer("/query/pages/0/imageinfo/0") else {
                    return Ok(());
                };
                copy_text(data, "image_url", info, "url");
                if let (Some(w), Some(h)) = (
                    info.get("width").and_then(Json::as_i64),
                    info.get("height").and_then(Json::as_i64),
                ) {
                    data.insert("image_size".into(), Value::Tuple(vec![Value::Int(w), Value::Int(h)]));
                }
            }
            "random" => {
                let Some(page) = payload.pointer("/query/random/0") else {
                    return Ok(());
                };
                copy_text(data, "title", page, "title");
                if let Some(title) = page.get("title").and_then(Json::as_str) {
                    params.title = Some(title.replace(' ', "_"));
                }
                if let Some(pageid) = page.get("id").and_then(Json::as_u64) {
                    data.insert("pageid".into(), Value::Int(pageid as i64));
                    params.pageid = Some(pageid);
                }
            }
            other => return Err(FetchError::unimplemented(self.name(), other)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_by_title() {
        let mut qb = QueryBuilder::new("en", None, None);
        let params = Params::with_title("Ada Lovelace");

        let url = PageApi.build_query("query", &mut qb, &params).unwrap();

        assert!(url.starts_with("https://en.wikipedia.org/w/api.php?action=query"));
        assert!(url.contains("titles=Ada_Lovelace"));
        assert_eq!(qb.status(), "query, Ada Lovelace");
    }

    #[test]
    fn test_parse_by_pageid() {
        let mut qb = QueryBuilder::new("en", None, None);
        let params = Params {
            pageid: Some(974),
            ..Params::default()
        };

        let url = PageApi.build_query("parse", &mut qb, &params).unwrap();
        assert!(url.contains("action=parse"));
        assert!(url.contains("pageid=974"));
    }

    #[test]
    fn test_imageinfo_targets_page_image() {
        let mut qb = QueryBuilder::new("en", None, None);
        let mut params = Params::with_title("Ada_Lovelace");
        params.image = Some("Ada_Lovelace_portrait.jpg".to_string());

        let url = PageApi.build_query("imageinfo", &mut qb, &params).unwrap();

        assert!(url.contains("titles=File:Ada_Lovelace_portrait.jpg"));
        assert!(!url.contains("File:Ada_Lovelace&"));
        assert_eq!(qb.status(), "imageinfo, File:Ada_Lovelace_portrait.jpg");
    }

    #[test]
    fn test_imageinfo_on_file_page_uses_title() {
        let mut qb = QueryBuilder::new("en", None, None);
        let params = Params::with_title("File:Ada_Lovelace_portrait.jpg");

        assert!(PageApi.applies("imageinfo", &params));
        let url = PageApi.build_query("imageinfo", &mut qb, &params).unwrap();
        assert!(url.contains("titles=File:Ada_Lovelace_portrait.jpg"));
        assert!(!url.contains("File:File:"));
    }

    #[test]
    fn test_imageinfo_without_image_is_not_found() {
        let mut qb = QueryBuilder::new("en", None, None);
        let params = Params::with_title("Ada_Lovelace");

        assert!(!PageApi.applies("imageinfo", &params));
        assert!(PageApi.applies("query", &params));
        let err = PageApi.build_query("imageinfo", &mut qb, &params).unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[test]
    fn test_unknown_action_is_unimplemented() {
        let mut qb = QueryBuilder::new("en", None, None);
        let err = PageApi
            .build_query("wikidata", &mut qb, &Params::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::UnimplementedAction { endpoint: "page", ref action } if action == "wikidata"
        ));
    }

    #[test]
    fn test_extract_query_binds_title_and_pageid() {
        let payload = json!({
            "query": {
                "pages": [{
                    "pageid": 974,
                    "title": "Ada Lovelace",
                    "fullurl": "https://en.wikipedia.org/wiki/Ada_Lovelace",
                    "extract": "Augusta Ada King...",
                    "pageprops": {"wikibase_item": "Q7259"},
                    "pageimage": "Ada_Lovelace_portrait.jpg"
                }]
            }
        });
        let mut data = AggregateData::new();
        let mut params = Params::with_title("ada lovelace");

        PageApi.extract("query", &payload, &mut data, &mut params).unwrap();

        assert_eq!(params.title.as_deref(), Some("Ada_Lovelace"));
        assert_eq!(params.pageid, Some(974));
        assert_eq!(params.wikibase.as_deref(), Some("Q7259"));
        assert_eq!(data["pageid"], Value::Int(974));
        assert_eq!(data["image"], Value::from("Ada_Lovelace_portrait.jpg"));
        assert_eq!(params.image.as_deref(), Some("Ada_Lovelace_portrait.jpg"));
        assert!(data.contains_key("extract"));
    }

    #[test]
    fn test_extract_parse_collects_links() {
        let payload = json!({
            "parse": {
                "pageid": 1,
                "displaytitle": "Foo",
                "links": [{"ns": 0, "title": "Bar", "exists": true}, {"ns": 0, "title": "Baz"}],
                "images": ["A.jpg"]
            }
        });
        let mut data = AggregateData::new();
        let mut params = Params::with_title("Foo");

        PageApi.extract("parse", &payload, &mut data, &mut params).unwrap();

        assert_eq!(
            data["links"],
            Value::List(vec!["Bar".into(), "Baz".into()])
        );
        assert_eq!(data["images"], Value::List(vec!["A.jpg".into()]));
        assert_eq!(params.pageid, Some(1));
    }

    #[test]
    fn test_extract_imageinfo_size_tuple() {
        let payload = json!({
            "query": {"pages": [{"imageinfo": [{"url": "https://u/x.jpg", "width": 640, "height": 480}]}]}
        });
        let mut data = AggregateData::new();
        PageApi
            .extract("imageinfo", &payload, &mut data, &mut Params::default())
            .unwrap();

        assert_eq!(data["image_url"], Value::from("https://u/x.jpg"));
        assert_eq!(
            data["image_size"],
            Value::Tuple(vec![Value::Int(640), Value::Int(480)])
        );
    }
}
