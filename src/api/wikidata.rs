//! Wikidata entities
//!
//! The `wikidata` action fetches one entity through `wbgetentities`, either
//! by id or by the page title on the session's wiki.

use std::collections::BTreeMap;

use serde_json::Value as Json;

use super::Endpoint;
use crate::data::{AggregateData, Value};
use crate::error::{FetchError, Result};
use crate::params::Params;
use crate::query::{encode, QueryBuilder};

const ACTIONS: &[&str] = &["wikidata"];

/// Wikimedia projects whose site ids are `<lang><project>`
const SISTER_PROJECTS: &[&str] = &[
    "wikibooks",
    "wikinews",
    "wikiquote",
    "wikisource",
    "wikiversity",
    "wikivoyage",
    "wiktionary",
];

/// Wikidata site id for a wiki, e.g. "enwiki" or "frwikiquote"
///
/// Without an alternate host this is the language's Wikipedia. Hosts that
/// are not `<sub>.<project>.org` on a known Wikimedia project have no site
/// id.
pub(crate) fn site_id(lang: &str, wiki: Option<&str>) -> Option<String> {
    let Some(host) = wiki else {
        return Some(format!("{}wiki", lang.replace('-', "_")));
    };
    let labels: Vec<&str> = host.split('.').collect();
    let [sub, project, "org"] = labels.as_slice() else {
        return None;
    };
    let sub = sub.replace('-', "_");
    match *project {
        "wikipedia" | "wikimedia" => Some(format!("{}wiki", sub)),
        "wikidata" => Some("wikidatawiki".to_string()),
        other if SISTER_PROJECTS.contains(&other) => Some(format!("{}{}", sub, other)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WikidataApi;

impl WikidataApi {
    /// Text of a `{"language": .., "value": ..}` term in `lang`
    fn term<'a>(entity: &'a Json, field: &str, lang: &str) -> Option<&'a str> {
        entity
            .get(field)?
            .get(lang)?
            .get("value")
            .and_then(Json::as_str)
    }
}

impl Endpoint for WikidataApi {
    fn name(&self) -> &'static str {
        "wikidata"
    }

    fn actions(&self) -> &'static [&'static str] {
        ACTIONS
    }

    fn build_query(&self, action: &str, qb: &mut QueryBuilder, params: &Params) -> Result<String> {
        if action != "wikidata" {
            return Err(FetchError::unimplemented(self.name(), action));
        }
        let lang = qb.lang().to_string();
        let (selector, target) = match (&params.wikibase, &params.title) {
            (Some(id), _) => (format!("ids={}", encode(id)), id.clone()),
            (None, Some(title)) => {
                let site = site_id(&lang, params.wiki.as_deref())
                    .ok_or_else(|| FetchError::UnsupportedSite(qb.domain()))?;
                (
                    format!("sites={}&titles={}", site, encode(title)),
                    title.clone(),
                )
            }
            (None, None) => ("ids=".to_string(), String::new()),
        };
        qb.set_status(action, &target);
        Ok(qb.wikidata(&format!(
            "action=wbgetentities&{}&languages={}&props=labels|descriptions|aliases|claims|sitelinks",
            selector, lang
        )))
    }

    fn extract(
        &self,
        action: &str,
        payload: &Json,
        data: &mut AggregateData,
        params: &mut Params,
    ) -> Result<()> {
        if action != "wikidata" {
            return Err(FetchError::unimplemented(self.name(), action));
        }
        let Some((id, entity)) = payload
            .get("entities")
            .and_then(Json::as_object)
            .and_then(|entities| entities.iter().next())
        else {
            return Ok(());
        };

        data.insert("wikibase".into(), id.as_str().into());
        params.wikibase = Some(id.clone());

        let lang = params.lang.clone();
        if let Some(label) = Self::term(entity, "labels", &lang) {
            data.insert("label".into(), label.into());
        }
        if let Some(description) = Self::term(entity, "descriptions", &lang) {
            data.insert("description".into(), description.into());
        }
        if let Some(aliases) = entity.pointer(&format!("/aliases/{}", lang)).and_then(Json::as_array) {
            let aliases = aliases
                .iter()
                .filter_map(|a| a.get("value").and_then(Json::as_str))
                .map(Value::from)
                .collect();
            data.insert("aliases".into(), Value::List(aliases));
        }
        if let Some(claims) = entity.get("claims").and_then(Json::as_object) {
            let counts: BTreeMap<String, Value> = claims
                .iter()
                .map(|(pid, statements)| {
                    let n = statements.as_array().map_or(0, Vec::len);
                    (pid.clone(), Value::Int(n as i64))
                })
                .collect();
            data.insert("claims".into(), Value::Map(counts));
        }
        let sitelink = site_id(&lang, params.wiki.as_deref())
            .and_then(|site| entity.pointer(&format!("/sitelinks/{}/title", site)))
            .and_then(Json::as_str);
        if let Some(title) = sitelink {
            params.title.get_or_insert_with(|| title.replace(' ', "_"));
            data.insert("title".into(), title.into());
        }
        Ok(())
    }
}
