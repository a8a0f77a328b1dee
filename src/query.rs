//! Query string construction shared by every endpoint
//!
//! A `QueryBuilder` knows which host to talk to (language wiki, alternate
//! wiki, Wikidata) and appends the transport-format marker that asks the
//! API for JSON. Display code strips that marker again with `strip_format`.

use crate::params::Params;

/// Marker appended to Action API queries to request JSON responses
pub const FORMAT_MARKER: &str = "&format=json";

/// Maximum width of a formatted report line
pub const MAXWIDTH: usize = 72;

/// Right padding kept free when a report line is truncated
pub const RPAD: usize = 4;

/// Path of the MediaWiki Action API on a wiki host
const API_PATH: &str = "/w/api.php";

/// Path prefix of the RESTBase API on a wiki host
const REST_PATH: &str = "/api/rest_v1";

/// Host serving the Wikidata Action API
const WIKIDATA_HOST: &str = "www.wikidata.org";

/// Builds request URLs for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    lang: String,
    wiki: Option<String>,
    variant: Option<String>,
    status: String,
}

impl QueryBuilder {
    pub fn new(lang: impl Into<String>, wiki: Option<String>, variant: Option<String>) -> Self {
        Self {
            lang: lang.into(),
            wiki,
            variant,
            status: String::new(),
        }
    }

    /// Builder parameterised by a session's `lang`, `wiki` and `variant`
    pub fn for_params(params: &Params) -> Self {
        Self::new(
            params.lang.clone(),
            params.wiki.clone(),
            params.variant.clone(),
        )
    }

    /// Host queried for wiki actions, either the alternate wiki or
    /// `<lang>.wikipedia.org`
    pub fn domain(&self) -> String {
        match &self.wiki {
            Some(wiki) => wiki.clone(),
            None => format!("{}.wikipedia.org", self.lang),
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Action API URL for the given parameter string
    pub fn api(&self, query: &str) -> String {
        self.action_api(&self.domain(), query)
    }

    /// Wikidata Action API URL for the given parameter string
    pub fn wikidata(&self, query: &str) -> String {
        self.action_api(WIKIDATA_HOST, query)
    }

    /// RESTBase URL for the given path (e.g. "/page/summary/Foo")
    pub fn rest(&self, path: &str) -> String {
        format!("https://{}{}{}", self.domain(), REST_PATH, path)
    }

    fn action_api(&self, host: &str, query: &str) -> String {
        let mut url = format!(
            "https://{}{}?{}{}&formatversion=2",
            host, API_PATH, query, FORMAT_MARKER
        );
        if let Some(variant) = &self.variant {
            url.push_str("&variant=");
            url.push_str(&encode(variant));
        }
        url
    }

    /// Records a short description of the request in flight
    pub fn set_status(&mut self, action: &str, target: &str) {
        self.status = if target.is_empty() {
            action.to_string()
        } else {
            format!("{}, {}", action, target)
        };
    }

    /// Short description of the last request built, used in status lines
    pub fn status(&self) -> &str {
        &self.status
    }
}

/// Removes the transport-format marker from a query for display
pub fn strip_format(query: &str) -> String {
    query.replace(FORMAT_MARKER, "")
}

/// Percent-encodes a title or parameter value
///
/// Spaces become underscores first, as MediaWiki stores titles that way.
pub fn encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.replace(' ', "_").bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b':' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_includes_format_marker() {
        let qb = QueryBuilder::new("en", None, None);
        let url = qb.api("action=query&titles=Ada");

        assert_eq!(
            url,
            "https://en.wikipedia.org/w/api.php?action=query&titles=Ada&format=json&formatversion=2"
        );
        assert!(url.contains(FORMAT_MARKER));
    }

    #[test]
    fn test_alternate_wiki_replaces_domain() {
        let qb = QueryBuilder::new("en", Some("en.wikiquote.org".to_string()), None);
        assert_eq!(qb.domain(), "en.wikiquote.org");
        assert!(qb.api("action=parse").starts_with("https://en.wikiquote.org/w/api.php?"));
        assert_eq!(
            qb.rest("/page/"),
            "https://en.wikiquote.org/api/rest_v1/page/"
        );
    }

    #[test]
    fn test_variant_is_appended() {
        let qb = QueryBuilder::new("zh", None, Some("zh-tw".to_string()));
        assert!(qb.api("action=parse").ends_with("&variant=zh-tw"));
    }

    #[test]
    fn test_wikidata_uses_wikidata_host() {
        let qb = QueryBuilder::new("fr", Some("fr.wikiquote.org".to_string()), None);
        assert!(qb
            .wikidata("action=wbgetentities&ids=Q42")
            .starts_with("https://www.wikidata.org/w/api.php?action=wbgetentities&ids=Q42"));
    }

    #[test]
    fn test_strip_format_removes_marker_only() {
        let qb = QueryBuilder::new("en", None, None);
        let stripped = strip_format(&qb.api("action=query"));

        assert!(!stripped.contains(FORMAT_MARKER));
        assert!(stripped.ends_with("action=query&formatversion=2"));
    }

    #[test]
    fn test_encode_titles() {
        assert_eq!(encode("Ada Lovelace"), "Ada_Lovelace");
        assert_eq!(encode("File:Foo bar.jpg"), "File:Foo_bar.jpg");
        assert_eq!(encode("AC/DC"), "AC%2FDC");
        assert_eq!(encode("Zürich"), "Z%C3%BCrich");
    }

    #[test]
    fn test_status_hint() {
        let mut qb = QueryBuilder::new("en", None, None);
        qb.set_status("parse", "Ada_Lovelace");
        assert_eq!(qb.status(), "parse, Ada_Lovelace");
        qb.set_status("random", "");
        assert_eq!(qb.status(), "random");
    }
}
