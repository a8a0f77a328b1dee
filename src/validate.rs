//! Response validation
//!
//! Classifies a raw API body into a parsed payload or a typed failure. The
//! checks run in a fixed order and the first one that matches wins.

use serde_json::Value as Json;
use tracing::warn;

use crate::diagnostics::Diagnostics;
use crate::error::{FetchError, Result};
use crate::params::Params;
use crate::query::strip_format;

/// Wikidata's entity key for "no such entity"
const MISSING_ENTITY: &str = "-1";

/// Parses and checks the body fetched for `action`
///
/// API warnings and errors are always written to `sink`, whatever the
/// session's silent flag says.
///
/// # Returns
/// * `Ok(Json)` - The parsed payload
/// * `Err(FetchError)` - `EmptyResponse`, `MalformedPayload`, `ApiError` or `NotFound`
pub fn validate(
    action: &str,
    query: &str,
    response: Option<&str>,
    params: &Params,
    sink: &mut dyn Diagnostics,
) -> Result<Json> {
    let body = match response {
        Some(body) if !body.is_empty() => body,
        _ => return Err(FetchError::EmptyResponse(params.clone())),
    };

    let query = strip_format(query);

    let data: Json =
        serde_json::from_str(body).map_err(|_| FetchError::MalformedPayload(query.clone()))?;

    if let Some(warnings) = data.get("warnings").filter(|w| is_truthy(w)) {
        warn!(action, %warnings, "API warning");
        sink.emit(&format!("API warning: {}", warnings));
    }

    if let Some(error) = data.get("error").filter(|e| is_truthy(e)) {
        warn!(action, %error, "API error");
        sink.emit(&format!("API error: {}", error));
        return Err(FetchError::ApiError(query));
    }

    if action.contains("query") && first_page_missing(&data) {
        return Err(FetchError::NotFound(query));
    }

    if action == "parse" && !data.get("parse").is_some_and(is_truthy) {
        return Err(FetchError::NotFound(query));
    }

    if action == "wikidata"
        && data
            .get("entities")
            .and_then(Json::as_object)
            .is_some_and(|entities| entities.contains_key(MISSING_ENTITY))
    {
        return Err(FetchError::NotFound(query));
    }

    Ok(data)
}

/// True when `query.pages[0]` carries a `missing` marker
///
/// formatversion=2 marks missing pages with `true`, formatversion=1 with an
/// empty string; both count.
fn first_page_missing(data: &Json) -> bool {
    data.get("query")
        .and_then(|q| q.get("pages"))
        .and_then(Json::as_array)
        .and_then(|pages| pages.first())
        .and_then(|page| page.get("missing"))
        .is_some_and(|missing| !matches!(missing, Json::Null | Json::Bool(false)))
}

/// False for null, `false`, zero, and empty strings, arrays and objects
fn is_truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Json::String(s) => !s.is_empty(),
        Json::Array(items) => !items.is_empty(),
        Json::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Recorder;
    use serde_json::json;

    const QUERY: &str = "https://en.wikipedia.org/w/api.php?action=query&titles=X&format=json";

    fn check(action: &str, body: &str) -> (Result<Json>, Recorder) {
        let recorder = Recorder::new();
        let mut sink = recorder.clone();
        let result = validate(action, QUERY, Some(body), &Params::default(), &mut sink);
        (result, recorder)
    }

    #[test]
    fn test_empty_response_carries_params() {
        let params = Params::with_title("Nothing");
        let mut sink = Recorder::new();

        for body in [None, Some("")] {
            match validate("query", QUERY, body, &params, &mut sink) {
                Err(FetchError::EmptyResponse(p)) => assert_eq!(p, params),
                other => panic!("expected EmptyResponse, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_malformed_payload_strips_format_marker() {
        let (result, _) = check("query", "<html>not json</html>");
        match result {
            Err(FetchError::MalformedPayload(q)) => {
                assert!(!q.contains("&format=json"));
                assert!(q.contains("action=query"));
            }
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_warning_is_logged_but_not_fatal() {
        let (result, recorder) = check(
            "parse",
            r#"{"warnings":{"main":"Unrecognized parameter"},"parse":{"title":"X"}}"#,
        );
        assert!(result.is_ok());
        assert!(recorder.contains("API warning"));
    }

    #[test]
    fn test_api_error_is_logged_then_raised() {
        let (result, recorder) = check("query", r#"{"error":{"code":"badvalue"}}"#);
        assert!(matches!(result, Err(FetchError::ApiError(q)) if !q.contains("&format=json")));
        assert!(recorder.contains("API error"));
        assert!(recorder.contains("badvalue"));
    }

    #[test]
    fn test_empty_error_field_is_ignored() {
        let (result, recorder) = check("restbase", r#"{"error":"","items":[]}"#);
        assert!(result.is_ok());
        assert!(recorder.lines().is_empty());
    }

    #[test]
    fn test_missing_page_is_not_found() {
        let (result, _) = check("query", r#"{"query":{"pages":[{"missing":""}]}}"#);
        assert!(matches!(result, Err(FetchError::NotFound(_))));

        let (result, _) = check("query", r#"{"query":{"pages":[{"title":"X","missing":true}]}}"#);
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[test]
    fn test_missing_check_matches_any_query_shaped_action() {
        let (result, _) = check("querymore", r#"{"query":{"pages":[{"missing":true}]}}"#);
        assert!(matches!(result, Err(FetchError::NotFound(_))));

        let (result, _) = check("imageinfo", r#"{"query":{"pages":[{"missing":true}]}}"#);
        assert!(result.is_ok(), "imageinfo is not a query-shaped action name");
    }

    #[test]
    fn test_present_page_validates() {
        let (result, _) = check(
            "query",
            r#"{"query":{"pages":[{"pageid":1,"title":"X","missing":false}]}}"#,
        );
        assert_eq!(result.unwrap()["query"]["pages"][0]["pageid"], json!(1));
    }

    #[test]
    fn test_parse_without_parse_field_is_not_found() {
        let (result, _) = check("parse", r#"{"noparse":true}"#);
        assert!(matches!(result, Err(FetchError::NotFound(_))));

        let (result, _) = check("parse", r#"{"parse":{}}"#);
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[test]
    fn test_wikidata_sentinel_is_not_found() {
        let (result, _) = check("wikidata", r#"{"entities":{"-1":{}}}"#);
        assert!(matches!(result, Err(FetchError::NotFound(_))));

        let (result, _) = check("wikidata", r#"{"entities":{"Q42":{"id":"Q42"}}}"#);
        assert!(result.is_ok());
    }

    #[test]
    fn test_wikidata_without_entities_passes_through() {
        let (result, _) = check("wikidata", r#"{"success":1}"#);
        assert!(result.is_ok());
    }

    #[test]
    fn test_error_takes_precedence_over_not_found() {
        let (result, _) = check(
            "query",
            r#"{"error":{"code":"x"},"query":{"pages":[{"missing":true}]}}"#,
        );
        assert!(matches!(result, Err(FetchError::ApiError(_))));
    }
}
