//! Failures raised while fetching and validating an action

use thiserror::Error;

use crate::params::Params;

/// Errors that end a `Session::fetch` call
///
/// None of these are retried; the caller decides whether to fetch again.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The transport returned no body
    #[error("Empty response: {0}")]
    EmptyResponse(Params),

    /// The body could not be parsed as JSON
    #[error("Malformed payload from query: {0}")]
    MalformedPayload(String),

    /// The API reported an error in its payload
    #[error("API error for query: {0}")]
    ApiError(String),

    /// The page or entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The wiki host has no Wikidata site id
    #[error("No Wikidata site for wiki: {0}")]
    UnsupportedSite(String),

    /// An endpoint was asked for an action it does not provide
    #[error("{endpoint} does not implement action '{action}'")]
    UnimplementedAction {
        endpoint: &'static str,
        action: String,
    },
}

impl FetchError {
    pub fn unimplemented(endpoint: &'static str, action: &str) -> Self {
        FetchError::UnimplementedAction {
            endpoint,
            action: action.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
