//! Command-line interface parsing for wptools
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into a `SessionConfig`: which API family to use, the session params and
//! flags, which actions to fetch, and per-request transport options.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::params::{Flags, Params};

/// Error types for CLI argument parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// The specified API family is not recognized
    #[error("Invalid API: '{0}'. Valid APIs: page, restbase, wikidata, category")]
    InvalidApi(String),

    /// The action is not offered by the chosen API family
    #[error("Invalid action '{action}' for the {api} API. Valid actions: {valid}")]
    InvalidAction {
        api: &'static str,
        action: String,
        valid: String,
    },

    /// The API family needs a title (or id) to look up
    #[error("The {0} API needs a title")]
    MissingTitle(&'static str),
}

/// wptools - Fetch Wikipedia, Wikidata and RESTBase data for a page
#[derive(Parser, Debug)]
#[command(name = "wptools")]
#[command(about = "Wikipedia, Wikidata and RESTBase page data")]
#[command(version)]
pub struct Cli {
    /// Page title, or a Wikidata id (e.g. Q42) with --api wikidata
    ///
    /// Examples:
    ///   wptools "Ada Lovelace"
    ///   wptools --api restbase "Ada Lovelace"
    ///   wptools --api wikidata Q42
    ///   wptools --api category Physics
    #[arg(value_name = "TITLE")]
    pub title: Option<String>,

    /// Wiki language code
    #[arg(short, long, default_value = "en")]
    pub lang: String,

    /// Alternate wiki host (e.g. en.wikiquote.org)
    #[arg(long, value_name = "HOST")]
    pub wiki: Option<String>,

    /// Language variant (e.g. zh-tw)
    #[arg(long)]
    pub variant: Option<String>,

    /// API family: page, restbase, wikidata, category
    #[arg(short, long, default_value = "page", value_name = "API")]
    pub api: String,

    /// Action to fetch; may be repeated. Defaults to every action of the API
    #[arg(long = "action", value_name = "ACTION")]
    pub actions: Vec<String>,

    /// Actions never to fetch, comma separated
    #[arg(long, value_name = "ACTIONS", value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Proxy URL for every request
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Suppress status output and the report
    #[arg(short, long)]
    pub silent: bool,

    /// Trace requests and responses
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the collected data as JSON on stdout
    #[arg(long)]
    pub raw: bool,

    /// Print the query string of each fetched action on stdout
    #[arg(short, long)]
    pub query: bool,
}

/// API families selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKind {
    Page,
    Restbase,
    Wikidata,
    Category,
}

impl ApiKind {
    /// Parses an API name, accepting a few short aliases
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "page" => Some(ApiKind::Page),
            "restbase" | "rest" => Some(ApiKind::Restbase),
            "wikidata" | "wd" => Some(ApiKind::Wikidata),
            "category" | "cat" => Some(ApiKind::Category),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ApiKind::Page => "page",
            ApiKind::Restbase => "restbase",
            ApiKind::Wikidata => "wikidata",
            ApiKind::Category => "category",
        }
    }

    /// Every action the family can fetch
    pub fn supported_actions(&self) -> &'static [&'static str] {
        match self {
            ApiKind::Page => &["query", "parse", "imageinfo", "random"],
            ApiKind::Restbase => &["restbase"],
            ApiKind::Wikidata => &["wikidata"],
            ApiKind::Category => &["category"],
        }
    }

    /// Whether a lookup without a title makes sense
    fn needs_title(&self, actions: &[String]) -> bool {
        match self {
            ApiKind::Restbase => false,
            ApiKind::Page => !actions.iter().any(|a| a == "random"),
            ApiKind::Wikidata | ApiKind::Category => true,
        }
    }
}

/// Parses an API argument into an `ApiKind`.
///
/// # Returns
/// * `Ok(ApiKind)` if the string names a known API family
/// * `Err(CliError::InvalidApi)` otherwise
pub fn parse_api_arg(s: &str) -> Result<ApiKind, CliError> {
    ApiKind::from_str(s).ok_or_else(|| CliError::InvalidApi(s.to_string()))
}

/// True for Wikidata entity ids such as "Q42" or "P31"
fn is_entity_id(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some('Q' | 'P' | 'L'))
        && s.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

/// Configuration derived from CLI arguments for one session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub api: ApiKind,
    pub params: Params,
    pub flags: Flags,
    /// Actions to fetch in order; empty means every default action
    pub actions: Vec<String>,
    pub proxy: Option<String>,
    pub timeout: Option<Duration>,
    pub raw: bool,
    pub show_query: bool,
}

impl SessionConfig {
    /// Creates a SessionConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(SessionConfig)` with params, flags and actions filled in
    /// * `Err(CliError)` for an unknown API or action, or a missing title
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let api = parse_api_arg(&cli.api)?;

        for action in &cli.actions {
            if !api.supported_actions().contains(&action.as_str()) {
                return Err(CliError::InvalidAction {
                    api: api.name(),
                    action: action.clone(),
                    valid: api.supported_actions().join(", "),
                });
            }
        }

        if cli.title.is_none() && api.needs_title(&cli.actions) {
            return Err(CliError::MissingTitle(api.name()));
        }

        let mut params = Params::default().lang(cli.lang.clone());
        params.wiki = cli.wiki.clone();
        params.variant = cli.variant.clone();
        match &cli.title {
            Some(title) if api == ApiKind::Wikidata && is_entity_id(title) => {
                params.wikibase = Some(title.clone());
            }
            Some(title) => params.title = Some(title.replace(' ', "_")),
            None => {}
        }

        let flags = Flags {
            silent: cli.silent,
            verbose: cli.verbose,
            skip: cli.skip.iter().cloned().collect(),
        };

        Ok(SessionConfig {
            api,
            params,
            flags,
            actions: cli.actions.clone(),
            proxy: cli.proxy.clone(),
            timeout: cli.timeout.map(Duration::from_secs),
            raw: cli.raw,
            show_query: cli.query,
        })
    }
}
