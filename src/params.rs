//! Session identity and behaviour switches
//!
//! `Params` names what a session looks up (language, title, page id, ...) and
//! `Flags` controls how chatty it is and which actions it refuses to fetch.

use std::collections::BTreeSet;
use std::fmt;

/// Language used when none is given
pub const DEFAULT_LANG: &str = "en";

/// Session-scoped identity of a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    /// Wiki language code (e.g. "en", "fr")
    pub lang: String,
    /// Page title, possibly discovered late by an extractor
    pub title: Option<String>,
    /// Page id, possibly discovered late by an extractor
    pub pageid: Option<u64>,
    /// Alternate API host (e.g. "en.wikiquote.org")
    pub wiki: Option<String>,
    /// Language variant (e.g. "zh-tw")
    pub variant: Option<String>,
    /// Wikidata entity id (e.g. "Q42")
    pub wikibase: Option<String>,
    /// Lead image file name, without the "File:" prefix
    pub image: Option<String>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            title: None,
            pageid: None,
            wiki: None,
            variant: None,
            wikibase: None,
            image: None,
        }
    }
}

impl Params {
    /// Params for the given title in the default language
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn wiki(mut self, wiki: impl Into<String>) -> Self {
        self.wiki = Some(wiki.into());
        self
    }

    pub fn variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn wikibase(mut self, id: impl Into<String>) -> Self {
        self.wikibase = Some(id.into());
        self
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lang={}", self.lang)?;
        if let Some(title) = &self.title {
            write!(f, ", title={}", title)?;
        }
        if let Some(pageid) = self.pageid {
            write!(f, ", pageid={}", pageid)?;
        }
        if let Some(wiki) = &self.wiki {
            write!(f, ", wiki={}", wiki)?;
        }
        if let Some(variant) = &self.variant {
            write!(f, ", variant={}", variant)?;
        }
        if let Some(wikibase) = &self.wikibase {
            write!(f, ", wikibase={}", wikibase)?;
        }
        if let Some(image) = &self.image {
            write!(f, ", image={}", image)?;
        }
        Ok(())
    }
}

/// Session-scoped behaviour switches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// Suppress status and diagnostic output
    pub silent: bool,
    /// Trace transport activity
    pub verbose: bool,
    /// Actions that are never fetched
    pub skip: BTreeSet<String>,
}

impl Flags {
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    /// Adds an action to the skip set
    pub fn skip(mut self, action: impl Into<String>) -> Self {
        self.skip.insert(action.into());
        self
    }

    pub fn skips(&self, action: &str) -> bool {
        self.skip.contains(action)
    }
}
