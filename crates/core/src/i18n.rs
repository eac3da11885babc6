//! Translation trees and language resolution.
//!
//! Each supported language owns a tree of [`TranslationNode`]s loaded from a
//! JSON document such as:
//!
//! ```json
//! { "login": { "title": "Sign in" }, "logout": "Log out" }
//! ```
//!
//! Keys are dot-delimited paths into the tree (`"login.title"`). A lookup
//! that misses, or that stops on a group instead of a string, yields the
//! caller's fallback.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported UI languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    /// Every supported language, in selector order.
    pub const ALL: [Self; 2] = [Self::En, Self::Es];

    /// Two-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    /// Name shown in the language selector.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Es => "Español",
        }
    }

    /// Parse a stored two-letter code. Anything outside the supported set is `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }

    /// Parse a browser locale tag (`es-MX`, `en_US`, `es`) by its primary subtag.
    #[must_use]
    pub fn from_locale_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next().unwrap_or(tag);
        Self::from_code(primary)
    }
}

/// Pick the active language: stored preference, then browser locale, then `default`.
#[must_use]
pub fn resolve_language(stored: Option<&str>, browser: Option<&str>, default: Language) -> Language {
    stored
        .and_then(Language::from_code)
        .or_else(|| browser.and_then(Language::from_locale_tag))
        .unwrap_or(default)
}

/// A node in a translation tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TranslationNode {
    Text(String),
    Group(BTreeMap<String, TranslationNode>),
}

impl TranslationNode {
    /// Walk a dot-delimited key. Returns `None` when a segment is missing or
    /// the key ends on a group.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let mut node = self;
        for segment in key.split('.') {
            match node {
                Self::Group(children) => node = children.get(segment)?,
                Self::Text(_) => return None,
            }
        }
        match node {
            Self::Text(text) => Some(text),
            Self::Group(_) => None,
        }
    }
}

/// Errors loading a translation bundle.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("invalid translation bundle for {language:?}: {source}")]
    InvalidBundle {
        language: Language,
        #[source]
        source: serde_json::Error,
    },
}

/// Translation trees for every loaded language.
#[derive(Debug, Clone, Default)]
pub struct TranslationCatalog {
    trees: HashMap<Language, TranslationNode>,
}

impl TranslationCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the tree for `language`.
    #[must_use]
    pub fn with_tree(mut self, language: Language, tree: TranslationNode) -> Self {
        self.trees.insert(language, tree);
        self
    }

    /// Parse a JSON bundle and add it for `language`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a tree of string leaves.
    pub fn with_json(self, language: Language, json: &str) -> Result<Self, TranslationError> {
        let tree = serde_json::from_str(json)
            .map_err(|source| TranslationError::InvalidBundle { language, source })?;
        Ok(self.with_tree(language, tree))
    }

    /// Look up `key` in `language`'s tree.
    #[must_use]
    pub fn get(&self, language: Language, key: &str) -> Option<&str> {
        self.trees.get(&language)?.get(key)
    }
}

/// Lookup handle bound to one active language.
///
/// Cheap to clone; the catalog is shared.
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: Arc<TranslationCatalog>,
    language: Language,
}

impl Translator {
    #[must_use]
    pub const fn new(catalog: Arc<TranslationCatalog>, language: Language) -> Self {
        Self { catalog, language }
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Switch to `code` if it is supported. Unsupported codes are ignored and
    /// return `false`.
    pub fn set_language(&mut self, code: &str) -> bool {
        match Language::from_code(code) {
            Some(language) => {
                self.language = language;
                true
            }
            None => false,
        }
    }

    /// Translated text for `key`, or `fallback` when the key does not resolve.
    #[must_use]
    pub fn lookup<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.catalog
            .get(self.language, key)
            .unwrap_or_else(|| {
                tracing::debug!(key, language = self.language.code(), "missing translation");
                fallback
            })
    }

    /// Translated text for `key`, or an empty string.
    #[must_use]
    pub fn text(&self, key: &str) -> &str {
        self.lookup(key, "")
    }

    /// Translated text with `{name}` placeholders replaced from `args`.
    #[must_use]
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut text = self.text(key).to_owned();
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}
