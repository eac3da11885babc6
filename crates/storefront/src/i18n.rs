//! Bundled translations.
//!
//! The JSON bundles under `locales/` are compiled into the binary, so a
//! running storefront never reads them from disk.

use mercado_core::i18n::TranslationError;
use mercado_core::{Language, TranslationCatalog};

const EN: &str = include_str!("../locales/en.json");
const ES: &str = include_str!("../locales/es.json");

/// Parse every bundled language.
///
/// # Errors
///
/// Returns an error if a bundle is not a tree of strings.
pub fn load_catalog() -> Result<TranslationCatalog, TranslationError> {
    TranslationCatalog::new()
        .with_json(Language::En, EN)?
        .with_json(Language::Es, ES)
}
