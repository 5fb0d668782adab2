//! Catalog resolution: from (domain, locale directory, locales) to lookups.
//!
//! `CatalogResolver` abstracts where translations come from so messages can
//! re-run their lookup for any locale long after construction. Resolvers
//! never fail: when nothing matches they hand back [`NullTranslations`],
//! which echoes the message id (or picks between singular and plural by
//! count), so callers always have text to show.

use camino::Utf8Path;
use std::sync::Arc;

mod mo;
mod memory;

pub use self::mo::{DEFAULT_LOCALEDIR, GettextResolver, load_catalog};
pub use self::memory::{MemoryCatalog, MemoryResolver, PluralRule};

/// Separates context from message id in composite catalog keys.
///
/// gettext reserves this control character, so it never appears in real
/// message text. A lookup result that still contains it is the untranslated
/// composite key echoed back, not a translation.
pub const CONTEXT_SEPARATOR: char = '\u{4}';

/// Builds the composite catalog key for a context-qualified message.
#[must_use]
pub fn context_key(msgctx: &str, msgid: &str) -> String {
    let mut key = String::with_capacity(msgctx.len() + msgid.len() + 1);
    key.push_str(msgctx);
    key.push(CONTEXT_SEPARATOR);
    key.push_str(msgid);
    key
}

/// Lookup functions produced by a [`CatalogResolver`].
pub trait Translations: Send + Sync {
    /// Returns the translation of `key`, or `key` itself when none exists.
    fn gettext<'a>(&'a self, key: &'a str) -> &'a str;

    /// Returns the form of a plural message selected for `count`.
    ///
    /// Without a catalog entry the source text is used: `singular` when
    /// `count` is one and `plural` otherwise.
    fn ngettext<'a>(&'a self, singular: &'a str, plural: &'a str, count: u64) -> &'a str;
}

/// Fallback lookups that never translate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTranslations;

impl Translations for NullTranslations {
    fn gettext<'a>(&'a self, key: &'a str) -> &'a str {
        key
    }

    fn ngettext<'a>(&'a self, singular: &'a str, plural: &'a str, count: u64) -> &'a str {
        if count == 1 { singular } else { plural }
    }
}

// Catalog misses hand back the caller's own slice, so address identity tells
// a miss apart from a translation that happens to equal its source.
fn passed_through(result: &str, source: &str) -> bool {
    std::ptr::eq(result, source)
}

/// Ordered translation layers; the first layer holding an entry wins.
#[derive(Default, Clone)]
pub struct TranslationChain {
    layers: Vec<Arc<dyn Translations>>,
}

impl TranslationChain {
    /// Builds a chain from layers in priority order.
    #[must_use]
    pub const fn new(layers: Vec<Arc<dyn Translations>>) -> Self {
        Self { layers }
    }

    /// Number of layers in the chain.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.layers.len()
    }

    /// Reports whether the chain has no layers.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl std::fmt::Debug for TranslationChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationChain")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl Translations for TranslationChain {
    fn gettext<'a>(&'a self, key: &'a str) -> &'a str {
        self.layers
            .iter()
            .map(|layer| layer.gettext(key))
            .find(|found| !passed_through(found, key))
            .unwrap_or(key)
    }

    fn ngettext<'a>(&'a self, singular: &'a str, plural: &'a str, count: u64) -> &'a str {
        self.layers
            .iter()
            .map(|layer| layer.ngettext(singular, plural, count))
            .find(|found| !passed_through(found, singular) && !passed_through(found, plural))
            .unwrap_or(if count == 1 { singular } else { plural })
    }
}

/// Where and for which locales a lookup should be resolved.
#[derive(Debug, Clone, Copy)]
pub struct CatalogQuery<'a> {
    /// Catalog namespace, e.g. the application name.
    pub domain: &'a str,
    /// Directory holding `<lang>/LC_MESSAGES/<domain>.mo`; resolvers apply
    /// their own default when absent.
    pub localedir: Option<&'a Utf8Path>,
    /// Target locales in priority order.
    pub locales: &'a [String],
}

/// Maps a [`CatalogQuery`] to lookup functions.
///
/// Implementations must degrade to [`NullTranslations`] behaviour rather
/// than fail. The trait is object-safe so messages can carry an
/// `Arc<dyn CatalogResolver>` and re-resolve later.
pub trait CatalogResolver: Send + Sync {
    /// Resolves the lookups for `query`.
    fn resolve(&self, query: &CatalogQuery<'_>) -> Arc<dyn Translations>;

    /// Looks up a simple or composite key.
    fn simple_lookup(&self, query: &CatalogQuery<'_>, key: &str) -> String {
        self.resolve(query).gettext(key).to_owned()
    }

    /// Looks up a plural message, letting the catalog select the form.
    fn plural_lookup(
        &self,
        query: &CatalogQuery<'_>,
        singular: &str,
        plural: &str,
        count: u64,
    ) -> String {
        self.resolve(query)
            .ngettext(singular, plural, count)
            .to_owned()
    }
}

#[cfg(test)]
mod tests;
