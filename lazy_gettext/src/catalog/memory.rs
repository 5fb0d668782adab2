//! In-memory catalogs for embedding translations without MO files.

use std::collections::HashMap;
use std::sync::Arc;

use super::{
    CatalogQuery, CatalogResolver, NullTranslations, TranslationChain, Translations, context_key,
};
use crate::locale::candidate_languages;

/// Selects the plural form index for a count.
pub type PluralRule = fn(u64) -> usize;

const fn germanic_plural(count: u64) -> usize {
    if count == 1 { 0 } else { 1 }
}

/// Translations held in memory for one locale.
#[derive(Debug, Clone)]
pub struct MemoryCatalog {
    entries: HashMap<String, Vec<String>>,
    plural_rule: PluralRule,
}

impl MemoryCatalog {
    /// Creates an empty catalog using the `n != 1` plural rule.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            plural_rule: germanic_plural,
        }
    }

    /// Replaces the rule that maps counts to plural form indices.
    #[must_use]
    pub const fn with_plural_rule(mut self, rule: PluralRule) -> Self {
        self.plural_rule = rule;
        self
    }

    /// Adds a translation for a simple message id.
    #[must_use]
    pub fn with_message(mut self, msgid: &str, translation: &str) -> Self {
        self.entries
            .insert(msgid.to_owned(), vec![translation.to_owned()]);
        self
    }

    /// Adds a translation for a context-qualified message id.
    #[must_use]
    pub fn with_contextual(mut self, msgctx: &str, msgid: &str, translation: &str) -> Self {
        self.entries
            .insert(context_key(msgctx, msgid), vec![translation.to_owned()]);
        self
    }

    /// Adds the plural forms for a message keyed by its singular id.
    #[must_use]
    pub fn with_plural<I, S>(mut self, singular: &str, forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(
            singular.to_owned(),
            forms.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Number of entries in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the catalog holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Translations for MemoryCatalog {
    fn gettext<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries
            .get(key)
            .and_then(|forms| forms.first())
            .map_or(key, String::as_str)
    }

    fn ngettext<'a>(&'a self, singular: &'a str, plural: &'a str, count: u64) -> &'a str {
        let form = (self.plural_rule)(count);
        self.entries
            .get(singular)
            .and_then(|forms| forms.get(form))
            .map_or_else(
                || NullTranslations.ngettext(singular, plural, count),
                String::as_str,
            )
    }
}

/// Resolver over in-memory catalogs keyed by domain and locale.
///
/// Locale matching uses the same expansion as on-disk catalogs, so a
/// `pt_BR` request falls back to a catalog registered for `pt`. The locale
/// directory of a query is ignored.
#[derive(Debug, Default, Clone)]
pub struct MemoryResolver {
    catalogs: HashMap<(String, String), Arc<MemoryCatalog>>,
}

impl MemoryResolver {
    /// Creates a resolver with no catalogs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `catalog` for `domain` in `locale`.
    #[must_use]
    pub fn with_catalog(mut self, domain: &str, locale: &str, catalog: MemoryCatalog) -> Self {
        self.catalogs
            .insert((domain.to_owned(), locale.to_owned()), Arc::new(catalog));
        self
    }
}

impl CatalogResolver for MemoryResolver {
    fn resolve(&self, query: &CatalogQuery<'_>) -> Arc<dyn Translations> {
        let layers: Vec<Arc<dyn Translations>> = candidate_languages(query.locales)
            .into_iter()
            .filter_map(|language| {
                self.catalogs
                    .get(&(query.domain.to_owned(), language))
                    .map(|catalog| Arc::clone(catalog) as Arc<dyn Translations>)
            })
            .collect();
        if layers.is_empty() {
            return Arc::new(NullTranslations);
        }
        Arc::new(TranslationChain::new(layers))
    }
}
