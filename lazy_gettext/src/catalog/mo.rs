//! Binary MO catalogs installed under a locale directory.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use gettext::Catalog;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use super::{CatalogQuery, CatalogResolver, NullTranslations, TranslationChain, Translations};
use crate::error::I18nError;
use crate::locale::{FALLBACK_LOCALE, candidate_languages};

/// Locale directory searched when a query does not name one.
pub const DEFAULT_LOCALEDIR: &str = "/usr/share/locale";

// Counts above `i64::MAX` select the same plural form as `i64::MAX`.
const MAX_PLURAL_COUNT: u64 = 0x7fff_ffff_ffff_ffff;

static SHARED: LazyLock<Arc<GettextResolver>> =
    LazyLock::new(|| Arc::new(GettextResolver::new()));

impl Translations for Catalog {
    fn gettext<'a>(&'a self, key: &'a str) -> &'a str {
        Catalog::gettext(self, key)
    }

    fn ngettext<'a>(&'a self, singular: &'a str, plural: &'a str, count: u64) -> &'a str {
        let bounded = count.min(MAX_PLURAL_COUNT);
        Catalog::ngettext(self, singular, plural, bounded.try_into().unwrap_or_default())
    }
}

fn catalog_relative_path(language: &str, domain: &str) -> String {
    format!("{language}/LC_MESSAGES/{domain}.mo")
}

fn parent_or_dot(path: &Utf8Path) -> &Utf8Path {
    path.parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."))
}

fn open_parent_dir_and_name(path: &Utf8Path) -> std::io::Result<(Dir, String)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other("catalog path has no file name"))?;
    let dir = Dir::open_ambient_dir(parent_or_dot(path), ambient_authority())?;
    Ok((dir, file_name.to_owned()))
}

/// Reads and parses a single MO catalog.
///
/// # Errors
///
/// Returns [`I18nError::CatalogRead`] when the file cannot be read and
/// [`I18nError::CatalogParse`] when its contents are not a valid catalog.
pub fn load_catalog(path: &Utf8Path) -> Result<Catalog, I18nError> {
    let read_error = |source| I18nError::CatalogRead {
        path: path.to_owned(),
        source,
    };
    let (dir, name) = open_parent_dir_and_name(path).map_err(read_error)?;
    let bytes = dir.read(&name).map_err(read_error)?;
    Catalog::parse(bytes.as_slice()).map_err(|source| I18nError::CatalogParse {
        path: path.to_owned(),
        source,
    })
}

/// Resolves lookups from `<localedir>/<lang>/LC_MESSAGES/<domain>.mo`.
///
/// Every candidate language derived from the query's locales is probed in
/// order and all catalogs found are chained, so a regional catalog can fall
/// back to its base language. Parsed catalogs are cached by path for the
/// lifetime of the resolver; files that are missing are probed again on the
/// next lookup.
#[derive(Debug)]
pub struct GettextResolver {
    default_localedir: Utf8PathBuf,
    catalogs: RwLock<HashMap<Utf8PathBuf, Arc<Catalog>>>,
}

impl GettextResolver {
    /// Creates a resolver that defaults to [`DEFAULT_LOCALEDIR`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_localedir(DEFAULT_LOCALEDIR)
    }

    /// Creates a resolver with a custom fallback locale directory.
    #[must_use]
    pub fn with_default_localedir(localedir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            default_localedir: localedir.into(),
            catalogs: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the process-wide resolver used by messages built without an
    /// explicit resolver.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    fn localedir<'a>(&'a self, requested: Option<&'a Utf8Path>) -> &'a Utf8Path {
        requested.unwrap_or(&self.default_localedir)
    }

    /// Lists the catalog files that exist for `query`, in lookup order.
    #[must_use]
    pub fn find(&self, query: &CatalogQuery<'_>) -> Vec<Utf8PathBuf> {
        let localedir = self.localedir(query.localedir);
        let Ok(dir) = Dir::open_ambient_dir(localedir, ambient_authority()) else {
            tracing::debug!(%localedir, "locale directory unavailable");
            return Vec::new();
        };
        candidate_languages(query.locales)
            .iter()
            .map(|language| catalog_relative_path(language, query.domain))
            .filter(|relative| dir.is_file(relative))
            .map(|relative| localedir.join(relative))
            .collect()
    }

    /// Lists the locales with an installed catalog for `domain`.
    ///
    /// [`FALLBACK_LOCALE`] always leads the list since untranslated message
    /// ids are expected to be written in it; the remaining locales follow in
    /// lexical order.
    #[must_use]
    pub fn available_languages(&self, domain: &str, localedir: Option<&Utf8Path>) -> Vec<String> {
        let mut languages = vec![FALLBACK_LOCALE.to_owned()];
        let root = self.localedir(localedir);
        let Ok(dir) = Dir::open_ambient_dir(root, ambient_authority()) else {
            return languages;
        };
        let Ok(entries) = dir.entries() else {
            return languages;
        };
        let mut installed: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().ok())
            .filter(|language| {
                language != FALLBACK_LOCALE
                    && dir.is_file(catalog_relative_path(language, domain))
            })
            .collect();
        installed.sort_unstable();
        languages.extend(installed);
        languages
    }

    /// Drops every cached catalog so reinstalled files are parsed afresh.
    pub fn clear_cache(&self) {
        self.catalogs.write().clear();
    }

    fn catalog(&self, path: &Utf8Path) -> Option<Arc<Catalog>> {
        if let Some(cached) = self.catalogs.read().get(path) {
            return Some(Arc::clone(cached));
        }
        match load_catalog(path) {
            Ok(parsed) => {
                let mut catalogs = self.catalogs.write();
                let entry = catalogs
                    .entry(path.to_owned())
                    .or_insert_with(|| Arc::new(parsed));
                Some(Arc::clone(entry))
            }
            Err(err) => {
                tracing::warn!(%path, error = %err, "skipping unusable message catalog");
                None
            }
        }
    }
}

impl Default for GettextResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogResolver for GettextResolver {
    fn resolve(&self, query: &CatalogQuery<'_>) -> Arc<dyn Translations> {
        let layers: Vec<Arc<dyn Translations>> = self
            .find(query)
            .iter()
            .filter_map(|path| self.catalog(path))
            .map(|catalog| catalog as Arc<dyn Translations>)
            .collect();
        if layers.is_empty() {
            tracing::debug!(
                domain = query.domain,
                locales = ?query.locales,
                "no message catalog found; using untranslated text"
            );
            return Arc::new(NullTranslations);
        }
        Arc::new(TranslationChain::new(layers))
    }
}
