//! Lazily translated messages.
//!
//! A [`Message`] captures everything needed to look itself up again: the
//! message key ([`MessageKind`]), the catalog domain, an optional locale
//! directory, substitution params and the resolver to consult. Its
//! `default_text` is fixed at construction from the system locale, while
//! [`Message::translate`] re-runs the lookup for any locale on demand.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::catalog::{
    CONTEXT_SEPARATOR, CatalogQuery, CatalogResolver, GettextResolver, Translations, context_key,
    load_catalog,
};
use crate::config::localedir_from_env;
use crate::error::{FormatError, I18nError};
use crate::format::percent_format;
use crate::locale::desired_or_default;
use crate::params::Params;

/// Domain used when a message is built without naming one.
pub const DEFAULT_DOMAIN: &str = "default";

/// The catalog key of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Looked up by its id alone.
    Simple {
        /// Source text and catalog key.
        msgid: String,
    },
    /// Looked up by context and id, disambiguating identical ids.
    Contextual {
        /// Context string, e.g. `"menu"`.
        msgctx: String,
        /// Source text returned when no contextual entry exists.
        msgid: String,
    },
    /// Looked up by singular and plural source text plus a count.
    Plural {
        /// Singular source text and catalog key.
        msgsingle: String,
        /// Plural source text.
        msgplural: String,
        /// Count selecting the plural form; never translated.
        msgcount: u64,
    },
}

impl MessageKind {
    /// Key for a simple message.
    #[must_use]
    pub fn simple(msgid: impl Into<String>) -> Self {
        Self::Simple {
            msgid: msgid.into(),
        }
    }

    /// Key for a context-qualified message.
    #[must_use]
    pub fn contextual(msgctx: impl Into<String>, msgid: impl Into<String>) -> Self {
        Self::Contextual {
            msgctx: msgctx.into(),
            msgid: msgid.into(),
        }
    }

    /// Key for a plural message.
    #[must_use]
    pub fn plural(
        msgsingle: impl Into<String>,
        msgplural: impl Into<String>,
        msgcount: u64,
    ) -> Self {
        Self::Plural {
            msgsingle: msgsingle.into(),
            msgplural: msgplural.into(),
            msgcount,
        }
    }

    /// Source text shown when nothing is translated; the singular form for
    /// plural messages.
    #[must_use]
    pub fn msgid(&self) -> &str {
        match self {
            Self::Simple { msgid } | Self::Contextual { msgid, .. } => msgid,
            Self::Plural { msgsingle, .. } => msgsingle,
        }
    }

    fn lookup(&self, resolver: &dyn CatalogResolver, query: &CatalogQuery<'_>) -> String {
        match self {
            Self::Simple { msgid } => resolver.simple_lookup(query, msgid),
            Self::Contextual { msgctx, msgid } => {
                let found = resolver.simple_lookup(query, &context_key(msgctx, msgid));
                without_context(found, msgctx, msgid)
            }
            Self::Plural {
                msgsingle,
                msgplural,
                msgcount,
            } => resolver.plural_lookup(query, msgsingle, msgplural, *msgcount),
        }
    }

    fn lookup_in(&self, translations: &dyn Translations) -> String {
        match self {
            Self::Simple { msgid } => translations.gettext(msgid).to_owned(),
            Self::Contextual { msgctx, msgid } => {
                let key = context_key(msgctx, msgid);
                without_context(translations.gettext(&key).to_owned(), msgctx, msgid)
            }
            Self::Plural {
                msgsingle,
                msgplural,
                msgcount,
            } => translations
                .ngettext(msgsingle, msgplural, *msgcount)
                .to_owned(),
        }
    }
}

/// Discards a contextual lookup result that is still the composite key.
///
/// Catalog text never contains [`CONTEXT_SEPARATOR`], so its presence means
/// the lookup fell through and `msgid` is the right text to show.
pub(crate) fn without_context(found: String, msgctx: &str, msgid: &str) -> String {
    if found.contains(CONTEXT_SEPARATOR) {
        tracing::trace!(msgctx, msgid, "no contextual translation; using message id");
        return msgid.to_owned();
    }
    found
}

fn resolve_text(
    kind: &MessageKind,
    resolver: &dyn CatalogResolver,
    domain: &str,
    localedir: Option<&Utf8Path>,
    locales: &[String],
) -> String {
    let configured =
        localedir.map_or_else(|| localedir_from_env(domain), |dir| Some(dir.to_owned()));
    let query = CatalogQuery {
        domain,
        localedir: configured.as_deref(),
        locales,
    };
    kind.lookup(resolver, &query)
}

/// A translatable value that defers its lookup until rendered.
///
/// Equality, hashing and [`fmt::Display`] all use [`Message::default_text`],
/// so two messages with the same rendered text compare equal regardless of
/// how they were built.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use lazy_gettext::catalog::{MemoryCatalog, MemoryResolver};
/// use lazy_gettext::{Message, MessageKind, Params};
///
/// let resolver = MemoryResolver::new().with_catalog(
///     "shop",
///     "de",
///     MemoryCatalog::new().with_message("%(n)d items", "%(n)d Artikel"),
/// );
/// let message = Message::builder(MessageKind::simple("%(n)d items"))
///     .domain("shop")
///     .text("%(n)d items")
///     .resolver(Arc::new(resolver))
///     .build()
///     .format(Params::mapping([("n", 3)]))?;
/// assert_eq!(message.translate(Some("de"))?, "3 Artikel");
/// assert_eq!(message.default_text(), "3 items");
/// # Ok::<(), lazy_gettext::FormatError>(())
/// ```
#[derive(Clone)]
pub struct Message {
    kind: MessageKind,
    domain: String,
    localedir: Option<Utf8PathBuf>,
    params: Option<Params>,
    default_text: String,
    resolver: Arc<dyn CatalogResolver>,
}

impl Message {
    /// Starts building a message for `kind`.
    pub fn builder(kind: MessageKind) -> MessageBuilder {
        MessageBuilder::new(kind)
    }

    /// Builds a simple message in `domain` using the shared gettext resolver.
    #[must_use]
    pub fn new(msgid: impl Into<String>, domain: impl Into<String>) -> Self {
        Self::builder(MessageKind::simple(msgid))
            .domain(domain)
            .build()
    }

    /// Builds a contextual message in `domain` using the shared gettext
    /// resolver.
    #[must_use]
    pub fn contextual(
        msgctx: impl Into<String>,
        msgid: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self::builder(MessageKind::contextual(msgctx, msgid))
            .domain(domain)
            .build()
    }

    /// Builds a plural message in `domain` using the shared gettext resolver.
    #[must_use]
    pub fn plural(
        msgsingle: impl Into<String>,
        msgplural: impl Into<String>,
        msgcount: u64,
        domain: impl Into<String>,
    ) -> Self {
        Self::builder(MessageKind::plural(msgsingle, msgplural, msgcount))
            .domain(domain)
            .build()
    }

    /// The catalog key.
    #[must_use]
    pub const fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// The catalog domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The locale directory fixed at construction, if any.
    #[must_use]
    pub fn localedir(&self) -> Option<&Utf8Path> {
        self.localedir.as_deref()
    }

    /// The substitution params, if any.
    #[must_use]
    pub const fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// Text rendered at construction time.
    #[must_use]
    pub fn default_text(&self) -> &str {
        &self.default_text
    }

    /// Renders the message for `desired_locale`.
    ///
    /// Without a locale the system locale applies, falling back to
    /// [`crate::locale::FALLBACK_LOCALE`]. Nested messages in the params are
    /// translated into the same locale before substitution. The message
    /// itself is never modified.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when the params do not fit the translated
    /// template, or when a nested message fails to render.
    pub fn translate(&self, desired_locale: Option<&str>) -> Result<String, FormatError> {
        let locale = desired_or_default(desired_locale);
        let template = resolve_text(
            &self.kind,
            self.resolver.as_ref(),
            &self.domain,
            self.localedir.as_deref(),
            std::slice::from_ref(&locale),
        );
        let Some(params) = &self.params else {
            return Ok(template);
        };
        let translated = params.translate(Some(&locale))?;
        percent_format(&template, &translated)
    }

    /// Renders the message from the single MO catalog at `path`.
    ///
    /// Unlike [`Message::translate`] nothing falls back silently: the
    /// catalog must exist and parse. Nested messages in the params still
    /// resolve through their own resolvers for `desired_locale`. Useful for
    /// checking a catalog's templates against the params a program supplies.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::CatalogRead`] or [`I18nError::CatalogParse`] when
    /// the catalog cannot be loaded, and [`I18nError::Format`] when the params
    /// do not fit the catalog's template.
    pub fn render_with_catalog(
        &self,
        path: &Utf8Path,
        desired_locale: Option<&str>,
    ) -> Result<String, I18nError> {
        let catalog = load_catalog(path)?;
        let template = self.kind.lookup_in(&catalog);
        let Some(params) = &self.params else {
            return Ok(template);
        };
        let locale = desired_or_default(desired_locale);
        let translated = params.translate(Some(&locale))?;
        Ok(percent_format(&template, &translated)?)
    }

    /// Applies `params` to the message, producing a new message.
    ///
    /// The params are merged with any already attached (see
    /// [`Params::merge`]) and substituted into the default text, with nested
    /// messages contributing their own default text. The result keeps this
    /// message's key and domain, so it can still be translated later.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when the merged params do not fit the
    /// default text.
    pub fn format(&self, params: impl Into<Params>) -> Result<Self, FormatError> {
        // An empty mapping is the identity for `merge`.
        let merged = self
            .params
            .clone()
            .unwrap_or_else(|| Params::Mapping(BTreeMap::new()))
            .merge(params.into());
        let default_text = percent_format(&self.default_text, &merged.to_default_text())?;
        Ok(Self {
            kind: self.kind.clone(),
            domain: self.domain.clone(),
            localedir: self.localedir.clone(),
            params: Some(merged),
            default_text,
            resolver: Arc::clone(&self.resolver),
        })
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("kind", &self.kind)
            .field("domain", &self.domain)
            .field("localedir", &self.localedir)
            .field("params", &self.params)
            .field("default_text", &self.default_text)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.default_text)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.default_text == other.default_text
    }
}

impl Eq for Message {}

impl Hash for Message {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.default_text.hash(state);
    }
}

impl PartialEq<str> for Message {
    fn eq(&self, other: &str) -> bool {
        self.default_text == other
    }
}

impl PartialEq<&str> for Message {
    fn eq(&self, other: &&str) -> bool {
        self.default_text == *other
    }
}

impl PartialEq<String> for Message {
    fn eq(&self, other: &String) -> bool {
        &self.default_text == other
    }
}

/// Configures and builds a [`Message`].
#[derive(Clone)]
#[must_use = "call `build` to produce the message"]
pub struct MessageBuilder {
    kind: MessageKind,
    domain: String,
    localedir: Option<Utf8PathBuf>,
    params: Option<Params>,
    text: Option<String>,
    resolver: Option<Arc<dyn CatalogResolver>>,
}

impl MessageBuilder {
    fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            domain: DEFAULT_DOMAIN.to_owned(),
            localedir: None,
            params: None,
            text: None,
            resolver: None,
        }
    }

    /// Sets the catalog domain; defaults to [`DEFAULT_DOMAIN`].
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Fixes the locale directory. Without one the domain's
    /// `<DOMAIN>_LOCALEDIR` variable is consulted on every lookup.
    pub fn localedir(mut self, localedir: impl Into<Utf8PathBuf>) -> Self {
        self.localedir = Some(localedir.into());
        self
    }

    pub(crate) fn localedir_if_set(mut self, localedir: Option<Utf8PathBuf>) -> Self {
        self.localedir = localedir;
        self
    }

    /// Attaches substitution params applied by [`Message::translate`].
    ///
    /// The default text is not substituted; use [`Message::format`] for
    /// that.
    pub fn params(mut self, params: impl Into<Params>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Supplies the default text instead of looking it up. An empty string
    /// counts as no override.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the resolver used for every lookup; defaults to
    /// [`GettextResolver::shared`].
    pub fn resolver(mut self, resolver: Arc<dyn CatalogResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Builds the message, looking up its default text in the system locale
    /// unless an override was given.
    #[must_use]
    pub fn build(self) -> Message {
        let resolver = self
            .resolver
            .unwrap_or_else(|| GettextResolver::shared() as Arc<dyn CatalogResolver>);
        let default_text = self.text.filter(|text| !text.is_empty()).unwrap_or_else(|| {
            resolve_text(
                &self.kind,
                resolver.as_ref(),
                &self.domain,
                self.localedir.as_deref(),
                &[desired_or_default(None)],
            )
        });
        Message {
            kind: self.kind,
            domain: self.domain,
            localedir: self.localedir,
            params: self.params,
            default_text,
            resolver,
        }
    }
}

impl fmt::Debug for MessageBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBuilder")
            .field("kind", &self.kind)
            .field("domain", &self.domain)
            .field("localedir", &self.localedir)
            .field("params", &self.params)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}
