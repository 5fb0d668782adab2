//! Translator functions bound to a catalog domain.
//!
//! A [`TranslatorFactory`] hands out closures for each translation flavour.
//! Every closure checks its [`LazyMode`] when called: in lazy mode it wraps
//! its arguments in a [`Message`] for later rendering, otherwise it looks
//! the text up immediately in the catalogs resolved when the closure was
//! created.

use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::catalog::{CatalogQuery, CatalogResolver, GettextResolver, Translations, context_key};
use crate::config::localedir_from_env;
use crate::error::FormatError;
use crate::format::percent_format;
use crate::lazy::LazyMode;
use crate::locale::default_languages;
use crate::message::{Message, MessageKind, without_context};
use crate::params::{Param, Params};

/// Severity of a log message, each with its own catalog domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Informational messages.
    Info,
    /// Warnings.
    Warning,
    /// Errors.
    Error,
    /// Critical failures.
    Critical,
}

impl LogLevel {
    /// Lower-case level name used in log domains.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Catalog domain for this level's messages, e.g. `app-log-info`.
    #[must_use]
    pub fn domain_for(self, domain: &str) -> String {
        format!("{domain}-log-{}", self.as_str())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a translator function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Translated {
    /// Text looked up when the translator was called.
    Text(String),
    /// A deferred message, produced in lazy mode.
    Lazy(Message),
}

impl Translated {
    /// The text to show now: the looked-up text or the message's default
    /// text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Lazy(message) => message.default_text(),
        }
    }

    /// Renders for `desired_locale`. Eager text is already final and is
    /// returned as-is.
    ///
    /// # Errors
    ///
    /// Propagates [`Message::translate`] failures.
    pub fn translate(&self, desired_locale: Option<&str>) -> Result<String, FormatError> {
        match self {
            Self::Text(text) => Ok(text.clone()),
            Self::Lazy(message) => message.translate(desired_locale),
        }
    }

    /// Substitutes `params`, keeping a lazy message lazy.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when the params do not fit the text.
    pub fn format(&self, params: impl Into<Params>) -> Result<Self, FormatError> {
        match self {
            Self::Text(text) => {
                percent_format(text, &params.into().to_default_text()).map(Self::Text)
            }
            Self::Lazy(message) => message.format(params).map(Self::Lazy),
        }
    }

    /// Reports whether the lookup was deferred.
    #[must_use]
    pub const fn is_lazy(&self) -> bool {
        matches!(self, Self::Lazy(_))
    }

    /// Returns the deferred message, if any.
    #[must_use]
    pub fn into_message(self) -> Option<Message> {
        match self {
            Self::Lazy(message) => Some(message),
            Self::Text(_) => None,
        }
    }

    /// Converts into the text to show now.
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Lazy(message) => message.default_text().to_owned(),
        }
    }
}

impl fmt::Display for Translated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for Translated {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Translated {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl From<Translated> for Param {
    fn from(value: Translated) -> Self {
        match value {
            Translated::Text(text) => Self::Str(text),
            Translated::Lazy(message) => Self::Message(Box::new(message)),
        }
    }
}

impl From<Translated> for Params {
    fn from(value: Translated) -> Self {
        Self::Scalar(value.into())
    }
}

struct Binding {
    domain: String,
    localedir: Option<Utf8PathBuf>,
    resolver: Arc<dyn CatalogResolver>,
    lazy: LazyMode,
    translations: Arc<dyn Translations>,
}

impl Binding {
    fn message(&self, kind: MessageKind) -> Message {
        Message::builder(kind)
            .domain(self.domain.as_str())
            .resolver(Arc::clone(&self.resolver))
            .localedir_if_set(self.localedir.clone())
            .build()
    }

    fn simple(&self, msgid: &str) -> Translated {
        if self.lazy.is_enabled() {
            return Translated::Lazy(self.message(MessageKind::simple(msgid)));
        }
        Translated::Text(self.translations.gettext(msgid).to_owned())
    }

    fn contextual(&self, msgctx: &str, msgid: &str) -> Translated {
        if self.lazy.is_enabled() {
            return Translated::Lazy(self.message(MessageKind::contextual(msgctx, msgid)));
        }
        let key = context_key(msgctx, msgid);
        let found = self.translations.gettext(&key).to_owned();
        Translated::Text(without_context(found, msgctx, msgid))
    }

    fn plural(&self, msgsingle: &str, msgplural: &str, msgcount: u64) -> Translated {
        if self.lazy.is_enabled() {
            return Translated::Lazy(
                self.message(MessageKind::plural(msgsingle, msgplural, msgcount)),
            );
        }
        Translated::Text(
            self.translations
                .ngettext(msgsingle, msgplural, msgcount)
                .to_owned(),
        )
    }
}

/// Produces translator functions for one catalog domain.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use lazy_gettext::catalog::MemoryResolver;
/// use lazy_gettext::{LazyMode, TranslatorFactory};
///
/// let factory = TranslatorFactory::builder("inventory")
///     .resolver(Arc::new(MemoryResolver::new()))
///     .lazy(LazyMode::Enabled)
///     .build();
/// let translate = factory.primary();
/// let message = translate("Stock level");
/// assert!(message.is_lazy());
/// assert_eq!(message.translate(Some("fr"))?, "Stock level");
/// # Ok::<(), lazy_gettext::FormatError>(())
/// ```
#[derive(Clone)]
pub struct TranslatorFactory {
    domain: String,
    localedir: Option<Utf8PathBuf>,
    resolver: Arc<dyn CatalogResolver>,
    lazy: LazyMode,
}

impl TranslatorFactory {
    /// Creates a factory for `domain` with default settings.
    ///
    /// The locale directory comes from the domain's `<DOMAIN>_LOCALEDIR`
    /// variable, the shared gettext resolver serves lookups and the
    /// process-wide lazy switch decides between eager and lazy results.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self::builder(domain).build()
    }

    /// Starts configuring a factory for `domain`.
    pub fn builder(domain: impl Into<String>) -> TranslatorFactoryBuilder {
        TranslatorFactoryBuilder {
            domain: domain.into(),
            localedir: None,
            resolver: None,
            lazy: LazyMode::default(),
        }
    }

    /// The catalog domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The locale directory, if one was given or configured.
    #[must_use]
    pub fn localedir(&self) -> Option<&Utf8Path> {
        self.localedir.as_deref()
    }

    /// How translators decide between lazy and eager results.
    #[must_use]
    pub const fn lazy_mode(&self) -> LazyMode {
        self.lazy
    }

    fn bind(&self, domain: String) -> Binding {
        let languages = default_languages();
        let translations = self.resolver.resolve(&CatalogQuery {
            domain: &domain,
            localedir: self.localedir.as_deref(),
            locales: &languages,
        });
        Binding {
            domain,
            localedir: self.localedir.clone(),
            resolver: Arc::clone(&self.resolver),
            lazy: self.lazy,
            translations,
        }
    }

    /// Translator for simple messages.
    #[must_use]
    pub fn primary(&self) -> impl Fn(&str) -> Translated + Send + Sync + 'static {
        let binding = self.bind(self.domain.clone());
        move |msgid| binding.simple(msgid)
    }

    /// Translator for context-qualified messages, called as
    /// `translate(msgctx, msgid)`.
    #[must_use]
    pub fn contextual_form(&self) -> impl Fn(&str, &str) -> Translated + Send + Sync + 'static {
        let binding = self.bind(self.domain.clone());
        move |msgctx, msgid| binding.contextual(msgctx, msgid)
    }

    /// Translator for plural messages, called as
    /// `translate(msgsingle, msgplural, msgcount)`.
    #[must_use]
    pub fn plural_form(
        &self,
    ) -> impl Fn(&str, &str, u64) -> Translated + Send + Sync + 'static {
        let binding = self.bind(self.domain.clone());
        move |msgsingle, msgplural, msgcount| binding.plural(msgsingle, msgplural, msgcount)
    }

    /// Translator for log messages of `level`, using the
    /// `<domain>-log-<level>` catalog domain.
    #[must_use]
    pub fn log_translator(
        &self,
        level: LogLevel,
    ) -> impl Fn(&str) -> Translated + Send + Sync + 'static {
        let binding = self.bind(level.domain_for(&self.domain));
        move |msgid| binding.simple(msgid)
    }

    /// Translator for info-level log messages.
    #[must_use]
    pub fn log_info(&self) -> impl Fn(&str) -> Translated + Send + Sync + 'static {
        self.log_translator(LogLevel::Info)
    }

    /// Translator for warning-level log messages.
    #[must_use]
    pub fn log_warning(&self) -> impl Fn(&str) -> Translated + Send + Sync + 'static {
        self.log_translator(LogLevel::Warning)
    }

    /// Translator for error-level log messages.
    #[must_use]
    pub fn log_error(&self) -> impl Fn(&str) -> Translated + Send + Sync + 'static {
        self.log_translator(LogLevel::Error)
    }

    /// Translator for critical-level log messages.
    #[must_use]
    pub fn log_critical(&self) -> impl Fn(&str) -> Translated + Send + Sync + 'static {
        self.log_translator(LogLevel::Critical)
    }
}

impl fmt::Debug for TranslatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorFactory")
            .field("domain", &self.domain)
            .field("localedir", &self.localedir)
            .field("lazy", &self.lazy)
            .finish_non_exhaustive()
    }
}

/// Configures a [`TranslatorFactory`].
#[must_use = "call `build` to produce the factory"]
pub struct TranslatorFactoryBuilder {
    domain: String,
    localedir: Option<Utf8PathBuf>,
    resolver: Option<Arc<dyn CatalogResolver>>,
    lazy: LazyMode,
}

impl TranslatorFactoryBuilder {
    /// Sets the locale directory instead of reading `<DOMAIN>_LOCALEDIR`.
    pub fn localedir(mut self, localedir: impl Into<Utf8PathBuf>) -> Self {
        self.localedir = Some(localedir.into());
        self
    }

    /// Sets the resolver; defaults to [`GettextResolver::shared`].
    pub fn resolver(mut self, resolver: Arc<dyn CatalogResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Pins or releases the lazy decision; defaults to
    /// [`LazyMode::Process`].
    pub fn lazy(mut self, lazy: impl Into<LazyMode>) -> Self {
        self.lazy = lazy.into();
        self
    }

    /// Builds the factory, reading `<DOMAIN>_LOCALEDIR` when no directory
    /// was set.
    #[must_use]
    pub fn build(self) -> TranslatorFactory {
        let localedir = self
            .localedir
            .or_else(|| localedir_from_env(&self.domain));
        TranslatorFactory {
            domain: self.domain,
            localedir,
            resolver: self
                .resolver
                .unwrap_or_else(|| GettextResolver::shared() as Arc<dyn CatalogResolver>),
            lazy: self.lazy,
        }
    }
}

impl fmt::Debug for TranslatorFactoryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorFactoryBuilder")
            .field("domain", &self.domain)
            .field("localedir", &self.localedir)
            .field("lazy", &self.lazy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MemoryCatalog, MemoryResolver};
    use crate::lazy::enable_lazy;
    use anyhow::ensure;
    use figment::Jail;
    use rstest::{fixture, rstest};
    use serial_test::serial;
    use test_helpers::locale_env;

    const DOMAIN: &str = "factory-tests";

    #[fixture]
    fn resolver() -> Arc<dyn CatalogResolver> {
        Arc::new(
            MemoryResolver::new()
                .with_catalog(
                    DOMAIN,
                    "es",
                    MemoryCatalog::new()
                        .with_message("Hello", "Hola")
                        .with_contextual("door", "Open", "Abrir")
                        .with_plural("%d file", ["%d archivo", "%d archivos"]),
                )
                .with_catalog(
                    "factory-tests-log-error",
                    "es",
                    MemoryCatalog::new().with_message("Disk full", "Disco lleno"),
                ),
        )
    }

    fn factory(resolver: &Arc<dyn CatalogResolver>, lazy: LazyMode) -> TranslatorFactory {
        TranslatorFactory::builder(DOMAIN)
            .localedir("/srv/locale")
            .resolver(Arc::clone(resolver))
            .lazy(lazy)
            .build()
    }

    #[rstest]
    #[case(LogLevel::Info, "app-log-info")]
    #[case(LogLevel::Warning, "app-log-warning")]
    #[case(LogLevel::Error, "app-log-error")]
    #[case(LogLevel::Critical, "app-log-critical")]
    fn log_levels_name_their_domains(#[case] level: LogLevel, #[case] expected: &str) {
        assert_eq!(level.domain_for("app"), expected);
    }

    #[rstest]
    #[serial(locale_env)]
    fn eager_translators_use_language_list(resolver: Arc<dyn CatalogResolver>) {
        let scope = locale_env::scoped(None);
        let _language = scope.set_var("LANGUAGE", "es");
        let factory = factory(&resolver, LazyMode::Disabled);
        let primary = factory.primary();
        let contextual = factory.contextual_form();
        let plural = factory.plural_form();
        assert_eq!(primary("Hello"), Translated::Text(String::from("Hola")));
        assert_eq!(contextual("door", "Open"), "Abrir");
        assert_eq!(contextual("window", "Open"), "Open");
        assert_eq!(plural("%d file", "%d files", 1), "%d archivo");
        assert_eq!(plural("%d file", "%d files", 2), "%d archivos");
    }

    #[rstest]
    #[serial(locale_env)]
    fn eager_translators_echo_without_language(resolver: Arc<dyn CatalogResolver>) {
        let _scope = locale_env::scoped(None);
        let factory = factory(&resolver, LazyMode::Disabled);
        assert_eq!(factory.primary()("Hello"), "Hello");
        assert_eq!(factory.contextual_form()("door", "Open"), "Open");
        assert_eq!(factory.plural_form()("%d file", "%d files", 3), "%d files");
    }

    #[rstest]
    fn lazy_translators_defer_lookup(resolver: Arc<dyn CatalogResolver>) -> anyhow::Result<()> {
        let factory = factory(&resolver, LazyMode::Enabled);
        let contextual = factory.contextual_form()("door", "Open");
        let message = contextual
            .clone()
            .into_message()
            .ok_or_else(|| anyhow::anyhow!("expected a lazy message"))?;
        ensure!(
            message.kind() == &MessageKind::contextual("door", "Open"),
            "kind {:?}",
            message.kind()
        );
        ensure!(message.domain() == DOMAIN, "domain {}", message.domain());
        ensure!(
            message.localedir() == Some(Utf8Path::new("/srv/locale")),
            "localedir {:?}",
            message.localedir()
        );
        let spanish = contextual.translate(Some("es"))?;
        let german = contextual.translate(Some("de"))?;
        ensure!(spanish == "Abrir", "es: got {spanish}");
        ensure!(german == "Open", "de: got {german}");

        let plural = factory.plural_form()("%d file", "%d files", 4).format(4)?;
        ensure!(plural.is_lazy(), "formatting dropped laziness");
        let files = plural.translate(Some("es"))?;
        ensure!(files == "4 archivos", "plural: got {files}");
        Ok(())
    }

    #[rstest]
    #[serial(lazy_mode)]
    fn process_mode_is_read_per_call(resolver: Arc<dyn CatalogResolver>) {
        let translate = factory(&resolver, LazyMode::Process).primary();
        enable_lazy(true);
        assert!(translate("Hello").is_lazy());
        enable_lazy(false);
        assert!(!translate("Hello").is_lazy());
    }

    #[rstest]
    fn log_translators_use_level_domains(
        resolver: Arc<dyn CatalogResolver>,
    ) -> anyhow::Result<()> {
        let factory = factory(&resolver, LazyMode::Enabled);
        let error = factory.log_error()("Disk full");
        let info = factory.log_info()("Disk full");
        let domain = error
            .clone()
            .into_message()
            .map(|message| message.domain().to_owned());
        ensure!(
            domain.as_deref() == Some("factory-tests-log-error"),
            "log domain {domain:?}"
        );
        let error_text = error.translate(Some("es"))?;
        let info_text = info.translate(Some("es"))?;
        ensure!(error_text == "Disco lleno", "error: got {error_text}");
        ensure!(info_text == "Disk full", "info: got {info_text}");
        Ok(())
    }

    #[rstest]
    #[serial(locale_env)]
    fn eager_text_formats_nested_lazy_values(
        resolver: Arc<dyn CatalogResolver>,
    ) -> anyhow::Result<()> {
        let _scope = locale_env::scoped(None);
        let lazy = factory(&resolver, LazyMode::Enabled).primary()("Hello");
        let text = Translated::Text(String::from("%s, world"));
        let formatted = text.format(lazy)?;
        ensure!(
            formatted == Translated::Text(String::from("Hello, world")),
            "formatted {formatted:?}"
        );
        ensure!(formatted.into_string() == "Hello, world", "text changed");
        Ok(())
    }

    #[rstest]
    fn localedir_defaults_to_domain_variable() {
        Jail::expect_with(|jail| {
            jail.set_env("FACTORY_JAIL_LOCALEDIR", "/usr/local/share/locale");
            let configured = TranslatorFactory::builder("factory-jail")
                .resolver(Arc::new(MemoryResolver::new()))
                .build();
            assert_eq!(
                configured.localedir(),
                Some(Utf8Path::new("/usr/local/share/locale"))
            );
            let explicit = TranslatorFactory::builder("factory-jail")
                .localedir("/opt/locale")
                .resolver(Arc::new(MemoryResolver::new()))
                .build();
            assert_eq!(explicit.localedir(), Some(Utf8Path::new("/opt/locale")));
            Ok(())
        });
    }

    #[rstest]
    fn translators_can_cross_threads(resolver: Arc<dyn CatalogResolver>) {
        let translate = factory(&resolver, LazyMode::Enabled).primary();
        let handle = std::thread::spawn(move || translate("Hello").translate(Some("es")));
        assert_eq!(handle.join().ok(), Some(Ok(String::from("Hola"))));
    }
}
