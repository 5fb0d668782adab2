//! Lazy translation on top of gettext message catalogs.
//!
//! Application code obtains translator functions from a
//! [`TranslatorFactory`]. With lazy translation enabled they return
//! [`Message`] values that remember their key, domain and params, so the
//! same message can later be rendered into whichever locale a log handler or
//! response needs. Params may nest further messages, which are translated
//! into the same locale. With lazy translation off the functions look text
//! up straight away.
//!
//! Catalog lookups go through the [`catalog::CatalogResolver`] trait.
//! [`catalog::GettextResolver`] reads binary MO files from
//! `<localedir>/<lang>/LC_MESSAGES/<domain>.mo`; missing catalogs and
//! entries never fail, they fall back to the source text.

pub mod catalog;
pub mod config;
pub mod error;
mod factory;
pub mod format;
pub mod lazy;
pub mod locale;
mod message;
pub mod params;

pub use catalog::{CONTEXT_SEPARATOR, CatalogResolver, GettextResolver};
pub use error::{FormatError, I18nError};
pub use factory::{LogLevel, Translated, TranslatorFactory, TranslatorFactoryBuilder};
pub use lazy::{LazyMode, enable_lazy, is_lazy_enabled};
pub use message::{DEFAULT_DOMAIN, Message, MessageBuilder, MessageKind};
pub use params::{Param, Params};
