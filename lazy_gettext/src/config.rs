//! Per-domain settings drawn from the process environment.
//!
//! Each translation domain may point at its catalog directory through a
//! variable named after the domain, e.g. `MY_APP_LOCALEDIR` for `my-app`.
//! Settings are extracted with figment from the variables an [`Env`]
//! provider selects for the domain's prefix, so further keys can join
//! [`DomainSettings`] without touching the lookup code. Values are taken
//! verbatim: a directory named `2024` or `[locale]` stays a string.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};

use crate::error::I18nError;

const LOCALEDIR_SUFFIX: &str = "_LOCALEDIR";

fn domain_stem(domain: &str) -> String {
    domain.to_uppercase().replace(['.', '-'], "_")
}

/// Name of the environment variable holding the catalog directory for
/// `domain`.
///
/// # Examples
/// ```rust
/// use lazy_gettext::config::localedir_variable_name;
///
/// assert_eq!(localedir_variable_name("my.app-web"), "MY_APP_WEB_LOCALEDIR");
/// ```
#[must_use]
pub fn localedir_variable_name(domain: &str) -> String {
    let mut name = domain_stem(domain);
    name.push_str(LOCALEDIR_SUFFIX);
    name
}

/// Settings recognised for a translation domain.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DomainSettings {
    /// Directory containing `<lang>/LC_MESSAGES/<domain>.mo` catalogs.
    #[serde(default)]
    pub localedir: Option<String>,
}

impl DomainSettings {
    /// Extracts the settings for `domain` from `<DOMAIN>_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::Settings`] when a recognised variable holds a
    /// value of the wrong shape.
    pub fn from_env(domain: &str) -> Result<Self, I18nError> {
        let mut prefix = domain_stem(domain);
        prefix.push('_');
        // `Env` would parse `2024` or `true` into non-string values.
        let raw: BTreeMap<String, String> = Env::prefixed(&prefix)
            .iter()
            .map(|(key, value)| (key.into_string(), value))
            .collect();
        Figment::from(Serialized::defaults(raw))
            .extract()
            .map_err(|err| I18nError::Settings {
                domain: domain.to_owned(),
                source: Box::new(err),
            })
    }

    /// Returns the configured catalog directory, ignoring empty values.
    #[must_use]
    pub fn localedir(&self) -> Option<Utf8PathBuf> {
        self.localedir
            .as_deref()
            .filter(|dir| !dir.is_empty())
            .map(Utf8PathBuf::from)
    }
}

/// Reads the catalog directory configured for `domain`.
///
/// Absence is normal and yields `None`. Malformed settings are logged and
/// treated as absent so that translation keeps falling back to message ids.
#[must_use]
pub fn localedir_from_env(domain: &str) -> Option<Utf8PathBuf> {
    match DomainSettings::from_env(domain) {
        Ok(settings) => settings.localedir(),
        Err(err) => {
            tracing::warn!(domain, error = %err, "ignoring invalid translation settings");
            None
        }
    }
}
