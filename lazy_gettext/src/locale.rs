//! System locale discovery and gettext-style locale expansion.

use std::env;

/// Locale used when the environment does not name one.
pub const FALLBACK_LOCALE: &str = "en_US";

const DEFAULT_LOCALE_VARS: [&str; 4] = ["LC_ALL", "LC_CTYPE", "LANG", "LANGUAGE"];
const LANGUAGE_LIST_VARS: [&str; 4] = ["LANGUAGE", "LC_ALL", "LC_MESSAGES", "LANG"];

// Territories glibc's locale.alias assigns to bare language codes.
const LANGUAGE_TERRITORIES: [(&str, &str); 24] = [
    ("ar", "ar_AA"),
    ("cs", "cs_CZ"),
    ("da", "da_DK"),
    ("de", "de_DE"),
    ("el", "el_GR"),
    ("en", "en_US"),
    ("es", "es_ES"),
    ("fi", "fi_FI"),
    ("fr", "fr_FR"),
    ("he", "he_IL"),
    ("hu", "hu_HU"),
    ("it", "it_IT"),
    ("ja", "ja_JP"),
    ("ko", "ko_KR"),
    ("nb", "nb_NO"),
    ("nl", "nl_NL"),
    ("pl", "pl_PL"),
    ("pt", "pt_PT"),
    ("ru", "ru_RU"),
    ("sv", "sv_SE"),
    ("tr", "tr_TR"),
    ("uk", "uk_UA"),
    ("vi", "vi_VN"),
    ("zh", "zh_CN"),
];

/// Completes a bare language code with its customary territory.
///
/// Codes that already name a territory, or that the alias table does not
/// know, are returned unchanged.
///
/// # Examples
/// ```rust
/// use lazy_gettext::locale::normalize_locale;
///
/// assert_eq!(normalize_locale("de"), "de_DE");
/// assert_eq!(normalize_locale("pt_BR"), "pt_BR");
/// assert_eq!(normalize_locale("eo"), "eo");
/// ```
#[must_use]
pub fn normalize_locale(code: &str) -> String {
    LANGUAGE_TERRITORIES
        .iter()
        .find(|(language, _)| language.eq_ignore_ascii_case(code))
        .map_or_else(|| code.to_owned(), |(_, locale)| (*locale).to_owned())
}

fn first_env_value(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.is_empty())
}

/// Returns the locale configured for the process, if any.
///
/// The first non-empty variable among `LC_ALL`, `LC_CTYPE`, `LANG` and
/// `LANGUAGE` wins. The codeset and modifier are dropped, so
/// `de_DE.UTF-8@euro` yields `de_DE`, and a bare language is completed by
/// [`normalize_locale`], so `de` also yields `de_DE`. The `C` and `POSIX`
/// locales carry no language and report `None`.
#[must_use]
pub fn default_locale() -> Option<String> {
    let raw = first_env_value(&DEFAULT_LOCALE_VARS)?;
    let first = raw.split(':').next().unwrap_or_default();
    let code = first
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    if code.is_empty() || code == "C" || code == "POSIX" {
        return None;
    }
    Some(normalize_locale(code))
}

/// Resolves the locale a lookup should target.
///
/// An explicit, non-empty `desired` locale is used as-is; otherwise the
/// system locale applies, and [`FALLBACK_LOCALE`] covers an environment that
/// names none.
#[must_use]
pub fn desired_or_default(desired: Option<&str>) -> String {
    if let Some(locale) = desired.filter(|locale| !locale.is_empty()) {
        return locale.to_owned();
    }
    default_locale().unwrap_or_else(|| {
        tracing::debug!(
            fallback = FALLBACK_LOCALE,
            "system locale unavailable; using fallback"
        );
        FALLBACK_LOCALE.to_owned()
    })
}

/// Returns the language list consulted by eager translators.
///
/// Mirrors gettext: the first non-empty of `LANGUAGE`, `LC_ALL`,
/// `LC_MESSAGES` and `LANG`, split on `:`. With nothing set the list is
/// `["C"]`, which resolves to no catalog at all.
#[must_use]
pub fn default_languages() -> Vec<String> {
    first_env_value(&LANGUAGE_LIST_VARS).map_or_else(
        || vec![String::from("C")],
        |value| {
            value
                .split(':')
                .filter(|entry| !entry.is_empty())
                .map(str::to_owned)
                .collect()
        },
    )
}

struct LocaleParts<'a> {
    language: &'a str,
    territory: Option<&'a str>,
    codeset: Option<&'a str>,
    modifier: Option<&'a str>,
}

impl<'a> LocaleParts<'a> {
    fn split(tag: &'a str) -> Self {
        let (head, modifier) = tag
            .split_once('@')
            .map_or((tag, None), |(rest, tail)| (rest, Some(tail)));
        let (name, codeset) = head
            .split_once('.')
            .map_or((head, None), |(rest, tail)| (rest, Some(tail)));
        let (language, territory) = name
            .split_once('_')
            .map_or((name, None), |(rest, tail)| (rest, Some(tail)));
        Self {
            language,
            territory,
            codeset,
            modifier,
        }
    }
}

/// Expands a locale into the names gettext probes, most specific first.
///
/// The modifier outranks the territory, which outranks the codeset.
///
/// # Examples
/// ```rust
/// use lazy_gettext::locale::expand_locale;
///
/// assert_eq!(
///     expand_locale("de_DE.UTF-8"),
///     vec!["de_DE.UTF-8", "de_DE", "de.UTF-8", "de"],
/// );
/// ```
#[must_use]
pub fn expand_locale(tag: &str) -> Vec<String> {
    let parts = LocaleParts::split(tag);
    let mut expanded = Vec::new();
    for with_modifier in [true, false] {
        if with_modifier && parts.modifier.is_none() {
            continue;
        }
        for with_territory in [true, false] {
            if with_territory && parts.territory.is_none() {
                continue;
            }
            for with_codeset in [true, false] {
                if with_codeset && parts.codeset.is_none() {
                    continue;
                }
                let mut name = parts.language.to_owned();
                if let Some(territory) = parts.territory.filter(|_| with_territory) {
                    name.push('_');
                    name.push_str(territory);
                }
                if let Some(codeset) = parts.codeset.filter(|_| with_codeset) {
                    name.push('.');
                    name.push_str(codeset);
                }
                if let Some(modifier) = parts.modifier.filter(|_| with_modifier) {
                    name.push('@');
                    name.push_str(modifier);
                }
                expanded.push(name);
            }
        }
    }
    expanded
}

/// Expands and de-duplicates `locales`, stopping at the `C` locale.
#[must_use]
pub fn candidate_languages(locales: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for locale in locales {
        for name in expand_locale(locale) {
            if !candidates.contains(&name) {
                candidates.push(name);
            }
        }
    }
    if let Some(stop) = candidates.iter().position(|name| name == "C") {
        candidates.truncate(stop);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serial_test::serial;
    use test_helpers::locale_env;

    #[rstest]
    #[case("de", vec!["de"])]
    #[case("pt_BR", vec!["pt_BR", "pt"])]
    #[case("sr_RS@latin", vec!["sr_RS@latin", "sr@latin", "sr_RS", "sr"])]
    #[case(
        "de_DE.UTF-8@euro",
        vec![
            "de_DE.UTF-8@euro",
            "de_DE@euro",
            "de.UTF-8@euro",
            "de@euro",
            "de_DE.UTF-8",
            "de_DE",
            "de.UTF-8",
            "de",
        ]
    )]
    fn expands_most_specific_first(#[case] tag: &str, #[case] expected: Vec<&str>) {
        assert_eq!(expand_locale(tag), expected);
    }

    #[rstest]
    fn candidates_are_deduplicated_and_stop_at_c() {
        let locales = vec![
            String::from("fr_CA"),
            String::from("fr"),
            String::from("C"),
            String::from("de"),
        ];
        assert_eq!(candidate_languages(&locales), vec!["fr_CA", "fr"]);
    }

    #[rstest]
    #[serial(locale_env)]
    fn default_locale_strips_codeset() {
        let _scope = locale_env::scoped(Some("es_MX.UTF-8"));
        assert_eq!(default_locale().as_deref(), Some("es_MX"));
    }

    #[rstest]
    #[case("de", "de_DE")]
    #[case("ja.UTF-8", "ja_JP")]
    #[case("fr_CA", "fr_CA")]
    #[case("eo", "eo")]
    #[serial(locale_env)]
    fn default_locale_completes_bare_languages(#[case] value: &str, #[case] expected: &str) {
        let _scope = locale_env::scoped(Some(value));
        assert_eq!(default_locale().as_deref(), Some(expected));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("C"))]
    #[case(Some("POSIX"))]
    #[case(Some("C.UTF-8"))]
    #[serial(locale_env)]
    fn posix_or_unset_locale_falls_back(#[case] value: Option<&str>) {
        let _scope = locale_env::scoped(value);
        assert_eq!(default_locale(), None);
        assert_eq!(desired_or_default(None), FALLBACK_LOCALE);
    }

    #[rstest]
    #[serial(locale_env)]
    fn explicit_locale_wins_over_environment() {
        let _scope = locale_env::scoped(Some("ja_JP.UTF-8"));
        assert_eq!(desired_or_default(Some("ko")), "ko");
        assert_eq!(desired_or_default(Some("")), "ja_JP");
    }

    #[rstest]
    #[serial(locale_env)]
    fn language_list_prefers_language_variable() {
        let scope = locale_env::scoped(Some("de_DE.UTF-8"));
        let _language = scope.set_var("LANGUAGE", "fr:it");
        assert_eq!(default_languages(), vec!["fr", "it"]);
    }

    #[rstest]
    #[serial(locale_env)]
    fn language_list_defaults_to_c() {
        let _scope = locale_env::scoped(None);
        assert_eq!(default_languages(), vec!["C"]);
    }
}
